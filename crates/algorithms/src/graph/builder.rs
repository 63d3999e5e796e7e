//! Graph construction from cost and barrier layers

use serde::{Deserialize, Serialize};
use terrawalk_core::raster::{Neighborhood, Raster};
use terrawalk_core::{Error, Result};
use terrawalk_parallel::{ParallelStrategy, ProcessingMode};
use tracing::{debug, warn};

use super::{GraphSummary, TravelGraph};
use crate::barrier::PASSABLE;
use crate::conductance::{edge_conductance, CellSample, Conductance, LorentzianSpeed, SpeedModel};

/// The five congruent input layers
#[derive(Debug, Clone, Copy)]
pub struct CostLayers<'a> {
    /// Ground elevation
    pub elevation: &'a Raster<f64>,
    /// Normalized relative vegetation density, nominally in [0, 1]
    pub density: &'a Raster<f64>,
    /// Non-negative surface roughness
    pub roughness: &'a Raster<f64>,
    /// 1 = passable, 0 = cliff
    pub cliff: &'a Raster<u8>,
    /// 1 = passable, 0 = water
    pub water: &'a Raster<u8>,
}

/// Parameters for graph construction
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphParams {
    /// Adjacency pattern; 16 directions unless overridden.
    ///
    /// Barriers only block edges that start or end on them. Knight's-move
    /// edges under [`Neighborhood::Knight16`] span two rows or columns, so
    /// a barrier must be at least two cells thick to separate the grid; a
    /// one-cell line is enough under [`Neighborhood::Queen8`].
    pub neighborhood: Neighborhood,
    /// Row scheduling
    pub mode: ProcessingMode,
}

/// Unbuilt travel graph: validated inputs and a speed model.
///
/// ```ignore
/// let graph = GraphBuilder::new(layers)?.build(&GraphParams::default())?;
/// let path = solve(&graph, (0, 0), (40, 12))?;
/// ```
#[derive(Debug)]
pub struct GraphBuilder<'a, M = LorentzianSpeed> {
    layers: CostLayers<'a>,
    model: M,
}

impl<'a> GraphBuilder<'a> {
    /// Validate that every layer is congruent with `elevation` and that
    /// cells are square.
    pub fn new(layers: CostLayers<'a>) -> Result<Self> {
        let reference = layers.elevation;
        reference.require_square_cells()?;
        reference.check_congruent(layers.density, "density")?;
        reference.check_congruent(layers.roughness, "roughness")?;
        reference.check_congruent(layers.cliff, "cliff")?;
        reference.check_congruent(layers.water, "water")?;

        if reference.len() > u32::MAX as usize {
            return Err(Error::InvalidDimensions {
                width: reference.cols(),
                height: reference.rows(),
            });
        }

        Ok(Self {
            layers,
            model: LorentzianSpeed,
        })
    }
}

/// Edges leaving the cells of one row
#[derive(Default)]
struct RowEdges {
    counts: Vec<usize>,
    targets: Vec<u32>,
    weights: Vec<f64>,
    barrier: usize,
    degenerate: usize,
}

impl<'a, M: SpeedModel> GraphBuilder<'a, M> {
    /// Replace the speed model
    pub fn with_model<N: SpeedModel>(self, model: N) -> GraphBuilder<'a, N> {
        GraphBuilder {
            layers: self.layers,
            model,
        }
    }

    /// Materialize the graph.
    ///
    /// For every cell and each in-grid neighbor the edge weight is
    /// `distance / speed`, with distance between cell centers in ground
    /// units. Edges touching a barrier or a nodata cell, and edges whose
    /// speed is not strictly positive, are left out.
    pub fn build(&self, params: &GraphParams) -> Result<TravelGraph> {
        let elevation = self.layers.elevation;
        let (rows, cols) = elevation.shape();
        let resolution = elevation.cell_size();
        let neighborhood = params.neighborhood;

        let row_edges = params.mode.par_map(0..rows, |row| {
            let mut out = RowEdges {
                counts: Vec::with_capacity(cols),
                ..Default::default()
            };

            for col in 0..cols {
                let before = out.targets.len();

                if let Some(from) = self.sample(row, col) {
                    for (nr, nc, step) in neighborhood.neighbors(row, col, rows, cols) {
                        let Some(to) = self.sample(nr, nc) else {
                            continue;
                        };
                        let distance = step * resolution;

                        match edge_conductance(&self.model, &from, &to, distance) {
                            c @ Conductance::Speed(_) => {
                                out.targets.push((nr * cols + nc) as u32);
                                out.weights.push(c.travel_time(distance));
                            }
                            Conductance::Barrier => out.barrier += 1,
                            Conductance::Degenerate(_) => out.degenerate += 1,
                        }
                    }
                }

                out.counts.push(out.targets.len() - before);
            }

            out
        })?;

        let cells = rows * cols;
        let edges: usize = row_edges.iter().map(|r| r.targets.len()).sum();

        let mut offsets = Vec::with_capacity(cells + 1);
        let mut targets = Vec::with_capacity(edges);
        let mut weights = Vec::with_capacity(edges);
        let mut summary = GraphSummary {
            cells,
            edges,
            ..Default::default()
        };

        offsets.push(0);
        for row in row_edges {
            for count in row.counts {
                let last = offsets.last().copied().unwrap_or(0);
                offsets.push(last + count);
            }
            targets.extend(row.targets);
            weights.extend(row.weights);
            summary.barrier_edges += row.barrier;
            summary.degenerate_edges += row.degenerate;
        }

        if summary.degenerate_edges > 0 {
            warn!(
                degenerate = summary.degenerate_edges,
                "speed model returned non-positive speeds; those edges are impassable"
            );
        }
        debug!(
            cells,
            edges,
            barrier = summary.barrier_edges,
            neighborhood = ?neighborhood,
            "travel graph built"
        );

        Ok(TravelGraph::from_parts(
            (rows, cols),
            *elevation.transform(),
            elevation.crs().cloned(),
            offsets,
            targets,
            weights,
            summary,
        ))
    }

    /// Layer values at a cell, `None` where any cost layer is nodata
    fn sample(&self, row: usize, col: usize) -> Option<CellSample> {
        let l = &self.layers;
        let idx = (row, col);

        let elevation = l.elevation.data()[idx];
        let density = l.density.data()[idx];
        let roughness = l.roughness.data()[idx];
        if l.elevation.is_nodata(elevation) || l.density.is_nodata(density) || l.roughness.is_nodata(roughness) {
            return None;
        }

        let open = |mask: &Raster<u8>| {
            let v = mask.data()[idx];
            v == PASSABLE && !mask.is_nodata(v)
        };

        Some(CellSample {
            elevation,
            density,
            roughness,
            passable: open(l.cliff) && open(l.water),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barrier::IMPASSABLE;
    use approx::assert_relative_eq;
    use terrawalk_core::{GeoTransform, CRS};

    struct Layers {
        elevation: Raster<f64>,
        density: Raster<f64>,
        roughness: Raster<f64>,
        cliff: Raster<u8>,
        water: Raster<u8>,
    }

    impl Layers {
        fn flat(rows: usize, cols: usize) -> Self {
            let gt = GeoTransform::north_up(500.0, 1000.0, 10.0);
            let crs = CRS::utm(11, true);
            let f = |v: f64| Raster::filled(rows, cols, v).with_transform(gt).with_crs(crs.clone());
            let m = |v: u8| Raster::filled(rows, cols, v).with_transform(gt).with_crs(crs.clone());
            Self {
                elevation: f(0.0),
                density: f(0.0),
                roughness: f(0.0),
                cliff: m(PASSABLE),
                water: m(PASSABLE),
            }
        }

        fn borrow(&self) -> CostLayers<'_> {
            CostLayers {
                elevation: &self.elevation,
                density: &self.density,
                roughness: &self.roughness,
                cliff: &self.cliff,
                water: &self.water,
            }
        }

        fn build(&self) -> TravelGraph {
            GraphBuilder::new(self.borrow())
                .unwrap()
                .build(&GraphParams::default())
                .unwrap()
        }
    }

    fn mismatch_property(result: Result<GraphBuilder<'_>>) -> (&'static str, String) {
        match result {
            Err(Error::InputMismatch { property, layer, .. }) => (property, layer),
            other => panic!("expected InputMismatch, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_congruent_layers_accepted() {
        let layers = Layers::flat(4, 5);
        assert!(GraphBuilder::new(layers.borrow()).is_ok());
    }

    #[test]
    fn test_shape_mismatch() {
        let mut layers = Layers::flat(4, 5);
        layers.density = Raster::filled(4, 6, 0.0)
            .with_transform(*layers.elevation.transform())
            .with_crs(CRS::utm(11, true));
        assert_eq!(
            mismatch_property(GraphBuilder::new(layers.borrow())),
            ("shape", "density".to_string())
        );
    }

    #[test]
    fn test_resolution_mismatch() {
        let mut layers = Layers::flat(4, 5);
        layers.roughness.set_transform(GeoTransform::north_up(500.0, 1000.0, 5.0));
        assert_eq!(
            mismatch_property(GraphBuilder::new(layers.borrow())),
            ("resolution", "roughness".to_string())
        );
    }

    #[test]
    fn test_origin_mismatch() {
        let mut layers = Layers::flat(4, 5);
        layers.cliff.set_transform(GeoTransform::north_up(510.0, 1000.0, 10.0));
        assert_eq!(
            mismatch_property(GraphBuilder::new(layers.borrow())),
            ("origin", "cliff".to_string())
        );
    }

    #[test]
    fn test_crs_mismatch() {
        let mut layers = Layers::flat(4, 5);
        layers.water.set_crs(Some(CRS::utm(12, true)));
        assert_eq!(
            mismatch_property(GraphBuilder::new(layers.borrow())),
            ("crs", "water".to_string())
        );
    }

    #[test]
    fn test_wkt_crs_mismatch_with_non_ascii_name() {
        let mut layers = Layers::flat(3, 3);
        let named = CRS::from_wkt(format!("PROJCS[\"{}é\"]", "x".repeat(41)));
        for r in [&mut layers.elevation, &mut layers.roughness] {
            r.set_crs(Some(named.clone()));
        }
        layers.cliff.set_crs(Some(named.clone()));
        layers.water.set_crs(Some(named));
        layers.density.set_crs(Some(CRS::from_wkt("LOCAL_CS[\"site grid\"]")));

        assert_eq!(
            mismatch_property(GraphBuilder::new(layers.borrow())),
            ("crs", "density".to_string())
        );
    }

    #[test]
    fn test_non_square_cells_rejected() {
        let mut layers = Layers::flat(3, 3);
        let gt = GeoTransform::new(0.0, 0.0, 10.0, -5.0);
        for r in [&mut layers.elevation, &mut layers.density, &mut layers.roughness] {
            r.set_transform(gt);
        }
        layers.cliff.set_transform(gt);
        layers.water.set_transform(gt);
        assert!(matches!(
            GraphBuilder::new(layers.borrow()),
            Err(Error::InvalidParameter { name: "resolution", .. })
        ));
    }

    #[test]
    fn test_flat_grid_weights() {
        let graph = Layers::flat(3, 3).build();
        let v = LorentzianSpeed::lorentzian(0.0);

        assert_relative_eq!(graph.edge_weight((1, 1), (1, 2)).unwrap(), 10.0 / v, max_relative = 1e-12);
        assert_relative_eq!(
            graph.edge_weight((1, 1), (2, 2)).unwrap(),
            10.0 * std::f64::consts::SQRT_2 / v,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            graph.edge_weight((0, 0), (1, 2)).unwrap(),
            10.0 * 5f64.sqrt() / v,
            max_relative = 1e-12
        );
        // two cells apart orthogonally is not a neighbor
        assert_eq!(graph.edge_weight((0, 0), (0, 2)), None);

        // center of a 3x3 grid reaches all 8 queen neighbors, no knight
        // target fits; each corner reaches 3 queen + 2 knight neighbors
        assert_eq!(graph.edges(4).count(), 8);
        assert_eq!(graph.edges(0).count(), 5);
        assert_eq!(graph.summary().edges, graph.edge_count());
        assert_eq!(graph.summary().barrier_edges, 0);
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let mut layers = Layers::flat(6, 7);
        for r in 0..6 {
            for c in 0..7 {
                layers.elevation.set(r, c, (r * 3 + c * c) as f64).unwrap();
                layers.density.set(r, c, (r + c) as f64 / 12.0).unwrap();
            }
        }
        layers.water.set(2, 3, IMPASSABLE).unwrap();

        let builder = GraphBuilder::new(layers.borrow()).unwrap();
        let seq = builder
            .build(&GraphParams { mode: ProcessingMode::Sequential, ..Default::default() })
            .unwrap();
        let par = builder
            .build(&GraphParams { mode: ProcessingMode::ParallelWith(3), ..Default::default() })
            .unwrap();

        assert_eq!(seq.summary(), par.summary());
        for i in 0..seq.node_count() {
            let a: Vec<_> = seq.edges(i).collect();
            let b: Vec<_> = par.edges(i).collect();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_directional_asymmetry() {
        let mut layers = Layers::flat(1, 2);
        layers.elevation.set(0, 1, 3.0).unwrap();
        let graph = layers.build();

        let up = graph.edge_weight((0, 0), (0, 1)).unwrap();
        let down = graph.edge_weight((0, 1), (0, 0)).unwrap();
        let s = (3.0f64 / 10.0).atan().to_degrees();

        assert!(up > down);
        assert_relative_eq!(up, 10.0 / LorentzianSpeed::lorentzian(s), max_relative = 1e-12);
        assert_relative_eq!(down, 10.0 / LorentzianSpeed::lorentzian(-s), max_relative = 1e-12);
    }

    #[test]
    fn test_barrier_cells_are_isolated() {
        let mut layers = Layers::flat(3, 3);
        layers.cliff.set(1, 1, IMPASSABLE).unwrap();
        let graph = layers.build();

        assert_eq!(graph.edges(4).count(), 0);
        for i in 0..graph.node_count() {
            assert!(graph.edges(i).all(|(t, _)| t != 4));
        }
        // 8 out of the center plus 8 in
        assert_eq!(graph.summary().barrier_edges, 16);
    }

    #[test]
    fn test_nodata_cells_have_no_edges() {
        let mut layers = Layers::flat(3, 3);
        layers.elevation.set(0, 0, f64::NAN).unwrap();
        let graph = layers.build();

        assert_eq!(graph.edges(0).count(), 0);
        assert_eq!(graph.edge_weight((1, 1), (0, 0)), None);
        assert_eq!(graph.summary().barrier_edges, 0);
    }

    #[test]
    fn test_degenerate_speeds_are_counted() {
        struct Broken;
        impl SpeedModel for Broken {
            fn speed(&self, _: f64, _: f64, _: f64) -> f64 {
                -1.0
            }
        }

        let layers = Layers::flat(2, 2);
        let graph = GraphBuilder::new(layers.borrow())
            .unwrap()
            .with_model(Broken)
            .build(&GraphParams::default())
            .unwrap();

        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.summary().degenerate_edges, 12);
    }

    #[test]
    fn test_zero_threads_is_an_error() {
        let layers = Layers::flat(2, 2);
        let params = GraphParams {
            mode: ProcessingMode::ParallelWith(0),
            ..Default::default()
        };
        assert!(GraphBuilder::new(layers.borrow()).unwrap().build(&params).is_err());
    }
}
