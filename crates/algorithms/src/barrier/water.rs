//! Waterbody barriers from polygon datasets

use geo::{BoundingRect, Coord, Intersects, MapCoords, MultiPolygon, Point, Rect};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use terrawalk_core::crs::{reproject_bbox, transform_point};
use terrawalk_core::raster::{Raster, RasterElement};
use terrawalk_core::vector::{BoundingBox, FeatureCollection};
use terrawalk_core::{Error, Result, CRS};
use terrawalk_parallel::{ParallelStrategy, ProcessingMode};
use tracing::{debug, warn};

use super::{IMPASSABLE, PASSABLE};

/// External provider of waterbody polygons (e.g. a national hydrography
/// web service).
///
/// Implementations own their connection handling and must enforce a
/// bounded timeout; every failure is reported as an error, never as an
/// empty dataset.
pub trait HydrographySource: Send + Sync {
    /// CRS in which the source expects query extents and returns polygons
    fn crs(&self) -> CRS;

    /// Fetch the waterbody polygons intersecting `extent`
    fn query(&self, extent: &BoundingBox) -> Result<FeatureCollection>;
}

/// Where waterbody polygons come from
#[derive(Clone, Copy)]
pub enum WaterSource<'a> {
    /// Polygons supplied by the caller
    Polygons(&'a FeatureCollection),
    /// Polygons retrieved from a hydrography service for the grid's extent
    Query(&'a dyn HydrographySource),
}

/// Parameters for water rasterization
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaterParams {
    /// Row scheduling
    pub mode: ProcessingMode,
}

/// Extent to request from a hydrography source for `grid`.
///
/// The grid's bounding box is buffered on every side by its largest
/// center-to-corner distance (in grid units) and then reprojected into
/// `target`.
pub fn hydrography_query_extent<T: RasterElement>(grid: &Raster<T>, target: &CRS) -> Result<BoundingBox> {
    let extent = grid.extent();
    let buffered = extent.buffer(extent.max_corner_distance());

    match grid.crs() {
        Some(crs) => reproject_bbox(&buffered, crs, target),
        None => Err(Error::BarrierSource(
            "grid has no CRS; cannot build a hydrography query extent".into(),
        )),
    }
}

/// Build the water barrier mask for `grid` from `source`.
///
/// Queried sources that fail, or that return no polygons, are a
/// [`Error::BarrierSource`]: missing data is never read as "no water".
pub fn water_barrier(grid: &Raster<f64>, source: WaterSource<'_>, params: &WaterParams) -> Result<Raster<u8>> {
    match source {
        WaterSource::Polygons(polygons) => {
            if polygons.is_empty() {
                warn!("supplied waterbody dataset is empty; no water barriers");
            }
            rasterize_polygons(grid, polygons, params)
        }
        WaterSource::Query(service) => {
            let crs = service.crs();
            let extent = hydrography_query_extent(grid, &crs).map_err(|e| match e {
                Error::CrsMismatch(..) => {
                    Error::BarrierSource(format!("grid extent cannot be expressed in the source CRS: {}", e))
                }
                other => other,
            })?;
            debug!(?extent, crs = %crs, "querying hydrography source");

            let mut polygons = service
                .query(&extent)
                .map_err(|e| Error::BarrierSource(format!("hydrography query failed: {}", e)))?;
            if polygons.is_empty() {
                return Err(Error::BarrierSource(
                    "hydrography query returned no waterbodies".into(),
                ));
            }
            if polygons.crs.is_none() {
                polygons.crs = Some(crs);
            }
            rasterize_polygons(grid, &polygons, params)
        }
    }
}

/// A polygon in grid coordinates with its bounding rectangle
struct Footprint {
    shape: MultiPolygon<f64>,
    bounds: Rect<f64>,
}

/// Rasterize polygons onto the grid: cells whose center lies inside (or on
/// the boundary of) any polygon are impassable, all others passable.
///
/// Polygon holes are respected. Polygons in a different CRS than the grid
/// are reprojected first. Non-areal geometries are ignored.
pub fn rasterize_polygons<T: RasterElement>(
    grid: &Raster<T>,
    polygons: &FeatureCollection,
    params: &WaterParams,
) -> Result<Raster<u8>> {
    let footprints = collect_footprints(grid, polygons)?;
    let (rows, cols) = grid.shape();
    let transform = *grid.transform();

    let row_masks = params.mode.par_map(0..rows, |row| {
        let mut out = vec![PASSABLE; cols];
        if cols == 0 {
            return out;
        }
        let (_, y) = transform.pixel_to_geo(0, row);

        for fp in &footprints {
            let (min, max) = (fp.bounds.min(), fp.bounds.max());
            if y < min.y || y > max.y {
                continue;
            }
            let (c0, _) = transform.geo_to_pixel(min.x, y);
            let (c1, _) = transform.geo_to_pixel(max.x, y);
            let first = (c0.min(c1) - 0.5).floor().max(0.0) as usize;
            let last = ((c0.max(c1) - 0.5).ceil().max(0.0) as usize).min(cols - 1);

            for col in first..=last {
                if out[col] == IMPASSABLE {
                    continue;
                }
                let (x, _) = transform.pixel_to_geo(col, row);
                if fp.shape.intersects(&Point::new(x, y)) {
                    out[col] = IMPASSABLE;
                }
            }
        }
        out
    })?;

    let mut water = grid.with_same_meta::<u8>();
    *water.data_mut() = Array2::from_shape_vec((rows, cols), row_masks.concat())
        .map_err(|e| Error::Other(e.to_string()))?;

    let blocked = water.data().iter().filter(|&&v| v == IMPASSABLE).count();
    debug!(blocked, polygons = footprints.len(), "water barrier rasterized");

    Ok(water)
}

fn collect_footprints<T: RasterElement>(grid: &Raster<T>, polygons: &FeatureCollection) -> Result<Vec<Footprint>> {
    let reproject = match (polygons.crs.as_ref(), grid.crs()) {
        (Some(from), Some(to)) if !from.is_equivalent(to) => Some((from, to)),
        _ => None,
    };

    let grid_extent = grid.extent();
    let mut footprints = Vec::new();

    for feature in polygons.iter() {
        let shape = match &feature.geometry {
            Some(geo::Geometry::Polygon(p)) => MultiPolygon::new(vec![p.clone()]),
            Some(geo::Geometry::MultiPolygon(mp)) => mp.clone(),
            Some(other) => {
                debug!(id = ?feature.id, kind = geometry_kind(other), "skipping non-areal geometry");
                continue;
            }
            None => continue,
        };

        let shape = match reproject {
            Some((from, to)) => shape.try_map_coords(|c: Coord<f64>| {
                transform_point(c.x, c.y, from, to).map(|(x, y)| Coord { x, y })
            })?,
            None => shape,
        };

        let Some(bounds) = shape.bounding_rect() else {
            continue;
        };
        let bbox = BoundingBox::new(bounds.min().x, bounds.min().y, bounds.max().x, bounds.max().y);
        if bbox.intersects(&grid_extent) {
            footprints.push(Footprint { shape, bounds });
        }
    }

    Ok(footprints)
}

fn geometry_kind(geometry: &geo::Geometry<f64>) -> &'static str {
    match geometry {
        geo::Geometry::Point(_) => "Point",
        geo::Geometry::LineString(_) => "LineString",
        geo::Geometry::MultiPoint(_) => "MultiPoint",
        geo::Geometry::MultiLineString(_) => "MultiLineString",
        _ => "other",
    }
}
