//! Cliff barriers from slope thresholding

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use terrawalk_core::raster::Raster;
use terrawalk_core::{Error, Result};
use terrawalk_parallel::ProcessingMode;
use tracing::debug;

use super::{IMPASSABLE, PASSABLE};
use crate::terrain::{slope, SlopeParams};

/// Parameters for cliff detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliffParams {
    /// Cells at or above this slope angle (degrees) are cliffs
    pub threshold_degrees: f64,
    /// Row scheduling for the slope pass
    pub mode: ProcessingMode,
}

impl Default for CliffParams {
    fn default() -> Self {
        Self {
            threshold_degrees: 45.0,
            mode: ProcessingMode::default(),
        }
    }
}

/// Mark cells whose slope is at least `threshold_degrees` as impassable.
///
/// Slope is estimated with Horn's 3x3 method. Where it is undefined
/// (grid border, nodata neighbor) the cell stays passable, unless its own
/// elevation is nodata.
pub fn cliff_barrier(dem: &Raster<f64>, params: &CliffParams) -> Result<Raster<u8>> {
    let threshold = params.threshold_degrees;
    if !(threshold > 0.0 && threshold <= 90.0) {
        return Err(Error::InvalidParameter {
            name: "threshold_degrees",
            value: threshold.to_string(),
            reason: "must be in (0, 90]".into(),
        });
    }

    let slope_deg = slope(dem, &SlopeParams { mode: params.mode })?;

    let mask = Array2::from_shape_fn(dem.shape(), |(row, col)| {
        let z = dem.data()[(row, col)];
        let s = slope_deg.data()[(row, col)];
        if dem.is_nodata(z) || s >= threshold {
            IMPASSABLE
        } else {
            PASSABLE
        }
    });

    let mut cliff = dem.with_same_meta::<u8>();
    *cliff.data_mut() = mask;

    let blocked = cliff.data().iter().filter(|&&v| v == IMPASSABLE).count();
    debug!(blocked, cells = cliff.len(), threshold, "cliff barrier rasterized");

    Ok(cliff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrawalk_core::GeoTransform;

    fn dem_from(rows: usize, cols: usize, f: impl Fn(usize, usize) -> f64) -> Raster<f64> {
        let mut dem = Raster::new(rows, cols).with_transform(GeoTransform::north_up(0.0, 100.0, 10.0));
        for r in 0..rows {
            for c in 0..cols {
                dem.set(r, c, f(r, c)).unwrap();
            }
        }
        dem
    }

    #[test]
    fn test_flat_terrain_is_passable() {
        let dem = dem_from(6, 6, |_, _| 250.0);
        let cliff = cliff_barrier(&dem, &CliffParams::default()).unwrap();
        assert!(cliff.data().iter().all(|&v| v == PASSABLE));
    }

    #[test]
    fn test_steep_wall_is_blocked() {
        // 20 m rise per 10 m cell in x: slope = atan(2) ≈ 63.4°
        let dem = dem_from(6, 6, |_, c| c as f64 * 20.0);
        let cliff = cliff_barrier(&dem, &CliffParams::default()).unwrap();
        assert_eq!(cliff.get(3, 3).unwrap(), IMPASSABLE);
        // undefined slope on the border stays passable
        assert_eq!(cliff.get(0, 3).unwrap(), PASSABLE);
    }

    #[test]
    fn test_threshold_boundary() {
        // 10 m rise per 10 m cell: 45°
        let dem = dem_from(5, 5, |_, c| c as f64 * 10.0);
        let with = |threshold_degrees| {
            let params = CliffParams {
                threshold_degrees,
                ..Default::default()
            };
            cliff_barrier(&dem, &params).unwrap().get(2, 2).unwrap()
        };
        assert_eq!(with(44.9), IMPASSABLE);
        assert_eq!(with(45.1), PASSABLE);
    }

    #[test]
    fn test_nodata_elevation_is_blocked() {
        let mut dem = dem_from(5, 5, |_, _| 10.0);
        dem.set(0, 0, f64::NAN).unwrap();
        let cliff = cliff_barrier(&dem, &CliffParams::default()).unwrap();
        assert_eq!(cliff.get(0, 0).unwrap(), IMPASSABLE);
        assert_eq!(cliff.get(4, 4).unwrap(), PASSABLE);
    }

    #[test]
    fn test_invalid_threshold() {
        let dem = dem_from(3, 3, |_, _| 0.0);
        let params = CliffParams {
            threshold_degrees: 0.0,
            ..Default::default()
        };
        assert!(cliff_barrier(&dem, &params).is_err());
    }
}
