//! Slope calculation from DEMs
//!
//! Calculates the rate of change of elevation using the Horn (1981) method,
//! which uses a 3x3 neighborhood to compute partial derivatives.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use terrawalk_core::raster::Raster;
use terrawalk_core::{Error, Result};
use terrawalk_parallel::{ParallelStrategy, ProcessingMode};

/// Parameters for slope calculation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlopeParams {
    /// Row scheduling
    pub mode: ProcessingMode,
}

/// Calculate slope in degrees from a DEM
///
/// Uses Horn's (1981) method with a 3x3 neighborhood:
/// ```text
/// a b c
/// d e f
/// g h i
/// ```
///
/// dz/dx = ((c + 2f + i) - (a + 2d + g)) / (8 * cellsize)
/// dz/dy = ((g + 2h + i) - (a + 2b + c)) / (8 * cellsize)
/// slope = atan(sqrt(dz/dx² + dz/dy²)), in degrees
///
/// Border cells and cells touching nodata are NaN.
pub fn slope(dem: &Raster<f64>, params: &SlopeParams) -> Result<Raster<f64>> {
    let (rows, cols) = dem.shape();
    let eight_cell_size = 8.0 * dem.cell_size();

    let row_data = params.mode.par_map(0..rows, |row| {
        let mut out = vec![f64::NAN; cols];

        if row == 0 || row + 1 >= rows {
            return out;
        }

        for col in 1..cols.saturating_sub(1) {
            // SAFETY: 1 <= row < rows - 1 and 1 <= col < cols - 1
            let z = |r: usize, c: usize| unsafe { dem.get_unchecked(r, c) };

            let window = [
                z(row - 1, col - 1), z(row - 1, col), z(row - 1, col + 1),
                z(row, col - 1),     z(row, col),     z(row, col + 1),
                z(row + 1, col - 1), z(row + 1, col), z(row + 1, col + 1),
            ];
            if window.iter().any(|&v| dem.is_nodata(v)) {
                continue;
            }
            let [a, b, c, d, _, f, g, h, i] = window;

            let dz_dx = ((c + 2.0 * f + i) - (a + 2.0 * d + g)) / eight_cell_size;
            let dz_dy = ((g + 2.0 * h + i) - (a + 2.0 * b + c)) / eight_cell_size;

            out[col] = (dz_dx * dz_dx + dz_dy * dz_dy).sqrt().atan().to_degrees();
        }

        out
    })?;

    let mut output = dem.with_same_meta::<f64>();
    output.set_nodata(Some(f64::NAN));
    *output.data_mut() = Array2::from_shape_vec((rows, cols), row_data.concat())
        .map_err(|e| Error::Other(e.to_string()))?;

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrawalk_core::GeoTransform;

    /// Tilted plane z = x + y on unit cells
    fn create_test_dem() -> Raster<f64> {
        let mut dem = Raster::new(10, 10).with_transform(GeoTransform::north_up(0.0, 10.0, 1.0));
        for row in 0..10 {
            for col in 0..10 {
                dem.set(row, col, (row + col) as f64).unwrap();
            }
        }
        dem
    }

    #[test]
    fn test_slope_flat() {
        let dem = Raster::filled(10, 10, 100.0).with_transform(GeoTransform::north_up(0.0, 10.0, 1.0));
        let result = slope(&dem, &SlopeParams::default()).unwrap();

        let val = result.get(5, 5).unwrap();
        assert!(val.abs() < 0.001, "Expected ~0 slope for flat surface, got {}", val);
        assert!(result.get(0, 5).unwrap().is_nan(), "border should be undefined");
    }

    #[test]
    fn test_slope_tilted() {
        let dem = create_test_dem();
        let result = slope(&dem, &SlopeParams::default()).unwrap();

        // |grad| = sqrt(2) everywhere
        let expected = 2f64.sqrt().atan().to_degrees();
        for (r, c) in [(3, 3), (5, 5), (8, 1)] {
            let v = result.get(r, c).unwrap();
            assert!((v - expected).abs() < 1e-9, "({r},{c}): {v} vs {expected}");
        }
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let dem = create_test_dem();
        let seq = slope(&dem, &SlopeParams { mode: ProcessingMode::Sequential }).unwrap();
        let par = slope(&dem, &SlopeParams { mode: ProcessingMode::ParallelWith(2) }).unwrap();
        assert_eq!(seq.get(5, 5).unwrap(), par.get(5, 5).unwrap());
        assert_eq!(seq.get(8, 1).unwrap(), par.get(8, 1).unwrap());
    }

    #[test]
    fn test_nodata_neighbor_is_undefined() {
        let mut dem = create_test_dem();
        dem.set(4, 4, f64::NAN).unwrap();
        let result = slope(&dem, &SlopeParams::default()).unwrap();
        assert!(result.get(5, 5).unwrap().is_nan());
        assert!(!result.get(7, 7).unwrap().is_nan());
    }
}
