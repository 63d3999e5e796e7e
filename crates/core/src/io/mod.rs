//! I/O for raster layers (GeoTIFF) and vector features (GeoJSON)

mod geojson;
mod geotiff;

pub use geojson::{read_geojson, read_geojson_str, write_geojson, write_geojson_string};
pub use geotiff::{read_geotiff, read_geotiff_from_buffer, write_geotiff, write_geotiff_to_buffer};
