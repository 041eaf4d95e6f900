//! I/O operations for reading and writing geospatial data

mod csv_io;
mod geojson;

pub use csv_io::{read_points_csv, read_points_csv_from_str, read_table_csv, read_table_csv_from_str, CsvOptions};
pub use geojson::{geojson_to_string, read_geojson, read_geojson_from_str, write_geojson};
