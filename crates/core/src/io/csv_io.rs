//! CSV reading for attribute tables and point layers
//!
//! Two readers cover the two dataset shapes: `read_points_csv` builds point
//! geometries from longitude/latitude columns (a places table),
//! `read_table_csv` reads attribute-only rows (a trips table). Cell values
//! are typed dynamically: empty cells become the Null marker, then integer,
//! float, boolean, and finally plain text parses are tried in that order.

use crate::crs::Crs;
use crate::error::{Error, Result};
use crate::vector::{AttributeValue, Feature, FeatureCollection};
use geo_types::{Geometry, Point};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Options for reading CSV datasets
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter (default `,`)
    pub delimiter: u8,
    /// Column holding the x / longitude coordinate
    pub lon_column: String,
    /// Column holding the y / latitude coordinate
    pub lat_column: String,
    /// Column to use as the feature id, if any
    pub id_column: Option<String>,
    /// CRS of the coordinate columns (default WGS84)
    pub crs: Crs,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            lon_column: "longitude".to_string(),
            lat_column: "latitude".to_string(),
            id_column: None,
            crs: Crs::wgs84(),
        }
    }
}

/// Read a CSV file into a point-geometry collection.
///
/// Each row becomes a feature whose geometry is a point built from the
/// longitude/latitude columns. Rows with empty or unparsable coordinates
/// keep their attributes but carry no geometry; compare
/// `FeatureCollection::len` with `geometry_count` to see how many.
pub fn read_points_csv<P: AsRef<Path>>(path: P, options: &CsvOptions) -> Result<FeatureCollection> {
    let file = File::open(path.as_ref())?;
    decode_csv(file, options, true)
}

/// Read a point-geometry collection from an in-memory CSV string.
pub fn read_points_csv_from_str(data: &str, options: &CsvOptions) -> Result<FeatureCollection> {
    decode_csv(data.as_bytes(), options, true)
}

/// Read a CSV file into an attribute-only collection (no geometries).
pub fn read_table_csv<P: AsRef<Path>>(path: P, options: &CsvOptions) -> Result<FeatureCollection> {
    let file = File::open(path.as_ref())?;
    decode_csv(file, options, false)
}

/// Read an attribute-only collection from an in-memory CSV string.
pub fn read_table_csv_from_str(data: &str, options: &CsvOptions) -> Result<FeatureCollection> {
    decode_csv(data.as_bytes(), options, false)
}

/// Internal: decode CSV rows from any `Read` source
fn decode_csv<R: Read>(
    reader: R,
    options: &CsvOptions,
    with_geometry: bool,
) -> Result<FeatureCollection> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let (lon_idx, lat_idx) = if with_geometry {
        let lon = column_index(&headers, &options.lon_column)?;
        let lat = column_index(&headers, &options.lat_column)?;
        (Some(lon), Some(lat))
    } else {
        (None, None)
    };

    let id_idx = match &options.id_column {
        Some(name) => Some(column_index(&headers, name)?),
        None => None,
    };

    let mut collection = FeatureCollection::with_crs(options.crs.clone());
    for name in &headers {
        collection.add_column(name.clone());
    }

    for record in rdr.records() {
        let record = record?;
        let mut feature = Feature::empty();

        for (idx, raw) in record.iter().enumerate() {
            if let Some(name) = headers.get(idx) {
                feature.set_property(name.clone(), parse_cell(raw));
            }
        }

        if let (Some(lon_idx), Some(lat_idx)) = (lon_idx, lat_idx) {
            let lon = record.get(lon_idx).and_then(parse_coord);
            let lat = record.get(lat_idx).and_then(parse_coord);
            if let (Some(lon), Some(lat)) = (lon, lat) {
                feature.geometry = Some(Geometry::Point(Point::new(lon, lat)));
            }
        }

        if let Some(id_idx) = id_idx {
            if let Some(raw) = record.get(id_idx) {
                let raw = raw.trim();
                if !raw.is_empty() {
                    feature.id = Some(raw.to_string());
                }
            }
        }

        collection.push(feature);
    }

    Ok(collection)
}

fn column_index(headers: &[String], name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| Error::MissingColumn(name.to_string()))
}

fn parse_coord(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Type a single CSV cell.
fn parse_cell(raw: &str) -> AttributeValue {
    let raw = raw.trim();
    if raw.is_empty() {
        return AttributeValue::Null;
    }
    if let Ok(v) = raw.parse::<i64>() {
        return AttributeValue::Int(v);
    }
    if let Ok(v) = raw.parse::<f64>() {
        return AttributeValue::Float(v);
    }
    match raw {
        "true" | "True" | "TRUE" => AttributeValue::Bool(true),
        "false" | "False" | "FALSE" => AttributeValue::Bool(false),
        _ => AttributeValue::String(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLACES: &str = "\
id,name,city,latitude,longitude,rating
1001,Cafe Aalto,Helsinki,60.1685,24.9414,4.5
1002,Oodi Library,Helsinki,60.1739,24.9380,4.8
1003,Mystery Diner,,60.2055,24.6559,3.9
1004,No Fix,Espoo,,,2.0
";

    const TRIPS: &str = "\
trip_id,place_id,origin_id,distance_m,duration_min,mode
t1,1001,1002,950,12,walk
t2,1003,1001,8200,31,transit
";

    #[test]
    fn test_read_points() {
        let fc = read_points_csv_from_str(PLACES, &CsvOptions::default()).unwrap();
        assert_eq!(fc.len(), 4);
        assert_eq!(fc.geometry_count(), 3);
        assert_eq!(fc.columns().len(), 6);

        let first = &fc.features[0];
        let p = first.point().unwrap();
        assert!((p.x() - 24.9414).abs() < 1e-9);
        assert!((p.y() - 60.1685).abs() < 1e-9);
        assert_eq!(first.get_property("rating"), Some(&AttributeValue::Float(4.5)));
        assert_eq!(first.get_property("id"), Some(&AttributeValue::Int(1001)));
    }

    #[test]
    fn test_missing_city_is_null() {
        let fc = read_points_csv_from_str(PLACES, &CsvOptions::default()).unwrap();
        assert_eq!(fc.features[2].get_property("city"), Some(&AttributeValue::Null));
        // Row with missing coordinates keeps attributes, loses geometry
        assert!(fc.features[3].geometry.is_none());
        assert_eq!(
            fc.features[3].get_property("city"),
            Some(&AttributeValue::String("Espoo".into()))
        );
    }

    #[test]
    fn test_id_column() {
        let opts = CsvOptions {
            id_column: Some("id".to_string()),
            ..CsvOptions::default()
        };
        let fc = read_points_csv_from_str(PLACES, &opts).unwrap();
        assert_eq!(fc.features[0].id.as_deref(), Some("1001"));
    }

    #[test]
    fn test_missing_coordinate_column() {
        let opts = CsvOptions {
            lon_column: "lng".to_string(),
            ..CsvOptions::default()
        };
        let err = read_points_csv_from_str(PLACES, &opts).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(c) if c == "lng"));
    }

    #[test]
    fn test_read_table() {
        let fc = read_table_csv_from_str(TRIPS, &CsvOptions::default()).unwrap();
        assert_eq!(fc.len(), 2);
        assert_eq!(fc.geometry_count(), 0);
        assert_eq!(
            fc.features[0].get_property("mode"),
            Some(&AttributeValue::String("walk".into()))
        );
        assert_eq!(
            fc.features[1].get_property("distance_m"),
            Some(&AttributeValue::Int(8200))
        );
    }

    #[test]
    fn test_semicolon_delimiter() {
        let data = "a;b\n1;x\n";
        let opts = CsvOptions {
            delimiter: b';',
            ..CsvOptions::default()
        };
        let fc = read_table_csv_from_str(data, &opts).unwrap();
        assert_eq!(fc.features[0].get_property("a"), Some(&AttributeValue::Int(1)));
    }
}
