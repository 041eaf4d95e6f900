//! Native GeoJSON reading/writing
//!
//! Hand-encoded on top of `serde_json`. Covers the geometry types PlaceGis
//! produces (Point, MultiPoint, LineString, Polygon, MultiPolygon) plus a
//! named-CRS member so projected layers survive a round trip. Output is
//! consumable by standard GIS viewers.

use crate::crs::Crs;
use crate::error::{Error, Result};
use crate::vector::{AttributeValue, Feature, FeatureCollection};
use geo_types::{Coord, Geometry, LineString, MultiPoint, MultiPolygon, Point, Polygon};
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;

/// Read a GeoJSON file into a FeatureCollection
pub fn read_geojson<P: AsRef<Path>>(path: P) -> Result<FeatureCollection> {
    let data = fs::read_to_string(path.as_ref())?;
    read_geojson_from_str(&data)
}

/// Read a FeatureCollection from a GeoJSON string
pub fn read_geojson_from_str(data: &str) -> Result<FeatureCollection> {
    let root: Value = serde_json::from_str(data)?;

    let kind = root
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::InvalidGeoJson("missing \"type\" member".into()))?;
    if kind != "FeatureCollection" {
        return Err(Error::InvalidGeoJson(format!(
            "expected FeatureCollection, got {}",
            kind
        )));
    }

    let crs = decode_crs(&root);
    let mut collection = FeatureCollection::with_crs(crs);

    let features = root
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::InvalidGeoJson("missing \"features\" array".into()))?;

    for fv in features {
        let mut feature = match fv.get("geometry") {
            Some(Value::Null) | None => Feature::empty(),
            Some(geom) => Feature::new(decode_geometry(geom)?),
        };

        if let Some(props) = fv.get("properties").and_then(Value::as_object) {
            for (key, value) in props {
                feature.set_property(key.clone(), decode_value(value)?);
                // Register columns in file order, not map iteration order
                collection.add_column(key.clone());
            }
        }

        match fv.get("id") {
            Some(Value::String(s)) => feature.id = Some(s.clone()),
            Some(Value::Number(n)) => feature.id = Some(n.to_string()),
            _ => {}
        }

        collection.push(feature);
    }

    Ok(collection)
}

/// Write a FeatureCollection to a GeoJSON file
pub fn write_geojson<P: AsRef<Path>>(collection: &FeatureCollection, path: P) -> Result<()> {
    let text = geojson_to_string(collection)?;
    fs::write(path.as_ref(), text)?;
    Ok(())
}

/// Serialize a FeatureCollection as a GeoJSON string
pub fn geojson_to_string(collection: &FeatureCollection) -> Result<String> {
    let mut features = Vec::with_capacity(collection.len());

    for feature in collection.iter() {
        let geometry = match &feature.geometry {
            Some(g) => encode_geometry(g)?,
            None => Value::Null,
        };

        // Properties in column order, so exports are diffable
        let mut props = Map::new();
        for col in collection.columns() {
            let v = feature
                .get_property(col)
                .cloned()
                .unwrap_or(AttributeValue::Null);
            props.insert(col.clone(), encode_value(&v));
        }
        for (key, value) in &feature.properties {
            if !props.contains_key(key) {
                props.insert(key.clone(), encode_value(value));
            }
        }

        let mut fv = json!({
            "type": "Feature",
            "geometry": geometry,
            "properties": Value::Object(props),
        });
        if let Some(id) = &feature.id {
            fv["id"] = Value::String(id.clone());
        }
        features.push(fv);
    }

    let mut root = json!({
        "type": "FeatureCollection",
        "features": features,
    });
    if let Some(code) = collection.crs.epsg() {
        root["crs"] = json!({
            "type": "name",
            "properties": { "name": format!("urn:ogc:def:crs:EPSG::{}", code) },
        });
    }

    Ok(serde_json::to_string_pretty(&root)?)
}

// ── Geometry encoding ────────────────────────────────────────────────────

fn coord_json(c: &Coord<f64>) -> Value {
    json!([c.x, c.y])
}

fn ring_json(ring: &LineString<f64>) -> Value {
    Value::Array(ring.0.iter().map(coord_json).collect())
}

fn polygon_rings(poly: &Polygon<f64>) -> Value {
    let mut rings = vec![ring_json(poly.exterior())];
    rings.extend(poly.interiors().iter().map(ring_json));
    Value::Array(rings)
}

fn encode_geometry(geom: &Geometry<f64>) -> Result<Value> {
    let v = match geom {
        Geometry::Point(p) => json!({
            "type": "Point",
            "coordinates": [p.x(), p.y()],
        }),
        Geometry::MultiPoint(mp) => json!({
            "type": "MultiPoint",
            "coordinates": mp.0.iter().map(|p| json!([p.x(), p.y()])).collect::<Vec<_>>(),
        }),
        Geometry::LineString(ls) => json!({
            "type": "LineString",
            "coordinates": ring_json(ls),
        }),
        Geometry::Polygon(poly) => json!({
            "type": "Polygon",
            "coordinates": polygon_rings(poly),
        }),
        Geometry::MultiPolygon(mp) => json!({
            "type": "MultiPolygon",
            "coordinates": mp.0.iter().map(polygon_rings).collect::<Vec<_>>(),
        }),
        other => {
            return Err(Error::UnsupportedGeometry(format!("{:?}", other)))
        }
    };
    Ok(v)
}

// ── Geometry decoding ────────────────────────────────────────────────────

fn decode_coord(v: &Value) -> Result<Coord<f64>> {
    let arr = v
        .as_array()
        .ok_or_else(|| Error::InvalidGeoJson("coordinate is not an array".into()))?;
    if arr.len() < 2 {
        return Err(Error::InvalidGeoJson("coordinate needs two values".into()));
    }
    let x = arr[0]
        .as_f64()
        .ok_or_else(|| Error::InvalidGeoJson("non-numeric x coordinate".into()))?;
    let y = arr[1]
        .as_f64()
        .ok_or_else(|| Error::InvalidGeoJson("non-numeric y coordinate".into()))?;
    Ok(Coord { x, y })
}

fn decode_ring(v: &Value) -> Result<LineString<f64>> {
    let arr = v
        .as_array()
        .ok_or_else(|| Error::InvalidGeoJson("ring is not an array".into()))?;
    let coords: Result<Vec<Coord<f64>>> = arr.iter().map(decode_coord).collect();
    Ok(LineString::new(coords?))
}

fn decode_polygon(coords: &Value) -> Result<Polygon<f64>> {
    let rings = coords
        .as_array()
        .ok_or_else(|| Error::InvalidGeoJson("polygon coordinates not an array".into()))?;
    if rings.is_empty() {
        return Err(Error::InvalidGeoJson("polygon with no rings".into()));
    }
    let exterior = decode_ring(&rings[0])?;
    let interiors: Result<Vec<LineString<f64>>> = rings[1..].iter().map(decode_ring).collect();
    Ok(Polygon::new(exterior, interiors?))
}

fn decode_geometry(v: &Value) -> Result<Geometry<f64>> {
    let kind = v
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::InvalidGeoJson("geometry without \"type\"".into()))?;
    let coords = v
        .get("coordinates")
        .ok_or_else(|| Error::InvalidGeoJson("geometry without \"coordinates\"".into()))?;

    match kind {
        "Point" => {
            let c = decode_coord(coords)?;
            Ok(Geometry::Point(Point::new(c.x, c.y)))
        }
        "MultiPoint" => {
            let arr = coords
                .as_array()
                .ok_or_else(|| Error::InvalidGeoJson("MultiPoint coordinates".into()))?;
            let points: Result<Vec<Point<f64>>> = arr
                .iter()
                .map(|c| decode_coord(c).map(|c| Point::new(c.x, c.y)))
                .collect();
            Ok(Geometry::MultiPoint(MultiPoint::new(points?)))
        }
        "LineString" => Ok(Geometry::LineString(decode_ring(coords)?)),
        "Polygon" => Ok(Geometry::Polygon(decode_polygon(coords)?)),
        "MultiPolygon" => {
            let arr = coords
                .as_array()
                .ok_or_else(|| Error::InvalidGeoJson("MultiPolygon coordinates".into()))?;
            let polys: Result<Vec<Polygon<f64>>> = arr.iter().map(decode_polygon).collect();
            Ok(Geometry::MultiPolygon(MultiPolygon::new(polys?)))
        }
        other => Err(Error::UnsupportedGeometry(other.to_string())),
    }
}

// ── Attribute and CRS encoding ───────────────────────────────────────────

fn encode_value(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::Null => Value::Null,
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Int(v) => json!(v),
        AttributeValue::Float(v) => json!(v),
        AttributeValue::String(s) => Value::String(s.clone()),
    }
}

fn decode_value(value: &Value) -> Result<AttributeValue> {
    let v = match value {
        Value::Null => AttributeValue::Null,
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                AttributeValue::Int(i)
            } else {
                AttributeValue::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => AttributeValue::String(s.clone()),
        other => {
            return Err(Error::InvalidGeoJson(format!(
                "unsupported property value: {}",
                other
            )))
        }
    };
    Ok(v)
}

fn decode_crs(root: &Value) -> Crs {
    let name = root
        .get("crs")
        .and_then(|c| c.get("properties"))
        .and_then(|p| p.get("name"))
        .and_then(Value::as_str);

    match name {
        Some(name) => name
            .rsplit(':')
            .next()
            .and_then(|code| code.parse::<u32>().ok())
            .map(Crs::from_epsg)
            .unwrap_or_default(),
        // GeoJSON without a crs member is WGS84 by definition
        None => Crs::wgs84(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points() -> FeatureCollection {
        let mut fc = FeatureCollection::new();
        let mut a = Feature::new(Geometry::Point(Point::new(24.9414, 60.1685)));
        a.set_property("name", AttributeValue::String("Cafe Aalto".into()));
        a.set_property("rating", AttributeValue::Float(4.5));
        a.id = Some("1001".into());
        fc.push(a);

        let mut b = Feature::empty();
        b.set_property("name", AttributeValue::String("No Fix".into()));
        b.set_property("rating", AttributeValue::Null);
        fc.push(b);
        fc
    }

    #[test]
    fn test_roundtrip_points() {
        let fc = sample_points();
        let text = geojson_to_string(&fc).unwrap();
        let back = read_geojson_from_str(&text).unwrap();

        assert_eq!(back.len(), 2);
        assert_eq!(back.crs.epsg(), Some(4326));
        assert_eq!(back.features[0].id.as_deref(), Some("1001"));
        let p = back.features[0].point().unwrap();
        assert!((p.x() - 24.9414).abs() < 1e-12);
        // null geometry and null property survive
        assert!(back.features[1].geometry.is_none());
        assert_eq!(back.features[1].get_property("rating"), Some(&AttributeValue::Null));
    }

    #[test]
    fn test_polygon_with_hole() {
        let poly = Polygon::new(
            LineString::from(vec![
                (0.0, 0.0),
                (10.0, 0.0),
                (10.0, 10.0),
                (0.0, 10.0),
                (0.0, 0.0),
            ]),
            vec![LineString::from(vec![
                (2.0, 2.0),
                (8.0, 2.0),
                (8.0, 8.0),
                (2.0, 8.0),
                (2.0, 2.0),
            ])],
        );
        let mut fc = FeatureCollection::with_crs(Crs::utm(35, true));
        fc.push(Feature::new(Geometry::Polygon(poly)));

        let text = geojson_to_string(&fc).unwrap();
        let back = read_geojson_from_str(&text).unwrap();
        assert_eq!(back.crs.epsg(), Some(32635));
        match &back.features[0].geometry {
            Some(Geometry::Polygon(p)) => {
                assert_eq!(p.exterior().0.len(), 5);
                assert_eq!(p.interiors().len(), 1);
            }
            other => panic!("expected polygon, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_crs_defaults_to_wgs84() {
        let text = r#"{"type":"FeatureCollection","features":[]}"#;
        let fc = read_geojson_from_str(text).unwrap();
        assert_eq!(fc.crs.epsg(), Some(4326));
    }

    #[test]
    fn test_rejects_non_collection() {
        let text = r#"{"type":"Feature","geometry":null,"properties":{}}"#;
        assert!(matches!(
            read_geojson_from_str(text),
            Err(Error::InvalidGeoJson(_))
        ));
    }

    #[test]
    fn test_file_roundtrip() {
        let fc = sample_points();
        let tmp = tempfile::NamedTempFile::with_suffix(".geojson").unwrap();
        write_geojson(&fc, tmp.path()).unwrap();
        let back = read_geojson(tmp.path()).unwrap();
        assert_eq!(back.len(), fc.len());
        assert_eq!(back.columns(), fc.columns());
    }
}
