//! Integration test for the full place/trip analysis workflow:
//! CSV → point layer → attribute join → convex hull → reprojection →
//! spatial join → buffers → OD lines → GeoJSON export.

use placegis_algorithms::reproject::{auto_utm_crs, reproject_collection};
use placegis_algorithms::vector::{
    area, attribute_join, buffer_collection, collection_bounds, convex_hull_feature, length,
    od_lines, spatial_join, total_length, BufferParams, JoinKind, OdLineParams, SpatialPredicate,
};
use placegis_core::io::{
    geojson_to_string, read_geojson, read_geojson_from_str, read_points_csv_from_str,
    read_table_csv_from_str, write_geojson, CsvOptions,
};
use placegis_core::vector::AttributeValue;

/// Places around central Helsinki; one row with a missing city, one with
/// missing coordinates.
const PLACES_CSV: &str = "\
id,name,address,city,latitude,longitude,rating,category
1001,Cafe Aalto,Pohjoisesplanadi 39,Helsinki,60.1681,24.9462,4.5,cafe
1002,Oodi Library,Toolonlahdenkatu 4,Helsinki,60.1739,24.9380,4.8,library
1003,Loyly Sauna,Hernesaarenranta 4,,60.1518,24.9341,4.6,sauna
1004,Serena Waterpark,Tornimaentie 10,Espoo,60.3097,24.6930,4.1,leisure
1005,Lost Kiosk,Unknown 1,Helsinki,,,3.2,kiosk
";

/// Trips ending at a place (`id`), starting at another (`origin_id`).
const TRIPS_CSV: &str = "\
trip_id,id,origin_id,distance_m,duration_min,mode
t1,1001,1002,950,12,walk
t2,1003,1001,2400,9,bike
t3,1004,1002,21400,38,car
t4,1002,1003,2600,22,walk
";

/// Boundary polygon around central Helsinki (WGS84).
const DISTRICT_GEOJSON: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "geometry": {
        "type": "Polygon",
        "coordinates": [[
          [24.90, 60.14], [24.98, 60.14], [24.98, 60.19], [24.90, 60.19], [24.90, 60.14]
        ]]
      },
      "properties": { "district": "Keskusta" }
    }
  ]
}"#;

fn places() -> placegis_core::FeatureCollection {
    let options = CsvOptions {
        id_column: Some("id".to_string()),
        ..CsvOptions::default()
    };
    read_points_csv_from_str(PLACES_CSV, &options).expect("places CSV should parse")
}

#[test]
fn points_from_csv() {
    let places = places();
    assert_eq!(places.len(), 5);
    assert_eq!(places.geometry_count(), 4, "one row has no coordinates");

    // Missing city is the explicit Null marker
    assert_eq!(
        places.features[2].get_property("city"),
        Some(&AttributeValue::Null)
    );

    let bounds = collection_bounds(&places).unwrap();
    assert!(bounds.min_x > 24.0 && bounds.max_x < 25.0);
    assert!(bounds.min_y > 60.0 && bounds.max_y < 60.5);
}

#[test]
fn join_places_with_trips() {
    let places = places();
    let trips = read_table_csv_from_str(TRIPS_CSV, &CsvOptions::default()).unwrap();

    let joined = attribute_join(&places, &trips, "id", JoinKind::Inner).unwrap();
    assert_eq!(joined.len(), 4, "place 1005 has no trips");

    let cafe = joined
        .features
        .iter()
        .find(|f| f.get_property("id") == Some(&AttributeValue::Int(1001)))
        .unwrap();
    assert_eq!(
        cafe.get_property("mode"),
        Some(&AttributeValue::String("walk".into()))
    );
    // Left-side geometry and attributes survive
    assert!(cafe.point().is_some());
    assert_eq!(cafe.get_property("rating"), Some(&AttributeValue::Float(4.5)));

    let left = attribute_join(&places, &trips, "id", JoinKind::Left).unwrap();
    assert_eq!(left.len(), 5);
    let kiosk = left
        .features
        .iter()
        .find(|f| f.get_property("id") == Some(&AttributeValue::Int(1005)))
        .unwrap();
    assert_eq!(kiosk.get_property("mode"), Some(&AttributeValue::Null));
}

#[test]
fn hull_and_metric_area() {
    let places = places();

    let hull = convex_hull_feature(&places).unwrap();
    assert_eq!(hull.len(), 1);

    // In degrees the area is tiny; reproject to UTM for square metres
    let utm = auto_utm_crs(&places).unwrap();
    assert_eq!(utm.epsg(), Some(32635), "Helsinki is UTM zone 35N");

    let hull_utm = reproject_collection(&hull, &utm).unwrap();
    let metric_area = area(hull_utm.features[0].geometry.as_ref().unwrap());

    // Hull spans central Helsinki to Espoo: tens of square kilometres
    assert!(
        metric_area > 1.0e6 && metric_area < 1.0e9,
        "hull area {} m2 out of expected range",
        metric_area
    );
}

#[test]
fn spatial_join_against_district() {
    let places = places();
    let district = read_geojson_from_str(DISTRICT_GEOJSON).unwrap();

    let inside = spatial_join(&places, &district, SpatialPredicate::Within, JoinKind::Inner)
        .unwrap();
    // 1001, 1002, 1003 are central; 1004 is in Espoo; 1005 has no geometry
    assert_eq!(inside.len(), 3);
    for f in inside.iter() {
        assert_eq!(
            f.get_property("district"),
            Some(&AttributeValue::String("Keskusta".into()))
        );
    }

    let all = spatial_join(&places, &district, SpatialPredicate::Within, JoinKind::Left).unwrap();
    assert_eq!(all.len(), 5);
    let espoo = all
        .features
        .iter()
        .find(|f| f.get_property("id") == Some(&AttributeValue::Int(1004)))
        .unwrap();
    assert_eq!(espoo.get_property("district"), Some(&AttributeValue::Null));
}

#[test]
fn buffers_in_metric_crs() {
    let places = places();
    let utm = auto_utm_crs(&places).unwrap();
    let projected = reproject_collection(&places, &utm).unwrap();

    let params = BufferParams {
        distance: 500.0,
        segments: 64,
    };
    let buffers = buffer_collection(&projected, &params).unwrap();
    assert_eq!(buffers.len(), 4, "only features with geometry are buffered");

    let a = area(buffers.features[0].geometry.as_ref().unwrap());
    let expected = std::f64::consts::PI * 500.0 * 500.0;
    assert!((a - expected).abs() / expected < 0.01);

    // Geographic layers are refused
    assert!(buffer_collection(&places, &params).is_err());
}

#[test]
fn od_lines_metric_lengths() {
    let places = places();
    let trips = read_table_csv_from_str(TRIPS_CSV, &CsvOptions::default()).unwrap();

    let params = OdLineParams {
        place_key: "id".to_string(),
        origin_column: "origin_id".to_string(),
        dest_column: "id".to_string(),
    };
    let lines = od_lines(&places, &trips, &params).unwrap();
    assert_eq!(lines.len(), 4);

    let utm = auto_utm_crs(&lines).unwrap();
    let metric = reproject_collection(&lines, &utm).unwrap();

    // Straight-line distance for the walk t1 (Oodi → Cafe Aalto) is under
    // the reported street distance of 950 m but the same order of magnitude
    let t1 = metric
        .features
        .iter()
        .find(|f| f.get_property("trip_id") == Some(&AttributeValue::String("t1".into())))
        .unwrap();
    let l = length(t1.geometry.as_ref().unwrap());
    assert!(l > 300.0 && l < 950.0, "t1 crow-flies length {} m", l);

    assert!(total_length(&metric) > l);
}

#[test]
fn geojson_export_roundtrip() {
    let places = places();
    let utm = auto_utm_crs(&places).unwrap();
    let projected = reproject_collection(&places, &utm).unwrap();

    // Point layer file
    let points_file = tempfile::NamedTempFile::with_suffix(".geojson").unwrap();
    write_geojson(&projected, points_file.path()).unwrap();
    let reloaded = read_geojson(points_file.path()).unwrap();
    assert_eq!(reloaded.len(), projected.len());
    assert_eq!(reloaded.crs.epsg(), Some(32635));
    assert_eq!(reloaded.columns(), projected.columns());

    // Polygon layer string
    let hull = convex_hull_feature(&projected).unwrap();
    let text = geojson_to_string(&hull).unwrap();
    let hull_back = read_geojson_from_str(&text).unwrap();
    assert_eq!(hull_back.len(), 1);
    assert!(matches!(
        hull_back.features[0].geometry,
        Some(geo_types::Geometry::Polygon(_))
    ));
}
