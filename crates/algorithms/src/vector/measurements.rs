//! Geometric measurements: area, length, perimeter
//!
//! All measurements are Euclidean, in CRS units. For a geographic layer the
//! results are in square degrees / degrees; reproject to a metric CRS first
//! to get square metres / metres.

use geo::{Area as GeoArea, Euclidean, Geometry, Length};
use placegis_core::vector::FeatureCollection;

/// Calculate the unsigned area of a geometry.
pub fn area(geom: &Geometry<f64>) -> f64 {
    match geom {
        Geometry::Polygon(p) => p.unsigned_area(),
        Geometry::MultiPolygon(mp) => mp.unsigned_area(),
        Geometry::Rect(r) => r.unsigned_area(),
        _ => 0.0,
    }
}

/// Calculate the length of a linear geometry.
pub fn length(geom: &Geometry<f64>) -> f64 {
    match geom {
        Geometry::LineString(ls) => ls.length::<Euclidean>(),
        Geometry::MultiLineString(mls) => {
            mls.0.iter().map(|ls| ls.length::<Euclidean>()).sum()
        }
        Geometry::Line(l) => {
            let dx = l.end.x - l.start.x;
            let dy = l.end.y - l.start.y;
            (dx * dx + dy * dy).sqrt()
        }
        _ => 0.0,
    }
}

/// Calculate the perimeter of a polygon geometry.
///
/// Returns the total length of exterior and interior rings.
pub fn perimeter(geom: &Geometry<f64>) -> f64 {
    match geom {
        Geometry::Polygon(p) => {
            let ext = p.exterior().length::<Euclidean>();
            let int: f64 = p.interiors().iter().map(|r| r.length::<Euclidean>()).sum();
            ext + int
        }
        Geometry::MultiPolygon(mp) => {
            mp.0.iter()
                .map(|p| {
                    let ext = p.exterior().length::<Euclidean>();
                    let int: f64 = p.interiors().iter().map(|r| r.length::<Euclidean>()).sum();
                    ext + int
                })
                .sum()
        }
        _ => 0.0,
    }
}

/// Total area of every polygon feature in a collection.
pub fn total_area(collection: &FeatureCollection) -> f64 {
    collection
        .iter()
        .filter_map(|f| f.geometry.as_ref())
        .map(area)
        .sum()
}

/// Total length of every linear feature in a collection.
pub fn total_length(collection: &FeatureCollection) -> f64 {
    collection
        .iter()
        .filter_map(|f| f.geometry.as_ref())
        .map(length)
        .sum()
}
