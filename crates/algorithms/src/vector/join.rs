//! Attribute and spatial joins
//!
//! `attribute_join` combines two tables on a shared key column, the way a
//! places table is joined to its trips table. `spatial_join` combines a
//! point layer with a polygon layer through a geometric predicate instead
//! of a key. `od_lines` turns origin/destination id pairs into line
//! geometries between the referenced places.

use geo::{BoundingRect, Contains, Intersects};
use geo_types::{Geometry, LineString, Point, Polygon};
use placegis_core::error::{Error, Result};
use placegis_core::vector::{AttributeValue, Feature, FeatureCollection};
use std::collections::HashMap;

use super::spatial::BoundingBox;

/// How unmatched left-side rows are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// Keep only rows with a match
    Inner,
    /// Keep every left row; unmatched right columns become Null
    Left,
}

/// Geometric predicate for spatial joins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpatialPredicate {
    /// Left geometry lies within the right polygon (boundary excluded)
    Within,
    /// Left geometry intersects the right polygon (boundary included)
    Intersects,
}

/// Join two collections on a shared key column.
///
/// The left side keeps its geometry and column order; right-side columns
/// are appended, renamed with a `_right` suffix when the name collides.
/// When the right side has duplicate keys the first occurrence wins.
pub fn attribute_join(
    left: &FeatureCollection,
    right: &FeatureCollection,
    on: &str,
    kind: JoinKind,
) -> Result<FeatureCollection> {
    for (side, fc) in [("left", left), ("right", right)] {
        if !fc.columns().iter().any(|c| c == on) {
            return Err(Error::MissingColumn(format!("{} ({} side)", on, side)));
        }
    }

    // First occurrence wins for duplicate right keys
    let mut lookup: HashMap<String, &Feature> = HashMap::new();
    for feature in right.iter() {
        if let Some(v) = feature.get_property(on) {
            if !v.is_null() {
                lookup.entry(v.key_string()).or_insert(feature);
            }
        }
    }

    let appended = appended_columns(left, right, on);

    let mut out = FeatureCollection::with_crs(left.crs.clone());
    for col in left.columns() {
        out.add_column(col.clone());
    }
    for (_, renamed) in &appended {
        out.add_column(renamed.clone());
    }

    for feature in left.iter() {
        let key = feature
            .get_property(on)
            .filter(|v| !v.is_null())
            .map(|v| v.key_string());
        let matched = key.as_deref().and_then(|k| lookup.get(k));

        match (matched, kind) {
            (Some(rf), _) => {
                let mut nf = feature.clone();
                for (orig, renamed) in &appended {
                    let v = rf
                        .get_property(orig)
                        .cloned()
                        .unwrap_or(AttributeValue::Null);
                    nf.set_property(renamed.clone(), v);
                }
                out.push(nf);
            }
            (None, JoinKind::Left) => {
                let mut nf = feature.clone();
                for (_, renamed) in &appended {
                    nf.set_property(renamed.clone(), AttributeValue::Null);
                }
                out.push(nf);
            }
            (None, JoinKind::Inner) => {}
        }
    }

    Ok(out)
}

/// Join a point layer to a polygon layer by a spatial predicate.
///
/// For each point, the first polygon satisfying the predicate contributes
/// its attributes. Both layers must be in the same CRS. Polygon bounding
/// boxes prefilter candidates before the exact test.
pub fn spatial_join(
    points: &FeatureCollection,
    polygons: &FeatureCollection,
    predicate: SpatialPredicate,
    kind: JoinKind,
) -> Result<FeatureCollection> {
    if !points.crs.is_equivalent(&polygons.crs) {
        return Err(Error::CrsMismatch(
            points.crs.identifier(),
            polygons.crs.identifier(),
        ));
    }

    // Candidate polygons with precomputed bounds
    let candidates: Vec<(BoundingBox, &Polygon<f64>, &Feature)> = polygons
        .iter()
        .flat_map(|f| polygon_parts(f).into_iter().map(move |p| (f, p)))
        .filter_map(|(f, p)| {
            p.bounding_rect().map(|rect| {
                let bb = BoundingBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y);
                (bb, p, f)
            })
        })
        .collect();

    let appended = appended_columns(points, polygons, "");

    let mut out = FeatureCollection::with_crs(points.crs.clone());
    for col in points.columns() {
        out.add_column(col.clone());
    }
    for (_, renamed) in &appended {
        out.add_column(renamed.clone());
    }

    for feature in points.iter() {
        let hit = feature.point().and_then(|p| {
            candidates
                .iter()
                .filter(|(bb, _, _)| bb.contains_point(p.x(), p.y()))
                .find(|(_, poly, _)| matches_predicate(poly, &p, predicate))
                .map(|(_, _, f)| *f)
        });

        match (hit, kind) {
            (Some(pf), _) => {
                let mut nf = feature.clone();
                for (orig, renamed) in &appended {
                    let v = pf
                        .get_property(orig)
                        .cloned()
                        .unwrap_or(AttributeValue::Null);
                    nf.set_property(renamed.clone(), v);
                }
                out.push(nf);
            }
            (None, JoinKind::Left) => {
                let mut nf = feature.clone();
                for (_, renamed) in &appended {
                    nf.set_property(renamed.clone(), AttributeValue::Null);
                }
                out.push(nf);
            }
            (None, JoinKind::Inner) => {}
        }
    }

    Ok(out)
}

/// Parameters for origin/destination line construction
#[derive(Debug, Clone)]
pub struct OdLineParams {
    /// Key column identifying places
    pub place_key: String,
    /// Trips column naming the origin place
    pub origin_column: String,
    /// Trips column naming the destination place
    pub dest_column: String,
}

impl Default for OdLineParams {
    fn default() -> Self {
        Self {
            place_key: "id".to_string(),
            origin_column: "origin_id".to_string(),
            dest_column: "place_id".to_string(),
        }
    }
}

/// Build origin→destination lines from a trips table.
///
/// Each trip row whose origin and destination ids both resolve to a place
/// with a point geometry becomes a two-vertex LineString carrying the trip
/// attributes. Trips with missing ids or unknown places are skipped.
pub fn od_lines(
    places: &FeatureCollection,
    trips: &FeatureCollection,
    params: &OdLineParams,
) -> Result<FeatureCollection> {
    if !places.columns().iter().any(|c| c == &params.place_key) {
        return Err(Error::MissingColumn(params.place_key.clone()));
    }
    for col in [&params.origin_column, &params.dest_column] {
        if !trips.columns().iter().any(|c| c == col) {
            return Err(Error::MissingColumn(col.clone()));
        }
    }

    let mut locations: HashMap<String, Point<f64>> = HashMap::new();
    for feature in places.iter() {
        if let (Some(v), Some(p)) = (feature.get_property(&params.place_key), feature.point()) {
            if !v.is_null() {
                locations.entry(v.key_string()).or_insert(p);
            }
        }
    }

    let mut out = FeatureCollection::with_crs(places.crs.clone());
    for col in trips.columns() {
        out.add_column(col.clone());
    }

    for trip in trips.iter() {
        let origin = trip
            .get_property(&params.origin_column)
            .filter(|v| !v.is_null())
            .and_then(|v| locations.get(&v.key_string()));
        let dest = trip
            .get_property(&params.dest_column)
            .filter(|v| !v.is_null())
            .and_then(|v| locations.get(&v.key_string()));

        if let (Some(o), Some(d)) = (origin, dest) {
            let line = LineString::from(vec![(o.x(), o.y()), (d.x(), d.y())]);
            let mut nf = trip.clone();
            nf.geometry = Some(Geometry::LineString(line));
            out.push(nf);
        }
    }

    Ok(out)
}

// ── Internals ────────────────────────────────────────────────────────────

/// Right-side columns to append, as (original, output-name) pairs.
/// The `exclude` column (the join key) is skipped; collisions with left
/// columns get a `_right` suffix.
fn appended_columns(
    left: &FeatureCollection,
    right: &FeatureCollection,
    exclude: &str,
) -> Vec<(String, String)> {
    right
        .columns()
        .iter()
        .filter(|c| c.as_str() != exclude)
        .map(|c| {
            let renamed = if left.columns().iter().any(|l| l == c) {
                format!("{}_right", c)
            } else {
                c.clone()
            };
            (c.clone(), renamed)
        })
        .collect()
}

/// Polygon parts of a feature's geometry (MultiPolygon is flattened).
fn polygon_parts(feature: &Feature) -> Vec<&Polygon<f64>> {
    match &feature.geometry {
        Some(Geometry::Polygon(p)) => vec![p],
        Some(Geometry::MultiPolygon(mp)) => mp.0.iter().collect(),
        _ => Vec::new(),
    }
}

fn matches_predicate(poly: &Polygon<f64>, point: &Point<f64>, predicate: SpatialPredicate) -> bool {
    match predicate {
        SpatialPredicate::Within => poly.contains(point),
        SpatialPredicate::Intersects => poly.intersects(point),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::LineString;

    fn places() -> FeatureCollection {
        let mut fc = FeatureCollection::new();
        for (id, name, x, y) in [
            (1001, "Cafe Aalto", 24.9414, 60.1685),
            (1002, "Oodi Library", 24.9380, 60.1739),
            (1003, "Far Diner", 25.5000, 61.0000),
        ] {
            let mut f = Feature::new(Geometry::Point(Point::new(x, y)));
            f.set_property("id", AttributeValue::Int(id));
            f.set_property("name", AttributeValue::String(name.to_string()));
            fc.push(f);
        }
        fc
    }

    /// Trips table sharing the `id` column with the places table
    /// (the destination place identifier).
    fn trips() -> FeatureCollection {
        let mut fc = FeatureCollection::new();
        for (trip, place, origin, dist) in [
            ("t1", 1001, 1002, 950),
            ("t2", 1003, 1001, 8200),
            ("t3", 9999, 1001, 100), // unknown place
        ] {
            let mut f = Feature::empty();
            f.set_property("trip_id", AttributeValue::String(trip.to_string()));
            f.set_property("id", AttributeValue::Int(place));
            f.set_property("origin_id", AttributeValue::Int(origin));
            f.set_property("distance_m", AttributeValue::Int(dist));
            fc.push(f);
        }
        fc
    }

    fn boundary(name: &str, min: f64, max: f64) -> FeatureCollection {
        let mut fc = FeatureCollection::new();
        let poly = Polygon::new(
            LineString::from(vec![(min, min), (max, min), (max, max), (min, max), (min, min)]),
            vec![],
        );
        let mut f = Feature::new(Geometry::Polygon(poly));
        f.set_property("district", AttributeValue::String(name.to_string()));
        fc.push(f);
        fc
    }

    #[test]
    fn test_attribute_join_inner() {
        let joined = attribute_join(&places(), &trips(), "id", JoinKind::Inner).unwrap();
        assert_eq!(joined.len(), 2); // 1001 and 1003 have trips
        let first = &joined.features[0];
        assert_eq!(
            first.get_property("trip_id"),
            Some(&AttributeValue::String("t1".into()))
        );
        // geometry preserved from the left side
        assert!(first.point().is_some());
    }

    #[test]
    fn test_attribute_join_left_fills_null() {
        let joined = attribute_join(&places(), &trips(), "id", JoinKind::Left).unwrap();
        assert_eq!(joined.len(), 3);
        // 1002 has no trip row
        let unmatched = joined
            .features
            .iter()
            .find(|f| f.get_property("id") == Some(&AttributeValue::Int(1002)))
            .unwrap();
        assert_eq!(unmatched.get_property("trip_id"), Some(&AttributeValue::Null));
    }

    #[test]
    fn test_attribute_join_missing_key() {
        let err = attribute_join(&places(), &trips(), "place_code", JoinKind::Inner).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(_)));
    }

    #[test]
    fn test_attribute_join_collision_suffix() {
        let mut right = FeatureCollection::new();
        let mut f = Feature::empty();
        f.set_property("id", AttributeValue::Int(1001));
        f.set_property("name", AttributeValue::String("other".into()));
        right.push(f);

        let joined = attribute_join(&places(), &right, "id", JoinKind::Inner).unwrap();
        assert!(joined.columns().iter().any(|c| c == "name_right"));
        assert_eq!(
            joined.features[0].get_property("name"),
            Some(&AttributeValue::String("Cafe Aalto".into()))
        );
        assert_eq!(
            joined.features[0].get_property("name_right"),
            Some(&AttributeValue::String("other".into()))
        );
    }

    #[test]
    fn test_spatial_join_within() {
        // Wide box contains every place, tight box only central Helsinki
        let joined = spatial_join(
            &places(),
            &boundary("Keskusta", 24.0, 62.0),
            SpatialPredicate::Within,
            JoinKind::Inner,
        )
        .unwrap();
        assert_eq!(joined.len(), 3); // all three inside the wide box

        let tight = spatial_join(
            &places(),
            &boundary("Keskusta", 24.9, 60.2),
            SpatialPredicate::Within,
            JoinKind::Inner,
        )
        .unwrap();
        assert_eq!(tight.len(), 2);
        assert_eq!(
            tight.features[0].get_property("district"),
            Some(&AttributeValue::String("Keskusta".into()))
        );
    }

    #[test]
    fn test_spatial_join_left_keeps_outsiders() {
        let joined = spatial_join(
            &places(),
            &boundary("Keskusta", 24.9, 60.2),
            SpatialPredicate::Within,
            JoinKind::Left,
        )
        .unwrap();
        assert_eq!(joined.len(), 3);
        let outsider = joined
            .features
            .iter()
            .find(|f| f.get_property("id") == Some(&AttributeValue::Int(1003)))
            .unwrap();
        assert_eq!(outsider.get_property("district"), Some(&AttributeValue::Null));
    }

    #[test]
    fn test_spatial_join_boundary_point() {
        let mut pts = FeatureCollection::new();
        let mut f = Feature::new(Geometry::Point(Point::new(0.0, 5.0)));
        f.set_property("id", AttributeValue::Int(1));
        pts.push(f);

        let polys = boundary("B", 0.0, 10.0);

        // On the boundary: not Within, but Intersects
        let within = spatial_join(&pts, &polys, SpatialPredicate::Within, JoinKind::Inner).unwrap();
        assert_eq!(within.len(), 0);
        let touches =
            spatial_join(&pts, &polys, SpatialPredicate::Intersects, JoinKind::Inner).unwrap();
        assert_eq!(touches.len(), 1);
    }

    #[test]
    fn test_spatial_join_crs_mismatch() {
        let mut polys = boundary("B", 0.0, 10.0);
        polys.crs = placegis_core::Crs::web_mercator();
        let err = spatial_join(&places(), &polys, SpatialPredicate::Within, JoinKind::Inner)
            .unwrap_err();
        assert!(matches!(err, Error::CrsMismatch(_, _)));
    }

    #[test]
    fn test_od_lines() {
        let params = OdLineParams {
            dest_column: "id".to_string(),
            ..OdLineParams::default()
        };
        let lines = od_lines(&places(), &trips(), &params).unwrap();
        // t3 references an unknown place and is skipped
        assert_eq!(lines.len(), 2);
        match &lines.features[0].geometry {
            Some(Geometry::LineString(ls)) => {
                assert_eq!(ls.0.len(), 2);
                // origin 1002 → dest 1001
                assert!((ls.0[0].x - 24.9380).abs() < 1e-9);
                assert!((ls.0[1].x - 24.9414).abs() < 1e-9);
            }
            other => panic!("expected line, got {:?}", other),
        }
        assert_eq!(
            lines.features[0].get_property("distance_m"),
            Some(&AttributeValue::Int(950))
        );
    }
}
