//! Spatial operations: convex hull, centroid, bounding box, dissolve

use geo::{
    BoundingRect, Centroid as GeoCentroid, ConvexHull as GeoConvexHull, CoordsIter, Geometry,
    LineString, MultiPoint, Point, Polygon,
};
use placegis_core::error::{Error, Result};
use placegis_core::vector::{AttributeValue, Feature, FeatureCollection};
use std::collections::BTreeMap;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Grow to cover another box.
    pub fn merge(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn to_polygon(&self) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                (self.min_x, self.min_y),
                (self.max_x, self.min_y),
                (self.max_x, self.max_y),
                (self.min_x, self.max_y),
                (self.min_x, self.min_y),
            ]),
            vec![],
        )
    }
}

/// Compute the bounding box of a geometry
pub fn bounding_box(geom: &Geometry<f64>) -> Option<BoundingBox> {
    geom.bounding_rect().map(|rect| BoundingBox {
        min_x: rect.min().x,
        min_y: rect.min().y,
        max_x: rect.max().x,
        max_y: rect.max().y,
    })
}

/// Compute the bounding box of every geometry in a collection
pub fn collection_bounds(collection: &FeatureCollection) -> Option<BoundingBox> {
    collection
        .iter()
        .filter_map(|f| f.geometry.as_ref())
        .filter_map(bounding_box)
        .reduce(|acc, bb| acc.merge(&bb))
}

/// Compute the centroid of a geometry
pub fn centroid(geom: &Geometry<f64>) -> Option<Point<f64>> {
    match geom {
        Geometry::Point(p) => Some(*p),
        Geometry::Line(l) => Some(l.centroid()),
        Geometry::LineString(ls) => ls.centroid(),
        Geometry::Polygon(p) => p.centroid(),
        Geometry::MultiPoint(mp) => mp.centroid(),
        Geometry::MultiLineString(mls) => mls.centroid(),
        Geometry::MultiPolygon(mp) => mp.centroid(),
        Geometry::Rect(r) => Some(r.centroid()),
        _ => None,
    }
}

/// Compute the convex hull of all coordinates in a collection.
///
/// Features without geometry are ignored. With fewer than three distinct
/// coordinates the hull degenerates to a point or segment polygon, which is
/// passed through as-is.
pub fn convex_hull_points(collection: &FeatureCollection) -> Result<Polygon<f64>> {
    let points: Vec<Point<f64>> = collection
        .iter()
        .filter_map(|f| f.geometry.as_ref())
        .flat_map(|g| g.coords_iter())
        .map(|c| Point::new(c.x, c.y))
        .collect();

    if points.is_empty() {
        return Err(Error::Other(
            "convex hull of a collection without geometries".to_string(),
        ));
    }

    Ok(MultiPoint::from(points).convex_hull())
}

/// Convex hull wrapped as a single-feature polygon layer.
///
/// The output collection carries the source CRS and records how many
/// coordinates went into the hull, ready for GeoJSON export.
pub fn convex_hull_feature(collection: &FeatureCollection) -> Result<FeatureCollection> {
    let count = collection
        .iter()
        .filter_map(|f| f.geometry.as_ref())
        .flat_map(|g| g.coords_iter())
        .count();
    let hull = convex_hull_points(collection)?;

    let mut out = FeatureCollection::with_crs(collection.crs.clone());
    let mut feature = Feature::new(Geometry::Polygon(hull));
    feature.set_property("point_count", AttributeValue::Int(count as i64));
    out.push(feature);
    Ok(out)
}

/// Dissolve: group polygon features by an attribute and merge each group.
///
/// The merged shape is the convex hull of every exterior coordinate in the
/// group (a hull approximation of the union). Features whose geometry is
/// not a polygon, or whose key is Null, are skipped. Output features carry
/// the key column plus a `feature_count`, ordered by key.
pub fn dissolve(collection: &FeatureCollection, by: &str) -> Result<FeatureCollection> {
    if !collection.columns().iter().any(|c| c == by) {
        return Err(Error::MissingColumn(by.to_string()));
    }

    let mut groups: BTreeMap<String, Vec<&Polygon<f64>>> = BTreeMap::new();

    for feature in collection.iter() {
        let key = match feature.get_property(by) {
            Some(v) if !v.is_null() => v.key_string(),
            _ => continue,
        };
        match &feature.geometry {
            Some(Geometry::Polygon(p)) => groups.entry(key).or_default().push(p),
            Some(Geometry::MultiPolygon(mp)) => {
                groups.entry(key).or_default().extend(mp.0.iter())
            }
            _ => continue,
        }
    }

    let mut out = FeatureCollection::with_crs(collection.crs.clone());
    for (key, polys) in groups {
        let merged = if polys.len() == 1 {
            polys[0].clone()
        } else {
            let coords: Vec<Point<f64>> = polys
                .iter()
                .flat_map(|p| p.exterior().0.iter())
                .map(|c| Point::new(c.x, c.y))
                .collect();
            MultiPoint::from(coords).convex_hull()
        };

        let mut feature = Feature::new(Geometry::Polygon(merged));
        feature.set_property(by, AttributeValue::String(key));
        feature.set_property("feature_count", AttributeValue::Int(polys.len() as i64));
        out.push(feature);
    }
    Ok(out)
}
