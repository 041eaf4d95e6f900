//! Buffer operations
//!
//! Create buffer polygons around point features. A point buffer is a circle
//! approximated with a fixed number of segments. Buffer distances are in
//! CRS units, so the collection must be in a projected (metric) CRS —
//! reproject geographic layers first.

use geo_types::{Geometry, LineString, Point, Polygon};
use placegis_core::crs::CrsUnits;
use placegis_core::error::{Error, Result};
use placegis_core::vector::{Feature, FeatureCollection};
use rayon::prelude::*;
use std::f64::consts::PI;

/// Parameters for buffer operations
#[derive(Debug, Clone)]
pub struct BufferParams {
    /// Buffer radius in CRS units (metres for projected layers)
    pub distance: f64,
    /// Number of segments to approximate the circle (default: 32)
    pub segments: usize,
}

impl Default for BufferParams {
    fn default() -> Self {
        Self {
            distance: 100.0,
            segments: 32,
        }
    }
}

impl BufferParams {
    fn validate(&self) -> Result<()> {
        if !(self.distance > 0.0) {
            return Err(Error::InvalidParameter {
                name: "distance",
                value: self.distance.to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if self.segments < 4 {
            return Err(Error::InvalidParameter {
                name: "segments",
                value: self.segments.to_string(),
                reason: "need at least 4 segments".to_string(),
            });
        }
        Ok(())
    }
}

/// Create a circular buffer polygon around a point.
pub fn buffer_point(point: &Point<f64>, params: &BufferParams) -> Polygon<f64> {
    let n = params.segments.max(4);
    let r = params.distance;
    let cx = point.x();
    let cy = point.y();

    let mut coords = Vec::with_capacity(n + 1);
    for i in 0..n {
        let angle = 2.0 * PI * i as f64 / n as f64;
        coords.push((cx + r * angle.cos(), cy + r * angle.sin()));
    }
    // Close the ring
    coords.push(coords[0]);

    Polygon::new(LineString::from(coords), vec![])
}

/// Buffer every point feature in a collection.
///
/// Each point becomes a circle polygon carrying the source attributes.
/// Features without a point geometry are dropped. Geographic layers are
/// rejected: a degree-radius circle is not a buffer.
pub fn buffer_collection(
    collection: &FeatureCollection,
    params: &BufferParams,
) -> Result<FeatureCollection> {
    params.validate()?;
    if collection.crs.units() == CrsUnits::Degrees {
        return Err(Error::InvalidParameter {
            name: "crs",
            value: collection.crs.identifier(),
            reason: "buffer needs a projected CRS; reproject first".to_string(),
        });
    }

    let buffered: Vec<Feature> = collection
        .features
        .par_iter()
        .filter_map(|feature| {
            feature.point().map(|p| {
                let mut nf = feature.clone();
                nf.geometry = Some(Geometry::Polygon(buffer_point(&p, params)));
                nf
            })
        })
        .collect();

    let mut out = FeatureCollection::with_crs(collection.crs.clone());
    for col in collection.columns() {
        out.add_column(col.clone());
    }
    for feature in buffered {
        out.push(feature);
    }
    Ok(out)
}
