//! Vector analysis operations
//!
//! The operations behind the place/trip workflow:
//! - Convex hull: minimum enclosing convex polygon of a point layer
//! - Attribute join: combine two tables on a shared key column
//! - Spatial join: combine layers by a geometric predicate
//! - OD lines: origin/destination line construction from a trips table
//! - Buffer: metric buffer polygons around points
//! - Clip: intersect a layer with a rectangular extent
//! - Dissolve: merge polygon features by attribute
//! - Area / Length / Perimeter: geometric measurements

mod buffer;
mod clip;
mod join;
mod measurements;
mod spatial;

pub use buffer::{buffer_collection, buffer_point, BufferParams};
pub use clip::{clip_by_rect, clip_collection, ClipRect};
pub use join::{attribute_join, od_lines, spatial_join, JoinKind, OdLineParams, SpatialPredicate};
pub use measurements::{area, length, perimeter, total_area, total_length};
pub use spatial::{
    bounding_box, centroid, collection_bounds, convex_hull_feature, convex_hull_points, dissolve,
    BoundingBox,
};
