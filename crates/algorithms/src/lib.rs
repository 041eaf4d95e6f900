//! # PlaceGis Algorithms
//!
//! Vector analysis operations for PlaceGis.
//!
//! ## Available operation categories
//!
//! - **reproject**: pure-Rust coordinate transforms (WGS84, UTM, Web Mercator)
//! - **vector**: convex hull, joins, buffers, clipping, dissolve, measurements

pub mod reproject;
pub mod vector;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::reproject::{auto_utm_crs, reproject_collection, reproject_geometry, reproject_point};
    pub use crate::vector::{
        area, attribute_join, bounding_box, buffer_collection, centroid, clip_collection,
        collection_bounds, convex_hull_feature, convex_hull_points, dissolve, length, od_lines,
        perimeter, spatial_join, BoundingBox, BufferParams, ClipRect, JoinKind, OdLineParams,
        SpatialPredicate,
    };
    pub use placegis_core::prelude::*;
}
