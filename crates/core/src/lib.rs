//! # PlaceGis Core
//!
//! Core types and I/O for the PlaceGis vector analysis library.
//!
//! This crate provides:
//! - `Feature` / `FeatureCollection`: geometries + attribute tables
//! - `Crs`: Coordinate Reference System handling
//! - CSV reading for tables with or without coordinate columns
//! - GeoJSON reading/writing for point and polygon layers

pub mod crs;
pub mod error;
pub mod io;
pub mod vector;

pub use crs::Crs;
pub use error::{Error, Result};
pub use vector::{AttributeValue, Feature, FeatureCollection};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::Crs;
    pub use crate::error::{Error, Result};
    pub use crate::vector::{AttributeValue, Feature, FeatureCollection};
}
