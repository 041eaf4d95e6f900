//! Vector data structures: features with geometry and attributes
//!
//! A `FeatureCollection` is the in-memory form of one dataset (a places
//! table, a trips table, a boundary layer). Each `Feature` carries an
//! optional geometry plus a property map; the collection tracks column
//! order and the CRS shared by every geometry in it.

use crate::crs::Crs;
use geo_types::Geometry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Attribute value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl AttributeValue {
    /// True for the explicit missing-value marker
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Int(v) => Some(*v as f64),
            AttributeValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer view of the value, if it has one
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// String view of the value, if it is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Key form used for grouping and joining: stable text for any value.
    pub fn key_string(&self) -> String {
        match self {
            AttributeValue::Null => String::new(),
            AttributeValue::Bool(b) => b.to_string(),
            AttributeValue::Int(v) => v.to_string(),
            AttributeValue::Float(v) => v.to_string(),
            AttributeValue::String(s) => s.clone(),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Null => write!(f, ""),
            AttributeValue::Bool(b) => write!(f, "{}", b),
            AttributeValue::Int(v) => write!(f, "{}", v),
            AttributeValue::Float(v) => write!(f, "{}", v),
            AttributeValue::String(s) => write!(f, "{}", s),
        }
    }
}

/// A geographic feature with geometry and attributes
#[derive(Debug, Clone)]
pub struct Feature {
    /// Feature geometry (None for attribute-only rows)
    pub geometry: Option<Geometry<f64>>,
    /// Feature attributes
    pub properties: HashMap<String, AttributeValue>,
    /// Optional feature ID
    pub id: Option<String>,
}

impl Feature {
    /// Create a new feature with geometry
    pub fn new(geometry: Geometry<f64>) -> Self {
        Self {
            geometry: Some(geometry),
            properties: HashMap::new(),
            id: None,
        }
    }

    /// Create a feature with no geometry
    pub fn empty() -> Self {
        Self {
            geometry: None,
            properties: HashMap::new(),
            id: None,
        }
    }

    /// Set an attribute
    pub fn set_property(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.properties.insert(key.into(), value);
    }

    /// Get an attribute
    pub fn get_property(&self, key: &str) -> Option<&AttributeValue> {
        self.properties.get(key)
    }

    /// The feature's point coordinates, if its geometry is a point
    pub fn point(&self) -> Option<geo_types::Point<f64>> {
        match self.geometry {
            Some(Geometry::Point(p)) => Some(p),
            _ => None,
        }
    }
}

/// Collection of features sharing one CRS
#[derive(Debug, Clone)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
    /// CRS shared by every geometry in the collection
    pub crs: Crs,
    /// Attribute column order (as read from the source, then extended by joins)
    columns: Vec<String>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self::with_crs(Crs::wgs84())
    }

    pub fn with_crs(crs: Crs) -> Self {
        Self {
            features: Vec::new(),
            crs,
            columns: Vec::new(),
        }
    }

    /// Add a feature, registering any new attribute columns.
    pub fn push(&mut self, feature: Feature) {
        for key in feature.properties.keys() {
            if !self.columns.iter().any(|c| c == key) {
                self.columns.push(key.clone());
            }
        }
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Feature> {
        self.features.iter_mut()
    }

    /// Attribute column names in stable order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Register a column without touching existing features.
    pub fn add_column(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.columns.iter().any(|c| c == &name) {
            self.columns.push(name);
        }
    }

    /// Number of features that carry a geometry
    pub fn geometry_count(&self) -> usize {
        self.features.iter().filter(|f| f.geometry.is_some()).count()
    }

    /// Count of Null values per column
    pub fn null_counts(&self) -> Vec<(String, usize)> {
        self.columns
            .iter()
            .map(|col| {
                let nulls = self
                    .features
                    .iter()
                    .filter(|f| {
                        f.get_property(col).map(|v| v.is_null()).unwrap_or(true)
                    })
                    .count();
                (col.clone(), nulls)
            })
            .collect()
    }

    /// Keep only features matching the predicate.
    pub fn filter<P>(&self, predicate: P) -> FeatureCollection
    where
        P: Fn(&Feature) -> bool,
    {
        let mut out = FeatureCollection::with_crs(self.crs.clone());
        out.columns = self.columns.clone();
        out.features = self
            .features
            .iter()
            .filter(|f| predicate(f))
            .cloned()
            .collect();
        out
    }

    /// Drop features whose value in `column` is missing or Null.
    pub fn drop_null(&self, column: &str) -> FeatureCollection {
        self.filter(|f| {
            f.get_property(column)
                .map(|v| !v.is_null())
                .unwrap_or(false)
        })
    }

    /// Drop features without geometry.
    pub fn drop_missing_geometry(&self) -> FeatureCollection {
        self.filter(|f| f.geometry.is_some())
    }

    /// Restrict attributes to the named columns (unknown names are an error).
    pub fn select_columns(&self, names: &[&str]) -> crate::error::Result<FeatureCollection> {
        for name in names {
            if !self.columns.iter().any(|c| c == name) {
                return Err(crate::error::Error::MissingColumn(name.to_string()));
            }
        }
        let mut out = FeatureCollection::with_crs(self.crs.clone());
        out.columns = names.iter().map(|s| s.to_string()).collect();
        for f in &self.features {
            let mut nf = Feature {
                geometry: f.geometry.clone(),
                properties: HashMap::new(),
                id: f.id.clone(),
            };
            for name in names {
                let v = f
                    .get_property(name)
                    .cloned()
                    .unwrap_or(AttributeValue::Null);
                nf.properties.insert(name.to_string(), v);
            }
            out.features.push(nf);
        }
        Ok(out)
    }
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl IntoIterator for FeatureCollection {
    type Item = Feature;
    type IntoIter = std::vec::IntoIter<Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.into_iter()
    }
}
