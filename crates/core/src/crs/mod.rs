//! Coordinate Reference System handling
//!
//! PlaceGis identifies a CRS primarily by EPSG code. The reprojection
//! routines in `placegis_algorithms` support WGS84 (4326), Web Mercator
//! (3857) and the UTM zones (326xx north / 327xx south); other codes can
//! still be carried through as metadata.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Measurement units implied by a CRS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrsUnits {
    /// Angular degrees (geographic CRS)
    Degrees,
    /// Metres (projected CRS)
    Metres,
    /// Unknown units
    Unknown,
}

/// Coordinate Reference System representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crs {
    /// EPSG code if known
    epsg: Option<u32>,
    /// WKT representation if available
    wkt: Option<String>,
    /// PROJ string if available
    proj: Option<String>,
}

impl Crs {
    /// Create a CRS from an EPSG code
    pub fn from_epsg(code: u32) -> Self {
        Self {
            epsg: Some(code),
            wkt: None,
            proj: None,
        }
    }

    /// Create a CRS from a WKT string
    pub fn from_wkt(wkt: impl Into<String>) -> Self {
        Self {
            epsg: None,
            wkt: Some(wkt.into()),
            proj: None,
        }
    }

    /// Create a CRS from a PROJ string
    pub fn from_proj(proj: impl Into<String>) -> Self {
        Self {
            epsg: None,
            wkt: None,
            proj: Some(proj.into()),
        }
    }

    /// WGS84 geographic CRS (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::from_epsg(4326)
    }

    /// Web Mercator (EPSG:3857)
    pub fn web_mercator() -> Self {
        Self::from_epsg(3857)
    }

    /// UTM zone CRS (EPSG:326xx north, EPSG:327xx south)
    pub fn utm(zone: u32, north: bool) -> Self {
        let base = if north { 32600 } else { 32700 };
        Self::from_epsg(base + zone)
    }

    /// Get EPSG code if known
    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    /// Get WKT representation
    pub fn wkt(&self) -> Option<&str> {
        self.wkt.as_deref()
    }

    /// Get PROJ string
    pub fn proj(&self) -> Option<&str> {
        self.proj.as_deref()
    }

    /// True for geographic (angular) coordinate systems
    pub fn is_geographic(&self) -> bool {
        matches!(self.epsg, Some(4326) | Some(4258) | Some(4269))
    }

    /// True for projected (planar) coordinate systems known to PlaceGis
    pub fn is_projected(&self) -> bool {
        match self.epsg {
            Some(3857) => true,
            Some(code) => parse_utm_epsg(code).is_some(),
            None => false,
        }
    }

    /// Measurement units of coordinates in this CRS
    pub fn units(&self) -> CrsUnits {
        if self.is_geographic() {
            CrsUnits::Degrees
        } else if self.is_projected() {
            CrsUnits::Metres
        } else {
            CrsUnits::Unknown
        }
    }

    /// Check if two CRS are equivalent
    pub fn is_equivalent(&self, other: &Crs) -> bool {
        // Simple check: if both have EPSG codes, compare them
        if let (Some(a), Some(b)) = (self.epsg, other.epsg) {
            return a == b;
        }

        if let (Some(a), Some(b)) = (&self.wkt, &other.wkt) {
            return a == b;
        }

        if let (Some(a), Some(b)) = (&self.proj, &other.proj) {
            return a == b;
        }

        false
    }

    /// Get a string identifier for this CRS
    pub fn identifier(&self) -> String {
        if let Some(code) = self.epsg {
            return format!("EPSG:{}", code);
        }
        if let Some(proj) = &self.proj {
            return proj.clone();
        }
        if let Some(wkt) = &self.wkt {
            return format!("WKT:{}", &wkt[..wkt.len().min(50)]);
        }
        "Unknown".to_string()
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

impl Default for Crs {
    fn default() -> Self {
        Self::wgs84()
    }
}

/// Parse an EPSG code into UTM zone info: `Some((zone, is_north))`.
///
/// - EPSG 326xx → zone xx, North hemisphere
/// - EPSG 327xx → zone xx, South hemisphere
pub fn parse_utm_epsg(epsg: u32) -> Option<(u32, bool)> {
    if (32601..=32660).contains(&epsg) {
        Some((epsg - 32600, true))
    } else if (32701..=32760).contains(&epsg) {
        Some((epsg - 32700, false))
    } else {
        None
    }
}

/// Pick the UTM zone covering a WGS84 coordinate: `(zone, is_north)`.
pub fn utm_zone_for(lon: f64, lat: f64) -> (u32, bool) {
    let zone = (((lon + 180.0) / 6.0).floor() as i32 + 1).clamp(1, 60) as u32;
    (zone, lat >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crs_epsg() {
        let crs = Crs::from_epsg(4326);
        assert_eq!(crs.epsg(), Some(4326));
        assert_eq!(crs.identifier(), "EPSG:4326");
    }

    #[test]
    fn test_crs_equivalence() {
        let a = Crs::from_epsg(4326);
        let b = Crs::wgs84();
        assert!(a.is_equivalent(&b));
    }

    #[test]
    fn test_utm_constructor() {
        assert_eq!(Crs::utm(35, true).epsg(), Some(32635));
        assert_eq!(Crs::utm(21, false).epsg(), Some(32721));
    }

    #[test]
    fn test_units() {
        assert_eq!(Crs::wgs84().units(), CrsUnits::Degrees);
        assert_eq!(Crs::web_mercator().units(), CrsUnits::Metres);
        assert_eq!(Crs::utm(30, true).units(), CrsUnits::Metres);
        assert_eq!(Crs::from_epsg(27700).units(), CrsUnits::Unknown);
    }

    #[test]
    fn test_parse_utm_epsg() {
        assert_eq!(parse_utm_epsg(32630), Some((30, true)));
        assert_eq!(parse_utm_epsg(32721), Some((21, false)));
        assert_eq!(parse_utm_epsg(4326), None);
        assert_eq!(parse_utm_epsg(32600), None); // zone 0 invalid
        assert_eq!(parse_utm_epsg(32761), None); // zone 61 invalid
    }

    #[test]
    fn test_utm_zone_for() {
        // Helsinki: 24.94E, 60.17N → zone 35 north
        assert_eq!(utm_zone_for(24.94, 60.17), (35, true));
        // Buenos Aires: 58.38W, 34.60S → zone 21 south
        assert_eq!(utm_zone_for(-58.38, -34.60), (21, false));
        // Antimeridian edges clamp to valid zones
        assert_eq!(utm_zone_for(-180.0, 10.0).0, 1);
        assert_eq!(utm_zone_for(180.0, 10.0).0, 60);
    }
}
