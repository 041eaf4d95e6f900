//! Pure-Rust coordinate reprojection (Snyder 1987, USGS formulas).
//!
//! Supports WGS84 (EPSG:4326), the UTM zones (EPSG 326xx north / 327xx
//! south) and spherical Web Mercator (EPSG:3857). No external C
//! dependencies (no libproj). Transforms between any pair of supported
//! CRS are routed through WGS84.
//!
//! The workflow this enables: load coordinates as WGS84 degrees, reproject
//! to a metric CRS, then measure distances and areas in metres.

use geo::{CoordsIter, MapCoords};
use geo_types::{Coord, Geometry, Point};
use placegis_core::crs::{parse_utm_epsg, utm_zone_for, Crs};
use placegis_core::error::{Error, Result};
use placegis_core::vector::FeatureCollection;
use rayon::prelude::*;

// ── WGS84 ellipsoid constants ────────────────────────────────────────────

const A: f64 = 6_378_137.0; // semi-major axis (m)
const F: f64 = 1.0 / 298.257_223_563; // flattening
const E2: f64 = 2.0 * F - F * F; // eccentricity squared
const E_PRIME2: f64 = E2 / (1.0 - E2); // second eccentricity squared
const K0: f64 = 0.9996; // UTM scale factor
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Web Mercator sphere radius (m); equals the WGS84 semi-major axis.
const R_MERC: f64 = A;

// ── Public API ───────────────────────────────────────────────────────────

/// Reproject a single point between two supported CRS.
pub fn reproject_point(point: &Point<f64>, from: &Crs, to: &Crs) -> Result<Point<f64>> {
    let tf = Transform::resolve(from, to)?;
    let c = tf.apply(Coord {
        x: point.x(),
        y: point.y(),
    });
    Ok(Point::new(c.x, c.y))
}

/// Reproject every coordinate of a geometry between two supported CRS.
pub fn reproject_geometry(geom: &Geometry<f64>, from: &Crs, to: &Crs) -> Result<Geometry<f64>> {
    let tf = Transform::resolve(from, to)?;
    Ok(geom.map_coords(|c| tf.apply(c)))
}

/// Reproject a whole collection to the target CRS.
///
/// Returns a clone with every geometry transformed and the collection CRS
/// updated. Reprojecting to the CRS the collection is already in is the
/// identity. Unsupported source or target CRS is an error.
pub fn reproject_collection(
    collection: &FeatureCollection,
    target: &Crs,
) -> Result<FeatureCollection> {
    if collection.crs.is_equivalent(target) {
        return Ok(collection.clone());
    }

    let tf = Transform::resolve(&collection.crs, target)?;

    let mut out = collection.clone();
    out.crs = target.clone();
    out.features.par_iter_mut().for_each(|feature| {
        if let Some(geom) = feature.geometry.take() {
            feature.geometry = Some(geom.map_coords(|c| tf.apply(c)));
        }
    });
    Ok(out)
}

/// Pick a metric UTM CRS for a WGS84 collection from the centre of its
/// coordinate extent.
pub fn auto_utm_crs(collection: &FeatureCollection) -> Result<Crs> {
    if !collection.crs.is_geographic() {
        return Err(Error::CrsMismatch(
            collection.crs.identifier(),
            "geographic CRS required".to_string(),
        ));
    }

    let mut min_x = f64::MAX;
    let mut min_y = f64::MAX;
    let mut max_x = f64::MIN;
    let mut max_y = f64::MIN;
    let mut seen = false;

    for feature in collection.iter() {
        if let Some(geom) = &feature.geometry {
            for c in geom.coords_iter() {
                min_x = min_x.min(c.x);
                min_y = min_y.min(c.y);
                max_x = max_x.max(c.x);
                max_y = max_y.max(c.y);
                seen = true;
            }
        }
    }

    if !seen {
        return Err(Error::Other(
            "cannot pick a UTM zone for a collection without geometries".to_string(),
        ));
    }

    let (zone, north) = utm_zone_for((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
    Ok(Crs::utm(zone, north))
}

// ── Transform resolution ─────────────────────────────────────────────────

/// A resolved transform between two supported CRS, routed through WGS84.
#[derive(Debug, Clone, Copy)]
struct Transform {
    inverse: Step,
    forward: Step,
}

/// One projection step relative to WGS84 degrees.
#[derive(Debug, Clone, Copy)]
enum Step {
    Identity,
    Utm { zone: u32, north: bool },
    WebMercator,
}

impl Step {
    fn for_crs(crs: &Crs) -> Result<Self> {
        match crs.epsg() {
            Some(4326) => Ok(Step::Identity),
            Some(3857) => Ok(Step::WebMercator),
            Some(code) => parse_utm_epsg(code)
                .map(|(zone, north)| Step::Utm { zone, north })
                .ok_or_else(|| Error::UnsupportedCrs(crs.identifier())),
            None => Err(Error::UnsupportedCrs(crs.identifier())),
        }
    }

    /// WGS84 (lon, lat) degrees → projected coordinates.
    fn forward(&self, c: Coord<f64>) -> Coord<f64> {
        match self {
            Step::Identity => c,
            Step::Utm { zone, north } => {
                let (e, n) = wgs84_to_utm(c.x, c.y, *zone, *north);
                Coord { x: e, y: n }
            }
            Step::WebMercator => {
                let (x, y) = wgs84_to_web_mercator(c.x, c.y);
                Coord { x, y }
            }
        }
    }

    /// Projected coordinates → WGS84 (lon, lat) degrees.
    fn inverse(&self, c: Coord<f64>) -> Coord<f64> {
        match self {
            Step::Identity => c,
            Step::Utm { zone, north } => {
                let (lon, lat) = utm_to_wgs84(c.x, c.y, *zone, *north);
                Coord { x: lon, y: lat }
            }
            Step::WebMercator => {
                let (lon, lat) = web_mercator_to_wgs84(c.x, c.y);
                Coord { x: lon, y: lat }
            }
        }
    }
}

impl Transform {
    fn resolve(from: &Crs, to: &Crs) -> Result<Self> {
        Ok(Self {
            inverse: Step::for_crs(from)?,
            forward: Step::for_crs(to)?,
        })
    }

    fn apply(&self, c: Coord<f64>) -> Coord<f64> {
        self.forward.forward(self.inverse.inverse(c))
    }
}

// ── Transverse Mercator (Snyder 1987, USGS Prof. Paper 1395, pp. 61-64) ──

/// Convert WGS84 (longitude, latitude) in degrees to UTM (easting, northing)
/// in metres for the given zone and hemisphere.
fn wgs84_to_utm(lon_deg: f64, lat_deg: f64, zone: u32, north: bool) -> (f64, f64) {
    let lat = lat_deg.to_radians();
    let lon = lon_deg.to_radians();

    let lon0 = central_meridian(zone);

    let sin_lat = lat.sin();
    let cos_lat = lat.cos();
    let tan_lat = lat.tan();

    let n = A / (1.0 - E2 * sin_lat * sin_lat).sqrt();
    let t = tan_lat * tan_lat;
    let c = E_PRIME2 * cos_lat * cos_lat;
    let a_coeff = cos_lat * (lon - lon0);

    // Meridional arc length M (Snyder eq. 3-21)
    let m = meridional_arc(lat);

    let a2 = a_coeff * a_coeff;
    let a4 = a2 * a2;
    let a6 = a4 * a2;

    // Easting (Snyder eq. 8-9)
    let easting = K0 * n
        * (a_coeff
            + (1.0 - t + c) * a2 * a_coeff / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * E_PRIME2)
                * a4
                * a_coeff
                / 120.0)
        + FALSE_EASTING;

    // Northing (Snyder eq. 8-10)
    let northing = K0
        * (m
            + n * tan_lat
                * (a2 / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * E_PRIME2) * a6 / 720.0));

    let northing = if north {
        northing
    } else {
        northing + FALSE_NORTHING_SOUTH
    };

    (easting, northing)
}

/// Convert UTM (easting, northing) in metres to WGS84 (longitude, latitude)
/// in degrees (Snyder eqs. 8-17..8-25, footpoint latitude method).
fn utm_to_wgs84(easting: f64, northing: f64, zone: u32, north: bool) -> (f64, f64) {
    let x = easting - FALSE_EASTING;
    let y = if north {
        northing
    } else {
        northing - FALSE_NORTHING_SOUTH
    };

    let lon0 = central_meridian(zone);

    // Footpoint latitude (Snyder eqs. 7-19, 3-24)
    let m = y / K0;
    let mu = m / (A * (1.0 - E2 / 4.0 - 3.0 * E2 * E2 / 64.0 - 5.0 * E2 * E2 * E2 / 256.0));
    let e1 = (1.0 - (1.0 - E2).sqrt()) / (1.0 + (1.0 - E2).sqrt());

    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

    let sin_phi1 = phi1.sin();
    let cos_phi1 = phi1.cos();
    let tan_phi1 = phi1.tan();

    let c1 = E_PRIME2 * cos_phi1 * cos_phi1;
    let t1 = tan_phi1 * tan_phi1;
    let n1 = A / (1.0 - E2 * sin_phi1 * sin_phi1).sqrt();
    let r1 = A * (1.0 - E2) / (1.0 - E2 * sin_phi1 * sin_phi1).powf(1.5);
    let d = x / (n1 * K0);

    let d2 = d * d;
    let d4 = d2 * d2;
    let d6 = d4 * d2;

    let lat = phi1
        - (n1 * tan_phi1 / r1)
            * (d2 / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * E_PRIME2) * d4 / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1
                    - 252.0 * E_PRIME2
                    - 3.0 * c1 * c1)
                    * d6
                    / 720.0);

    let lon = lon0
        + (d - (1.0 + 2.0 * t1 + c1) * d2 * d / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * E_PRIME2 + 24.0 * t1 * t1)
                * d4
                * d
                / 120.0)
            / cos_phi1;

    (lon.to_degrees(), lat.to_degrees())
}

/// Central meridian of a UTM zone, in radians.
fn central_meridian(zone: u32) -> f64 {
    ((zone as f64 - 1.0) * 6.0 - 180.0 + 3.0).to_radians()
}

/// Meridional arc from equator to latitude `lat` (radians).
/// Snyder eq. 3-21.
fn meridional_arc(lat: f64) -> f64 {
    let e2 = E2;
    let e4 = e2 * e2;
    let e6 = e4 * e2;

    A * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * lat
        - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * lat).sin()
        + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * lat).sin()
        - (35.0 * e6 / 3072.0) * (6.0 * lat).sin())
}

// ── Spherical Web Mercator ───────────────────────────────────────────────

fn wgs84_to_web_mercator(lon_deg: f64, lat_deg: f64) -> (f64, f64) {
    // Clamp to the projection's defined latitude range
    let lat = lat_deg.clamp(-85.051_128_779_806_59, 85.051_128_779_806_59);
    let x = R_MERC * lon_deg.to_radians();
    let y = R_MERC * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

fn web_mercator_to_wgs84(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / R_MERC).to_degrees();
    let lat = (2.0 * (y / R_MERC).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    (lon, lat)
}

// ── Tests ────────────────────────────────────────────────────────────────
