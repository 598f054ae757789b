//! Spherical geometry.
//!
//! Coordinates come in as latitude/longitude degrees. For indexing they are
//! projected onto a sphere of radius [`EARTH_RADIUS_KM`]; for acceptance
//! tests the haversine great-circle distance on the same sphere is used.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// A geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    /// Latitude in [-90, 90].
    pub lat: f64,
    /// Longitude in [-180, 180].
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Returns true if both components are finite and inside their ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// A point in 3-D Cartesian space, in kilometres from the Earth's centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    /// Returns the component for `axis` (0 = x, 1 = y, anything else = z).
    #[inline]
    pub fn axis(&self, axis: usize) -> f64 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Straight-line distance to another point.
    pub fn chord_to(&self, other: &Point3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Projects a geographic coordinate onto the sphere of radius [`EARTH_RADIUS_KM`].
pub fn project(coords: LatLon) -> Point3 {
    let lat = coords.lat.to_radians();
    let lon = coords.lon.to_radians();

    Point3 {
        x: EARTH_RADIUS_KM * lat.cos() * lon.cos(),
        y: EARTH_RADIUS_KM * lat.cos() * lon.sin(),
        z: EARTH_RADIUS_KM * lat.sin(),
    }
}

/// Haversine great-circle distance in kilometres.
pub fn great_circle_km(a: LatLon, b: LatLon) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = lat2 - lat1;
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Converts a great-circle arc length into the chord that spans it.
///
/// Arcs of half the circumference or more map to the diameter, so the
/// result is monotone in `arc_km` and never smaller than any real chord
/// between two points at most `arc_km` apart.
pub fn chord_for_arc_km(arc_km: f64) -> f64 {
    if arc_km <= 0.0 {
        return 0.0;
    }
    if arc_km >= PI * EARTH_RADIUS_KM {
        return 2.0 * EARTH_RADIUS_KM;
    }
    2.0 * EARTH_RADIUS_KM * (arc_km / (2.0 * EARTH_RADIUS_KM)).sin()
}
