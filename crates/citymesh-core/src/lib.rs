//! Citymesh Core - City records and geodesy
//!
//! This crate holds everything the graph engine needs to know about the
//! input: the [`CityRecord`] type, the geometry used to index and compare
//! locations, and a reader for the `worldcitiespop` CSV layout.
//!
//! # Geometry
//!
//! Two metrics are in play:
//! - great-circle (haversine) distance on the sphere, the only distance
//!   that ever decides membership,
//! - chord distance between projected 3-D points, used by the spatial
//!   index purely for pruning.
//!
//! Both share [`EARTH_RADIUS_KM`], so a chord bound derived from an arc
//! length is exact up to floating-point rounding.
//!
//! # Example
//!
//! ```
//! use citymesh_core::{great_circle_km, LatLon};
//!
//! let a = LatLon::new(0.0, 0.0);
//! let b = LatLon::new(0.0, 1.0);
//! let d = great_circle_km(a, b);
//! assert!((d - 111.19).abs() < 0.1);
//! ```

mod city;
pub mod dataset;
mod error;
pub mod geo;

pub use city::CityRecord;
pub use dataset::{read_cities, read_cities_from};
pub use error::{DatasetError, Result};
pub use geo::{chord_for_arc_km, great_circle_km, project, LatLon, Point3, EARTH_RADIUS_KM};
