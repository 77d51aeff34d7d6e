//! Planar coordinates used for the first-pass server ranking

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Immutable (lat, lon) pair with finite components.
///
/// Distance is plain Euclidean distance on the raw degrees, which is the same
/// approximation the server network uses for its own ordering. It is not a
/// geodesic distance and is only meaningful for ranking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    lat: f64,
    lon: f64,
}

impl GeoPoint {
    /// Create a point, rejecting NaN and infinite coordinates
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(AppError::validation(format!(
                "coordinates must be finite, got [{}, {}]",
                lat, lon
            )));
        }
        Ok(Self { lat, lon })
    }

    /// Parse a point from the textual attributes found in server documents
    pub fn parse(lat: &str, lon: &str) -> Result<Self> {
        let lat: f64 = lat.trim().parse()?;
        let lon: f64 = lon.trim().parse()?;
        Self::new(lat, lon)
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn distance(&self, other: &GeoPoint) -> f64 {
        distance(self, other)
    }
}

/// `sqrt((a.lon - b.lon)^2 + (a.lat - b.lat)^2)`
pub fn distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    (a.lon - b.lon).hypot(a.lat - b.lat)
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lat, self.lon)
    }
}

impl<'de> Deserialize<'de> for GeoPoint {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            lat: f64,
            lon: f64,
        }

        let raw = Raw::deserialize(deserializer)?;
        GeoPoint::new(raw.lat, raw.lon).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rejects_non_finite() {
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(0.0, f64::INFINITY).is_err());
        assert!(GeoPoint::new(f64::NEG_INFINITY, f64::NAN).is_err());
        assert!(GeoPoint::new(45.5, -122.6).is_ok());
    }

    #[test]
    fn test_parse_from_attributes() {
        let p = GeoPoint::parse(" 52.5167", "13.4000").unwrap();
        assert_eq!(p.lat(), 52.5167);
        assert_eq!(p.lon(), 13.4);

        assert!(GeoPoint::parse("north", "13.4").is_err());
        assert!(GeoPoint::parse("NaN", "13.4").is_err());
    }

    #[test]
    fn test_distance_is_planar() {
        let a = GeoPoint::new(0.0, 0.0).unwrap();
        let b = GeoPoint::new(3.0, 4.0).unwrap();
        assert_eq!(a.distance(&b), 5.0);
    }

    #[test]
    fn test_deserialize_json_point() {
        let p: GeoPoint = serde_json::from_str(r#"{"lat": 1.5, "lon": -2.0}"#).unwrap();
        assert_eq!(p, GeoPoint::new(1.5, -2.0).unwrap());
    }

    #[test]
    fn test_display() {
        assert_eq!(GeoPoint::new(1.5, -2.0).unwrap().to_string(), "[1.5, -2]");
    }

    proptest! {
        #[test]
        fn prop_distance_to_self_is_zero(lat in -90.0f64..90.0, lon in -180.0f64..180.0) {
            let p = GeoPoint::new(lat, lon).unwrap();
            prop_assert_eq!(distance(&p, &p), 0.0);
        }

        #[test]
        fn prop_distance_is_symmetric(
            lat1 in -90.0f64..90.0, lon1 in -180.0f64..180.0,
            lat2 in -90.0f64..90.0, lon2 in -180.0f64..180.0,
        ) {
            let a = GeoPoint::new(lat1, lon1).unwrap();
            let b = GeoPoint::new(lat2, lon2).unwrap();
            prop_assert_eq!(distance(&a, &b), distance(&b, &a));
            prop_assert!(distance(&a, &b) >= 0.0);
        }
    }
}
