use serde::{Deserialize, Serialize};

use crate::error::{LocatorError, LocatorResult};

/// Mean earth radius in metres (IUGG), shared with the haversine SQL expression.
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

pub const DEFAULT_RADIUS_METERS: f64 = 5_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> LocatorResult<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(LocatorError::invalid(
                "invalid_coordinate",
                format!("latitude {latitude} must lie within [-90, 90]"),
            ));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(LocatorError::invalid(
                "invalid_coordinate",
                format!("longitude {longitude} must lie within [-180, 180]"),
            ));
        }
        Ok(Self { longitude, latitude })
    }

    /// Great-circle distance using the haversine formula.
    pub fn distance_meters(&self, other: &GeoPoint) -> f64 {
        let phi1 = self.latitude.to_radians();
        let phi2 = other.latitude.to_radians();
        let d_phi = (other.latitude - self.latitude).to_radians();
        let d_lambda = (other.longitude - self.longitude).to_radians();
        let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_METERS * a.sqrt().min(1.0).asin()
    }
}

/// A centre point plus radius, used to restrict and order pharmacy lookups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoRadius {
    pub origin: GeoPoint,
    pub radius_meters: f64,
}

pub fn validate_radius(radius_meters: f64) -> LocatorResult<f64> {
    // +inf is allowed: it means "no distance cap" while still ordering by distance.
    if radius_meters.is_nan() || radius_meters <= 0.0 {
        return Err(LocatorError::invalid(
            "invalid_radius",
            "maxDistance must be a positive number of metres",
        ));
    }
    Ok(radius_meters)
}

/// Builds an optional origin from raw query values. Both halves must be present or absent.
pub fn parse_origin(latitude: Option<&str>, longitude: Option<&str>) -> LocatorResult<Option<GeoPoint>> {
    let latitude = latitude.map(str::trim).filter(|v| !v.is_empty());
    let longitude = longitude.map(str::trim).filter(|v| !v.is_empty());
    match (latitude, longitude) {
        (None, None) => Ok(None),
        (Some(lat), Some(lon)) => {
            let lat = parse_coordinate("latitude", lat)?;
            let lon = parse_coordinate("longitude", lon)?;
            GeoPoint::new(lon, lat).map(Some)
        }
        _ => Err(LocatorError::invalid(
            "incomplete_coordinate",
            "latitude and longitude must be supplied together",
        )),
    }
}

fn parse_coordinate(name: &str, raw: &str) -> LocatorResult<f64> {
    raw.parse::<f64>().map_err(|_| {
        LocatorError::invalid("invalid_coordinate", format!("{name} '{raw}' is not a number"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let a = GeoPoint::new(0.0, 0.0).unwrap();
        let b = GeoPoint::new(0.0, 1.0).unwrap();
        let d = a.distance_meters(&b);
        assert!((d - 111_195.0).abs() < 10.0, "distance was {d}");
        assert_eq!(a.distance_meters(&a), 0.0);
    }

    #[test]
    fn out_of_range_coordinates_rejected() {
        assert!(GeoPoint::new(181.0, 0.0).is_err());
        assert!(GeoPoint::new(0.0, -90.5).is_err());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn half_a_coordinate_is_incomplete() {
        let err = parse_origin(Some("6.5"), None).unwrap_err();
        assert_eq!(err.code(), "incomplete_coordinate");
        let err = parse_origin(Some("abc"), Some("3.3")).unwrap_err();
        assert_eq!(err.code(), "invalid_coordinate");
        assert_eq!(parse_origin(None, Some("  ")), Ok(None));
        assert_eq!(parse_origin(None, None), Ok(None));
    }

    #[test]
    fn radius_must_be_positive() {
        assert!(validate_radius(0.0).is_err());
        assert!(validate_radius(-1.0).is_err());
        assert!(validate_radius(f64::NAN).is_err());
        assert_eq!(validate_radius(f64::INFINITY), Ok(f64::INFINITY));
    }
}
