//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers, as used by the matching engine.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// GPS coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to another point in kilometers (haversine),
    /// rounded to 2 decimals. All stored `distance_km` values come from this
    /// function.
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let delta_lat = (other.latitude - self.latitude).to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        // Float drift can push `a` past 1.0 for near-antipodal points
        let a = ((delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2))
        .min(1.0);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        round_km(EARTH_RADIUS_KM * c)
    }
}

fn round_km(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_distance_to_self_is_zero() {
        let p = GeoPoint::new(-11.9932, -76.9942);
        assert_eq!(p.distance_km(&p), 0.0);
    }

    #[test]
    fn test_distance_one_degree_longitude_at_equator() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 1.0);
        assert_eq!(a.distance_km(&b), 111.19);
    }

    #[test]
    fn test_distance_between_lima_districts() {
        // San Juan de Lurigancho -> Ate Vitarte
        let sjl = GeoPoint::new(-11.9932, -76.9942);
        let ate = GeoPoint::new(-12.0464, -76.9378);
        assert_eq!(sjl.distance_km(&ate), 8.52);

        // San Juan de Lurigancho -> Villa El Salvador
        let ves = GeoPoint::new(-12.2122, -76.9392);
        assert_eq!(sjl.distance_km(&ves), 25.08);
    }

    #[test]
    fn test_distance_rounded_to_two_decimals() {
        let a = GeoPoint::new(-12.0, -77.0);
        let b = GeoPoint::new(-11.9932, -76.9942);
        assert_eq!(a.distance_km(&b), 0.98);
    }

    proptest! {
        #[test]
        fn prop_distance_is_symmetric(
            lat1 in -90.0f64..90.0,
            lon1 in -180.0f64..180.0,
            lat2 in -90.0f64..90.0,
            lon2 in -180.0f64..180.0,
        ) {
            let a = GeoPoint::new(lat1, lon1);
            let b = GeoPoint::new(lat2, lon2);
            prop_assert_eq!(a.distance_km(&b), b.distance_km(&a));
        }

        #[test]
        fn prop_distance_is_non_negative(
            lat1 in -90.0f64..90.0,
            lon1 in -180.0f64..180.0,
            lat2 in -90.0f64..90.0,
            lon2 in -180.0f64..180.0,
        ) {
            let a = GeoPoint::new(lat1, lon1);
            let b = GeoPoint::new(lat2, lon2);
            prop_assert!(a.distance_km(&b) >= 0.0);
        }
    }
}
