//! Great-circle distance on a spherical earth.

use serde::{Deserialize, Serialize};

/// Mean earth radius used by every distance calculation, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points given in degrees, in kilometres.
///
/// Total over the real coordinate domain; no validation is performed here.
#[inline]
pub fn distance_km(lat_a: f64, lon_a: f64, lat_b: f64, lon_b: f64) -> f64 {
    let lat_a_rad = lat_a.to_radians();
    let lat_b_rad = lat_b.to_radians();
    let delta_lat = (lat_b - lat_a).to_radians();
    let delta_lon = (lon_b - lon_a).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat_a_rad.cos() * lat_b_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Distance to `other` in kilometres.
    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        distance_km(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }

    /// Display form used when no address is known: `lat, lon` to 4 decimals.
    pub fn display_short(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_distance_same_point_is_zero() {
        assert_eq!(distance_km(28.7041, 77.1025, 28.7041, 77.1025), 0.0);
        assert_eq!(distance_km(-33.8688, 151.2093, -33.8688, 151.2093), 0.0);
        assert_eq!(distance_km(0.0, 0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_distance_one_degree_of_longitude_at_equator() {
        let d = distance_km(0.0, 0.0, 0.0, 1.0);
        assert_abs_diff_eq!(d, 111.19, epsilon = 0.5);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let pairs = [
            ((51.5074, -0.1278), (48.8566, 2.3522)),
            ((28.7041, 77.1025), (19.0760, 72.8777)),
            ((-33.8688, 151.2093), (37.7749, -122.4194)),
        ];
        for ((lat_a, lon_a), (lat_b, lon_b)) in pairs {
            let ab = distance_km(lat_a, lon_a, lat_b, lon_b);
            let ba = distance_km(lat_b, lon_b, lat_a, lon_a);
            assert_abs_diff_eq!(ab, ba, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_distance_london_paris() {
        // Roughly 344 km
        let d = distance_km(51.5074, -0.1278, 48.8566, 2.3522);
        assert!(d > 340.0 && d < 348.0, "got {d}");
    }

    #[test]
    fn test_distance_antipodes() {
        let d = distance_km(0.0, 0.0, 0.0, 180.0);
        assert_abs_diff_eq!(d, std::f64::consts::PI * EARTH_RADIUS_KM, epsilon = 1e-6);
    }

    #[test]
    fn test_coordinates_distance_to() {
        let a = Coordinates::new(0.0, 0.0);
        let b = Coordinates::new(0.0, 1.0);
        assert_abs_diff_eq!(a.distance_to(&b), distance_km(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_coordinates_display_short() {
        let c = Coordinates::new(28.70412, 77.102534);
        assert_eq!(c.display_short(), "28.7041, 77.1025");
    }

    #[test]
    fn test_coordinates_serialization() {
        let c = Coordinates::new(1.5, -2.25);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, r#"{"latitude":1.5,"longitude":-2.25}"#);
    }
}
