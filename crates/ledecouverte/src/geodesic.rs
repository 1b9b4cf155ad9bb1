// Great-circle distance between landmarks

use crate::geometry::GeometryError;
use legraphe::LatLng;

/// Sphere radius used for distances, in meters
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Haversine distance in meters
pub fn haversine_distance(a: LatLng, b: LatLng) -> f64 {
    let (lat1, lat2) = (a.latitude.to_radians(), b.latitude.to_radians());
    let d_lat = lat2 - lat1;
    let d_lng = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Reject a location with a non-finite coordinate
pub fn check_location(p: LatLng) -> Result<LatLng, GeometryError> {
    if p.latitude.is_finite() && p.longitude.is_finite() {
        Ok(p)
    } else {
        Err(GeometryError::InvalidGeometry(format!(
            "non-finite coordinate ({}, {})",
            p.latitude, p.longitude
        )))
    }
}

/// Haversine distance, rejecting non-finite coordinates
pub fn checked_distance(a: LatLng, b: LatLng) -> Result<f64, GeometryError> {
    Ok(haversine_distance(check_location(a)?, check_location(b)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_point() {
        let p = LatLng::new(48.8584, 2.2945);
        assert_eq!(haversine_distance(p, p), 0.0);
    }

    #[test]
    fn test_quarter_meridian() {
        let d = haversine_distance(LatLng::new(0.0, 0.0), LatLng::new(90.0, 0.0));
        let expected = std::f64::consts::FRAC_PI_2 * EARTH_RADIUS_M;
        assert!((d - expected).abs() < 1e-6);
    }

    #[test]
    fn test_nearby_landmarks() {
        // Eiffel Tower to Trocadero, roughly 800 m apart
        let eiffel = LatLng::new(48.8584, 2.2945);
        let trocadero = LatLng::new(48.8616, 2.2893);
        let d = haversine_distance(eiffel, trocadero);
        assert!(d > 400.0 && d < 1000.0, "distance {}", d);
    }

    #[test]
    fn test_symmetric() {
        let a = LatLng::new(40.6892, -74.0445);
        let b = LatLng::new(51.5007, -0.1246);
        assert!((haversine_distance(a, b) - haversine_distance(b, a)).abs() < 1e-6);
    }

    #[test]
    fn test_checked_distance_rejects_nan() {
        let bad = LatLng {
            latitude: f64::NAN,
            longitude: 0.0,
        };
        assert!(checked_distance(bad, LatLng::new(0.0, 0.0)).is_err());
    }

    #[test]
    fn test_check_location() {
        let p = LatLng::new(48.8584, 2.2945);
        assert_eq!(check_location(p).unwrap(), p);
        let bad = LatLng {
            latitude: 0.0,
            longitude: f64::INFINITY,
        };
        assert!(check_location(bad).is_err());
    }
}
