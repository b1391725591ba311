use crate::models::{BoundingBox, LocationConstraint};

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Calculate a bounding box around a center point
///
/// Cheaper than Haversine, used as a pre-filter.
/// 1° latitude ≈ 111km, 1° longitude ≈ 111km * cos(latitude)
pub fn calculate_bounding_box(lat: f64, lon: f64, radius_km: f64) -> BoundingBox {
    let lat_delta = radius_km / 111.0;
    let lon_delta = radius_km / (111.0 * lat.to_radians().cos().abs());

    BoundingBox {
        min_lat: lat - lat_delta,
        max_lat: lat + lat_delta,
        min_lon: lon - lon_delta,
        max_lon: lon + lon_delta,
    }
}

/// Check if a point is within a bounding box
#[inline]
pub fn is_within_bounding_box(lat: f64, lon: f64, bbox: &BoundingBox) -> bool {
    lat >= bbox.min_lat && lat <= bbox.max_lat && lon >= bbox.min_lon && lon <= bbox.max_lon
}

/// Whether a point lies within a location constraint's radius
///
/// Points outside the bounding box are rejected before computing Haversine.
pub fn is_within_radius(lat: f64, lon: f64, location: &LocationConstraint) -> bool {
    let radius_km = location.radius_m / 1000.0;
    let bbox = calculate_bounding_box(location.latitude, location.longitude, radius_km);
    if !is_within_bounding_box(lat, lon, &bbox) {
        return false;
    }

    haversine_distance(location.latitude, location.longitude, lat, lon) <= radius_km
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hauptplatz(radius_m: f64) -> LocationConstraint {
        LocationConstraint {
            place: "hauptplatz".to_string(),
            latitude: 47.0707,
            longitude: 15.4382,
            radius_m,
        }
    }

    #[test]
    fn test_haversine_distance() {
        // Hauptplatz to Hauptbahnhof, roughly 1.6 km
        let distance = haversine_distance(47.0707, 15.4382, 47.0707, 15.4172);
        assert!((distance - 1.6).abs() < 0.1, "Distance should be ~1.6km, got {}", distance);
    }

    #[test]
    fn test_bounding_box() {
        let bbox = calculate_bounding_box(47.0707, 15.4382, 10.0);

        assert!(bbox.min_lat < 47.0707);
        assert!(bbox.max_lat > 47.0707);
        assert!(bbox.min_lon < 15.4382);
        assert!(bbox.max_lon > 15.4382);

        // 20km / 111km per degree = ~0.18 degrees
        let lat_span = bbox.max_lat - bbox.min_lat;
        assert!((lat_span - 0.18).abs() < 0.02, "Lat span should be ~0.18 degrees");
    }

    #[test]
    fn test_within_radius() {
        let location = hauptplatz(800.0);

        // Herrengasse is a couple of hundred metres away
        assert!(is_within_radius(47.0717, 15.4377, &location));
        // Hauptbahnhof is well outside 800 m
        assert!(!is_within_radius(47.0707, 15.4172, &location));
        // Far away point fails the bounding box already
        assert!(!is_within_radius(48.2082, 16.3738, &location));
    }

    #[test]
    fn test_radius_boundary_is_inclusive() {
        let location = hauptplatz(0.0);
        assert!(is_within_radius(47.0707, 15.4382, &location));
    }
}
