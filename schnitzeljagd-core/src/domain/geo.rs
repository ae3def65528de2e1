use rand::Rng;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// Mean earth radius used for great-circle distances
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Approximate length of one degree of latitude
pub const METERS_PER_DEGREE: f64 = 111_300.0;

/// A WGS84 coordinate in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle distance to `other` in meters
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        distance_meters(self.lat, self.lng, other.lat, other.lng)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}° N, {:.5}° E", self.lat, self.lng)
    }
}

/// Haversine distance between two coordinates, in meters
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    // Rounding can push `a` a hair above 1 for antipodal points
    2.0 * EARTH_RADIUS_M * a.sqrt().min(1.0).asin()
}

/// Uniform-by-area random point inside a disk around (`lat`, `lng`)
pub fn random_point_within_radius<R: Rng + ?Sized>(
    rng: &mut R,
    lat: f64,
    lng: f64,
    radius_m: f64,
) -> GeoPoint {
    random_point_in_ring(rng, lat, lng, 0.0, radius_m)
}

/// Uniform-by-area random point in the annulus between `min_m` and `max_m`
///
/// With `min_m == 0` this is plain disk sampling: the radius fraction is
/// `sqrt(u)` so that points do not cluster around the center.
pub fn random_point_in_ring<R: Rng + ?Sized>(
    rng: &mut R,
    lat: f64,
    lng: f64,
    min_m: f64,
    max_m: f64,
) -> GeoPoint {
    let (inner, outer) = if min_m <= max_m {
        (min_m.max(0.0), max_m.max(0.0))
    } else {
        (max_m.max(0.0), min_m.max(0.0))
    };

    let u: f64 = rng.random();
    let v: f64 = rng.random();

    let distance_m = (inner * inner + u * (outer * outer - inner * inner)).sqrt();
    let angle = 2.0 * PI * v;

    let offset_deg = distance_m / METERS_PER_DEGREE;
    let lat_offset = offset_deg * angle.cos();
    let lng_offset = offset_deg * angle.sin() / lat.to_radians().cos();

    GeoPoint::new(lat + lat_offset, lng + lng_offset)
}

/// Inclusive uniform integer in `[min, max]` (bounds may come in either order)
pub fn random_distance_meters<R: Rng + ?Sized>(rng: &mut R, min: u32, max: u32) -> u32 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    rng.random_range(lo..=hi)
}
