use rand::Rng;
use serde::{Deserialize, Serialize};

/// Placeholder label for endpoints sampled uniformly inside the viewport.
pub const PLACEHOLDER_NAME: &str = "Location";

/// Planar coordinate in degrees. No datum handling beyond what the route
/// provider uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lng: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Planar euclidean distance in coordinate units.
    pub fn planar_distance(&self, other: &GeoPoint) -> f64 {
        let dx = other.lng - self.lng;
        let dy = other.lat - self.lat;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn lerp(&self, other: &GeoPoint, t: f64) -> GeoPoint {
        GeoPoint {
            lng: self.lng + (other.lng - self.lng) * t,
            lat: self.lat + (other.lat - self.lat) * t,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.lng.is_finite() && self.lat.is_finite()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedPoint {
    #[serde(flatten)]
    pub point: GeoPoint,
    pub name: String,
}

impl NamedPoint {
    pub fn new(point: GeoPoint, name: impl Into<String>) -> Self {
        Self { point, name: name.into() }
    }

    pub fn placeholder(point: GeoPoint) -> Self {
        Self::new(point, PLACEHOLDER_NAME)
    }
}

/// Snapshot of the visible map rectangle plus zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportBounds {
    pub min_lng: f64,
    pub max_lng: f64,
    pub min_lat: f64,
    pub max_lat: f64,
    pub zoom: f64,
}

impl ViewportBounds {
    pub fn new(min_lng: f64, max_lng: f64, min_lat: f64, max_lat: f64, zoom: f64) -> Self {
        Self { min_lng, max_lng, min_lat, max_lat, zoom }
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint {
            lng: (self.min_lng + self.max_lng) / 2.0,
            lat: (self.min_lat + self.max_lat) / 2.0,
        }
    }

    pub fn contains(&self, p: &GeoPoint) -> bool {
        p.lng >= self.min_lng
            && p.lng <= self.max_lng
            && p.lat >= self.min_lat
            && p.lat <= self.max_lat
    }

    pub fn sample_uniform<R: Rng + ?Sized>(&self, rng: &mut R) -> GeoPoint {
        GeoPoint {
            lng: self.min_lng + rng.gen::<f64>() * (self.max_lng - self.min_lng),
            lat: self.min_lat + rng.gen::<f64>() * (self.max_lat - self.min_lat),
        }
    }

    /// True when the center moved more than `center_threshold` along either
    /// axis or the zoom changed by more than `zoom_threshold`.
    pub fn differs_significantly(
        &self,
        other: &ViewportBounds,
        center_threshold: f64,
        zoom_threshold: f64,
    ) -> bool {
        let a = self.center();
        let b = other.center();
        let moved =
            (a.lng - b.lng).abs() > center_threshold || (a.lat - b.lat).abs() > center_threshold;
        let zoomed = (self.zoom - other.zoom).abs() > zoom_threshold;
        moved || zoomed
    }
}

impl Default for ViewportBounds {
    fn default() -> Self {
        // Lower Manhattan / western Brooklyn
        ViewportBounds::new(-74.1, -73.9, 40.6, 40.8, 11.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn nyc() -> ViewportBounds {
        ViewportBounds::new(-74.1, -73.9, 40.6, 40.8, 11.0)
    }

    #[test]
    fn center_is_midpoint() {
        let c = nyc().center();
        assert!((c.lng - -74.0).abs() < 1e-9);
        assert!((c.lat - 40.7).abs() < 1e-9);
    }

    #[test]
    fn uniform_samples_stay_inside() {
        let bounds = nyc();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            assert!(bounds.contains(&bounds.sample_uniform(&mut rng)));
        }
    }

    #[test]
    fn small_moves_are_not_significant() {
        let a = nyc();
        let mut b = a;
        b.min_lng += 0.5;
        b.max_lng += 0.5;
        b.zoom += 1.5;
        assert!(!a.differs_significantly(&b, 0.5, 1.5));
    }

    #[test]
    fn either_threshold_is_enough() {
        let a = nyc();
        let mut panned = a;
        panned.min_lat -= 0.6;
        panned.max_lat -= 0.6;
        assert!(a.differs_significantly(&panned, 0.5, 1.5));

        let mut zoomed = a;
        zoomed.zoom = 13.0;
        assert!(a.differs_significantly(&zoomed, 0.5, 1.5));
    }
}
