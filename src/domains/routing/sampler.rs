use crate::common::{GeoPoint, NamedPoint, ViewportBounds};
use rand::seq::SliceRandom;
use rand::Rng;

/// Picks route endpoints: uniformly from the known places (with
/// replacement) when there are any, otherwise uniformly inside the viewport.
#[derive(Debug, Clone)]
pub struct EndpointSampler {
    places: Vec<NamedPoint>,
    bounds: ViewportBounds,
}

impl EndpointSampler {
    pub fn new(places: Vec<NamedPoint>, bounds: ViewportBounds) -> Self {
        Self { places, bounds }
    }

    pub fn uses_places(&self) -> bool {
        !self.places.is_empty()
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> NamedPoint {
        match self.places.choose(rng) {
            Some(place) => place.clone(),
            None => NamedPoint::placeholder(self.bounds.sample_uniform(rng)),
        }
    }
}

/// Start/end pairs closer than `epsilon` along both axes are not worth routing.
pub fn is_degenerate_pair(a: &GeoPoint, b: &GeoPoint, epsilon: f64) -> bool {
    (a.lng - b.lng).abs() < epsilon && (a.lat - b.lat).abs() < epsilon
}
