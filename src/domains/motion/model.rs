use super::track::PolylineTrack;
use crate::common::GeoPoint;
use crate::domains::routing::Route;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Rough planar conversion used for agent speed: 111 km per degree.
pub const KM_PER_DEGREE: f64 = 111.0;
pub const SECONDS_PER_HOUR: f64 = 3600.0;
pub const DEFAULT_SPEED_KMH: f64 = 60.0;

pub fn degrees_per_second(speed_kmh: f64) -> f64 {
    speed_kmh / KM_PER_DEGREE / SECONDS_PER_HOUR
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionState {
    /// Fraction of the polyline travelled, always in [0, 1).
    pub progress: f64,
    pub last_sample_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    pub position: GeoPoint,
    pub heading: f64,
}

/// Moves one agent along its route forever, looping back to the first
/// point whenever progress reaches 1.
#[derive(Debug, Clone)]
pub struct MotionModel {
    route: Arc<Route>,
    track: Option<PolylineTrack>,
    rate_per_second: f64,
    state: MotionState,
    sample: MotionSample,
}

impl MotionModel {
    pub fn new(route: Arc<Route>, speed_kmh: f64, now_ms: u64) -> Self {
        let track = PolylineTrack::new(&route.polyline);
        let rate_per_second = track
            .as_ref()
            .map(|t| degrees_per_second(speed_kmh) / t.total_length())
            .unwrap_or(0.0);
        let position = route.polyline.first().copied().unwrap_or(GeoPoint::new(0.0, 0.0));

        Self {
            route,
            track,
            rate_per_second,
            state: MotionState { progress: 0.0, last_sample_ms: now_ms },
            sample: MotionSample { position, heading: 0.0 },
        }
    }

    pub fn route(&self) -> &Arc<Route> {
        &self.route
    }

    pub fn is_inert(&self) -> bool {
        self.track.is_none()
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    /// Normalized progress gained per second of wall-clock time.
    pub fn rate_per_second(&self) -> f64 {
        self.rate_per_second
    }

    pub fn current(&self) -> MotionSample {
        self.sample
    }

    /// Advance to `now_ms` and return the new sample. Inert models emit nothing.
    pub fn tick(&mut self, now_ms: u64) -> Option<MotionSample> {
        let track = self.track.as_ref()?;

        let elapsed_secs = now_ms.saturating_sub(self.state.last_sample_ms) as f64 / 1000.0;
        self.state.last_sample_ms = now_ms;

        self.state.progress += self.rate_per_second * elapsed_secs;
        if self.state.progress >= 1.0 {
            self.state.progress = 0.0;
        }

        let loc = track.locate(self.state.progress);
        self.sample = MotionSample {
            position: track.position_at(loc),
            heading: track.heading_for(loc.index, self.sample.heading),
        };
        Some(self.sample)
    }
}
