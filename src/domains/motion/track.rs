use crate::common::GeoPoint;

/// Where along a polyline a given progress value falls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentLocation {
    pub index: usize,
    pub local: f64,
}

/// Precomputed planar lengths for a polyline. Prefix sums are normalized
/// so the last one is (up to rounding) 1.0.
#[derive(Debug, Clone)]
pub struct PolylineTrack {
    points: Vec<GeoPoint>,
    segment_fractions: Vec<f64>,
    cumulative_ends: Vec<f64>,
    total_length: f64,
}

impl PolylineTrack {
    /// Returns None for polylines that cannot be traversed: fewer than two
    /// points or zero total length.
    pub fn new(points: &[GeoPoint]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let lengths: Vec<f64> = points.windows(2).map(|w| w[0].planar_distance(&w[1])).collect();
        let total_length: f64 = lengths.iter().sum();
        if !(total_length > 0.0) || !total_length.is_finite() {
            return None;
        }

        let segment_fractions: Vec<f64> = lengths.iter().map(|l| l / total_length).collect();
        let mut acc = 0.0;
        let cumulative_ends = segment_fractions
            .iter()
            .map(|f| {
                acc += f;
                acc
            })
            .collect();

        Some(Self {
            points: points.to_vec(),
            segment_fractions,
            cumulative_ends,
            total_length,
        })
    }

    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    pub fn segment_count(&self) -> usize {
        self.segment_fractions.len()
    }

    /// First segment whose cumulative end is >= `progress`. Rounding that
    /// leaves progress past the last prefix lands at the end of the last
    /// segment instead of snapping back to the start.
    pub fn locate(&self, progress: f64) -> SegmentLocation {
        let index = self.cumulative_ends.partition_point(|&end| end < progress);
        if index >= self.segment_count() {
            return SegmentLocation { index: self.segment_count() - 1, local: 1.0 };
        }

        let fraction = self.segment_fractions[index];
        let local = if fraction > 0.0 {
            let start = self.cumulative_ends[index] - fraction;
            ((progress - start) / fraction).clamp(0.0, 1.0)
        } else {
            0.0
        };
        SegmentLocation { index, local }
    }

    pub fn position_at(&self, loc: SegmentLocation) -> GeoPoint {
        let a = &self.points[loc.index];
        let b = &self.points[loc.index + 1];
        a.lerp(b, loc.local)
    }

    /// Bearing of a segment in degrees, 0 = +lat, 90 = +lng. None when the
    /// segment has no direction.
    pub fn segment_bearing(&self, index: usize) -> Option<f64> {
        let a = &self.points[index];
        let b = &self.points[index + 1];
        let dx = b.lng - a.lng;
        let dy = b.lat - a.lat;
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        Some(bearing_degrees(dx, dy))
    }

    pub fn heading_for(&self, index: usize, previous: f64) -> f64 {
        self.segment_bearing(index).unwrap_or(previous)
    }
}

/// `atan2(dx, dy)` in degrees. The x-before-y order is what the map's
/// marker rotation expects.
pub fn bearing_degrees(dx: f64, dy: f64) -> f64 {
    dx.atan2(dy).to_degrees()
}
