use crate::common::ViewportBounds;
use crate::domains::map::{MapSignal, MapView};
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc;

/// Headless stand-in for the map widget: holds the current viewport and
/// raises the same signals a real map would.
pub struct SimulatedMapView {
    bounds: Mutex<ViewportBounds>,
    signals: mpsc::Sender<MapSignal>,
}

impl SimulatedMapView {
    pub fn new(initial: ViewportBounds, capacity: usize) -> (Self, mpsc::Receiver<MapSignal>) {
        let (signals, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                bounds: Mutex::new(initial),
                signals,
            },
            rx,
        )
    }

    pub async fn load(&self) -> Result<(), String> {
        self.emit(MapSignal::Loaded).await
    }

    /// Moves the view and reports it settled, as after a pan or zoom.
    pub async fn settle_at(&self, bounds: ViewportBounds) -> Result<(), String> {
        *self.bounds.lock().unwrap_or_else(PoisonError::into_inner) = bounds;
        self.emit(MapSignal::ViewSettled).await
    }

    async fn emit(&self, signal: MapSignal) -> Result<(), String> {
        self.signals
            .send(signal)
            .await
            .map_err(|e| format!("Failed to send map signal: {}", e))
    }
}

impl MapView for SimulatedMapView {
    fn bounds(&self) -> ViewportBounds {
        *self.bounds.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
