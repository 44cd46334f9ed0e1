use crate::common::ViewportBounds;

/// Signals the map widget raises that the simulation reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapSignal {
    /// Style and data are ready; fired once.
    Loaded,
    /// The user stopped panning or zooming.
    ViewSettled,
}

/// Read side of the external map widget.
pub trait MapView: Send + Sync {
    fn bounds(&self) -> ViewportBounds;
}
