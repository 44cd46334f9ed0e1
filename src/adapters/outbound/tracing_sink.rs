use crate::domains::render::{MarkerUpdate, RenderSink, RouteDrawRequest};
use crate::domains::routing::RouteId;

/// Emits every render request as a tracing event. Marker updates are at
/// trace level since there is one per agent per frame.
pub struct TracingRenderSink;

impl RenderSink for TracingRenderSink {
    fn draw_route(&self, request: RouteDrawRequest) {
        tracing::info!(
            route = %request.route_id,
            color = request.color.hex(),
            points = request.coordinates.len(),
            "draw route"
        );
    }

    fn clear_route(&self, route_id: RouteId) {
        tracing::info!(route = %route_id, "clear route");
    }

    fn update_marker(&self, update: MarkerUpdate) {
        tracing::trace!(
            route = %update.route_id,
            lng = update.position.lng,
            lat = update.position.lat,
            rotation = update.rotation,
            "marker"
        );
    }

    fn remove_marker(&self, route_id: RouteId) {
        tracing::debug!(route = %route_id, "remove marker");
    }
}
