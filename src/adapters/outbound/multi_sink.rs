use crate::domains::render::{MarkerUpdate, RenderSink, RouteDrawRequest};
use crate::domains::routing::RouteId;
use std::sync::Arc;

/// Forwards every request to a primary sink and, when present, a secondary one.
pub struct MultiRenderSink {
    primary: Arc<dyn RenderSink>,
    secondary: Option<Arc<dyn RenderSink>>,
}

impl MultiRenderSink {
    pub fn new(primary: Arc<dyn RenderSink>, secondary: Option<Arc<dyn RenderSink>>) -> Self {
        Self { primary, secondary }
    }
}

impl RenderSink for MultiRenderSink {
    fn draw_route(&self, request: RouteDrawRequest) {
        if let Some(sec) = &self.secondary {
            sec.draw_route(request.clone());
        }
        self.primary.draw_route(request);
    }

    fn clear_route(&self, route_id: RouteId) {
        self.primary.clear_route(route_id);
        if let Some(sec) = &self.secondary {
            sec.clear_route(route_id);
        }
    }

    fn update_marker(&self, update: MarkerUpdate) {
        if let Some(sec) = &self.secondary {
            sec.update_marker(update.clone());
        }
        self.primary.update_marker(update);
    }

    fn remove_marker(&self, route_id: RouteId) {
        self.primary.remove_marker(route_id);
        if let Some(sec) = &self.secondary {
            sec.remove_marker(route_id);
        }
    }
}
