use crate::common::{ApplicationError, ApplicationResult, GeoPoint};
use crate::domains::render::{MarkerUpdate, RenderSink, RouteDrawRequest};
use crate::domains::routing::RouteId;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct Scene {
    routes: Vec<RouteDrawRequest>,
    markers: HashMap<RouteId, MarkerUpdate>,
}

/// Keeps the latest drawn routes and marker positions so they can be
/// exported as a GeoJSON FeatureCollection.
#[derive(Default)]
pub struct GeoJsonRenderSink {
    scene: Mutex<Scene>,
}

fn position(p: &GeoPoint) -> Vec<f64> {
    vec![p.lng, p.lat]
}

fn properties(value: serde_json::Value) -> Option<JsonObject> {
    match value {
        serde_json::Value::Object(map) => Some(map),
        _ => None,
    }
}

impl GeoJsonRenderSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn scene(&self) -> MutexGuard<'_, Scene> {
        self.scene.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Route lines first (draw order), then one point per marker.
    pub fn feature_collection(&self) -> FeatureCollection {
        let scene = self.scene();
        let mut features = Vec::with_capacity(scene.routes.len() + scene.markers.len());

        for route in &scene.routes {
            features.push(Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::LineString(
                    route.coordinates.iter().map(position).collect(),
                ))),
                id: None,
                properties: properties(json!({
                    "kind": "route",
                    "route_id": route.route_id.to_string(),
                    "color": route.color.hex(),
                    "width": route.width,
                    "opacity": route.opacity,
                })),
                foreign_members: None,
            });
        }

        for route in &scene.routes {
            let Some(marker) = scene.markers.get(&route.route_id) else {
                continue;
            };
            features.push(Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(position(&marker.position)))),
                id: None,
                properties: properties(json!({
                    "kind": "bus",
                    "route_id": marker.route_id.to_string(),
                    "color": marker.icon.color.hex(),
                    "rotation": marker.rotation,
                    "title": marker.tooltip.title,
                    "tooltip": marker.tooltip.body,
                    "icon_svg": marker.icon.to_svg(),
                })),
                foreign_members: None,
            });
        }

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> ApplicationResult<()> {
        let body = serde_json::to_string_pretty(&self.feature_collection())
            .map_err(|e| ApplicationError::RenderSink(format!("serialize snapshot: {}", e)))?;
        std::fs::write(path.as_ref(), body)
            .map_err(|e| {
                ApplicationError::RenderSink(format!("write {}: {}", path.as_ref().display(), e))
            })
    }
}

impl RenderSink for GeoJsonRenderSink {
    fn draw_route(&self, request: RouteDrawRequest) {
        let mut scene = self.scene();
        scene.routes.retain(|r| r.route_id != request.route_id);
        scene.routes.push(request);
    }

    fn clear_route(&self, route_id: RouteId) {
        self.scene().routes.retain(|r| r.route_id != route_id);
    }

    fn update_marker(&self, update: MarkerUpdate) {
        self.scene().markers.insert(update.route_id, update);
    }

    fn remove_marker(&self, route_id: RouteId) {
        self.scene().markers.remove(&route_id);
    }
}
