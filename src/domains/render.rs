use crate::common::GeoPoint;
use crate::domains::routing::{ColorToken, Route, RouteId};
use serde::{Deserialize, Serialize};

pub const ROUTE_LINE_WIDTH: f64 = 2.0;
pub const ROUTE_LINE_OPACITY: f64 = 0.15;
pub const MARKER_TOOLTIP_TITLE: &str = "Bus Service";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDrawRequest {
    pub route_id: RouteId,
    pub coordinates: Vec<GeoPoint>,
    pub color: ColorToken,
    pub width: f64,
    pub opacity: f64,
}

impl RouteDrawRequest {
    pub fn for_route(route: &Route) -> Self {
        Self {
            route_id: route.id,
            coordinates: route.polyline.clone(),
            color: route.color,
            width: ROUTE_LINE_WIDTH,
            opacity: ROUTE_LINE_OPACITY,
        }
    }
}

/// The bus glyph drawn for each agent, tinted with its route color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerIcon {
    pub color: ColorToken,
}

impl MarkerIcon {
    pub const SIZE_PX: u32 = 40;

    pub fn to_svg(&self) -> String {
        let fill = self.color.hex();
        format!(
            concat!(
                r#"<svg width="{size}" height="{size}" viewBox="0 0 24 24" fill="none" xmlns="http://www.w3.org/2000/svg">"#,
                r#"<rect x="4" y="6" width="16" height="12" rx="2" fill="{fill}"/>"#,
                r#"<rect x="4" y="6" width="16" height="12" rx="2" stroke="white" stroke-width="1"/>"#,
                r#"<rect x="6" y="8" width="5" height="4" rx="0.5" fill="white" opacity="0.9"/>"#,
                r#"<rect x="13" y="8" width="5" height="4" rx="0.5" fill="white" opacity="0.9"/>"#,
                r##"<circle cx="8" cy="18" r="2" fill="#111827"/>"##,
                r##"<circle cx="16" cy="18" r="2" fill="#111827"/>"##,
                r##"<circle cx="6" cy="15" r="0.8" fill="#fef3c7"/>"##,
                r##"<circle cx="18" cy="15" r="0.8" fill="#fef3c7"/>"##,
                "</svg>"
            ),
            size = Self::SIZE_PX,
            fill = fill,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerTooltip {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerUpdate {
    pub route_id: RouteId,
    pub position: GeoPoint,
    pub rotation: f64,
    pub icon: MarkerIcon,
    pub tooltip: MarkerTooltip,
}

/// Where drawing requests go. Implementations must not block for long;
/// marker updates arrive once per frame per agent.
pub trait RenderSink: Send + Sync {
    fn draw_route(&self, request: RouteDrawRequest);
    fn clear_route(&self, route_id: RouteId);
    fn update_marker(&self, update: MarkerUpdate);
    fn remove_marker(&self, route_id: RouteId);
}
