use crate::common::{DomainError, DomainResult, GeoPoint, NamedPoint};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Fixed, ordered bus palette. Routes pick `index mod len`.
pub const BUS_PALETTE: [&str; 10] = [
    "#f97316", // orange
    "#3b82f6", // blue
    "#10b981", // green
    "#8b5cf6", // purple
    "#ef4444", // red
    "#06b6d4", // cyan
    "#f59e0b", // amber
    "#ec4899", // pink
    "#14b8a6", // teal
    "#6366f1", // indigo
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteId(pub Uuid);

impl RouteId {
    pub fn new() -> Self {
        RouteId(Uuid::new_v4())
    }
}

impl Default for RouteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bus-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorToken(usize);

impl ColorToken {
    pub fn for_index(index: usize) -> Self {
        ColorToken(index % BUS_PALETTE.len())
    }

    pub fn palette_index(&self) -> usize {
        self.0
    }

    pub fn hex(&self) -> &'static str {
        BUS_PALETTE[self.0]
    }
}

/// An immutable routed path between two named endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteId,
    pub polyline: Vec<GeoPoint>,
    pub start: NamedPoint,
    pub end: NamedPoint,
    pub color: ColorToken,
}

impl Route {
    pub fn new(
        polyline: Vec<GeoPoint>,
        start: NamedPoint,
        end: NamedPoint,
        color: ColorToken,
    ) -> DomainResult<Self> {
        if polyline.len() < 2 {
            return Err(DomainError::InvalidRoute {
                reason: format!("polyline needs at least 2 points, got {}", polyline.len()),
            });
        }
        if let Some(bad) = polyline.iter().find(|p| !p.is_finite()) {
            return Err(DomainError::InvalidRoute {
                reason: format!("non-finite coordinate ({}, {})", bad.lng, bad.lat),
            });
        }
        Ok(Self {
            id: RouteId::new(),
            polyline,
            start,
            end,
            color,
        })
    }

    pub fn tooltip(&self) -> String {
        format!("{} → {}", self.start.name, self.end.name)
    }
}

/// The active set of routes. Never mutated after construction; the
/// orchestrator swaps in a whole new set per generation cycle.
#[derive(Debug, Clone, Default)]
pub struct RouteSet {
    routes: Vec<Arc<Route>>,
    by_id: HashMap<RouteId, usize>,
}

impl RouteSet {
    pub fn new(routes: Vec<Route>) -> Self {
        let routes: Vec<Arc<Route>> = routes.into_iter().map(Arc::new).collect();
        let by_id = routes.iter().enumerate().map(|(i, r)| (r.id, i)).collect();
        Self { routes, by_id }
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn get(&self, id: &RouteId) -> Option<&Arc<Route>> {
        self.by_id.get(id).map(|&i| &self.routes[i])
    }

    pub fn contains(&self, id: &RouteId) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Route>> {
        self.routes.iter()
    }
}
