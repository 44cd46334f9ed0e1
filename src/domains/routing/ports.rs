use crate::common::{DomainResult, GeoPoint, NamedPoint, ViewportBounds};
use async_trait::async_trait;

/// Port for looking up named places inside a viewport.
#[async_trait]
pub trait PlaceLookup: Send + Sync {
    async fn places_in_bounds(&self, bounds: &ViewportBounds) -> DomainResult<Vec<NamedPoint>>;
}

/// Port for the road-network directions provider. `Ok(None)` means the
/// provider answered but has no usable route.
#[async_trait]
pub trait RouteLookup: Send + Sync {
    async fn route_between(
        &self,
        start: GeoPoint,
        end: GeoPoint,
    ) -> DomainResult<Option<Vec<GeoPoint>>>;
}
