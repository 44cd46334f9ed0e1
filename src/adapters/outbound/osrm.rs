use crate::common::{DomainError, DomainResult, GeoPoint};
use crate::config::ProviderConfig;
use crate::domains::routing::RouteLookup;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: geojson::Geometry,
}

pub fn route_url(base: &str, start: GeoPoint, end: GeoPoint) -> String {
    format!(
        "{}/route/v1/driving/{},{};{},{}?overview=full&geometries=geojson",
        base.trim_end_matches('/'),
        start.lng,
        start.lat,
        end.lng,
        end.lat
    )
}

/// Takes the first (fastest) route. An empty route list or a non-"Ok" code
/// means no route; geometry that is not a usable LineString is an error.
pub fn parse_route(body: &str) -> DomainResult<Option<Vec<GeoPoint>>> {
    let response: OsrmResponse = serde_json::from_str(body)?;
    if matches!(response.code.as_deref(), Some(code) if code != "Ok") {
        return Ok(None);
    }
    let Some(first) = response.routes.into_iter().next() else {
        return Ok(None);
    };

    let coords = match first.geometry.value {
        geojson::Value::LineString(coords) => coords,
        _ => {
            return Err(DomainError::MalformedGeometry {
                reason: "route geometry is not a LineString".to_string(),
            })
        }
    };
    let polyline = coords
        .into_iter()
        .map(|c| match c.as_slice() {
            [lng, lat, ..] => Ok(GeoPoint::new(*lng, *lat)),
            _ => Err(DomainError::MalformedGeometry {
                reason: format!("position with {} ordinates", c.len()),
            }),
        })
        .collect::<DomainResult<Vec<_>>>()?;

    if polyline.is_empty() {
        return Ok(None);
    }
    Ok(Some(polyline))
}

pub struct OsrmRouteLookup {
    client: reqwest::Client,
    base_url: String,
}

impl OsrmRouteLookup {
    pub fn new(config: &ProviderConfig) -> DomainResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| DomainError::InfrastructureError(format!("http client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.osrm_url.clone(),
        })
    }
}

#[async_trait]
impl RouteLookup for OsrmRouteLookup {
    async fn route_between(
        &self,
        start: GeoPoint,
        end: GeoPoint,
    ) -> DomainResult<Option<Vec<GeoPoint>>> {
        let response = self
            .client
            .get(route_url(&self.base_url, start, end))
            .send()
            .await
            .map_err(|e| DomainError::Lookup(format!("osrm request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "osrm returned an error status");
            return Ok(None);
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("application/json"))
            .unwrap_or(false);
        let body = response
            .text()
            .await
            .map_err(|e| DomainError::Lookup(format!("osrm body: {}", e)))?;
        if !is_json {
            let preview: String = body.chars().take(200).collect();
            tracing::warn!(%preview, "osrm returned a non-JSON response");
            return Ok(None);
        }

        parse_route(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_is_lng_lat_ordered() {
        let url = route_url("https://router.example/", GeoPoint::new(-74.0, 40.7), GeoPoint::new(-73.95, 40.65));
        assert_eq!(
            url,
            "https://router.example/route/v1/driving/-74,40.7;-73.95,40.65?overview=full&geometries=geojson"
        );
    }

    #[test]
    fn takes_first_route_geometry() {
        let body = r#"{
            "code": "Ok",
            "routes": [
                {"geometry": {"type": "LineString", "coordinates": [[-74.0, 40.7], [-73.99, 40.71], [-73.98, 40.7]]}, "distance": 1200.0},
                {"geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]}}
            ]
        }"#;
        let polyline = parse_route(body).unwrap().unwrap();
        assert_eq!(polyline.len(), 3);
        assert_eq!(polyline[1], GeoPoint::new(-73.99, 40.71));
    }

    #[test]
    fn no_routes_is_none() {
        assert_eq!(parse_route(r#"{"code": "Ok", "routes": []}"#).unwrap(), None);
        assert_eq!(parse_route(r#"{"code": "NoRoute", "message": "Impossible route"}"#).unwrap(), None);
    }

    #[test]
    fn point_geometry_is_malformed() {
        let body = r#"{"code": "Ok", "routes": [{"geometry": {"type": "Point", "coordinates": [1.0, 2.0]}}]}"#;
        assert!(matches!(parse_route(body), Err(DomainError::MalformedGeometry { .. })));
    }
}
