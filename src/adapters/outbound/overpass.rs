use crate::common::{DomainError, DomainResult, GeoPoint, NamedPoint, ViewportBounds};
use crate::config::ProviderConfig;
use crate::domains::routing::PlaceLookup;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

pub const UNKNOWN_PLACE: &str = "Unknown Place";

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

/// Overpass QL for populated places inside the viewport (south, west, north, east).
pub fn places_query(bounds: &ViewportBounds) -> String {
    format!(
        "[out:json][timeout:25];(node[\"place\"~\"city|town|village|suburb\"]({},{},{},{}););out body;",
        bounds.min_lat, bounds.min_lng, bounds.max_lat, bounds.max_lng
    )
}

/// Elements without coordinates are skipped; unnamed ones get a stock label.
pub fn parse_places(body: &str) -> DomainResult<Vec<NamedPoint>> {
    let response: OverpassResponse = serde_json::from_str(body)?;
    Ok(response
        .elements
        .into_iter()
        .filter_map(|el| {
            let (lat, lon) = (el.lat?, el.lon?);
            let name = el.tags.get("name").cloned().unwrap_or_else(|| UNKNOWN_PLACE.to_string());
            Some(NamedPoint::new(GeoPoint::new(lon, lat), name))
        })
        .collect())
}

pub struct OverpassPlaceLookup {
    client: reqwest::Client,
    endpoint: String,
}

impl OverpassPlaceLookup {
    pub fn new(config: &ProviderConfig) -> DomainResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| DomainError::InfrastructureError(format!("http client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: config.overpass_url.clone(),
        })
    }
}

#[async_trait]
impl PlaceLookup for OverpassPlaceLookup {
    async fn places_in_bounds(&self, bounds: &ViewportBounds) -> DomainResult<Vec<NamedPoint>> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("data", places_query(bounds))])
            .send()
            .await
            .map_err(|e| DomainError::Lookup(format!("overpass request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::Lookup(format!("overpass returned {}", status)));
        }
        let body = response
            .text()
            .await
            .map_err(|e| DomainError::Lookup(format!("overpass body: {}", e)))?;

        let places = parse_places(&body)?;
        tracing::debug!(count = places.len(), "overpass places loaded");
        Ok(places)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_uses_south_west_north_east() {
        let q = places_query(&ViewportBounds::new(-74.1, -73.9, 40.6, 40.8, 11.0));
        assert!(q.contains("(40.6,-74.1,40.8,-73.9)"));
        assert!(q.contains("city|town|village|suburb"));
    }

    #[test]
    fn parses_named_and_unnamed_nodes() {
        let body = r#"{
            "version": 0.6,
            "elements": [
                {"type": "node", "id": 1, "lat": 40.71, "lon": -74.0, "tags": {"name": "Tribeca", "place": "suburb"}},
                {"type": "node", "id": 2, "lat": 40.65, "lon": -73.95, "tags": {"place": "suburb"}},
                {"type": "way", "id": 3}
            ]
        }"#;
        let places = parse_places(body).unwrap();
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].name, "Tribeca");
        assert_eq!(places[0].point, GeoPoint::new(-74.0, 40.71));
        assert_eq!(places[1].name, UNKNOWN_PLACE);
    }

    #[test]
    fn missing_elements_is_empty() {
        assert!(parse_places("{}").unwrap().is_empty());
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_places("<html>rate limited</html>").is_err());
    }
}
