use crate::constants::*;
use crate::error::{AppError, Result};
use crate::models::Coordinates;
use crate::services::street_graph::StreetGraph;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Primary Overpass API endpoints with automatic fallback
const OVERPASS_ENDPOINTS: &[&str] = &[
    "https://overpass-api.de/api/interpreter", // Official main endpoint
    "https://overpass.private.coffee/api/interpreter", // Community mirror
    "https://maps.mail.ru/osm/tools/overpass/api/interpreter", // Mail.ru mirror
];

/// Highway values that are never walkable
const EXCLUDED_HIGHWAYS: &str =
    "motorway|motorway_link|trunk|trunk_link|construction|proposed|abandoned|platform|raceway|bus_guideway|escape";

#[derive(Clone)]
pub struct OverpassClient {
    client: Client,
    endpoints: Vec<String>,
    current_endpoint_idx: Arc<AtomicUsize>,
}

impl Default for OverpassClient {
    fn default() -> Self {
        Self::new()
    }
}

impl OverpassClient {
    pub fn new() -> Self {
        Self::with_endpoints(OVERPASS_ENDPOINTS.iter().map(|s| s.to_string()).collect())
    }

    /// Use a fixed endpoint list (a local mirror, or a test server)
    pub fn with_endpoints(endpoints: Vec<String>) -> Self {
        OverpassClient {
            client: Client::new(),
            endpoints,
            current_endpoint_idx: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the next endpoint to try (round-robin)
    fn get_next_endpoint(&self) -> String {
        let idx = self.current_endpoint_idx.fetch_add(1, Ordering::Relaxed);
        self.endpoints[idx % self.endpoints.len()].clone()
    }

    /// Download the walkable street network within `radius_m` of `center`
    pub async fn fetch_walk_network(
        &self,
        center: &Coordinates,
        radius_m: f64,
    ) -> Result<StreetGraph> {
        let query = build_walk_query(center, radius_m);
        tracing::debug!("Overpass walk network query: {}", query);

        let response = self
            .execute_query_with_retry(query, OVERPASS_RETRY_MAX_ATTEMPTS)
            .await?;
        let graph = response.into_street_graph();

        tracing::info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            radius_m = %format!("{:.0}", radius_m),
            "Fetched walk network: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        if graph.is_empty() {
            return Err(AppError::GraphSearch(format!(
                "No walkable streets within {:.0}m",
                radius_m
            )));
        }
        Ok(graph)
    }

    /// Execute query with exponential backoff on timeouts, 429 and 504.
    /// `max_retries` = 2 means 3 total attempts.
    async fn execute_query_with_retry(
        &self,
        query: String,
        max_retries: usize,
    ) -> Result<OverpassResponse> {
        if self.endpoints.is_empty() {
            return Err(AppError::OverpassApi(
                "No Overpass endpoint configured".to_string(),
            ));
        }
        let mut retry_count = 0;

        loop {
            let endpoint = self.get_next_endpoint();

            let response_result = self
                .client
                .post(&endpoint)
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(format!("data={}", urlencoding::encode(&query)))
                .timeout(Duration::from_secs(OVERPASS_QUERY_TIMEOUT_SECONDS))
                .send()
                .await;

            let response = match response_result {
                Ok(resp) => resp,
                Err(e) => {
                    let error_msg = if e.is_timeout() {
                        "Request timed out".to_string()
                    } else {
                        format!("Request failed: {}", e)
                    };

                    if retry_count < max_retries {
                        retry_count += 1;
                        let backoff_ms = 1000 * (2_u64.pow(retry_count as u32));

                        tracing::warn!(
                            "Overpass query {} ({}), retrying in {}ms (attempt {}/{})",
                            error_msg,
                            endpoint,
                            backoff_ms,
                            retry_count + 1,
                            max_retries + 1
                        );

                        tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                        continue;
                    }
                    return Err(AppError::OverpassApi(format!(
                        "{} after {} attempts",
                        error_msg,
                        max_retries + 1
                    )));
                }
            };

            let status = response.status();

            if status.is_success() {
                return response.json().await.map_err(|e| {
                    AppError::OverpassApi(format!("Failed to parse response: {}", e))
                });
            }

            let is_retryable = status == OVERPASS_HTTP_TOO_MANY_REQUESTS
                || status == OVERPASS_HTTP_GATEWAY_TIMEOUT;

            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            if is_retryable && retry_count < max_retries {
                retry_count += 1;
                let backoff_ms = 1000 * (2_u64.pow(retry_count as u32));

                tracing::warn!(
                    "Overpass query returned HTTP {}, retrying in {}ms (attempt {}/{})",
                    status,
                    backoff_ms,
                    retry_count + 1,
                    max_retries + 1
                );

                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                continue;
            }

            return Err(AppError::OverpassApi(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }
    }
}

/// Overpass QL for walkable ways around a point, with their nodes
fn build_walk_query(center: &Coordinates, radius_m: f64) -> String {
    format!(
        "[out:json][timeout:{timeout}];\
         (way[\"highway\"][\"area\"!~\"yes\"][\"highway\"!~\"{excluded}\"]\
         [\"foot\"!~\"no\"][\"access\"!~\"private\"](around:{radius:.0},{lat},{lng}););\
         (._;>;);out body;",
        timeout = OVERPASS_QUERY_TIMEOUT_SECONDS,
        excluded = EXCLUDED_HIGHWAYS,
        radius = radius_m,
        lat = center.lat,
        lng = center.lng,
    )
}

// Overpass API response types

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum OverpassElement {
    Node {
        id: i64,
        lat: f64,
        lon: f64,
    },
    Way {
        #[allow(dead_code)]
        id: i64,
        #[serde(default)]
        nodes: Vec<i64>,
    },
    #[serde(other)]
    Other,
}

impl OverpassResponse {
    fn into_street_graph(self) -> StreetGraph {
        let mut nodes = HashMap::new();
        let mut ways = Vec::new();

        for element in self.elements {
            match element {
                OverpassElement::Node { id, lat, lon } => {
                    if let Ok(coords) = Coordinates::new(lat, lon) {
                        nodes.insert(id, coords);
                    }
                }
                OverpassElement::Way { nodes: refs, .. } => ways.push(refs),
                OverpassElement::Other => {}
            }
        }

        StreetGraph::from_ways(&nodes, &ways)
    }
}
