use crate::constants::ORS_DEFAULT_BASE_URL;
use crate::error::{AppError, Result};
use crate::models::Coordinates;
use crate::services::route_provider::{CandidateQuery, RouteProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Round-trip directions from the OpenRouteService API
#[derive(Clone)]
pub struct OpenRouteServiceClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenRouteServiceClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, ORS_DEFAULT_BASE_URL.to_string())
    }

    /// Point the client at a proxy or a local test server
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        OpenRouteServiceClient {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Request one round trip starting and ending at `start`.
    /// `length_m` is a hint; the service may return a shorter or longer loop.
    pub async fn round_trip(
        &self,
        start: &Coordinates,
        length_m: f64,
        seed: u64,
        profile: &str,
    ) -> Result<Vec<Coordinates>> {
        let url = format!("{}/v2/directions/{}/geojson", self.base_url, profile);
        let body = RoundTripRequest {
            coordinates: [[start.lng, start.lat]],
            profile,
            format: "geojson",
            options: RoundTripOptions {
                round_trip: RoundTripParams {
                    length: length_m,
                    seed,
                },
            },
        };

        tracing::debug!(
            profile = profile,
            length_m = %format!("{:.0}", length_m),
            seed = seed,
            "OpenRouteService round trip request"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::RoutingApi(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(
                status = %status,
                seed = seed,
                "OpenRouteService HTTP error {}: {}",
                status, error_text
            );
            return Err(AppError::RoutingApi(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let collection: FeatureCollection = response
            .json()
            .await
            .map_err(|e| AppError::RoutingApi(format!("Failed to parse response: {}", e)))?;

        let feature = collection
            .features
            .into_iter()
            .next()
            .ok_or_else(|| AppError::RoutingApi("No route found".to_string()))?;

        let path = feature
            .geometry
            .coordinates
            .iter()
            .map(|position| Coordinates::from_lng_lat(position))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| AppError::RoutingApi(format!("Invalid geometry: {}", e)))?;

        if path.len() < 2 {
            return Err(AppError::RoutingApi(format!(
                "Route geometry has {} point(s)",
                path.len()
            )));
        }

        tracing::debug!(points = path.len(), seed = seed, "OpenRouteService response");
        Ok(path)
    }
}

#[async_trait]
impl RouteProvider for OpenRouteServiceClient {
    async fn candidate_route(&self, query: &CandidateQuery<'_>) -> Result<Vec<Coordinates>> {
        self.round_trip(
            query.start,
            query.target_distance_m,
            query.seed,
            query.activity.ors_profile(),
        )
        .await
    }

    fn name(&self) -> &'static str {
        "openrouteservice"
    }
}

// OpenRouteService request/response types

#[derive(Debug, Serialize)]
struct RoundTripRequest<'a> {
    coordinates: [[f64; 2]; 1], // [lng, lat]
    profile: &'a str,
    format: &'a str,
    options: RoundTripOptions,
}

#[derive(Debug, Serialize)]
struct RoundTripOptions {
    round_trip: RoundTripParams,
}

#[derive(Debug, Serialize)]
struct RoundTripParams {
    length: f64, // meters
    seed: u64,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    coordinates: Vec<Vec<f64>>, // [lng, lat] or [lng, lat, ele]
}
