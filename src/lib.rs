// Library exports for testing and reusability

pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use error::{AppError, Result};

use cache::GraphCache;
use config::{Config, ProviderKind};
use services::activity_export::ActivityExporter;
use services::local_graph::LocalGraphProvider;
use services::openrouteservice::OpenRouteServiceClient;
use services::overpass::OverpassClient;
use services::route_generator::RouteGenerator;
use services::route_provider::RouteProvider;
use services::telemetry::TelemetryGenerator;
use std::sync::Arc;

// App state for sharing across the application
pub struct AppState {
    pub route_generator: RouteGenerator,
    pub exporter: ActivityExporter,
    /// Present when routes come from the local street graph
    pub graph_cache: Option<Arc<GraphCache>>,
}

impl AppState {
    /// Wire the configured route provider, generator and exporter
    pub fn from_config(config: &Config) -> Result<Self> {
        let (provider, graph_cache): (Arc<dyn RouteProvider>, Option<Arc<GraphCache>>) =
            match config.provider {
                ProviderKind::OpenRouteService => {
                    let api_key = config.ors_api_key.clone().ok_or_else(|| {
                        AppError::Internal("ORS_API_KEY is not configured".to_string())
                    })?;
                    let client = match &config.ors_base_url {
                        Some(base_url) => {
                            OpenRouteServiceClient::with_base_url(api_key, base_url.clone())
                        }
                        None => OpenRouteServiceClient::new(api_key),
                    };
                    (Arc::new(client), None)
                }
                ProviderKind::LocalGraph => {
                    let overpass = match &config.overpass_url {
                        Some(url) => OverpassClient::with_endpoints(vec![url.clone()]),
                        None => OverpassClient::new(),
                    };
                    let cache = Arc::new(GraphCache::new(
                        config.graph_cache_ttl,
                        config.graph_cache_max_entries,
                    ));
                    let provider =
                        LocalGraphProvider::new(overpass, cache.clone(), config.graph_radius_m);
                    (Arc::new(provider), Some(cache))
                }
            };

        tracing::info!(provider = provider.name(), "Route provider initialized");

        Self::new(provider, config, graph_cache)
    }

    /// Build around an explicit provider (used by tests and embedders)
    pub fn new(
        provider: Arc<dyn RouteProvider>,
        config: &Config,
        graph_cache: Option<Arc<GraphCache>>,
    ) -> Result<Self> {
        Ok(AppState {
            route_generator: RouteGenerator::new(provider, config.route_generator.clone()),
            exporter: ActivityExporter::new(TelemetryGenerator::new(config.telemetry.clone())?),
            graph_cache,
        })
    }
}
