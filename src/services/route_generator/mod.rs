mod candidate_set;
pub mod geometry;
mod tolerance;

pub use candidate_set::CandidateSet;
pub use geometry::{path_length_m, segment_lengths_m};
pub use tolerance::ToleranceBand;

use crate::config::RouteGeneratorConfig;
use crate::constants::{MAX_ROUTE_SEED, NO_ROUTE_FOUND_MESSAGE};
use crate::models::{
    ActivityKind, CandidateRoute, Coordinates, DistanceKm, LoopRouteRequest, LoopRouteResponse,
};
use crate::services::route_provider::{CandidateQuery, RouteProvider};

use rand::Rng;
use std::sync::Arc;

/// Resolved parameters of one generation
#[derive(Debug, Clone)]
pub struct LoopSearch {
    pub start: Coordinates,
    pub target_distance_m: f64,
    pub tolerance_pct: f64,
    /// Routes wanted
    pub count: usize,
    /// Provider calls allowed, successful or not
    pub max_attempts: usize,
    pub activity: ActivityKind,
}

impl LoopSearch {
    /// Fill the optional request fields from configuration
    pub fn from_request(request: &LoopRouteRequest, config: &RouteGeneratorConfig) -> Self {
        let count = request.count.unwrap_or(config.default_candidate_count);
        Self {
            start: request.start_point,
            target_distance_m: DistanceKm(request.distance_km).to_meters().as_meters(),
            tolerance_pct: request
                .distance_tolerance_pct
                .unwrap_or(config.distance_tolerance_pct),
            count,
            max_attempts: request
                .max_attempts
                .unwrap_or(count * config.attempts_per_candidate)
                .min(config.max_attempts),
            activity: request.activity,
        }
    }
}

/// Outcome of a generation; fewer routes than requested is not an error
#[derive(Debug)]
pub struct LoopGeneration {
    pub routes: Vec<CandidateRoute>,
    pub attempts: usize,
    pub provider_failures: usize,
    pub message: Option<String>,
}

impl From<LoopGeneration> for LoopRouteResponse {
    fn from(generation: LoopGeneration) -> Self {
        LoopRouteResponse {
            routes: generation.routes,
            attempts: generation.attempts,
            provider_failures: generation.provider_failures,
            message: generation.message,
        }
    }
}

#[derive(Clone)]
pub struct RouteGenerator {
    provider: Arc<dyn RouteProvider>,
    config: RouteGeneratorConfig,
}

impl RouteGenerator {
    pub fn new(provider: Arc<dyn RouteProvider>, config: RouteGeneratorConfig) -> Self {
        RouteGenerator { provider, config }
    }

    pub fn config(&self) -> &RouteGeneratorConfig {
        &self.config
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Ask the provider for candidates until `search.count` distinct loops
    /// within tolerance are accepted or the attempt budget runs out.
    ///
    /// Each attempt draws a fresh seed from `rng`. Provider failures are
    /// logged and count against the budget.
    pub async fn generate_loop_routes<R>(&self, search: &LoopSearch, rng: &mut R) -> LoopGeneration
    where
        R: Rng + Send + ?Sized,
    {
        let band = ToleranceBand::new(search.target_distance_m, search.tolerance_pct);
        let mut accepted = CandidateSet::with_capacity(search.count);
        let mut attempts = 0;
        let mut provider_failures = 0;

        tracing::info!(
            provider = self.provider.name(),
            target_m = %format!("{:.0}", band.target_m),
            min_m = %format!("{:.0}", band.min_m()),
            max_m = %format!("{:.0}", band.max_m()),
            count = search.count,
            max_attempts = search.max_attempts,
            "Generating loop routes of {:.1}km (±{:.0}%)",
            band.target_m / 1000.0,
            band.tolerance_pct * 100.0
        );

        while attempts < search.max_attempts && !accepted.is_full() {
            attempts += 1;
            let seed = rng.random_range(0..=MAX_ROUTE_SEED);
            let query = CandidateQuery {
                start: &search.start,
                target_distance_m: search.target_distance_m,
                seed,
                activity: search.activity,
            };

            let path = match self.provider.candidate_route(&query).await {
                Ok(path) => path,
                Err(e) => {
                    provider_failures += 1;
                    tracing::warn!(
                        attempt = attempts,
                        seed = seed,
                        error = %e,
                        "Provider failed to return a candidate, skipping attempt"
                    );
                    continue;
                }
            };

            let length_m = path_length_m(&path);
            if !band.contains(length_m) {
                tracing::debug!(
                    attempt = attempts,
                    seed = seed,
                    length_m = %format!("{:.0}", length_m),
                    error_pct = %format!("{:+.1}", band.error_pct(length_m) * 100.0),
                    "Candidate outside tolerance"
                );
                continue;
            }
            if accepted.contains_path(&path) {
                tracing::debug!(attempt = attempts, seed = seed, "Duplicate candidate rejected");
                continue;
            }

            tracing::info!(
                attempt = attempts,
                seed = seed,
                length_m = %format!("{:.0}", length_m),
                closure_m = %format!("{:.0}", geometry::loop_closure_m(&path)),
                points = path.len(),
                "Accepted route {}/{}",
                accepted.len() + 1,
                search.count
            );
            accepted.insert(CandidateRoute::new(path, length_m, seed));
        }

        let routes = accepted.into_routes();
        let message = if routes.is_empty() {
            tracing::warn!(
                attempts = attempts,
                provider_failures = provider_failures,
                "No route accepted"
            );
            Some(NO_ROUTE_FOUND_MESSAGE.to_string())
        } else {
            None
        };

        LoopGeneration {
            routes,
            attempts,
            provider_failures,
            message,
        }
    }
}
