use async_trait::async_trait;
use loopgen::config::{Config, ProviderKind, RouteGeneratorConfig, TelemetryConfig};
use loopgen::constants::*;
use loopgen::models::Coordinates;
use loopgen::services::route_generator::path_length_m;
use loopgen::services::route_provider::{CandidateQuery, RouteProvider};
use loopgen::{AppError, AppState, Result};
use std::f64::consts::PI;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Meters per degree of latitude (approximate, only used to place points)
const METERS_PER_DEGREE: f64 = 111_195.0;
const LOOP_POINTS: usize = 64;

/// Circular loop through `start`, rotated around it by `rotation` radians,
/// scaled so that `path_length_m` measures `length_m`
#[allow(dead_code)]
pub fn circle_loop(start: &Coordinates, length_m: f64, rotation: f64) -> Vec<Coordinates> {
    let nominal_radius = length_m / (2.0 * PI);
    let draft = circle_points(start, nominal_radius, rotation);
    let radius = nominal_radius * length_m / path_length_m(&draft);
    circle_points(start, radius, rotation)
}

fn circle_points(start: &Coordinates, radius_m: f64, rotation: f64) -> Vec<Coordinates> {
    let meters_per_degree_lng = METERS_PER_DEGREE * start.lat.to_radians().cos();
    // Centre sits `radius_m` away from the start in the `rotation` direction
    let center_lat = start.lat + radius_m * rotation.sin() / METERS_PER_DEGREE;
    let center_lng = start.lng + radius_m * rotation.cos() / meters_per_degree_lng;
    let start_angle = rotation + PI;

    let mut points: Vec<Coordinates> = (0..=LOOP_POINTS)
        .map(|k| {
            let angle = start_angle + 2.0 * PI * k as f64 / LOOP_POINTS as f64;
            Coordinates::new(
                center_lat + radius_m * angle.sin() / METERS_PER_DEGREE,
                center_lng + radius_m * angle.cos() / meters_per_degree_lng,
            )
            .unwrap()
        })
        .collect();
    points[0] = *start;
    points[LOOP_POINTS] = *start;
    points
}

/// Returns a distinct loop of a fixed length for every seed
#[allow(dead_code)]
pub struct RotatingLoopProvider {
    pub length_m: f64,
    pub calls: AtomicUsize,
}

#[allow(dead_code)]
impl RotatingLoopProvider {
    pub fn new(length_m: f64) -> Self {
        Self {
            length_m,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RouteProvider for RotatingLoopProvider {
    async fn candidate_route(&self, query: &CandidateQuery<'_>) -> Result<Vec<Coordinates>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let rotation = query.seed as f64 * 2.0 * PI / (MAX_ROUTE_SEED as f64 + 1.0);
        Ok(circle_loop(query.start, self.length_m, rotation))
    }

    fn name(&self) -> &'static str {
        "rotating-loop"
    }
}

/// Returns the same loop whatever the seed
#[allow(dead_code)]
pub struct FixedLoopProvider {
    pub length_m: f64,
}

#[async_trait]
impl RouteProvider for FixedLoopProvider {
    async fn candidate_route(&self, query: &CandidateQuery<'_>) -> Result<Vec<Coordinates>> {
        Ok(circle_loop(query.start, self.length_m, 0.0))
    }

    fn name(&self) -> &'static str {
        "fixed-loop"
    }
}

/// Fails the first `fail_first` calls, then delegates
#[allow(dead_code)]
pub struct FlakyProvider {
    pub inner: Arc<dyn RouteProvider>,
    pub fail_first: usize,
    pub calls: AtomicUsize,
}

#[allow(dead_code)]
impl FlakyProvider {
    pub fn new(inner: Arc<dyn RouteProvider>, fail_first: usize) -> Self {
        Self {
            inner,
            fail_first,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RouteProvider for FlakyProvider {
    async fn candidate_route(&self, query: &CandidateQuery<'_>) -> Result<Vec<Coordinates>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.fail_first {
            return Err(AppError::RoutingApi("HTTP 503: unavailable".to_string()));
        }
        self.inner.candidate_route(query).await
    }

    fn name(&self) -> &'static str {
        "flaky"
    }
}

/// Paris, Hôtel de Ville
#[allow(dead_code)]
pub fn paris() -> Coordinates {
    Coordinates::new(48.8566, 2.3522).unwrap()
}

/// Get test configuration
#[allow(dead_code)]
pub fn get_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        provider: ProviderKind::OpenRouteService,
        ors_api_key: Some(std::env::var("ORS_API_KEY").unwrap_or_else(|_| "test_key".to_string())),
        ors_base_url: None,
        overpass_url: None,
        graph_radius_m: DEFAULT_GRAPH_RADIUS_M,
        graph_cache_ttl: DEFAULT_GRAPH_CACHE_TTL_SECONDS,
        graph_cache_max_entries: DEFAULT_GRAPH_CACHE_MAX_ENTRIES,
        route_generator: RouteGeneratorConfig::default(),
        telemetry: TelemetryConfig::default(),
    }
}

/// App state around a mock provider
#[allow(dead_code)]
pub fn test_state(provider: Arc<dyn RouteProvider>) -> Arc<AppState> {
    Arc::new(AppState::new(provider, &get_test_config(), None).unwrap())
}

/// Real API tests run only with a key and without SKIP_REAL_API_TESTS
#[allow(dead_code)]
pub fn should_skip_real_api_tests() -> bool {
    std::env::var("SKIP_REAL_API_TESTS").is_ok() || std::env::var("ORS_API_KEY").is_err()
}
