//! Stable application-wide constants.
//!
//! Values here are structural invariants, formula coefficients, and default
//! fallbacks for env-var-based configuration. They should rarely change.
//! Tuning knobs that benefit from runtime experimentation live in
//! [`RouteGeneratorConfig`](crate::config::RouteGeneratorConfig) and
//! [`TelemetryConfig`](crate::config::TelemetryConfig) instead.

// --- Server defaults (used when HOST / PORT env vars are absent) ---

/// Default bind address for the HTTP server.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default port for the HTTP server.
pub const DEFAULT_PORT: &str = "3000";

// --- Candidate acceptance loop ---

/// Default relative tolerance around the target distance (±20%).
pub const DEFAULT_DISTANCE_TOLERANCE_PCT: f64 = 0.2;
/// Default provider calls allowed per requested route (remote round trips).
pub const DEFAULT_ATTEMPTS_PER_CANDIDATE: usize = 10;
/// Random-via loops on a local graph rarely land in band, so they get more tries.
pub const LOCAL_GRAPH_ATTEMPTS_PER_CANDIDATE: usize = 100;
/// Number of routes requested when the caller does not say.
pub const DEFAULT_CANDIDATE_COUNT: usize = 3;
/// Hard upper bound on routes returned by one generation.
pub const MAX_CANDIDATE_COUNT: usize = 5;
/// Attempt seeds are drawn uniformly from `0..=MAX_ROUTE_SEED`.
pub const MAX_ROUTE_SEED: u64 = 10_000;

/// Accepted target distance range for a generation request (km).
pub const MIN_TARGET_DISTANCE_KM: f64 = 1.0;
pub const MAX_TARGET_DISTANCE_KM: f64 = 100.0;

/// Shown to the caller when a generation accepts no route.
pub const NO_ROUTE_FOUND_MESSAGE: &str =
    "No route found. Try another start point, a different distance or a wider tolerance.";

// --- Remote round-trip provider ---

/// OpenRouteService public API root.
pub const ORS_DEFAULT_BASE_URL: &str = "https://api.openrouteservice.org";

// --- Local street graph ---

/// Default Overpass search radius around the start point (meters).
pub const DEFAULT_GRAPH_RADIUS_M: f64 = 1_500.0;
/// Search radius never drops below this fraction of the target distance.
pub const GRAPH_RADIUS_TARGET_FACTOR: f64 = 0.3;
/// Accepted range for `GRAPH_RADIUS_M`.
pub const MIN_GRAPH_RADIUS_M: f64 = 100.0;
pub const MAX_GRAPH_RADIUS_M: f64 = 20_000.0;
/// Default lifetime of a downloaded street graph: 1 hour.
pub const DEFAULT_GRAPH_CACHE_TTL_SECONDS: u64 = 3_600;
/// Maximum street graphs held in memory.
pub const DEFAULT_GRAPH_CACHE_MAX_ENTRIES: u64 = 32;

// --- Overpass retry policy ---

pub const OVERPASS_QUERY_TIMEOUT_SECONDS: u64 = 30;
/// Retries after the first attempt (3 attempts total).
pub const OVERPASS_RETRY_MAX_ATTEMPTS: usize = 2;
pub const OVERPASS_HTTP_TOO_MANY_REQUESTS: u16 = 429;
pub const OVERPASS_HTTP_GATEWAY_TIMEOUT: u16 = 504;

// --- Synthetic telemetry ---
// sample i gets wave = sin(i / TELEMETRY_WAVE_DIVISOR); speed, heart rate and
// altitude are all offset by a multiple of the same wave.

pub const TELEMETRY_WAVE_DIVISOR: f64 = 10.0;
/// Relative speed swing applied by the wave (±10%).
pub const TELEMETRY_SPEED_WAVE_AMPLITUDE: f64 = 0.1;
/// Heart-rate swing applied by the wave (bpm).
pub const TELEMETRY_HR_WAVE_AMPLITUDE_BPM: f64 = 3.0;
/// Altitude swing applied by the wave (meters).
pub const TELEMETRY_ALTITUDE_WAVE_AMPLITUDE_M: f64 = 1.0;
/// Speed factor floor so a noisy draw never stalls or reverses the athlete.
pub const TELEMETRY_MIN_SPEED_FACTOR: f64 = 0.5;

pub const DEFAULT_SAMPLE_INTERVAL_SECONDS: u64 = 2;
pub const DEFAULT_MIN_STEP_SECONDS: u64 = 3;
pub const DEFAULT_BASE_ALTITUDE_M: f64 = 200.0;
pub const DEFAULT_SPEED_NOISE_STD: f64 = 0.05;
pub const DEFAULT_HR_NOISE_STD_BPM: f64 = 5.0;

// --- Activity request limits ---

pub const MIN_AVG_SPEED_KMH: f64 = 4.0;
pub const MAX_AVG_SPEED_KMH: f64 = 40.0;
pub const MIN_AVG_HEART_RATE_BPM: f64 = 90.0;
pub const MAX_AVG_HEART_RATE_BPM: f64 = 190.0;

// --- TCX lap metadata ---

/// Calories are drawn uniformly from this half-open range.
pub const CALORIES_MIN: u32 = 300;
pub const CALORIES_MAX: u32 = 800;

pub const TCX_NAMESPACE: &str = "http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2";
pub const TCX_ACTIVITY_EXTENSION_NAMESPACE: &str =
    "http://www.garmin.com/xmlschemas/ActivityExtension/v2";
pub const GPX_CREATOR: &str = "loopgen";
