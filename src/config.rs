use crate::constants::*;
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    OpenRouteService, // Remote round-trip directions
    LocalGraph,       // Overpass street graph + shortest path
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openrouteservice" | "ors" | "remote" => Ok(ProviderKind::OpenRouteService),
            "local" | "graph" | "osm" => Ok(ProviderKind::LocalGraph),
            _ => Err(format!(
                "Invalid route provider: {}. Use 'openrouteservice' or 'local'",
                s
            )),
        }
    }
}

impl ProviderKind {
    /// Provider calls allowed per requested route when not configured
    pub fn default_attempts_per_candidate(&self) -> usize {
        match self {
            ProviderKind::OpenRouteService => DEFAULT_ATTEMPTS_PER_CANDIDATE,
            ProviderKind::LocalGraph => LOCAL_GRAPH_ATTEMPTS_PER_CANDIDATE,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::OpenRouteService => write!(f, "openrouteservice"),
            ProviderKind::LocalGraph => write!(f, "local"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub provider: ProviderKind,
    pub ors_api_key: Option<String>,
    pub ors_base_url: Option<String>,
    pub overpass_url: Option<String>,
    pub graph_radius_m: f64,
    pub graph_cache_ttl: u64,
    pub graph_cache_max_entries: u64,
    pub route_generator: RouteGeneratorConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone)]
pub struct RouteGeneratorConfig {
    /// Accepted relative deviation from the target distance
    /// e.g., 0.2 = ±20% of target distance
    pub distance_tolerance_pct: f64,

    /// Provider calls allowed per requested route; the attempt budget of a
    /// generation is `count * attempts_per_candidate`
    pub attempts_per_candidate: usize,

    /// Routes requested when the caller leaves the count out
    pub default_candidate_count: usize,

    /// Upper bound on routes per generation
    pub max_candidate_count: usize,

    /// Ceiling on the attempt budget of one generation, including a budget
    /// set by the caller
    pub max_attempts: usize,
}

impl Default for RouteGeneratorConfig {
    fn default() -> Self {
        Self::for_provider(ProviderKind::default())
    }
}

impl RouteGeneratorConfig {
    /// Defaults tuned to how often a provider's candidates land in band
    pub fn for_provider(provider: ProviderKind) -> Self {
        let attempts_per_candidate = provider.default_attempts_per_candidate();
        Self {
            distance_tolerance_pct: DEFAULT_DISTANCE_TOLERANCE_PCT,
            attempts_per_candidate,
            default_candidate_count: DEFAULT_CANDIDATE_COUNT,
            max_candidate_count: MAX_CANDIDATE_COUNT,
            max_attempts: MAX_CANDIDATE_COUNT * attempts_per_candidate,
        }
    }

    pub fn from_env(provider: ProviderKind) -> Result<Self, String> {
        let defaults = Self::for_provider(provider);

        let attempts_per_candidate: usize = env::var("ROUTE_ATTEMPTS_PER_CANDIDATE")
            .unwrap_or_else(|_| defaults.attempts_per_candidate.to_string())
            .parse()
            .map_err(|_| "Invalid ROUTE_ATTEMPTS_PER_CANDIDATE")?;

        let max_candidate_count: usize = env::var("ROUTE_MAX_CANDIDATE_COUNT")
            .unwrap_or_else(|_| defaults.max_candidate_count.to_string())
            .parse()
            .map_err(|_| "Invalid ROUTE_MAX_CANDIDATE_COUNT")?;

        let config = Self {
            distance_tolerance_pct: env::var("ROUTE_DISTANCE_TOLERANCE_PCT")
                .unwrap_or_else(|_| defaults.distance_tolerance_pct.to_string())
                .parse()
                .map_err(|_| "Invalid ROUTE_DISTANCE_TOLERANCE_PCT")?,

            attempts_per_candidate,

            default_candidate_count: env::var("ROUTE_DEFAULT_CANDIDATE_COUNT")
                .unwrap_or_else(|_| defaults.default_candidate_count.to_string())
                .parse()
                .map_err(|_| "Invalid ROUTE_DEFAULT_CANDIDATE_COUNT")?,

            max_candidate_count,

            // Defaults to the largest budget a request can need
            max_attempts: env::var("ROUTE_MAX_ATTEMPTS")
                .unwrap_or_else(|_| (max_candidate_count * attempts_per_candidate).to_string())
                .parse()
                .map_err(|_| "Invalid ROUTE_MAX_ATTEMPTS")?,
        };

        if !(config.distance_tolerance_pct > 0.0 && config.distance_tolerance_pct < 1.0) {
            return Err("ROUTE_DISTANCE_TOLERANCE_PCT must be between 0 and 1".to_string());
        }
        if config.attempts_per_candidate == 0 {
            return Err("ROUTE_ATTEMPTS_PER_CANDIDATE must be at least 1".to_string());
        }
        if config.max_attempts < config.default_candidate_count * config.attempts_per_candidate {
            return Err(
                "ROUTE_MAX_ATTEMPTS must cover the default candidate count times \
                 ROUTE_ATTEMPTS_PER_CANDIDATE"
                    .to_string(),
            );
        }
        if config.max_candidate_count == 0 {
            return Err("ROUTE_MAX_CANDIDATE_COUNT must be at least 1".to_string());
        }
        if config.default_candidate_count == 0
            || config.default_candidate_count > config.max_candidate_count
        {
            return Err(
                "ROUTE_DEFAULT_CANDIDATE_COUNT must be between 1 and ROUTE_MAX_CANDIDATE_COUNT"
                    .to_string(),
            );
        }

        Ok(config)
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Seconds between samples in fixed-interval mode (chart series)
    pub sample_interval_s: u64,

    /// Smallest elapsed-time step in distance-aware mode (TCX export)
    pub min_step_s: u64,

    /// Altitude the sinusoidal wave oscillates around
    pub base_altitude_m: f64,

    /// Standard deviation of the Gaussian speed factor noise
    pub speed_noise_std: f64,

    /// Standard deviation of the Gaussian heart-rate noise (bpm)
    pub hr_noise_std: f64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            sample_interval_s: DEFAULT_SAMPLE_INTERVAL_SECONDS,
            min_step_s: DEFAULT_MIN_STEP_SECONDS,
            base_altitude_m: DEFAULT_BASE_ALTITUDE_M,
            speed_noise_std: DEFAULT_SPEED_NOISE_STD,
            hr_noise_std: DEFAULT_HR_NOISE_STD_BPM,
        }
    }
}

impl TelemetryConfig {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let config = Self {
            sample_interval_s: env::var("TELEMETRY_SAMPLE_INTERVAL_S")
                .unwrap_or_else(|_| defaults.sample_interval_s.to_string())
                .parse()
                .map_err(|_| "Invalid TELEMETRY_SAMPLE_INTERVAL_S")?,

            min_step_s: env::var("TELEMETRY_MIN_STEP_S")
                .unwrap_or_else(|_| defaults.min_step_s.to_string())
                .parse()
                .map_err(|_| "Invalid TELEMETRY_MIN_STEP_S")?,

            base_altitude_m: env::var("TELEMETRY_BASE_ALTITUDE_M")
                .unwrap_or_else(|_| defaults.base_altitude_m.to_string())
                .parse()
                .map_err(|_| "Invalid TELEMETRY_BASE_ALTITUDE_M")?,

            speed_noise_std: env::var("TELEMETRY_SPEED_NOISE_STD")
                .unwrap_or_else(|_| defaults.speed_noise_std.to_string())
                .parse()
                .map_err(|_| "Invalid TELEMETRY_SPEED_NOISE_STD")?,

            hr_noise_std: env::var("TELEMETRY_HR_NOISE_STD")
                .unwrap_or_else(|_| defaults.hr_noise_std.to_string())
                .parse()
                .map_err(|_| "Invalid TELEMETRY_HR_NOISE_STD")?,
        };

        // Elapsed time must strictly increase
        if config.sample_interval_s == 0 || config.min_step_s == 0 {
            return Err(
                "TELEMETRY_SAMPLE_INTERVAL_S and TELEMETRY_MIN_STEP_S must be at least 1"
                    .to_string(),
            );
        }
        if config.speed_noise_std < 0.0 || config.hr_noise_std < 0.0 {
            return Err("Telemetry noise standard deviations cannot be negative".to_string());
        }

        Ok(config)
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenv::dotenv().ok();

        let provider: ProviderKind = env::var("ROUTE_PROVIDER")
            .unwrap_or_else(|_| ProviderKind::default().to_string())
            .parse()?;

        let ors_api_key = env::var("ORS_API_KEY").ok().filter(|k| !k.is_empty());
        if provider == ProviderKind::OpenRouteService && ors_api_key.is_none() {
            return Err("ORS_API_KEY must be set when ROUTE_PROVIDER=openrouteservice".to_string());
        }

        // Parse and validate graph_radius_m
        let graph_radius_m: f64 = env::var("GRAPH_RADIUS_M")
            .unwrap_or_else(|_| DEFAULT_GRAPH_RADIUS_M.to_string())
            .parse()
            .map_err(|_| "Invalid GRAPH_RADIUS_M")?;

        if !(MIN_GRAPH_RADIUS_M..=MAX_GRAPH_RADIUS_M).contains(&graph_radius_m) {
            return Err(format!(
                "GRAPH_RADIUS_M must be between {} and {} meters",
                MIN_GRAPH_RADIUS_M, MAX_GRAPH_RADIUS_M
            ));
        }

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| "Invalid PORT")?,
            provider,
            ors_api_key,
            ors_base_url: env::var("ORS_BASE_URL").ok(),
            overpass_url: env::var("OVERPASS_URL").ok(),
            graph_radius_m,
            graph_cache_ttl: env::var("GRAPH_CACHE_TTL")
                .unwrap_or_else(|_| DEFAULT_GRAPH_CACHE_TTL_SECONDS.to_string())
                .parse()
                .map_err(|_| "Invalid GRAPH_CACHE_TTL")?,
            graph_cache_max_entries: env::var("GRAPH_CACHE_MAX_ENTRIES")
                .unwrap_or_else(|_| DEFAULT_GRAPH_CACHE_MAX_ENTRIES.to_string())
                .parse()
                .map_err(|_| "Invalid GRAPH_CACHE_MAX_ENTRIES")?,
            route_generator: RouteGeneratorConfig::from_env(provider)?,
            telemetry: TelemetryConfig::from_env()?,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "ROUTE_PROVIDER",
            "ORS_API_KEY",
            "GRAPH_RADIUS_M",
            "ROUTE_DISTANCE_TOLERANCE_PCT",
            "ROUTE_DEFAULT_CANDIDATE_COUNT",
            "ROUTE_ATTEMPTS_PER_CANDIDATE",
            "ROUTE_MAX_ATTEMPTS",
            "TELEMETRY_MIN_STEP_S",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_provider_kind_from_str() {
        assert_eq!(
            "OpenRouteService".parse::<ProviderKind>().unwrap(),
            ProviderKind::OpenRouteService
        );
        assert_eq!(
            "local".parse::<ProviderKind>().unwrap(),
            ProviderKind::LocalGraph
        );
        assert!("carrier-pigeon".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_defaults_match_constants() {
        let config = RouteGeneratorConfig::default();
        assert_eq!(config.distance_tolerance_pct, 0.2);
        assert_eq!(config.default_candidate_count, 3);
        assert_eq!(config.attempts_per_candidate, 10);
        assert_eq!(config.max_attempts, 50);

        let telemetry = TelemetryConfig::default();
        assert_eq!(telemetry.sample_interval_s, 2);
        assert_eq!(telemetry.min_step_s, 3);
        assert_eq!(telemetry.base_altitude_m, 200.0);
    }

    #[test]
    #[serial]
    fn test_remote_provider_requires_api_key() {
        clear_env();
        env::set_var("ROUTE_PROVIDER", "openrouteservice");

        let result = Config::from_env();
        assert!(result.is_err());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_local_provider_without_api_key() {
        clear_env();
        env::set_var("ROUTE_PROVIDER", "local");

        let config = Config::from_env().unwrap();
        assert_eq!(config.provider, ProviderKind::LocalGraph);
        assert_eq!(config.graph_radius_m, DEFAULT_GRAPH_RADIUS_M);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_tolerance_rejected() {
        clear_env();
        env::set_var("ROUTE_DISTANCE_TOLERANCE_PCT", "1.5");

        assert!(RouteGeneratorConfig::from_env(ProviderKind::OpenRouteService).is_err());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_zero_min_step_rejected() {
        clear_env();
        env::set_var("TELEMETRY_MIN_STEP_S", "0");

        assert!(TelemetryConfig::from_env().is_err());

        clear_env();
    }

    #[test]
    fn test_local_graph_gets_larger_attempt_budget() {
        let remote = RouteGeneratorConfig::for_provider(ProviderKind::OpenRouteService);
        let local = RouteGeneratorConfig::for_provider(ProviderKind::LocalGraph);

        assert_eq!(local.attempts_per_candidate, 100);
        assert!(local.attempts_per_candidate > remote.attempts_per_candidate);
        assert_eq!(
            local.max_attempts,
            local.max_candidate_count * local.attempts_per_candidate
        );
    }

    #[test]
    #[serial]
    fn test_max_attempts_from_env() {
        clear_env();

        let config = RouteGeneratorConfig::from_env(ProviderKind::LocalGraph).unwrap();
        assert_eq!(config.attempts_per_candidate, 100);
        assert_eq!(config.max_attempts, 500);

        env::set_var("ROUTE_ATTEMPTS_PER_CANDIDATE", "4");
        let config = RouteGeneratorConfig::from_env(ProviderKind::LocalGraph).unwrap();
        assert_eq!(config.max_attempts, 20);

        env::set_var("ROUTE_MAX_ATTEMPTS", "40");
        let config = RouteGeneratorConfig::from_env(ProviderKind::LocalGraph).unwrap();
        assert_eq!(config.max_attempts, 40);

        // Below the default budget of 3 routes x 4 attempts
        env::set_var("ROUTE_MAX_ATTEMPTS", "11");
        assert!(RouteGeneratorConfig::from_env(ProviderKind::LocalGraph).is_err());

        clear_env();
    }
}
