use crate::config::RouteGeneratorConfig;
use crate::constants::*;
use crate::models::{Coordinates, DistanceMeters};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    #[default]
    #[serde(alias = "Running")]
    Running,
    #[serde(alias = "Biking", alias = "cycling")]
    Biking,
    #[serde(alias = "Walking")]
    Walking,
}

impl ActivityKind {
    /// Returns the OpenRouteService profile used for round-trip requests
    pub fn ors_profile(&self) -> &'static str {
        match self {
            ActivityKind::Running | ActivityKind::Walking => "foot-walking",
            ActivityKind::Biking => "cycling-regular",
        }
    }

    /// Value of the TCX `Sport` attribute; the schema only knows
    /// Running, Biking and Other
    pub fn tcx_sport(&self) -> &'static str {
        match self {
            ActivityKind::Running => "Running",
            ActivityKind::Biking => "Biking",
            ActivityKind::Walking => "Other",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityKind::Running => write!(f, "running"),
            ActivityKind::Biking => write!(f, "biking"),
            ActivityKind::Walking => write!(f, "walking"),
        }
    }
}

impl FromStr for ActivityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "running" | "run" => Ok(ActivityKind::Running),
            "biking" | "bike" | "cycling" => Ok(ActivityKind::Biking),
            "walking" | "walk" => Ok(ActivityKind::Walking),
            _ => Err(format!("Invalid activity: '{}'", s)),
        }
    }
}

/// A loop accepted by the candidate search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRoute {
    pub id: Uuid,
    /// Ordered path, first and last points near the start
    pub path: Vec<Coordinates>,
    /// Length measured along the path (meters)
    pub distance_m: f64,
    /// Seed handed to the provider for this candidate
    pub seed: u64,
}

impl CandidateRoute {
    pub fn new(path: Vec<Coordinates>, distance_m: f64, seed: u64) -> Self {
        CandidateRoute {
            id: Uuid::new_v4(),
            path,
            distance_m,
            seed,
        }
    }

    pub fn distance_km(&self) -> f64 {
        DistanceMeters(self.distance_m).to_km().as_km()
    }
}

// Request/Response types for API endpoints

#[derive(Debug, Deserialize)]
pub struct LoopRouteRequest {
    pub start_point: Coordinates,
    pub distance_km: f64,
    #[serde(default)]
    pub activity: ActivityKind,
    /// Number of routes wanted (defaults to the configured count)
    #[serde(default)]
    pub count: Option<usize>,
    /// Relative tolerance, e.g. 0.2 = ±20% (defaults to the configured value)
    #[serde(default)]
    pub distance_tolerance_pct: Option<f64>,
    /// Provider calls allowed (defaults to count × attempts per candidate)
    #[serde(default)]
    pub max_attempts: Option<usize>,
    /// Seeds the attempt RNG for reproducible searches
    #[serde(default)]
    pub seed: Option<u64>,
}

impl LoopRouteRequest {
    pub fn validate(&self, config: &RouteGeneratorConfig) -> Result<(), String> {
        let max_count = config.max_candidate_count;
        if !(MIN_TARGET_DISTANCE_KM..=MAX_TARGET_DISTANCE_KM).contains(&self.distance_km) {
            return Err(format!(
                "distance_km must be between {} and {}",
                MIN_TARGET_DISTANCE_KM, MAX_TARGET_DISTANCE_KM
            ));
        }
        // Deserialization bypasses Coordinates::new
        Coordinates::new(self.start_point.lat, self.start_point.lng)?;
        if let Some(count) = self.count {
            if count == 0 || count > max_count {
                return Err(format!("count must be between 1 and {}", max_count));
            }
        }
        if let Some(tolerance) = self.distance_tolerance_pct {
            if !(tolerance > 0.0 && tolerance < 1.0) {
                return Err("distance_tolerance_pct must be between 0 and 1".to_string());
            }
        }
        if let Some(max_attempts) = self.max_attempts {
            if max_attempts > config.max_attempts {
                return Err(format!(
                    "max_attempts must be at most {}",
                    config.max_attempts
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoopRouteResponse {
    pub routes: Vec<CandidateRoute>,
    pub attempts: usize,
    pub provider_failures: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(distance_km: f64) -> LoopRouteRequest {
        LoopRouteRequest {
            start_point: Coordinates::new(48.8566, 2.3522).unwrap(),
            distance_km,
            activity: ActivityKind::Running,
            count: None,
            distance_tolerance_pct: None,
            max_attempts: None,
            seed: None,
        }
    }

    #[test]
    fn test_loop_route_request_validation() {
        let config = RouteGeneratorConfig::default();
        let mut req = request(5.0);
        assert!(req.validate(&config).is_ok());

        req.distance_km = 0.5; // Too short
        assert!(req.validate(&config).is_err());

        req.distance_km = 150.0; // Too long
        assert!(req.validate(&config).is_err());

        req.distance_km = 5.0;
        req.count = Some(0);
        assert!(req.validate(&config).is_err());
        req.count = Some(6);
        assert!(req.validate(&config).is_err());
        req.count = Some(5);
        assert!(req.validate(&config).is_ok());

        req.distance_tolerance_pct = Some(0.0);
        assert!(req.validate(&config).is_err());
        req.distance_tolerance_pct = Some(0.1);
        assert!(req.validate(&config).is_ok());
    }

    #[test]
    fn test_attempt_budget_capped() {
        let config = RouteGeneratorConfig::default();
        let mut req = request(5.0);

        req.max_attempts = Some(0);
        assert!(req.validate(&config).is_ok());
        req.max_attempts = Some(config.max_attempts);
        assert!(req.validate(&config).is_ok());
        req.max_attempts = Some(config.max_attempts + 1);
        assert!(req.validate(&config).is_err());
        req.max_attempts = Some(200_000);
        assert!(req.validate(&config).is_err());
    }

    #[test]
    fn test_request_rejects_out_of_range_start() {
        let config = RouteGeneratorConfig::default();
        let mut req = request(5.0);
        req.start_point = Coordinates {
            lat: 95.0,
            lng: 2.0,
        };
        assert!(req.validate(&config).is_err());
    }

    #[test]
    fn test_activity_profiles() {
        assert_eq!(ActivityKind::Running.ors_profile(), "foot-walking");
        assert_eq!(ActivityKind::Walking.ors_profile(), "foot-walking");
        assert_eq!(ActivityKind::Biking.ors_profile(), "cycling-regular");
        assert_eq!(ActivityKind::Walking.tcx_sport(), "Other");
    }

    #[test]
    fn test_activity_from_str_and_serde() {
        assert_eq!(
            "Running".parse::<ActivityKind>().unwrap(),
            ActivityKind::Running
        );
        assert_eq!("bike".parse::<ActivityKind>().unwrap(), ActivityKind::Biking);
        assert!("swimming".parse::<ActivityKind>().is_err());

        let kind: ActivityKind = serde_json::from_str("\"Walking\"").unwrap();
        assert_eq!(kind, ActivityKind::Walking);
        assert_eq!(
            serde_json::to_string(&ActivityKind::Biking).unwrap(),
            "\"biking\""
        );
    }

    #[test]
    fn test_candidate_route_distance_km() {
        let route = CandidateRoute::new(vec![], 5200.0, 42);
        assert_eq!(route.distance_km(), 5.2);
        assert_eq!(route.seed, 42);
    }
}
