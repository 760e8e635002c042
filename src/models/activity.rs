use crate::constants::*;
use crate::models::{ActivityKind, Coordinates};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Body of the activity export and telemetry endpoints.
/// The caller sends back a route it received from the loop endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityRequest {
    pub path: Vec<Coordinates>,
    #[serde(default)]
    pub activity: ActivityKind,
    pub avg_speed_kmh: f64,
    pub avg_heart_rate_bpm: f64,
    /// Defaults to the current time
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_time: Option<OffsetDateTime>,
    #[serde(default)]
    pub name: Option<String>,
    /// Seeds telemetry noise for reproducible files
    #[serde(default)]
    pub seed: Option<u64>,
}

impl ActivityRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.path.len() < 2 {
            return Err("path must contain at least 2 points".to_string());
        }
        for point in &self.path {
            Coordinates::new(point.lat, point.lng)?;
        }
        self.pace().validate()
    }

    pub fn metadata(&self) -> ActivityMetadata {
        ActivityMetadata {
            activity: self.activity,
            start_time: self.start_time.unwrap_or_else(OffsetDateTime::now_utc),
            name: self.name.clone(),
        }
    }

    pub fn pace(&self) -> Pace {
        Pace {
            avg_speed_kmh: self.avg_speed_kmh,
            avg_heart_rate_bpm: self.avg_heart_rate_bpm,
        }
    }
}

/// Target averages the synthetic telemetry oscillates around
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pace {
    pub avg_speed_kmh: f64,
    pub avg_heart_rate_bpm: f64,
}

impl Pace {
    pub fn validate(&self) -> Result<(), String> {
        if !(MIN_AVG_SPEED_KMH..=MAX_AVG_SPEED_KMH).contains(&self.avg_speed_kmh) {
            return Err(format!(
                "avg_speed_kmh must be between {} and {}",
                MIN_AVG_SPEED_KMH, MAX_AVG_SPEED_KMH
            ));
        }
        if !(MIN_AVG_HEART_RATE_BPM..=MAX_AVG_HEART_RATE_BPM).contains(&self.avg_heart_rate_bpm) {
            return Err(format!(
                "avg_heart_rate_bpm must be between {} and {}",
                MIN_AVG_HEART_RATE_BPM, MAX_AVG_HEART_RATE_BPM
            ));
        }
        Ok(())
    }

    pub fn avg_speed_mps(&self) -> f64 {
        self.avg_speed_kmh / 3.6
    }
}

#[derive(Debug, Clone)]
pub struct ActivityMetadata {
    pub activity: ActivityKind,
    pub start_time: OffsetDateTime,
    pub name: Option<String>,
}

/// Parallel per-sample series, aligned index-for-index
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Telemetry {
    pub elapsed_s: Vec<u64>,
    pub speed_kmh: Vec<f64>,
    pub heart_rate_bpm: Vec<f64>,
    pub altitude_m: Vec<f64>,
    /// Cumulative distance; filled by distance-aware sampling only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub distance_m: Vec<f64>,
}

impl Telemetry {
    pub fn len(&self) -> usize {
        self.elapsed_s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elapsed_s.is_empty()
    }

    pub fn total_seconds(&self) -> u64 {
        self.elapsed_s.last().copied().unwrap_or(0)
    }

    pub fn total_distance_m(&self) -> f64 {
        self.distance_m.last().copied().unwrap_or(0.0)
    }

    /// Series for a dual-axis speed / heart-rate chart
    pub fn chart_series(&self) -> ChartSeries {
        ChartSeries {
            elapsed_s: self.elapsed_s.clone(),
            speed_kmh: self.speed_kmh.clone(),
            heart_rate_bpm: self.heart_rate_bpm.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSeries {
    pub elapsed_s: Vec<u64>,
    pub speed_kmh: Vec<f64>,
    pub heart_rate_bpm: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_body() -> serde_json::Value {
        json!({
            "path": [
                {"lat": 48.8566, "lng": 2.3522},
                {"lat": 48.8570, "lng": 2.3530}
            ],
            "activity": "Running",
            "avg_speed_kmh": 10.0,
            "avg_heart_rate_bpm": 140.0
        })
    }

    #[test]
    fn test_activity_request_defaults() {
        let request: ActivityRequest = serde_json::from_value(valid_body()).unwrap();
        assert!(request.validate().is_ok());
        assert!(request.start_time.is_none());
        assert!(request.seed.is_none());
        assert_eq!(request.pace().avg_speed_mps(), 10.0 / 3.6);
    }

    #[test]
    fn test_activity_request_parses_rfc3339_start() {
        let mut body = valid_body();
        body["start_time"] = json!("2024-05-01T08:30:00Z");
        let request: ActivityRequest = serde_json::from_value(body).unwrap();
        let start = request.start_time.unwrap();
        assert_eq!(start.hour(), 8);
        assert_eq!(start.minute(), 30);
    }

    #[test]
    fn test_activity_request_validation() {
        let mut request: ActivityRequest = serde_json::from_value(valid_body()).unwrap();

        request.avg_speed_kmh = 2.0;
        assert!(request.validate().is_err());
        request.avg_speed_kmh = 10.0;

        request.avg_heart_rate_bpm = 220.0;
        assert!(request.validate().is_err());
        request.avg_heart_rate_bpm = 140.0;

        request.path.truncate(1);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_telemetry_totals() {
        let telemetry = Telemetry {
            elapsed_s: vec![3, 7, 12],
            speed_kmh: vec![10.0, 10.5, 9.8],
            heart_rate_bpm: vec![140.0, 142.0, 139.0],
            altitude_m: vec![200.1, 200.2, 200.3],
            distance_m: vec![8.0, 20.0, 33.5],
        };
        assert_eq!(telemetry.len(), 3);
        assert_eq!(telemetry.total_seconds(), 12);
        assert_eq!(telemetry.total_distance_m(), 33.5);
        assert_eq!(telemetry.chart_series().speed_kmh.len(), 3);
        assert_eq!(Telemetry::default().total_seconds(), 0);
    }
}
