use crate::config::TelemetryConfig;
use crate::constants::*;
use crate::error::{AppError, Result};
use crate::models::{Coordinates, Pace, Telemetry};
use crate::services::route_generator::segment_lengths_m;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Fabricates plausible speed, heart-rate and altitude samples along a route.
///
/// Every sample rides the same slow sinusoid (`sin(i / 10)`) plus Gaussian
/// noise; randomness comes from the caller's RNG so output is reproducible.
#[derive(Debug, Clone)]
pub struct TelemetryGenerator {
    config: TelemetryConfig,
    speed_noise: Normal<f64>,
    hr_noise: Normal<f64>,
}

/// Noise-model output for one sample index
#[derive(Debug, Clone, Copy)]
struct Sample {
    speed_factor: f64,
    heart_rate_bpm: f64,
    altitude_m: f64,
}

impl TelemetryGenerator {
    pub fn new(config: TelemetryConfig) -> Result<Self> {
        // Elapsed time must strictly increase, even across zero-length segments
        if config.sample_interval_s == 0 || config.min_step_s == 0 {
            return Err(AppError::Internal(
                "Telemetry sample interval and minimum step must be at least 1s".to_string(),
            ));
        }
        let speed_noise = Normal::new(0.0, config.speed_noise_std)
            .map_err(|e| AppError::Internal(format!("Invalid speed noise: {}", e)))?;
        let hr_noise = Normal::new(0.0, config.hr_noise_std)
            .map_err(|e| AppError::Internal(format!("Invalid heart-rate noise: {}", e)))?;

        Ok(TelemetryGenerator {
            config,
            speed_noise,
            hr_noise,
        })
    }

    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }

    fn sample<R: Rng + ?Sized>(&self, i: usize, pace: &Pace, rng: &mut R) -> Sample {
        let wave = (i as f64 / TELEMETRY_WAVE_DIVISOR).sin();

        let speed_factor = (1.0
            + TELEMETRY_SPEED_WAVE_AMPLITUDE * wave
            + self.speed_noise.sample(rng))
        .max(TELEMETRY_MIN_SPEED_FACTOR);
        let heart_rate_bpm = pace.avg_heart_rate_bpm
            + TELEMETRY_HR_WAVE_AMPLITUDE_BPM * wave
            + self.hr_noise.sample(rng);
        let altitude_m = self.config.base_altitude_m + TELEMETRY_ALTITUDE_WAVE_AMPLITUDE_M * wave;

        Sample {
            speed_factor,
            heart_rate_bpm,
            altitude_m,
        }
    }

    /// One sample per route point at a fixed interval; feeds the chart
    pub fn fixed_interval<R: Rng + ?Sized>(
        &self,
        path: &[Coordinates],
        pace: &Pace,
        rng: &mut R,
    ) -> Telemetry {
        let mut telemetry = Telemetry::default();

        for i in 0..path.len() {
            let sample = self.sample(i, pace, rng);
            telemetry
                .elapsed_s
                .push(self.config.sample_interval_s * (i as u64 + 1));
            telemetry
                .speed_kmh
                .push(pace.avg_speed_kmh * sample.speed_factor);
            telemetry.heart_rate_bpm.push(sample.heart_rate_bpm);
            telemetry.altitude_m.push(sample.altitude_m);
        }

        telemetry
    }

    /// One sample per segment end. Each step lasts the segment length over
    /// the sampled speed, never less than the configured minimum step.
    pub fn distance_aware<R: Rng + ?Sized>(
        &self,
        path: &[Coordinates],
        pace: &Pace,
        rng: &mut R,
    ) -> Telemetry {
        let mut telemetry = Telemetry::default();
        let mut elapsed_s = 0_u64;
        let mut distance_m = 0.0;

        for (i, segment_m) in segment_lengths_m(path).into_iter().enumerate() {
            let sample = self.sample(i, pace, rng);
            let speed_mps = pace.avg_speed_mps() * sample.speed_factor;
            let step_s = ((segment_m / speed_mps).floor() as u64).max(self.config.min_step_s);

            elapsed_s += step_s;
            distance_m += segment_m;

            telemetry.elapsed_s.push(elapsed_s);
            telemetry.speed_kmh.push(speed_mps * 3.6);
            telemetry.heart_rate_bpm.push(sample.heart_rate_bpm);
            telemetry.altitude_m.push(sample.altitude_m);
            telemetry.distance_m.push(distance_m);
        }

        telemetry
    }
}
