mod gpx_writer;
mod tcx_writer;

pub use gpx_writer::encode_gpx;
pub use tcx_writer::encode_tcx;

use crate::error::Result;
use crate::models::{ActivityMetadata, ChartSeries, Coordinates, Pace};
use crate::services::telemetry::TelemetryGenerator;
use rand::Rng;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Tcx,
    Gpx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Tcx => "tcx",
            ExportFormat::Gpx => "gpx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Tcx => "application/vnd.garmin.tcx+xml",
            ExportFormat::Gpx => "application/gpx+xml",
        }
    }

    /// `parcours_<index>.<ext>`, index starting at 1
    pub fn file_name(&self, index: usize) -> String {
        format!("parcours_{}.{}", index, self.extension())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tcx" => Ok(ExportFormat::Tcx),
            "gpx" => Ok(ExportFormat::Gpx),
            _ => Err(format!("Invalid export format: '{}'", s)),
        }
    }
}

/// Turns a route into activity files and chart data
#[derive(Debug, Clone)]
pub struct ActivityExporter {
    telemetry: TelemetryGenerator,
}

impl ActivityExporter {
    pub fn new(telemetry: TelemetryGenerator) -> Self {
        ActivityExporter { telemetry }
    }

    /// Fixed-interval speed and heart-rate series for one route
    pub fn chart_series<R: Rng + ?Sized>(
        &self,
        path: &[Coordinates],
        pace: &Pace,
        rng: &mut R,
    ) -> ChartSeries {
        self.telemetry.fixed_interval(path, pace, rng).chart_series()
    }

    pub fn export<R: Rng + ?Sized>(
        &self,
        format: ExportFormat,
        path: &[Coordinates],
        pace: &Pace,
        metadata: &ActivityMetadata,
        rng: &mut R,
    ) -> Result<Vec<u8>> {
        let bytes = match format {
            ExportFormat::Tcx => {
                let telemetry = self.telemetry.distance_aware(path, pace, rng);
                encode_tcx(path, &telemetry, metadata, rng)?
            }
            ExportFormat::Gpx => encode_gpx(path, metadata.name.as_deref())?,
        };

        tracing::debug!(
            format = %format,
            points = path.len(),
            bytes = bytes.len(),
            "Encoded {} activity",
            metadata.activity
        );
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TelemetryConfig;
    use crate::models::ActivityKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use time::OffsetDateTime;

    fn exporter() -> ActivityExporter {
        ActivityExporter::new(TelemetryGenerator::new(TelemetryConfig::default()).unwrap())
    }

    fn path() -> Vec<Coordinates> {
        (0..12)
            .map(|i| Coordinates::new(48.85 + i as f64 * 0.0004, 2.35).unwrap())
            .collect()
    }

    #[test]
    fn test_format_names() {
        assert_eq!(ExportFormat::Tcx.file_name(1), "parcours_1.tcx");
        assert_eq!(ExportFormat::Gpx.file_name(3), "parcours_3.gpx");
        assert_eq!("GPX".parse::<ExportFormat>().unwrap(), ExportFormat::Gpx);
        assert!("fit".parse::<ExportFormat>().is_err());
        assert_eq!(
            ExportFormat::Tcx.content_type(),
            "application/vnd.garmin.tcx+xml"
        );
    }

    #[test]
    fn test_export_is_reproducible_with_seed() {
        let pace = Pace {
            avg_speed_kmh: 10.0,
            avg_heart_rate_bpm: 140.0,
        };
        let metadata = ActivityMetadata {
            activity: ActivityKind::Running,
            start_time: OffsetDateTime::UNIX_EPOCH,
            name: None,
        };
        let a = exporter()
            .export(ExportFormat::Tcx, &path(), &pace, &metadata, &mut StdRng::seed_from_u64(4))
            .unwrap();
        let b = exporter()
            .export(ExportFormat::Tcx, &path(), &pace, &metadata, &mut StdRng::seed_from_u64(4))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_chart_series_one_sample_per_point() {
        let pace = Pace {
            avg_speed_kmh: 25.0,
            avg_heart_rate_bpm: 150.0,
        };
        let series = exporter().chart_series(&path(), &pace, &mut StdRng::seed_from_u64(2));
        assert_eq!(series.elapsed_s.len(), 12);
        assert_eq!(series.speed_kmh.len(), 12);
        assert_eq!(series.heart_rate_bpm.len(), 12);
    }
}
