pub mod activity;
pub mod coordinates;
pub mod distance;
pub mod route;

pub use activity::{ActivityMetadata, ActivityRequest, ChartSeries, Pace, Telemetry};
pub use coordinates::Coordinates;
pub use distance::{DistanceKm, DistanceMeters};
pub use route::{ActivityKind, CandidateRoute, LoopRouteRequest, LoopRouteResponse};
