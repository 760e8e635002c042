use crate::error::Result;
use crate::models::{ActivityKind, Coordinates};
use async_trait::async_trait;

/// One request for a candidate loop
#[derive(Debug, Clone, Copy)]
pub struct CandidateQuery<'a> {
    pub start: &'a Coordinates,
    pub target_distance_m: f64,
    /// Varies the shape of the loop between attempts
    pub seed: u64,
    pub activity: ActivityKind,
}

/// Source of candidate loops for the acceptance loop.
///
/// A provider returns a path that starts and ends near `start` and whose length
/// is roughly `target_distance_m`; it does not check the length itself.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn candidate_route(&self, query: &CandidateQuery<'_>) -> Result<Vec<Coordinates>>;

    /// Short name for logs and the health endpoint
    fn name(&self) -> &'static str;
}
