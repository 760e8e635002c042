mod memory;

pub use memory::GraphCache;

use crate::models::Coordinates;
use serde::{Deserialize, Serialize};

/// Generate a cache key for a street graph download.
/// Centre is rounded to 3 decimal places (~100m precision), radius to whole meters.
pub fn graph_cache_key(center: &Coordinates, radius_m: f64) -> String {
    let rounded = center.round(3);
    format!(
        "graph:walk:{:.3}:{:.3}:{:.0}",
        rounded.lat, rounded.lng, radius_m
    )
}

/// Cache statistics for monitoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub entries: u64,
}
