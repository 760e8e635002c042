use crate::cache::CacheStats;
use crate::services::street_graph::StreetGraph;
use moka::future::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// In-memory street graph cache backed by moka with TTL and bounded capacity.
/// All methods are `&self`, so one instance is shared across requests.
pub struct GraphCache {
    graphs: Cache<String, Arc<StreetGraph>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl GraphCache {
    pub fn new(ttl_seconds: u64, max_capacity: u64) -> Self {
        let graphs = Cache::builder()
            .time_to_live(Duration::from_secs(ttl_seconds))
            .max_capacity(max_capacity)
            .build();

        GraphCache {
            graphs,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Arc<StreetGraph>> {
        match self.graphs.get(key).await {
            Some(graph) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Graph cache hit: {}", key);
                Some(graph)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Graph cache miss: {}", key);
                None
            }
        }
    }

    pub async fn insert(&self, key: &str, graph: Arc<StreetGraph>) {
        let nodes = graph.node_count();
        self.graphs.insert(key.to_string(), graph).await;
        tracing::debug!("Cached street graph ({} nodes): {}", nodes, key);
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let hit_rate = if hits + misses > 0 {
            (hits as f64 / (hits + misses) as f64) * 100.0
        } else {
            0.0
        };

        CacheStats {
            hits,
            misses,
            hit_rate,
            entries: self.graphs.entry_count(),
        }
    }
}
