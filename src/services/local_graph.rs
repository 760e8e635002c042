use crate::cache::{graph_cache_key, GraphCache};
use crate::constants::GRAPH_RADIUS_TARGET_FACTOR;
use crate::error::{AppError, Result};
use crate::models::Coordinates;
use crate::services::overpass::OverpassClient;
use crate::services::route_provider::{CandidateQuery, RouteProvider};
use crate::services::street_graph::StreetGraph;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

/// Builds loops on an OpenStreetMap walk network: start node to a random
/// intermediate node and back along shortest paths
pub struct LocalGraphProvider {
    overpass: OverpassClient,
    cache: Arc<GraphCache>,
    min_radius_m: f64,
}

impl LocalGraphProvider {
    pub fn new(overpass: OverpassClient, cache: Arc<GraphCache>, min_radius_m: f64) -> Self {
        LocalGraphProvider {
            overpass,
            cache,
            min_radius_m,
        }
    }

    /// Download radius for a target loop length
    pub fn search_radius_m(&self, target_distance_m: f64) -> f64 {
        self.min_radius_m
            .max(GRAPH_RADIUS_TARGET_FACTOR * target_distance_m)
    }

    /// Street graph around `center`, downloaded once per cache lifetime
    pub async fn street_graph(&self, center: &Coordinates, radius_m: f64) -> Result<Arc<StreetGraph>> {
        let key = graph_cache_key(center, radius_m);
        if let Some(graph) = self.cache.get(&key).await {
            return Ok(graph);
        }

        let graph = Arc::new(self.overpass.fetch_walk_network(center, radius_m).await?);
        self.cache.insert(&key, graph.clone()).await;
        Ok(graph)
    }
}

/// One seeded loop on an already-loaded graph
pub fn loop_on_graph(graph: &StreetGraph, start: &Coordinates, seed: u64) -> Result<Vec<Coordinates>> {
    let start_node = graph
        .nearest_node(start)
        .ok_or_else(|| AppError::GraphSearch("Street graph is empty".to_string()))?;

    let mut rng = StdRng::seed_from_u64(seed);
    let via = graph
        .random_node(&mut rng)
        .ok_or_else(|| AppError::GraphSearch("Street graph is empty".to_string()))?;

    let nodes = graph.loop_via(start_node, via)?;
    tracing::debug!(
        seed = seed,
        nodes = nodes.len(),
        length_m = %format!("{:.0}", graph.route_length_m(&nodes)),
        "Graph loop built"
    );
    Ok(graph.path_coordinates(&nodes))
}

#[async_trait]
impl RouteProvider for LocalGraphProvider {
    async fn candidate_route(&self, query: &CandidateQuery<'_>) -> Result<Vec<Coordinates>> {
        let radius_m = self.search_radius_m(query.target_distance_m);
        let graph = self.street_graph(query.start, radius_m).await?;
        loop_on_graph(&graph, query.start, query.seed)
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::route_generator::path_length_m;
    use std::collections::HashMap;

    /// 5x5 grid of streets, ~110m blocks
    fn grid() -> StreetGraph {
        let mut nodes = HashMap::new();
        for row in 0..5 {
            for col in 0..5 {
                let id = (row * 5 + col) as i64;
                nodes.insert(
                    id,
                    Coordinates::new(48.85 + row as f64 * 0.001, 2.35 + col as f64 * 0.0015)
                        .unwrap(),
                );
            }
        }
        let mut ways: Vec<Vec<i64>> = Vec::new();
        for i in 0..5_i64 {
            ways.push((0..5).map(|j| i * 5 + j).collect());
            ways.push((0..5).map(|j| j * 5 + i).collect());
        }
        StreetGraph::from_ways(&nodes, &ways)
    }

    #[test]
    fn test_search_radius_grows_with_target() {
        let provider = LocalGraphProvider::new(
            OverpassClient::with_endpoints(vec![]),
            Arc::new(GraphCache::new(60, 4)),
            1500.0,
        );
        assert_eq!(provider.search_radius_m(3000.0), 1500.0);
        assert_eq!(provider.search_radius_m(10_000.0), 3000.0);
    }

    #[test]
    fn test_loop_on_graph_is_closed_and_seeded() {
        let graph = grid();
        let start = Coordinates::new(48.8501, 2.3501).unwrap();

        // Some seeds may pick the start node itself
        let (seed, path) = (0..20)
            .find_map(|seed| loop_on_graph(&graph, &start, seed).ok().map(|p| (seed, p)))
            .unwrap();

        assert_eq!(path.first(), path.last());
        assert!(path.len() >= 3);
        assert!(path_length_m(&path) > 0.0);
        assert_eq!(loop_on_graph(&graph, &start, seed).unwrap(), path);
    }

    #[test]
    fn test_empty_graph_is_search_error() {
        let start = Coordinates::new(48.85, 2.35).unwrap();
        assert!(matches!(
            loop_on_graph(&StreetGraph::default(), &start, 1),
            Err(AppError::GraphSearch(_))
        ));
    }

    #[tokio::test]
    async fn test_cached_graph_skips_download() {
        let cache = Arc::new(GraphCache::new(60, 4));
        let provider = LocalGraphProvider::new(
            OverpassClient::with_endpoints(vec![]),
            cache.clone(),
            1500.0,
        );
        let start = Coordinates::new(48.8501, 2.3501).unwrap();
        cache
            .insert(&graph_cache_key(&start, 1500.0), Arc::new(grid()))
            .await;

        let graph = provider.street_graph(&start, 1500.0).await.unwrap();
        assert_eq!(graph.node_count(), 25);

        // No endpoints configured, so a miss must fail
        let far = Coordinates::new(45.0, 5.0).unwrap();
        assert!(matches!(
            provider.street_graph(&far, 1500.0).await,
            Err(AppError::OverpassApi(_))
        ));
    }
}
