use crate::error::{AppError, Result};
use crate::models::Coordinates;
use petgraph::graph::{NodeIndex, UnGraph};
use rand::Rng;
use std::collections::HashMap;

/// Walkable street network; nodes are OSM nodes, edge weights are segment
/// lengths in meters
#[derive(Debug, Clone, Default)]
pub struct StreetGraph {
    graph: UnGraph<Coordinates, f64>,
}

impl StreetGraph {
    /// Build from OSM node positions and ways given as node-id sequences.
    /// Way nodes without a known position are skipped.
    pub fn from_ways(nodes: &HashMap<i64, Coordinates>, ways: &[Vec<i64>]) -> Self {
        let mut graph = UnGraph::<Coordinates, f64>::new_undirected();
        let mut index: HashMap<i64, NodeIndex> = HashMap::new();

        for way in ways {
            let mut previous: Option<(NodeIndex, Coordinates)> = None;
            for osm_id in way {
                let Some(coords) = nodes.get(osm_id) else {
                    continue;
                };
                let node = *index
                    .entry(*osm_id)
                    .or_insert_with(|| graph.add_node(*coords));

                if let Some((prev_node, prev_coords)) = previous {
                    if prev_node != node {
                        let length_m = prev_coords.distance_to(coords) * 1000.0;
                        graph.update_edge(prev_node, node, length_m);
                    }
                }
                previous = Some((node, *coords));
            }
        }

        StreetGraph { graph }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn coordinates(&self, node: NodeIndex) -> Option<Coordinates> {
        self.graph.node_weight(node).copied()
    }

    /// Closest graph node to `point` by geodesic distance
    pub fn nearest_node(&self, point: &Coordinates) -> Option<NodeIndex> {
        self.graph
            .node_indices()
            .map(|n| (n, point.distance_to(&self.graph[n])))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(n, _)| n)
    }

    /// Minimum-length path between two nodes (A* with a zero heuristic).
    /// Returns the total length in meters and the visited nodes.
    pub fn shortest_path(&self, from: NodeIndex, to: NodeIndex) -> Option<(f64, Vec<NodeIndex>)> {
        petgraph::algo::astar(
            &self.graph,
            from,
            |n| n == to,
            |e| *e.weight(),
            |_| 0.0,
        )
    }

    /// Sum of edge weights along consecutive nodes
    pub fn route_length_m(&self, nodes: &[NodeIndex]) -> f64 {
        nodes
            .windows(2)
            .filter_map(|w| {
                self.graph
                    .find_edge(w[0], w[1])
                    .and_then(|e| self.graph.edge_weight(e))
            })
            .sum()
    }

    pub fn path_coordinates(&self, nodes: &[NodeIndex]) -> Vec<Coordinates> {
        nodes.iter().filter_map(|n| self.coordinates(*n)).collect()
    }

    pub fn random_node<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<NodeIndex> {
        if self.is_empty() {
            return None;
        }
        Some(NodeIndex::new(rng.random_range(0..self.graph.node_count())))
    }

    /// Loop `start -> via -> start`: the outbound path followed by the return
    /// path without its first node
    pub fn loop_via(&self, start: NodeIndex, via: NodeIndex) -> Result<Vec<NodeIndex>> {
        if start == via {
            return Err(AppError::GraphSearch(
                "Intermediate node is the start node".to_string(),
            ));
        }
        let (_, outbound) = self.shortest_path(start, via).ok_or_else(|| {
            AppError::GraphSearch("No path from start to intermediate node".to_string())
        })?;
        let (_, inbound) = self.shortest_path(via, start).ok_or_else(|| {
            AppError::GraphSearch("No path back to start".to_string())
        })?;

        let mut nodes = outbound;
        nodes.extend(inbound.into_iter().skip(1));
        Ok(nodes)
    }
}
