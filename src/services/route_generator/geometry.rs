use crate::models::{Coordinates, DistanceMeters};

/// Compute segment length in meters
pub fn segment_length_m(p1: &Coordinates, p2: &Coordinates) -> f64 {
    p1.distance_to(p2) * 1000.0
}

/// Length of every consecutive segment, in path order (meters).
/// Empty for paths with fewer than 2 points.
pub fn segment_lengths_m(path: &[Coordinates]) -> Vec<f64> {
    path.windows(2)
        .map(|w| segment_length_m(&w[0], &w[1]))
        .collect()
}

/// Total path length in meters, summed pairwise along the path
pub fn path_length_m(path: &[Coordinates]) -> f64 {
    path.windows(2)
        .map(|w| DistanceMeters(segment_length_m(&w[0], &w[1])))
        .sum::<DistanceMeters>()
        .as_meters()
}

/// Gap between the first and last point of a path (meters)
pub fn loop_closure_m(path: &[Coordinates]) -> f64 {
    match (path.first(), path.last()) {
        (Some(first), Some(last)) => segment_length_m(first, last),
        _ => 0.0,
    }
}
