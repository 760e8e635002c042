use crate::models::{CandidateRoute, Coordinates};

/// Accepted routes in acceptance order, bounded by the requested count.
/// Two routes are duplicates only when their coordinate sequences are equal.
#[derive(Debug, Default)]
pub struct CandidateSet {
    routes: Vec<CandidateRoute>,
    capacity: usize,
}

impl CandidateSet {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            routes: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn contains_path(&self, path: &[Coordinates]) -> bool {
        self.routes.iter().any(|r| r.path.as_slice() == path)
    }

    /// Returns false (and drops the route) when full or already present
    pub fn insert(&mut self, route: CandidateRoute) -> bool {
        if self.is_full() || self.contains_path(&route.path) {
            return false;
        }
        self.routes.push(route);
        true
    }

    pub fn is_full(&self) -> bool {
        self.routes.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn into_routes(self) -> Vec<CandidateRoute> {
        self.routes
    }
}
