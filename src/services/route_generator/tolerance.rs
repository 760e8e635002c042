/// Accepted band of route lengths around a target distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToleranceBand {
    pub target_m: f64,
    /// Relative tolerance, e.g. 0.2 = ±20% of target
    pub tolerance_pct: f64,
}

impl ToleranceBand {
    pub fn new(target_m: f64, tolerance_pct: f64) -> Self {
        Self {
            target_m,
            tolerance_pct,
        }
    }

    /// Absolute allowed deviation in meters
    pub fn slack_m(&self) -> f64 {
        self.tolerance_pct * self.target_m
    }

    pub fn min_m(&self) -> f64 {
        self.target_m - self.slack_m()
    }

    pub fn max_m(&self) -> f64 {
        self.target_m + self.slack_m()
    }

    /// Inclusive on both edges
    pub fn contains(&self, length_m: f64) -> bool {
        (length_m - self.target_m).abs() <= self.slack_m()
    }

    /// Signed relative deviation from target (0.04 = 4% too long)
    pub fn error_pct(&self, length_m: f64) -> f64 {
        if self.target_m <= 0.0 {
            return 0.0;
        }
        (length_m - self.target_m) / self.target_m
    }
}
