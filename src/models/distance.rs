use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// Distance in kilometers, the unit requests and reports are phrased in
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct DistanceKm(pub f64);

/// Distance in meters, the unit every length is measured in
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct DistanceMeters(pub f64);

impl DistanceKm {
    pub fn to_meters(self) -> DistanceMeters {
        DistanceMeters(self.0 * 1000.0)
    }

    pub fn as_km(self) -> f64 {
        self.0
    }
}

impl DistanceMeters {
    pub fn to_km(self) -> DistanceKm {
        DistanceKm(self.0 / 1000.0)
    }

    pub fn as_meters(self) -> f64 {
        self.0
    }
}

impl From<DistanceMeters> for DistanceKm {
    fn from(meters: DistanceMeters) -> Self {
        meters.to_km()
    }
}

impl From<DistanceKm> for DistanceMeters {
    fn from(km: DistanceKm) -> Self {
        km.to_meters()
    }
}

impl fmt::Display for DistanceKm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} km", self.0)
    }
}

impl fmt::Display for DistanceMeters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0} m", self.0)
    }
}

impl Add for DistanceMeters {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        DistanceMeters(self.0 + other.0)
    }
}

impl Sum for DistanceMeters {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(DistanceMeters(0.0), Add::add)
    }
}
