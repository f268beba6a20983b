use std::sync::Arc;

use super::{
    location::{Location, LocationIdx},
    travel_time_matrix::{Time, TravelMatrices},
};

/// Estimates the driving time between two locations.
///
/// Estimators must be total over the locations they are queried with and
/// return non-negative times. They are shared between the workers of a fleet
/// search, hence `Send + Sync`.
pub trait DetourTimeEstimator: Send + Sync {
    fn estimate_time(&self, from: LocationIdx, to: LocationIdx) -> Time;
}

impl<F> DetourTimeEstimator for F
where
    F: Fn(LocationIdx, LocationIdx) -> Time + Send + Sync,
{
    fn estimate_time(&self, from: LocationIdx, to: LocationIdx) -> Time {
        self(from, to)
    }
}

impl DetourTimeEstimator for TravelMatrices {
    fn estimate_time(&self, from: LocationIdx, to: LocationIdx) -> Time {
        self.travel_time(from, to)
    }
}

/// Speed and detour factor used when no network times are available.
#[derive(Debug, Clone, Copy)]
pub struct BeelineParams {
    /// Meters per second.
    pub speed: f64,
    /// Ratio between the network distance and the great-circle distance.
    pub distance_factor: f64,
}

impl Default for BeelineParams {
    fn default() -> Self {
        BeelineParams {
            speed: 30.0 / 3.6,
            distance_factor: 1.3,
        }
    }
}

/// Estimates times from great-circle distances between lat/lon locations.
pub struct BeelineTimeEstimator {
    locations: Arc<Vec<Location>>,
    params: BeelineParams,
}

impl BeelineTimeEstimator {
    pub fn new(locations: Arc<Vec<Location>>, params: BeelineParams) -> Self {
        BeelineTimeEstimator { locations, params }
    }
}

impl DetourTimeEstimator for BeelineTimeEstimator {
    fn estimate_time(&self, from: LocationIdx, to: LocationIdx) -> Time {
        if from == to {
            return 0.0;
        }

        let distance = self.locations[from].haversine_distance(&self.locations[to]);
        distance * self.params.distance_factor / self.params.speed
    }
}
