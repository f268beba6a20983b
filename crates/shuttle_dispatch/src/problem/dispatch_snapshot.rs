use super::{
    detour_time_estimator::{BeelineTimeEstimator, DetourTimeEstimator},
    location::LocationIdx,
    request::Request,
    travel_time_matrix::{Time, TravelMatrices},
    vehicle_entry::VehicleEntry,
};

pub enum SnapshotEstimator {
    Matrix(TravelMatrices),
    Beeline(BeelineTimeEstimator),
}

impl SnapshotEstimator {
    pub fn estimator_name(&self) -> &'static str {
        match self {
            SnapshotEstimator::Matrix(_) => "matrix",
            SnapshotEstimator::Beeline(_) => "beeline",
        }
    }
}

impl DetourTimeEstimator for SnapshotEstimator {
    fn estimate_time(&self, from: LocationIdx, to: LocationIdx) -> Time {
        match self {
            SnapshotEstimator::Matrix(e) => e.estimate_time(from, to),
            SnapshotEstimator::Beeline(e) => e.estimate_time(from, to),
        }
    }
}

/// Fleet schedules and open requests at one dispatch cycle.
///
/// `entries[i]` belongs to the vehicle with id `i`.
pub struct DispatchSnapshot {
    pub estimator: SnapshotEstimator,
    pub entries: Vec<VehicleEntry>,
    pub requests: Vec<Request>,
}
