use crate::problem::{
    detour_time_estimator::DetourTimeEstimator,
    location::LocationIdx,
    request::Request,
    travel_time_matrix::{Distance, Time, TravelMatrices},
    vehicle_entry::VehicleEntry,
};

use super::insertion_generator::{Insertion, for_each_insertion};

/// Computes the payload attached to every new leg of an insertion.
pub trait DetourDataProvider<D> {
    fn detour_data(&self, from: LocationIdx, to: LocationIdx) -> D;
}

impl<E: DetourTimeEstimator> DetourDataProvider<Time> for E {
    fn detour_data(&self, from: LocationIdx, to: LocationIdx) -> Time {
        self.estimate_time(from, to)
    }
}

/// Payloads that know how long their leg takes to drive.
pub trait DetourTime {
    fn detour_time(&self) -> Time;
}

impl DetourTime for Time {
    fn detour_time(&self) -> Time {
        *self
    }
}

/// Time and distance of a leg.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetourPath {
    pub time: Time,
    pub distance: Distance,
}

impl DetourTime for DetourPath {
    fn detour_time(&self) -> Time {
        self.time
    }
}

impl DetourDataProvider<DetourPath> for TravelMatrices {
    fn detour_data(&self, from: LocationIdx, to: LocationIdx) -> DetourPath {
        DetourPath {
            time: self.travel_time(from, to),
            distance: self.travel_distance(from, to),
        }
    }
}

/// An insertion together with the data of the (up to) four legs it adds.
///
/// * `detour_to_pickup`: waypoint `p` to the pickup
/// * `detour_from_pickup`: pickup to waypoint `p + 1`, or straight to the
///   dropoff when `p == d`
/// * `detour_to_dropoff`: waypoint `d` to the dropoff, `None` when `p == d`
///   since that leg is `detour_from_pickup`
/// * `detour_from_dropoff`: dropoff to waypoint `d + 1`, `None` when the
///   dropoff ends the schedule
#[derive(Debug, Clone)]
pub struct InsertionWithDetourData<'a, D> {
    pub insertion: Insertion<'a>,
    pub detour_to_pickup: D,
    pub detour_from_pickup: D,
    pub detour_to_dropoff: Option<D>,
    pub detour_from_dropoff: Option<D>,
}

impl<'a, D> InsertionWithDetourData<'a, D> {
    pub fn create(
        request: &Request,
        insertion: Insertion<'a>,
        provider: &impl DetourDataProvider<D>,
    ) -> Self {
        let entry = insertion.entry;
        let Insertion {
            pickup_idx,
            dropoff_idx,
            ..
        } = insertion;

        let detour_to_pickup =
            provider.detour_data(entry.waypoint(pickup_idx).location(), request.from());

        let (detour_from_pickup, detour_to_dropoff) = if pickup_idx == dropoff_idx {
            (provider.detour_data(request.from(), request.to()), None)
        } else {
            (
                provider.detour_data(request.from(), entry.waypoint(pickup_idx + 1).location()),
                Some(provider.detour_data(entry.waypoint(dropoff_idx).location(), request.to())),
            )
        };

        let detour_from_dropoff = (dropoff_idx < entry.stop_count()).then(|| {
            provider.detour_data(request.to(), entry.waypoint(dropoff_idx + 1).location())
        });

        InsertionWithDetourData {
            insertion,
            detour_to_pickup,
            detour_from_pickup,
            detour_to_dropoff,
            detour_from_dropoff,
        }
    }
}

impl<D: DetourTime> InsertionWithDetourData<'_, D> {
    pub fn time_to_pickup(&self) -> Time {
        self.detour_to_pickup.detour_time()
    }

    pub fn time_from_pickup(&self) -> Time {
        self.detour_from_pickup.detour_time()
    }

    /// Zero when the dropoff directly follows the pickup.
    pub fn time_to_dropoff(&self) -> Time {
        self.detour_to_dropoff.as_ref().map_or(0.0, D::detour_time)
    }

    /// Zero when the dropoff ends the schedule.
    pub fn time_from_dropoff(&self) -> Time {
        self.detour_from_dropoff.as_ref().map_or(0.0, D::detour_time)
    }
}

/// Generates the insertions of `request` into `entry` and attaches the
/// detour data of their legs.
pub fn generate_insertions_with_detour_data<'a, D>(
    request: &Request,
    entry: &'a VehicleEntry,
    provider: &impl DetourDataProvider<D>,
) -> Vec<InsertionWithDetourData<'a, D>> {
    let mut insertions = Vec::new();
    for_each_insertion(request, entry, |insertion| {
        insertions.push(InsertionWithDetourData::create(request, insertion, provider));
    });
    insertions
}
