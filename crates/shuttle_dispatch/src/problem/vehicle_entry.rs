use thiserror::Error;

use crate::define_index_newtype;

use super::{
    slack_times::compute_slack_times,
    travel_time_matrix::Time,
    waypoint::{Start, Stop, Waypoint},
};

define_index_newtype!(VehicleId, VehicleEntry);

#[derive(Debug, Error, PartialEq)]
pub enum VehicleEntryError {
    #[error("vehicle {vehicle}: occupancy after the last waypoint is {occupancy}, expected 0")]
    NonZeroEndOccupancy { vehicle: String, occupancy: u32 },

    #[error("vehicle {vehicle}: occupancy {occupancy} at waypoint {waypoint} exceeds capacity {capacity}")]
    CapacityExceeded {
        vehicle: String,
        waypoint: usize,
        occupancy: u32,
        capacity: u32,
    },

    #[error("vehicle {vehicle}: waypoint {waypoint} is not ordered by visit time")]
    UnorderedWaypoint { vehicle: String, waypoint: usize },

    #[error("vehicle {vehicle}: expected {expected} slack times, got {actual}")]
    SlackTimesLength {
        vehicle: String,
        expected: usize,
        actual: usize,
    },
}

/// Static description of a fleet vehicle.
#[derive(Debug, Clone)]
pub struct Vehicle {
    pub id: VehicleId,
    pub external_id: String,
    pub capacity: u32,
    pub service_end_time: Time,
}

/// Snapshot of a vehicle's planned schedule taken at dispatch time.
///
/// Waypoint 0 is the vehicle's current position, waypoint `k > 0` is
/// `stops[k - 1]`. Entries can only be created through the validating
/// constructors and are never mutated afterwards.
#[derive(Debug, Clone)]
pub struct VehicleEntry {
    vehicle: Vehicle,
    start: Start,
    stops: Vec<Stop>,
    slack_times: Vec<Time>,
}

impl VehicleEntry {
    /// Creates an entry with an explicit slack array of `stops.len() + 1`
    /// values, see [`compute_slack_times`].
    pub fn new(
        vehicle: Vehicle,
        start: Start,
        stops: Vec<Stop>,
        slack_times: Vec<Time>,
    ) -> Result<Self, VehicleEntryError> {
        if slack_times.len() != stops.len() + 1 {
            return Err(VehicleEntryError::SlackTimesLength {
                vehicle: vehicle.external_id,
                expected: stops.len() + 1,
                actual: slack_times.len(),
            });
        }

        let entry = VehicleEntry {
            vehicle,
            start,
            stops,
            slack_times,
        };
        entry.validate()?;

        Ok(entry)
    }

    /// Creates an entry whose slack is derived from the stop time constraints
    /// and the end of the vehicle's service.
    pub fn with_service_end(
        vehicle: Vehicle,
        start: Start,
        stops: Vec<Stop>,
    ) -> Result<Self, VehicleEntryError> {
        let slack_times = compute_slack_times(&start, &stops, vehicle.service_end_time);
        VehicleEntry::new(vehicle, start, stops, slack_times)
    }

    fn validate(&self) -> Result<(), VehicleEntryError> {
        let capacity = self.capacity();
        let mut previous_departure = self.start.departure_time();

        for (index, waypoint) in self.waypoints().enumerate() {
            if waypoint.occupancy() > capacity {
                return Err(VehicleEntryError::CapacityExceeded {
                    vehicle: self.vehicle.external_id.clone(),
                    waypoint: index,
                    occupancy: waypoint.occupancy(),
                    capacity,
                });
            }

            if let Waypoint::Stop(stop) = waypoint
                && (stop.arrival_time() < previous_departure
                    || stop.departure_time() < stop.arrival_time())
            {
                return Err(VehicleEntryError::UnorderedWaypoint {
                    vehicle: self.vehicle.external_id.clone(),
                    waypoint: index,
                });
            }

            previous_departure = waypoint.departure_time();
        }

        let end_occupancy = self.end_occupancy();
        if end_occupancy != 0 {
            return Err(VehicleEntryError::NonZeroEndOccupancy {
                vehicle: self.vehicle.external_id.clone(),
                occupancy: end_occupancy,
            });
        }

        Ok(())
    }

    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    pub fn vehicle_id(&self) -> VehicleId {
        self.vehicle.id
    }

    pub fn capacity(&self) -> u32 {
        self.vehicle.capacity
    }

    pub fn start(&self) -> &Start {
        &self.start
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    /// Waypoint `index` of the schedule, 0 being the start.
    ///
    /// Panics if `index > stop_count()`.
    pub fn waypoint(&self, index: usize) -> Waypoint<'_> {
        if index == 0 {
            Waypoint::Start(&self.start)
        } else {
            Waypoint::Stop(&self.stops[index - 1])
        }
    }

    pub fn waypoints(&self) -> impl Iterator<Item = Waypoint<'_>> {
        std::iter::once(Waypoint::Start(&self.start)).chain(self.stops.iter().map(Waypoint::Stop))
    }

    pub fn slack_times(&self) -> &[Time] {
        &self.slack_times
    }

    pub fn slack_time(&self, index: usize) -> Time {
        self.slack_times[index]
    }

    fn end_occupancy(&self) -> u32 {
        self.stops
            .last()
            .map_or(self.start.occupancy(), Stop::outgoing_occupancy)
    }
}

/// Entry of vehicle `id`, which is usually, but not necessarily, at position
/// `id` of `entries`.
pub fn find_vehicle_entry(entries: &[VehicleEntry], id: VehicleId) -> Option<&VehicleEntry> {
    entries
        .get(id.get())
        .filter(|entry| entry.vehicle_id() == id)
        .or_else(|| entries.iter().find(|entry| entry.vehicle_id() == id))
}
