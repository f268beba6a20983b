use crate::problem::{request::Request, travel_time_matrix::Time, vehicle_entry::VehicleEntry};

use super::detour_data::{DetourTime, InsertionWithDetourData};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickupDetourInfo {
    /// Time the vehicle leaves the pickup.
    pub departure_time: Time,
    /// Delay the pickup adds to every waypoint following it.
    pub pickup_time_loss: Time,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropoffDetourInfo {
    /// Time the vehicle reaches the dropoff.
    pub arrival_time: Time,
    /// Delay the dropoff adds on top of the pickup time loss to every
    /// waypoint following it.
    pub dropoff_time_loss: Time,
}

/// Timing of an insertion: when the request is picked up and dropped off,
/// and how much the rest of the schedule is delayed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetourTimeInfo {
    pub pickup: PickupDetourInfo,
    pub dropoff: DropoffDetourInfo,
}

impl DetourTimeInfo {
    pub fn new(
        departure_time: Time,
        arrival_time: Time,
        pickup_time_loss: Time,
        dropoff_time_loss: Time,
    ) -> Self {
        DetourTimeInfo {
            pickup: PickupDetourInfo {
                departure_time,
                pickup_time_loss,
            },
            dropoff: DropoffDetourInfo {
                arrival_time,
                dropoff_time_loss,
            },
        }
    }

    pub fn total_time_loss(&self) -> Time {
        self.pickup.pickup_time_loss + self.dropoff.dropoff_time_loss
    }
}

/// Turns the legs of an insertion into pickup/dropoff times and time losses.
#[derive(Debug, Clone, Copy)]
pub struct InsertionDetourTimeCalculator {
    stop_duration: Time,
}

impl InsertionDetourTimeCalculator {
    pub fn new(stop_duration: Time) -> Self {
        InsertionDetourTimeCalculator { stop_duration }
    }

    pub fn stop_duration(&self) -> Time {
        self.stop_duration
    }

    pub fn calculate<D: DetourTime>(
        &self,
        request: &Request,
        insertion: &InsertionWithDetourData<D>,
    ) -> DetourTimeInfo {
        if insertion.insertion.pickup_idx == insertion.insertion.dropoff_idx {
            return self.calculate_combined(request, insertion);
        }

        let pickup = self.calculate_pickup(request, insertion);
        let dropoff = self.calculate_dropoff(request, insertion, &pickup);

        DetourTimeInfo { pickup, dropoff }
    }

    /// Pickup and dropoff inserted back to back after the same waypoint.
    ///
    /// The whole detour is computed at once and split afterwards: the part up
    /// to the pickup departure is the pickup loss (capped by the whole
    /// detour), the remainder is the dropoff loss.
    fn calculate_combined<D: DetourTime>(
        &self,
        request: &Request,
        insertion: &InsertionWithDetourData<D>,
    ) -> DetourTimeInfo {
        let entry = insertion.insertion.entry;
        let index = insertion.insertion.pickup_idx;
        let waypoint_departure = entry.waypoint(index).departure_time();

        let departure_time = self.pickup_departure_time(request, insertion);
        let arrival_time = departure_time + insertion.time_from_pickup();

        let detour = (arrival_time - waypoint_departure
            + self.stop_duration
            + insertion.time_from_dropoff()
            - replaced_drive_time(entry, index))
        .max(0.0);
        let pickup_time_loss = (departure_time - waypoint_departure).min(detour);

        DetourTimeInfo::new(
            departure_time,
            arrival_time,
            pickup_time_loss,
            detour - pickup_time_loss,
        )
    }

    fn pickup_departure_time<D: DetourTime>(
        &self,
        request: &Request,
        insertion: &InsertionWithDetourData<D>,
    ) -> Time {
        let waypoint = insertion.insertion.entry.waypoint(insertion.insertion.pickup_idx);

        // The vehicle is already at the origin, the request boards during
        // that stop.
        if waypoint.is_stop() && waypoint.location() == request.from() {
            waypoint.departure_time().max(request.earliest_start_time())
        } else {
            let arrival = waypoint.departure_time() + insertion.time_to_pickup();
            arrival.max(request.earliest_start_time()) + self.stop_duration
        }
    }

    fn calculate_pickup<D: DetourTime>(
        &self,
        request: &Request,
        insertion: &InsertionWithDetourData<D>,
    ) -> PickupDetourInfo {
        let entry = insertion.insertion.entry;
        let pickup_idx = insertion.insertion.pickup_idx;
        let waypoint_departure = entry.waypoint(pickup_idx).departure_time();
        let departure_time = self.pickup_departure_time(request, insertion);

        let pickup_time_loss = (departure_time - waypoint_departure + insertion.time_from_pickup()
            - replaced_drive_time(entry, pickup_idx))
        .max(0.0);

        PickupDetourInfo {
            departure_time,
            pickup_time_loss,
        }
    }

    fn calculate_dropoff<D: DetourTime>(
        &self,
        request: &Request,
        insertion: &InsertionWithDetourData<D>,
        pickup: &PickupDetourInfo,
    ) -> DropoffDetourInfo {
        let entry = insertion.insertion.entry;
        let dropoff_idx = insertion.insertion.dropoff_idx;
        let waypoint = entry.waypoint(dropoff_idx);
        let stop = &entry.stops()[dropoff_idx - 1];

        if waypoint.location() == request.to() {
            // Alighting during an existing stop costs nothing extra.
            return DropoffDetourInfo {
                arrival_time: stop.arrival_time() + pickup.pickup_time_loss,
                dropoff_time_loss: 0.0,
            };
        }

        let arrival_time =
            waypoint.departure_time() + pickup.pickup_time_loss + insertion.time_to_dropoff();
        let dropoff_time_loss = insertion.time_to_dropoff()
            + self.stop_duration
            + insertion.time_from_dropoff()
            - replaced_drive_time(entry, dropoff_idx);

        DropoffDetourInfo {
            arrival_time,
            dropoff_time_loss: dropoff_time_loss.max(0.0),
        }
    }
}

/// Scheduled drive from waypoint `index` to the next one, 0 after the last
/// waypoint.
fn replaced_drive_time(entry: &VehicleEntry, index: usize) -> Time {
    if index < entry.stop_count() {
        entry.stops()[index].arrival_time() - entry.waypoint(index).departure_time()
    } else {
        0.0
    }
}
