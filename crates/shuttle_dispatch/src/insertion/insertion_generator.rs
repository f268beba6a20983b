use crate::problem::{
    request::Request,
    vehicle_entry::{VehicleEntry, VehicleId},
};

/// Placement of a request's pickup and dropoff into one vehicle schedule.
///
/// Both indices refer to waypoints of the original schedule (0 is the
/// vehicle's current position): the pickup is inserted right after waypoint
/// `pickup_idx` and the dropoff right after waypoint `dropoff_idx`. When both
/// are equal the dropoff directly follows the pickup.
#[derive(Debug, Clone, Copy)]
pub struct Insertion<'a> {
    pub entry: &'a VehicleEntry,
    pub pickup_idx: usize,
    pub dropoff_idx: usize,
}

impl Insertion<'_> {
    pub fn vehicle_id(&self) -> VehicleId {
        self.entry.vehicle_id()
    }

    pub fn indices(&self) -> (usize, usize) {
        (self.pickup_idx, self.dropoff_idx)
    }
}

#[inline]
fn has_room(occupancy: u32, size: u32, capacity: u32) -> bool {
    capacity.saturating_sub(occupancy) >= size
}

/// Calls `f` for every insertion of `request` into `entry` that keeps the
/// occupancy within capacity on every leg, ordered by pickup then dropoff
/// index.
///
/// Insertions that only differ from another one by a zero-length detour
/// (pickup or dropoff at the location of the following stop) are emitted
/// once, anchored at that stop.
pub fn for_each_insertion<'a>(
    request: &Request,
    entry: &'a VehicleEntry,
    mut f: impl FnMut(Insertion<'a>),
) {
    let capacity = entry.capacity();
    let stop_count = entry.stop_count();

    for pickup_idx in 0..=stop_count {
        if !has_room(entry.waypoint(pickup_idx).occupancy(), request.size(), capacity) {
            continue;
        }

        // Picking up at the next stop is generated from that stop.
        if pickup_idx < stop_count && entry.stops()[pickup_idx].location() == request.from() {
            continue;
        }

        for_each_dropoff(request, entry, pickup_idx, &mut f);
    }
}

fn for_each_dropoff<'a>(
    request: &Request,
    entry: &'a VehicleEntry,
    pickup_idx: usize,
    f: &mut impl FnMut(Insertion<'a>),
) {
    let capacity = entry.capacity();
    let stop_count = entry.stop_count();

    let insertion = |dropoff_idx| Insertion {
        entry,
        pickup_idx,
        dropoff_idx,
    };

    for dropoff_idx in pickup_idx..stop_count {
        let next_stop = &entry.stops()[dropoff_idx];
        let at_next_stop = next_stop.location() == request.to();

        // Dropping off at the next stop is generated from that stop.
        if !at_next_stop {
            f(insertion(dropoff_idx));
        }

        if !has_room(next_stop.outgoing_occupancy(), request.size(), capacity) {
            // The dropoff happens at the stop, before its outgoing leg.
            if at_next_stop {
                f(insertion(dropoff_idx + 1));
            }
            return;
        }
    }

    f(insertion(stop_count));
}

/// Collects [`for_each_insertion`].
pub fn generate_insertions<'a>(request: &Request, entry: &'a VehicleEntry) -> Vec<Insertion<'a>> {
    let mut insertions = Vec::new();
    for_each_insertion(request, entry, |insertion| insertions.push(insertion));
    insertions
}
