use super::{location::LocationIdx, travel_time_matrix::Time};

/// Current position of a vehicle, i.e. where its planned schedule begins.
#[derive(Debug, Clone)]
pub struct Start {
    location: LocationIdx,
    departure_time: Time,
    occupancy: u32,
}

impl Start {
    pub fn new(location: LocationIdx, departure_time: Time, occupancy: u32) -> Self {
        Start {
            location,
            departure_time,
            occupancy,
        }
    }

    pub fn location(&self) -> LocationIdx {
        self.location
    }

    /// Earliest time the vehicle can leave its current position.
    pub fn departure_time(&self) -> Time {
        self.departure_time
    }

    pub fn occupancy(&self) -> u32 {
        self.occupancy
    }
}

/// Scheduled service window of a stop together with the latest times the
/// already assigned requests tolerate.
#[derive(Debug, Clone, Copy)]
pub struct StopTask {
    pub arrival_time: Time,
    pub departure_time: Time,
    pub latest_arrival_time: Time,
    pub latest_departure_time: Time,
}

impl StopTask {
    /// A task without constraints of its own.
    pub fn unconstrained(arrival_time: Time, departure_time: Time) -> Self {
        StopTask {
            arrival_time,
            departure_time,
            latest_arrival_time: Time::INFINITY,
            latest_departure_time: Time::INFINITY,
        }
    }

    /// Delay this stop can absorb before one of its latest times is violated.
    pub fn slack_time(&self) -> Time {
        (self.latest_arrival_time - self.arrival_time)
            .min(self.latest_departure_time - self.departure_time)
    }
}

#[derive(Debug, Clone)]
pub struct Stop {
    location: LocationIdx,
    task: StopTask,
    outgoing_occupancy: u32,
}

impl Stop {
    pub fn new(location: LocationIdx, task: StopTask, outgoing_occupancy: u32) -> Self {
        Stop {
            location,
            task,
            outgoing_occupancy,
        }
    }

    pub fn location(&self) -> LocationIdx {
        self.location
    }

    pub fn task(&self) -> &StopTask {
        &self.task
    }

    pub fn arrival_time(&self) -> Time {
        self.task.arrival_time
    }

    pub fn departure_time(&self) -> Time {
        self.task.departure_time
    }

    /// Occupancy on the leg leaving this stop.
    pub fn outgoing_occupancy(&self) -> u32 {
        self.outgoing_occupancy
    }
}

/// One position of a vehicle schedule.
#[derive(Debug, Clone, Copy)]
pub enum Waypoint<'a> {
    Start(&'a Start),
    Stop(&'a Stop),
}

impl Waypoint<'_> {
    pub fn location(&self) -> LocationIdx {
        match self {
            Waypoint::Start(start) => start.location(),
            Waypoint::Stop(stop) => stop.location(),
        }
    }

    pub fn departure_time(&self) -> Time {
        match self {
            Waypoint::Start(start) => start.departure_time(),
            Waypoint::Stop(stop) => stop.departure_time(),
        }
    }

    /// Occupancy on the leg leaving this waypoint.
    pub fn occupancy(&self) -> u32 {
        match self {
            Waypoint::Start(start) => start.occupancy(),
            Waypoint::Stop(stop) => stop.outgoing_occupancy(),
        }
    }

    pub fn is_stop(&self) -> bool {
        matches!(self, Waypoint::Stop(_))
    }
}
