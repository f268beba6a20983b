#![allow(dead_code)]

use shuttle_dispatch::problem::{
    location::Location,
    travel_time_matrix::{Time, TravelMatrices},
    vehicle_entry::{Vehicle, VehicleEntry, VehicleId},
    waypoint::{Start, Stop, StopTask},
};

/// Location `y * width + x` is at `(x, y)`.
pub fn create_location_grid(width: usize, height: usize) -> Vec<Location> {
    (0..height)
        .flat_map(|y| (0..width).map(move |x| Location::from_cartesian(x as f64, y as f64)))
        .collect()
}

/// One unit of distance per second.
pub fn create_grid_matrices(width: usize, height: usize) -> TravelMatrices {
    TravelMatrices::from_euclidean(&create_location_grid(width, height), 1.0)
}

pub struct TestStop {
    pub location: usize,
    pub arrival: Time,
    pub occupancy: u32,
    pub latest_arrival: Option<Time>,
}

impl TestStop {
    pub fn new(location: usize, arrival: Time, occupancy: u32) -> Self {
        TestStop {
            location,
            arrival,
            occupancy,
            latest_arrival: None,
        }
    }

    pub fn latest_arrival(mut self, latest_arrival: Time) -> Self {
        self.latest_arrival = Some(latest_arrival);
        self
    }
}

pub struct TestVehicle {
    pub id: usize,
    pub capacity: u32,
    pub start_location: usize,
    pub start_occupancy: u32,
    pub service_end_time: Time,
    pub stops: Vec<TestStop>,
}

impl TestVehicle {
    pub fn idle(id: usize, start_location: usize) -> Self {
        TestVehicle {
            id,
            capacity: 4,
            start_location,
            start_occupancy: 0,
            service_end_time: 1000.0,
            stops: vec![],
        }
    }
}

/// Stops are left as soon as they are reached.
pub fn create_entry(vehicle: TestVehicle) -> VehicleEntry {
    let stops = vehicle
        .stops
        .iter()
        .map(|stop| {
            Stop::new(
                stop.location.into(),
                StopTask {
                    arrival_time: stop.arrival,
                    departure_time: stop.arrival,
                    latest_arrival_time: stop.latest_arrival.unwrap_or(Time::INFINITY),
                    latest_departure_time: Time::INFINITY,
                },
                stop.occupancy,
            )
        })
        .collect();

    VehicleEntry::with_service_end(
        Vehicle {
            id: VehicleId::new(vehicle.id),
            external_id: format!("v{}", vehicle.id),
            capacity: vehicle.capacity,
            service_end_time: vehicle.service_end_time,
        },
        Start::new(vehicle.start_location.into(), 0.0, vehicle.start_occupancy),
        stops,
    )
    .unwrap()
}
