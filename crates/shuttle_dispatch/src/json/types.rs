use std::sync::Arc;

use fxhash::FxHashSet;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::{
    insertion::best_insertion_finder::{InsertionSearchOutcome, InsertionSearchResult},
    problem::{
        detour_time_estimator::{BeelineParams, BeelineTimeEstimator},
        dispatch_snapshot::{DispatchSnapshot, SnapshotEstimator},
        location::{Location, LocationIdx},
        request::{Request, RequestError, RequestTimes},
        travel_time_matrix::{Time, TravelMatrices},
        vehicle_entry::{
            Vehicle, VehicleEntry, VehicleEntryError, VehicleId, find_vehicle_entry,
        },
        waypoint::{Start, Stop, StopTask},
    },
};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot has neither travel times nor locations to estimate them from")]
    NoTravelTimes,

    #[error("{name} matrix must be {size}x{size}")]
    InvalidMatrix { name: &'static str, size: usize },

    #[error("{name}[{from}][{to}] is {value}, expected a finite non-negative value")]
    InvalidTravelTime {
        name: &'static str,
        from: usize,
        to: usize,
        value: f64,
    },

    #[error("beeline {name} is {value}, expected a finite positive value")]
    InvalidBeeline { name: &'static str, value: f64 },

    #[error("{owner} refers to location {location_id}, snapshot has {num_locations} locations")]
    UnknownLocation {
        owner: String,
        location_id: usize,
        num_locations: usize,
    },

    #[error("duplicate vehicle id {0}")]
    DuplicateVehicle(String),

    #[error("duplicate request id {0}")]
    DuplicateRequest(String),

    #[error(transparent)]
    VehicleEntry(#[from] VehicleEntryError),

    #[error(transparent)]
    Request(#[from] RequestError),
}

/// Times are in seconds since an arbitrary reference shared by the whole
/// snapshot.
#[derive(Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename = "DispatchSnapshot")]
pub struct JsonDispatchSnapshot {
    pub locations: Option<Vec<JsonLocation>>,
    /// Square matrix of travel times between locations, in seconds.
    pub travel_times: Option<Vec<Vec<f64>>>,
    /// Square matrix of travel distances, in meters.
    pub travel_distances: Option<Vec<Vec<f64>>>,
    /// Used when no travel times are given.
    pub beeline: Option<JsonBeeline>,
    pub vehicles: Vec<JsonVehicle>,
    pub requests: Vec<JsonRequest>,
}

#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename = "Location")]
pub struct JsonLocation {
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
}

impl From<&JsonLocation> for Location {
    fn from(value: &JsonLocation) -> Self {
        Location::from_lat_lon(value.coordinates[1], value.coordinates[0])
    }
}

#[derive(Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename = "Beeline")]
pub struct JsonBeeline {
    /// Meters per second.
    pub speed: Option<f64>,
    pub distance_factor: Option<f64>,
}

#[derive(Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename = "Vehicle")]
pub struct JsonVehicle {
    pub id: String,
    pub capacity: u32,
    pub service_end_time: f64,
    pub start: JsonStart,
    pub stops: Option<Vec<JsonStop>>,
    /// One value per waypoint, start included. Derived from the stops and the
    /// service end when omitted.
    pub slack_times: Option<Vec<f64>>,
}

#[derive(Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename = "Start")]
pub struct JsonStart {
    pub location_id: usize,
    pub departure_time: f64,
    pub occupancy: Option<u32>,
}

#[derive(Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename = "Stop")]
pub struct JsonStop {
    pub location_id: usize,
    pub arrival_time: f64,
    pub departure_time: f64,
    pub latest_arrival_time: Option<f64>,
    pub latest_departure_time: Option<f64>,
    /// Occupancy on the leg leaving the stop.
    pub occupancy: u32,
}

#[derive(Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename = "Request")]
pub struct JsonRequest {
    pub id: String,
    pub from_location_id: usize,
    pub to_location_id: usize,
    pub size: Option<u32>,
    pub earliest_start_time: Option<f64>,
    pub latest_start_time: Option<f64>,
    pub latest_arrival_time: Option<f64>,
}

impl JsonDispatchSnapshot {
    #[instrument(skip_all, level = "debug")]
    pub fn build_snapshot(self) -> Result<DispatchSnapshot, SnapshotError> {
        let estimator = self.build_estimator()?;
        let num_locations = match &estimator {
            SnapshotEstimator::Matrix(matrices) => matrices.num_locations(),
            SnapshotEstimator::Beeline(_) => self.locations.as_ref().map_or(0, Vec::len),
        };
        let location = |owner: &str, location_id: usize| {
            if location_id < num_locations {
                Ok(LocationIdx::new(location_id))
            } else {
                Err(SnapshotError::UnknownLocation {
                    owner: owner.to_owned(),
                    location_id,
                    num_locations,
                })
            }
        };

        let mut vehicle_ids = FxHashSet::default();
        let mut entries = Vec::with_capacity(self.vehicles.len());

        for (index, vehicle) in self.vehicles.into_iter().enumerate() {
            if !vehicle_ids.insert(vehicle.id.clone()) {
                return Err(SnapshotError::DuplicateVehicle(vehicle.id));
            }

            let owner = format!("vehicle {}", vehicle.id);
            let start = Start::new(
                location(&owner, vehicle.start.location_id)?,
                vehicle.start.departure_time,
                vehicle.start.occupancy.unwrap_or(0),
            );
            let stops = vehicle
                .stops
                .unwrap_or_default()
                .into_iter()
                .map(|stop| -> Result<Stop, SnapshotError> {
                    Ok(Stop::new(
                        location(&owner, stop.location_id)?,
                        StopTask {
                            arrival_time: stop.arrival_time,
                            departure_time: stop.departure_time,
                            latest_arrival_time: stop.latest_arrival_time.unwrap_or(Time::INFINITY),
                            latest_departure_time: stop
                                .latest_departure_time
                                .unwrap_or(Time::INFINITY),
                        },
                        stop.occupancy,
                    ))
                })
                .collect::<Result<Vec<_>, _>>()?;

            let vehicle_info = Vehicle {
                id: VehicleId::new(index),
                external_id: vehicle.id,
                capacity: vehicle.capacity,
                service_end_time: vehicle.service_end_time,
            };

            let entry = match vehicle.slack_times {
                Some(slack_times) => VehicleEntry::new(vehicle_info, start, stops, slack_times)?,
                None => VehicleEntry::with_service_end(vehicle_info, start, stops)?,
            };
            entries.push(entry);
        }

        let mut request_ids = FxHashSet::default();
        let requests = self
            .requests
            .into_iter()
            .map(|request| -> Result<Request, SnapshotError> {
                if !request_ids.insert(request.id.clone()) {
                    return Err(SnapshotError::DuplicateRequest(request.id));
                }

                let owner = format!("request {}", request.id);
                let from = location(&owner, request.from_location_id)?;
                let to = location(&owner, request.to_location_id)?;
                let defaults = RequestTimes::default();

                Ok(Request::new(request.id, from, to)
                    .with_size(request.size.unwrap_or(1))?
                    .with_times(RequestTimes {
                        earliest_start: request.earliest_start_time.unwrap_or(defaults.earliest_start),
                        latest_start: request.latest_start_time.unwrap_or(defaults.latest_start),
                        latest_arrival: request
                            .latest_arrival_time
                            .unwrap_or(defaults.latest_arrival),
                    })?)
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            vehicles = entries.len(),
            requests = requests.len(),
            estimator = estimator.estimator_name(),
            "Built dispatch snapshot"
        );

        Ok(DispatchSnapshot {
            estimator,
            entries,
            requests,
        })
    }

    fn build_estimator(&self) -> Result<SnapshotEstimator, SnapshotError> {
        if let Some(times) = &self.travel_times {
            let size = times.len();
            ensure_square("travel_times", times, size)?;
            ensure_non_negative("travel_times", times)?;

            let matrices = match &self.travel_distances {
                Some(distances) => {
                    ensure_square("travel_distances", distances, size)?;
                    ensure_non_negative("travel_distances", distances)?;
                    TravelMatrices::new(distances.clone(), times.clone())
                }
                None => TravelMatrices::from_times(times.clone()),
            };

            return Ok(SnapshotEstimator::Matrix(matrices));
        }

        let Some(locations) = &self.locations else {
            return Err(SnapshotError::NoTravelTimes);
        };

        let defaults = BeelineParams::default();
        let params = match &self.beeline {
            Some(beeline) => BeelineParams {
                speed: beeline.speed.unwrap_or(defaults.speed),
                distance_factor: beeline.distance_factor.unwrap_or(defaults.distance_factor),
            },
            None => defaults,
        };
        ensure_positive("speed", params.speed)?;
        ensure_positive("distance_factor", params.distance_factor)?;

        Ok(SnapshotEstimator::Beeline(BeelineTimeEstimator::new(
            Arc::new(locations.iter().map(Location::from).collect()),
            params,
        )))
    }
}

fn ensure_square(name: &'static str, matrix: &[Vec<f64>], size: usize) -> Result<(), SnapshotError> {
    if matrix.len() != size || matrix.iter().any(|row| row.len() != size) {
        return Err(SnapshotError::InvalidMatrix { name, size });
    }

    Ok(())
}

fn ensure_non_negative(name: &'static str, matrix: &[Vec<f64>]) -> Result<(), SnapshotError> {
    for (from, row) in matrix.iter().enumerate() {
        if let Some((to, &value)) = row
            .iter()
            .enumerate()
            .find(|(_, value)| !value.is_finite() || **value < 0.0)
        {
            return Err(SnapshotError::InvalidTravelTime {
                name,
                from,
                to,
                value,
            });
        }
    }

    Ok(())
}

fn ensure_positive(name: &'static str, value: f64) -> Result<(), SnapshotError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SnapshotError::InvalidBeeline { name, value });
    }

    Ok(())
}

/// Outcome of the search for one request.
#[derive(Serialize, JsonSchema)]
#[serde(rename = "InsertionResult")]
pub struct JsonInsertionResult {
    pub request_id: String,
    pub vehicle_id: Option<String>,
    pub pickup_idx: Option<usize>,
    pub dropoff_idx: Option<usize>,
    pub cost: Option<f64>,
    pub pickup_time: Option<f64>,
    pub dropoff_time: Option<f64>,
    pub skipped_vehicles: usize,
}

impl JsonInsertionResult {
    pub fn from_outcome(
        request: &Request,
        outcome: &InsertionSearchOutcome,
        entries: &[VehicleEntry],
    ) -> Self {
        let mut result = JsonInsertionResult {
            request_id: request.external_id().to_owned(),
            vehicle_id: None,
            pickup_idx: None,
            dropoff_idx: None,
            cost: None,
            pickup_time: None,
            dropoff_time: None,
            skipped_vehicles: outcome.skipped_vehicles,
        };

        if let InsertionSearchResult::Assigned(best) = &outcome.result {
            result.vehicle_id = Some(
                find_vehicle_entry(entries, best.vehicle_id)
                    .map_or_else(|| best.vehicle_id.to_string(), |entry| {
                        entry.vehicle().external_id.clone()
                    }),
            );
            result.pickup_idx = Some(best.pickup_idx);
            result.dropoff_idx = Some(best.dropoff_idx);
            result.cost = Some(best.cost);
            result.pickup_time = Some(best.detour_time_info.pickup.departure_time);
            result.dropoff_time = Some(best.detour_time_info.dropoff.arrival_time);
        }

        result
    }
}
