use std::cmp::Ordering;

use jiff::{SignedDuration, Timestamp};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use thiserror::Error;
use tracing::{Level, debug, info, instrument, warn};

use crate::problem::{
    detour_time_estimator::DetourTimeEstimator,
    request::Request,
    travel_time_matrix::{Cost, Time},
    vehicle_entry::{VehicleEntry, VehicleId},
};

use super::{
    detour_data::InsertionWithDetourData,
    detour_time_calculator::{DetourTimeInfo, InsertionDetourTimeCalculator},
    insertion_cost_calculator::{DefaultInsertionCostCalculator, is_feasible},
    insertion_generator::for_each_insertion,
    insertion_params::InsertionParams,
};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to build the insertion thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// A feasible insertion and its price.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredInsertion {
    pub vehicle_id: VehicleId,
    pub pickup_idx: usize,
    pub dropoff_idx: usize,
    pub cost: Cost,
    pub detour_time_info: DetourTimeInfo,
}

impl ScoredInsertion {
    /// Cheapest first, ties broken by vehicle, pickup and dropoff index so
    /// that the order never depends on evaluation order.
    pub fn rank(&self, other: &ScoredInsertion) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then(self.vehicle_id.cmp(&other.vehicle_id))
            .then(self.pickup_idx.cmp(&other.pickup_idx))
            .then(self.dropoff_idx.cmp(&other.dropoff_idx))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InsertionSearchResult {
    Assigned(ScoredInsertion),
    Unassignable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertionSearchOutcome {
    pub result: InsertionSearchResult,
    pub evaluated_vehicles: usize,
    /// Vehicles left out because the deadline ran out.
    pub skipped_vehicles: usize,
}

/// Searches the cheapest feasible insertion of a request over a fleet.
///
/// Vehicles are evaluated independently on a dedicated thread pool, nothing
/// is committed to the schedules.
pub struct BestInsertionFinder<E> {
    estimator: E,
    cost_calculator: DefaultInsertionCostCalculator,
    thread_pool: rayon::ThreadPool,
    deadline: Option<SignedDuration>,
}

impl<E: DetourTimeEstimator> BestInsertionFinder<E> {
    pub fn new(estimator: E, params: &InsertionParams) -> Result<Self, DispatchError> {
        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(params.threads.number_of_threads())
            .build()?;

        Ok(BestInsertionFinder {
            estimator,
            cost_calculator: DefaultInsertionCostCalculator::new(
                InsertionDetourTimeCalculator::new(params.stop_duration),
                params.cost_strategy.into(),
            ),
            thread_pool,
            deadline: params.deadline,
        })
    }

    pub fn cost_calculator(&self) -> &DefaultInsertionCostCalculator {
        &self.cost_calculator
    }

    /// Feasible insertions of `request` into one vehicle, cheapest first.
    pub fn evaluate_vehicle(&self, request: &Request, entry: &VehicleEntry) -> Vec<ScoredInsertion> {
        let mut scored = Vec::new();

        for_each_insertion(request, entry, |insertion| {
            let data = InsertionWithDetourData::<Time>::create(request, insertion, &self.estimator);
            let detour_time_info = self
                .cost_calculator
                .detour_time_calculator()
                .calculate(request, &data);
            let cost = self.cost_calculator.calculate_with_detour_time_info(
                request,
                &insertion,
                &detour_time_info,
            );

            if is_feasible(cost) {
                scored.push(ScoredInsertion {
                    vehicle_id: insertion.vehicle_id(),
                    pickup_idx: insertion.pickup_idx,
                    dropoff_idx: insertion.dropoff_idx,
                    cost,
                    detour_time_info,
                });
            }
        });

        scored.sort_by(ScoredInsertion::rank);
        scored
    }

    /// Feasible insertions of `request` over the whole fleet, cheapest first.
    ///
    /// Vehicles left out by the deadline contribute nothing.
    #[instrument(skip_all, level = Level::DEBUG, fields(request = request.external_id()))]
    pub fn rank_insertions(&self, request: &Request, entries: &[VehicleEntry]) -> Vec<ScoredInsertion> {
        let evaluations = self.evaluate_fleet(request, entries, |scored| scored);
        warn_skipped(&evaluations);

        let mut scored = evaluations
            .into_iter()
            .flatten()
            .flatten()
            .collect::<Vec<_>>();

        scored.sort_by(ScoredInsertion::rank);
        debug!(feasible = scored.len(), "Ranked insertions");
        scored
    }

    #[instrument(skip_all, level = Level::DEBUG, fields(request = request.external_id()))]
    pub fn find_best_insertion(
        &self,
        request: &Request,
        entries: &[VehicleEntry],
    ) -> InsertionSearchOutcome {
        let evaluations =
            self.evaluate_fleet(request, entries, |scored| scored.into_iter().next());
        warn_skipped(&evaluations);

        let mut best: Option<ScoredInsertion> = None;
        let mut skipped_vehicles = 0;

        for evaluation in evaluations {
            match evaluation {
                None => skipped_vehicles += 1,
                Some(Some(candidate)) => {
                    if best
                        .as_ref()
                        .is_none_or(|best| candidate.rank(best).is_lt())
                    {
                        best = Some(candidate);
                    }
                }
                Some(None) => {}
            }
        }

        let result = match best {
            Some(best) => {
                debug!(
                    vehicle = %best.vehicle_id,
                    pickup_idx = best.pickup_idx,
                    dropoff_idx = best.dropoff_idx,
                    cost = best.cost,
                    "Found best insertion"
                );
                InsertionSearchResult::Assigned(best)
            }
            None => {
                info!(
                    request = request.external_id(),
                    "No feasible insertion, request is unassignable"
                );
                InsertionSearchResult::Unassignable
            }
        };

        InsertionSearchOutcome {
            result,
            evaluated_vehicles: entries.len() - skipped_vehicles,
            skipped_vehicles,
        }
    }

    /// Runs `evaluate_vehicle` over the fleet on the thread pool and maps each
    /// result with `map`. `None` marks a vehicle skipped by the deadline.
    fn evaluate_fleet<T: Send>(
        &self,
        request: &Request,
        entries: &[VehicleEntry],
        map: impl Fn(Vec<ScoredInsertion>) -> T + Sync,
    ) -> Vec<Option<T>> {
        let start = Timestamp::now();

        self.thread_pool.install(|| {
            entries
                .par_iter()
                .map(|entry| {
                    // Checked between vehicles, a started vehicle always completes
                    if self.is_out_of_time(start) {
                        return None;
                    }

                    Some(map(self.evaluate_vehicle(request, entry)))
                })
                .collect::<Vec<_>>()
        })
    }

    fn is_out_of_time(&self, start: Timestamp) -> bool {
        self.deadline
            .is_some_and(|deadline| Timestamp::now().duration_since(start) >= deadline)
    }
}

fn warn_skipped<T>(evaluations: &[Option<T>]) {
    let skipped_vehicles = evaluations.iter().filter(|e| e.is_none()).count();
    if skipped_vehicles > 0 {
        warn!(
            skipped_vehicles,
            "Deadline reached before every vehicle was evaluated"
        );
    }
}
