use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::problem::{
    request::Request,
    travel_time_matrix::{Cost, Time},
};

use super::{
    detour_time_calculator::DetourTimeInfo, insertion_cost_calculator::INFEASIBLE_SOLUTION_COST,
    insertion_generator::Insertion,
};

/// Slack available at the waypoints an insertion is anchored at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsertionSlack {
    pub pickup: Time,
    pub dropoff: Time,
}

impl InsertionSlack {
    pub fn of(insertion: &Insertion) -> Self {
        InsertionSlack {
            pickup: insertion.entry.slack_time(insertion.pickup_idx),
            dropoff: insertion.entry.slack_time(insertion.dropoff_idx),
        }
    }

    /// The pickup loss delays everything after the pickup, both losses
    /// delay everything after the dropoff.
    pub fn is_violated_by(&self, detour_time_info: &DetourTimeInfo) -> bool {
        detour_time_info.pickup.pickup_time_loss > self.pickup
            || detour_time_info.total_time_loss() > self.dropoff
    }
}

pub trait CostCalculationStrategy {
    fn calc_cost(
        &self,
        request: &Request,
        slack: InsertionSlack,
        detour_time_info: &DetourTimeInfo,
    ) -> Cost;
}

/// Insertions breaking the schedule or the request's time window are
/// infeasible.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectSoftConstraintViolations;

impl CostCalculationStrategy for RejectSoftConstraintViolations {
    fn calc_cost(
        &self,
        request: &Request,
        slack: InsertionSlack,
        detour_time_info: &DetourTimeInfo,
    ) -> Cost {
        if slack.is_violated_by(detour_time_info)
            || detour_time_info.pickup.departure_time > request.latest_start_time()
            || detour_time_info.dropoff.arrival_time > request.latest_arrival_time()
        {
            return INFEASIBLE_SOLUTION_COST;
        }

        detour_time_info.total_time_loss()
    }
}

/// Insertions breaking the schedule are infeasible, a late pickup or
/// arrival of the request itself is penalized per second.
#[derive(Debug, Clone, Copy)]
pub struct DiscourageSoftConstraintViolations {
    pub late_pickup_penalty: Cost,
    pub late_arrival_penalty: Cost,
}

impl Default for DiscourageSoftConstraintViolations {
    fn default() -> Self {
        DiscourageSoftConstraintViolations {
            late_pickup_penalty: 1.0,
            late_arrival_penalty: 10.0,
        }
    }
}

impl CostCalculationStrategy for DiscourageSoftConstraintViolations {
    fn calc_cost(
        &self,
        request: &Request,
        slack: InsertionSlack,
        detour_time_info: &DetourTimeInfo,
    ) -> Cost {
        if slack.is_violated_by(detour_time_info) {
            return INFEASIBLE_SOLUTION_COST;
        }

        let late_pickup =
            (detour_time_info.pickup.departure_time - request.latest_start_time()).max(0.0);
        let late_arrival =
            (detour_time_info.dropoff.arrival_time - request.latest_arrival_time()).max(0.0);

        detour_time_info.total_time_loss()
            + self.late_pickup_penalty * late_pickup
            + self.late_arrival_penalty * late_arrival
    }
}

/// Strategy selected in the configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CostStrategy {
    #[default]
    RejectSoftConstraintViolations,
    DiscourageSoftConstraintViolations,
}

#[derive(Debug, Clone, Copy)]
pub enum CostCalculationStrategyType {
    RejectSoftConstraintViolations(RejectSoftConstraintViolations),
    DiscourageSoftConstraintViolations(DiscourageSoftConstraintViolations),
}

impl CostCalculationStrategyType {
    pub fn strategy_name(&self) -> &'static str {
        match self {
            CostCalculationStrategyType::RejectSoftConstraintViolations(_) => {
                "reject_soft_constraint_violations"
            }
            CostCalculationStrategyType::DiscourageSoftConstraintViolations(_) => {
                "discourage_soft_constraint_violations"
            }
        }
    }
}

impl Default for CostCalculationStrategyType {
    fn default() -> Self {
        CostCalculationStrategyType::RejectSoftConstraintViolations(RejectSoftConstraintViolations)
    }
}

impl From<CostStrategy> for CostCalculationStrategyType {
    fn from(strategy: CostStrategy) -> Self {
        match strategy {
            CostStrategy::RejectSoftConstraintViolations => {
                CostCalculationStrategyType::RejectSoftConstraintViolations(
                    RejectSoftConstraintViolations,
                )
            }
            CostStrategy::DiscourageSoftConstraintViolations => {
                CostCalculationStrategyType::DiscourageSoftConstraintViolations(
                    DiscourageSoftConstraintViolations::default(),
                )
            }
        }
    }
}

impl CostCalculationStrategy for CostCalculationStrategyType {
    fn calc_cost(
        &self,
        request: &Request,
        slack: InsertionSlack,
        detour_time_info: &DetourTimeInfo,
    ) -> Cost {
        match self {
            CostCalculationStrategyType::RejectSoftConstraintViolations(s) => {
                s.calc_cost(request, slack, detour_time_info)
            }
            CostCalculationStrategyType::DiscourageSoftConstraintViolations(s) => {
                s.calc_cost(request, slack, detour_time_info)
            }
        }
    }
}
