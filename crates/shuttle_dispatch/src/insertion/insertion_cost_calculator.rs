use crate::problem::{request::Request, travel_time_matrix::Cost};

use super::{
    cost_calculation_strategy::{
        CostCalculationStrategy, CostCalculationStrategyType, InsertionSlack,
    },
    detour_data::{DetourTime, InsertionWithDetourData},
    detour_time_calculator::{DetourTimeInfo, InsertionDetourTimeCalculator},
    insertion_generator::Insertion,
};

/// Cost of an insertion that must never be selected.
pub const INFEASIBLE_SOLUTION_COST: Cost = f64::INFINITY;

pub fn is_feasible(cost: Cost) -> bool {
    cost < INFEASIBLE_SOLUTION_COST
}

/// Computes the timing of an insertion and prices it with the configured
/// strategy.
#[derive(Debug, Clone, Copy)]
pub struct DefaultInsertionCostCalculator {
    detour_time_calculator: InsertionDetourTimeCalculator,
    strategy: CostCalculationStrategyType,
}

impl DefaultInsertionCostCalculator {
    pub fn new(
        detour_time_calculator: InsertionDetourTimeCalculator,
        strategy: CostCalculationStrategyType,
    ) -> Self {
        DefaultInsertionCostCalculator {
            detour_time_calculator,
            strategy,
        }
    }

    pub fn detour_time_calculator(&self) -> &InsertionDetourTimeCalculator {
        &self.detour_time_calculator
    }

    pub fn strategy(&self) -> &CostCalculationStrategyType {
        &self.strategy
    }

    pub fn calculate<D: DetourTime>(
        &self,
        request: &Request,
        insertion: &InsertionWithDetourData<D>,
    ) -> Cost {
        let detour_time_info = self.detour_time_calculator.calculate(request, insertion);
        self.calculate_with_detour_time_info(request, &insertion.insertion, &detour_time_info)
    }

    pub fn calculate_with_detour_time_info(
        &self,
        request: &Request,
        insertion: &Insertion,
        detour_time_info: &DetourTimeInfo,
    ) -> Cost {
        self.strategy
            .calc_cost(request, InsertionSlack::of(insertion), detour_time_info)
    }
}
