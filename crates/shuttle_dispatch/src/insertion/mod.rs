pub mod best_insertion_finder;
pub mod cost_calculation_strategy;
pub mod detour_data;
pub mod detour_time_calculator;
pub mod insertion_cost_calculator;
pub mod insertion_generator;
pub mod insertion_params;
