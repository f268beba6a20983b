use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

use crate::problem::travel_time_matrix::Time;

use super::cost_calculation_strategy::CostStrategy;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InsertionParams {
    /// Time spent at a new pickup or dropoff, in seconds.
    pub stop_duration: Time,
    pub cost_strategy: CostStrategy,
    pub threads: Threads,

    /// Wall clock budget of a fleet search. Vehicles that are not evaluated
    /// before it runs out are skipped.
    pub deadline: Option<SignedDuration>,
}

impl Default for InsertionParams {
    fn default() -> Self {
        InsertionParams {
            stop_duration: 60.0,
            cost_strategy: CostStrategy::default(),
            threads: Threads::Auto,
            deadline: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Threads {
    Single,
    Auto,
    Multi(usize),
}

impl Threads {
    pub fn number_of_threads(&self) -> usize {
        match self {
            Threads::Single => 1,
            Threads::Multi(num) => (*num).max(1),
            Threads::Auto => std::thread::available_parallelism().map_or(1, |n| n.get()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_params_use_defaults() {
        let params: InsertionParams = serde_json::from_str(
            r#"{ "stop_duration": 30, "threads": { "multi": 2 }, "deadline": "2s" }"#,
        )
        .unwrap();

        assert_eq!(params.stop_duration, 30.0);
        assert_eq!(params.threads.number_of_threads(), 2);
        assert_eq!(params.deadline, Some(SignedDuration::from_secs(2)));
        assert_eq!(params.cost_strategy, CostStrategy::RejectSoftConstraintViolations);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let result = serde_json::from_str::<InsertionParams>(r#"{ "stop_time": 30 }"#);

        assert!(result.is_err());
    }

    #[test]
    fn test_number_of_threads() {
        assert_eq!(Threads::Single.number_of_threads(), 1);
        assert_eq!(Threads::Multi(0).number_of_threads(), 1);
        assert!(Threads::Auto.number_of_threads() >= 1);
    }
}
