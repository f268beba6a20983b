use thiserror::Error;

use super::{location::LocationIdx, travel_time_matrix::Time};

#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    #[error("request {0} has a size of zero")]
    ZeroSize(String),

    #[error("request {id}: latest start time {latest_start} is before earliest start time {earliest_start}")]
    InvalidStartWindow {
        id: String,
        earliest_start: Time,
        latest_start: Time,
    },

    #[error("request {id}: latest arrival time {latest_arrival} is before earliest start time {earliest_start}")]
    InvalidArrival {
        id: String,
        earliest_start: Time,
        latest_arrival: Time,
    },
}

/// Time constraints of a request. Unconstrained by default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestTimes {
    pub earliest_start: Time,
    pub latest_start: Time,
    pub latest_arrival: Time,
}

impl Default for RequestTimes {
    fn default() -> Self {
        RequestTimes {
            earliest_start: Time::NEG_INFINITY,
            latest_start: Time::INFINITY,
            latest_arrival: Time::INFINITY,
        }
    }
}

/// A pickup and dropoff demand waiting to be inserted into a schedule.
#[derive(Debug, Clone)]
pub struct Request {
    external_id: String,
    from: LocationIdx,
    to: LocationIdx,
    size: u32,
    times: RequestTimes,
}

impl Request {
    /// A single passenger request without time constraints.
    pub fn new(external_id: impl Into<String>, from: LocationIdx, to: LocationIdx) -> Self {
        Request {
            external_id: external_id.into(),
            from,
            to,
            size: 1,
            times: RequestTimes::default(),
        }
    }

    pub fn with_size(mut self, size: u32) -> Result<Self, RequestError> {
        if size == 0 {
            return Err(RequestError::ZeroSize(self.external_id));
        }

        self.size = size;
        Ok(self)
    }

    pub fn with_times(mut self, times: RequestTimes) -> Result<Self, RequestError> {
        if times.latest_start < times.earliest_start {
            return Err(RequestError::InvalidStartWindow {
                id: self.external_id,
                earliest_start: times.earliest_start,
                latest_start: times.latest_start,
            });
        }

        // The latest start is usually left open, only the earliest start
        // bounds the arrival.
        if times.latest_arrival < times.earliest_start {
            return Err(RequestError::InvalidArrival {
                id: self.external_id,
                earliest_start: times.earliest_start,
                latest_arrival: times.latest_arrival,
            });
        }

        self.times = times;
        Ok(self)
    }

    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    /// Pickup location.
    pub fn from(&self) -> LocationIdx {
        self.from
    }

    /// Dropoff location.
    pub fn to(&self) -> LocationIdx {
        self.to
    }

    /// Demand units occupied between pickup and dropoff.
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn earliest_start_time(&self) -> Time {
        self.times.earliest_start
    }

    pub fn latest_start_time(&self) -> Time {
        self.times.latest_start
    }

    pub fn latest_arrival_time(&self) -> Time {
        self.times.latest_arrival
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let request = Request::new("r1", 0.into(), 1.into());

        assert_eq!(request.size(), 1);
        assert_eq!(request.latest_start_time(), Time::INFINITY);
        assert_eq!(request.latest_arrival_time(), Time::INFINITY);
    }

    #[test]
    fn test_zero_size_is_rejected() {
        let result = Request::new("r1", 0.into(), 1.into()).with_size(0);

        assert_eq!(result.unwrap_err(), RequestError::ZeroSize("r1".to_owned()));
    }

    #[test]
    fn test_inverted_start_window_is_rejected() {
        let result = Request::new("r1", 0.into(), 1.into()).with_times(RequestTimes {
            earliest_start: 100.0,
            latest_start: 50.0,
            latest_arrival: 500.0,
        });

        assert!(matches!(
            result,
            Err(RequestError::InvalidStartWindow { .. })
        ));
    }

    #[test]
    fn test_latest_arrival_alone() {
        let request = Request::new("r1", 0.into(), 1.into())
            .with_times(RequestTimes {
                latest_arrival: 600.0,
                ..RequestTimes::default()
            })
            .unwrap();

        assert_eq!(request.latest_start_time(), Time::INFINITY);
        assert_eq!(request.latest_arrival_time(), 600.0);
    }

    #[test]
    fn test_arrival_before_earliest_start_is_rejected() {
        let result = Request::new("r1", 0.into(), 1.into()).with_times(RequestTimes {
            earliest_start: 300.0,
            latest_arrival: 200.0,
            ..RequestTimes::default()
        });

        assert_eq!(
            result.unwrap_err(),
            RequestError::InvalidArrival {
                id: "r1".to_owned(),
                earliest_start: 300.0,
                latest_arrival: 200.0,
            }
        );
    }

    #[test]
    fn test_valid_times() {
        let request = Request::new("r1", 0.into(), 1.into())
            .with_size(2)
            .unwrap()
            .with_times(RequestTimes {
                earliest_start: 100.0,
                latest_start: 400.0,
                latest_arrival: 1200.0,
            })
            .unwrap();

        assert_eq!(request.size(), 2);
        assert_eq!(request.earliest_start_time(), 100.0);
        assert_eq!(request.latest_arrival_time(), 1200.0);
    }
}
