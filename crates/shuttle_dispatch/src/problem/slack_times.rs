use super::{
    travel_time_matrix::Time,
    waypoint::{Start, Stop},
};

/// Computes the slack of every waypoint of a schedule.
///
/// `slack[k]` is the largest delay that can be introduced right after
/// waypoint `k` (0 is the start) without violating the latest times of the
/// following stops or the end of the vehicle's service. The result has one
/// entry per waypoint, i.e. `stops.len() + 1`.
pub fn compute_slack_times(start: &Start, stops: &[Stop], service_end_time: Time) -> Vec<Time> {
    let mut slack_times = vec![0.0; stops.len() + 1];

    let schedule_end_time = stops
        .last()
        .map_or(start.departure_time(), Stop::departure_time);

    let mut slack = service_end_time - schedule_end_time;
    slack_times[stops.len()] = slack;

    for (index, stop) in stops.iter().enumerate().rev() {
        slack = slack.min(stop.task().slack_time());
        slack_times[index] = slack;
    }

    slack_times
}

#[cfg(test)]
mod tests {
    use crate::problem::waypoint::StopTask;

    use super::*;

    fn stop(arrival: Time, departure: Time, latest_arrival: Time, latest_departure: Time) -> Stop {
        Stop::new(
            0.into(),
            StopTask {
                arrival_time: arrival,
                departure_time: departure,
                latest_arrival_time: latest_arrival,
                latest_departure_time: latest_departure,
            },
            0,
        )
    }

    #[test]
    fn test_no_stops_only_vehicle_slack() {
        let start = Start::new(0.into(), 100.0, 0);

        assert_eq!(compute_slack_times(&start, &[], 1000.0), vec![900.0]);
    }

    #[test]
    fn test_slack_is_minimum_over_following_stops() {
        let start = Start::new(0.into(), 0.0, 1);
        let stops = vec![
            // 50s of slack on arrival
            stop(100.0, 160.0, 150.0, Time::INFINITY),
            // 200s of slack on departure
            stop(300.0, 360.0, Time::INFINITY, 560.0),
            stop(500.0, 560.0, Time::INFINITY, Time::INFINITY),
        ];

        let slack_times = compute_slack_times(&start, &stops, 1000.0);

        assert_eq!(slack_times, vec![50.0, 200.0, 440.0, 440.0]);
    }

    #[test]
    fn test_late_schedule_has_negative_slack() {
        let start = Start::new(0.into(), 0.0, 1);
        let stops = vec![stop(100.0, 160.0, 90.0, Time::INFINITY)];

        assert_eq!(compute_slack_times(&start, &stops, 1000.0), vec![-10.0, 840.0]);
    }
}
