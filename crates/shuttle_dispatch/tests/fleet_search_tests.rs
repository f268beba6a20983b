use shuttle_dispatch::{
    insertion::{
        best_insertion_finder::{BestInsertionFinder, InsertionSearchResult},
        cost_calculation_strategy::CostStrategy,
        insertion_generator::generate_insertions,
        insertion_params::{InsertionParams, Threads},
    },
    json::types::{JsonDispatchSnapshot, JsonInsertionResult},
    problem::{
        request::{Request, RequestTimes},
        travel_time_matrix::Time,
        vehicle_entry::{VehicleEntry, VehicleId},
    },
};

use crate::test_utils::{TestStop, TestVehicle};

mod test_utils;

//  Y-axis
//  ^
//  | (20) (21) (22) (23) (24)
//  | (15) (16) (17) (18) (19)
//  | (10) (11) (12) (13) (14)
//  |  (5)  (6)  (7)  (8)  (9)
//  |  (0)  (1)  (2)  (3)  (4)
//  +--------------------------> X-axis
const GRID: usize = 5;

fn params(cost_strategy: CostStrategy) -> InsertionParams {
    InsertionParams {
        stop_duration: 0.0,
        cost_strategy,
        threads: Threads::Multi(2),
        deadline: None,
    }
}

/// Vehicle 0 drives 0 -> 4 -> 24 with a passenger between 4 and 24,
/// vehicle 1 waits at 12.
fn fleet() -> Vec<VehicleEntry> {
    vec![
        test_utils::create_entry(TestVehicle {
            stops: vec![TestStop::new(4, 4.0, 1), TestStop::new(24, 8.0, 0)],
            ..TestVehicle::idle(0, 0)
        }),
        test_utils::create_entry(TestVehicle::idle(1, 12)),
    ]
}

fn request(latest_arrival: Time) -> Request {
    Request::new("r1", 2.into(), 14.into())
        .with_times(RequestTimes {
            latest_arrival,
            ..RequestTimes::default()
        })
        .unwrap()
}

fn assigned(result: InsertionSearchResult) -> (VehicleId, usize, usize, f64) {
    match result {
        InsertionSearchResult::Assigned(best) => {
            (best.vehicle_id, best.pickup_idx, best.dropoff_idx, best.cost)
        }
        InsertionSearchResult::Unassignable => panic!("expected an insertion"),
    }
}

#[test]
fn test_request_on_the_way_costs_nothing() {
    let finder = BestInsertionFinder::new(
        test_utils::create_grid_matrices(GRID, GRID),
        &params(CostStrategy::RejectSoftConstraintViolations),
    )
    .unwrap();

    let outcome = finder.find_best_insertion(&request(Time::INFINITY), &fleet());

    // 2 is on the way to 4, 14 on the way to 24
    assert_eq!(assigned(outcome.result), (VehicleId::new(0), 0, 1, 0.0));
}

#[test]
fn test_latest_arrival_moves_the_dropoff_forward() {
    let finder = BestInsertionFinder::new(
        test_utils::create_grid_matrices(GRID, GRID),
        &params(CostStrategy::RejectSoftConstraintViolations),
    )
    .unwrap();

    let outcome = finder.find_best_insertion(&request(5.0), &fleet());

    // Arriving at 14 after 4 takes until t=6, going straight 2 -> 14 first
    // arrives at t=4.83
    let (vehicle_id, pickup_idx, dropoff_idx, cost) = assigned(outcome.result);
    assert_eq!((vehicle_id, pickup_idx, dropoff_idx), (VehicleId::new(0), 0, 0));
    assert!((cost - 8.0_f64.sqrt()).abs() < 1e-9);
}

#[test]
fn test_unreachable_window_is_rejected_or_penalized() {
    let matrices = test_utils::create_grid_matrices(GRID, GRID);

    let rejecting = BestInsertionFinder::new(
        matrices.clone(),
        &params(CostStrategy::RejectSoftConstraintViolations),
    )
    .unwrap();
    assert_eq!(
        rejecting.find_best_insertion(&request(3.0), &fleet()).result,
        InsertionSearchResult::Unassignable
    );

    let discouraging = BestInsertionFinder::new(
        matrices,
        &params(CostStrategy::DiscourageSoftConstraintViolations),
    )
    .unwrap();
    let (vehicle_id, pickup_idx, dropoff_idx, cost) =
        assigned(discouraging.find_best_insertion(&request(3.0), &fleet()).result);

    let detour = 8.0_f64.sqrt();
    assert_eq!((vehicle_id, pickup_idx, dropoff_idx), (VehicleId::new(0), 0, 0));
    assert!((cost - (detour + 10.0 * (2.0 + detour - 3.0))).abs() < 1e-9);
}

#[test]
fn test_feasible_insertions_respect_slack() {
    let matrices = test_utils::create_grid_matrices(GRID, GRID);
    let finder = BestInsertionFinder::new(
        matrices,
        &params(CostStrategy::RejectSoftConstraintViolations),
    )
    .unwrap();

    let entry = test_utils::create_entry(TestVehicle {
        stops: vec![
            TestStop::new(6, 2.0_f64.sqrt(), 2).latest_arrival(3.0),
            TestStop::new(18, 2.0_f64.sqrt() + 8.0_f64.sqrt() * 2.0, 1).latest_arrival(10.0),
            TestStop::new(24, 2.0_f64.sqrt() + 8.0_f64.sqrt() * 3.0, 0),
        ],
        service_end_time: 30.0,
        ..TestVehicle::idle(0, 0)
    });

    let mut feasible = 0;
    for (from, to) in [(1, 3), (5, 20), (7, 13), (10, 4), (22, 2), (12, 24)] {
        let request = Request::new(format!("{from}-{to}"), from.into(), to.into());
        let scored = finder.evaluate_vehicle(&request, &entry);

        assert!(scored.len() <= generate_insertions(&request, &entry).len());

        for insertion in &scored {
            let info = &insertion.detour_time_info;
            let pickup_slack = entry.slack_time(insertion.pickup_idx);
            let dropoff_slack = entry.slack_time(insertion.dropoff_idx);

            assert!(info.pickup.pickup_time_loss <= pickup_slack);
            assert!(info.total_time_loss() <= dropoff_slack);
            assert_eq!(insertion.cost, info.total_time_loss());
        }

        feasible += scored.len();
    }

    assert!(feasible > 0);
}

#[test]
fn test_result_does_not_depend_on_threads() {
    let entries = (0..12)
        .map(|id| test_utils::create_entry(TestVehicle::idle(id, (id * 7) % (GRID * GRID))))
        .collect::<Vec<_>>();
    let requests = (0..GRID * GRID)
        .map(|from| Request::new(format!("r{from}"), from.into(), (24 - from).into()))
        .collect::<Vec<_>>();

    let results = [Threads::Single, Threads::Multi(4)].map(|threads| {
        let finder = BestInsertionFinder::new(
            test_utils::create_grid_matrices(GRID, GRID),
            &InsertionParams {
                threads,
                ..params(CostStrategy::RejectSoftConstraintViolations)
            },
        )
        .unwrap();

        requests
            .iter()
            .map(|request| finder.find_best_insertion(request, &entries).result)
            .collect::<Vec<_>>()
    });

    assert_eq!(results[0], results[1]);
}

#[test]
fn test_snapshot_end_to_end() {
    let json: JsonDispatchSnapshot = serde_json::from_str(
        r#"{
            "travel_times": [
                [0, 60, 120, 180],
                [60, 0, 60, 120],
                [120, 60, 0, 60],
                [180, 120, 60, 0]
            ],
            "vehicles": [
                {
                    "id": "far",
                    "capacity": 2,
                    "service_end_time": 7200,
                    "start": { "location_id": 3, "departure_time": 0 }
                },
                {
                    "id": "near",
                    "capacity": 2,
                    "service_end_time": 7200,
                    "start": { "location_id": 0, "departure_time": 0 }
                }
            ],
            "requests": [
                { "id": "r1", "from_location_id": 1, "to_location_id": 2 },
                { "id": "r2", "from_location_id": 1, "to_location_id": 2, "size": 3 }
            ]
        }"#,
    )
    .unwrap();
    let snapshot = json.build_snapshot().unwrap();
    let finder = BestInsertionFinder::new(
        snapshot.estimator,
        &InsertionParams {
            stop_duration: 30.0,
            ..InsertionParams::default()
        },
    )
    .unwrap();

    let results = snapshot
        .requests
        .iter()
        .map(|request| {
            let outcome = finder.find_best_insertion(request, &snapshot.entries);
            JsonInsertionResult::from_outcome(request, &outcome, &snapshot.entries)
        })
        .collect::<Vec<_>>();

    assert_eq!(results[0].vehicle_id.as_deref(), Some("near"));
    assert_eq!(results[0].pickup_time, Some(90.0));
    assert_eq!(results[0].dropoff_time, Some(150.0));
    assert_eq!(results[0].cost, Some(180.0));

    // Larger than any vehicle
    assert_eq!(results[1].vehicle_id, None);
    assert_eq!(results[1].cost, None);
}
