pub mod detour_time_estimator;
pub mod dispatch_snapshot;
pub mod location;
pub mod request;
pub mod slack_times;
pub mod travel_time_matrix;
pub mod vehicle_entry;
pub mod waypoint;
