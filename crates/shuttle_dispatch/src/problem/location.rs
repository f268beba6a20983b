use geo::{Distance, Euclidean, Haversine};

use crate::define_index_newtype;

define_index_newtype!(LocationIdx, Location);

/// A point of the road network a waypoint or request refers to.
///
/// Schedules and requests only carry a [`LocationIdx`]; two waypoints are at
/// the same place exactly when their indices are equal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    point: geo::Point,
}

impl Location {
    pub fn from_cartesian(x: f64, y: f64) -> Self {
        Self {
            point: geo::Point::new(x, y),
        }
    }

    pub fn from_lat_lon(lat: f64, lon: f64) -> Self {
        Self {
            point: geo::Point::new(lon, lat),
        }
    }

    pub fn euclidean_distance(&self, to: &Location) -> f64 {
        Euclidean.distance(&self.point, &to.point)
    }

    /// Great-circle distance in meters.
    pub fn haversine_distance(&self, to: &Location) -> f64 {
        Haversine.distance(self.point, to.point)
    }
}
