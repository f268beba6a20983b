use std::sync::Arc;

use super::location::{Location, LocationIdx};

pub type Distance = f64;
pub type Time = f64;
pub type Cost = f64;

/// Travel times and distances between every pair of locations.
///
/// Both matrices are stored flat: the entry for a pair of locations is at
/// `from * num_locations + to`.
#[derive(Debug, Clone)]
pub struct TravelMatrices {
    distances: Arc<Vec<Distance>>,
    times: Arc<Vec<Time>>,
    num_locations: usize,
}

impl TravelMatrices {
    pub fn new(distances: Vec<Vec<Distance>>, times: Vec<Vec<Time>>) -> Self {
        let num_locations = times.len();

        TravelMatrices {
            distances: Arc::new(distances.into_iter().flatten().collect()),
            times: Arc::new(times.into_iter().flatten().collect()),
            num_locations,
        }
    }

    /// Matrices of a network where only times are known. Distances mirror
    /// the times.
    pub fn from_times(times: Vec<Vec<Time>>) -> Self {
        let num_locations = times.len();
        let times = Arc::new(times.into_iter().flatten().collect::<Vec<_>>());

        TravelMatrices {
            distances: Arc::clone(&times),
            times,
            num_locations,
        }
    }

    /// Straight-line distances on a plane, driven at `speed` units per second.
    pub fn from_euclidean(locations: &[Location], speed: f64) -> Self {
        let num_locations = locations.len();
        let mut distances: Vec<Distance> = vec![0.0; num_locations * num_locations];
        let mut times: Vec<Time> = vec![0.0; num_locations * num_locations];

        for (i, from) in locations.iter().enumerate() {
            for (j, to) in locations.iter().enumerate() {
                let index = i * num_locations + j;
                distances[index] = from.euclidean_distance(to);
                times[index] = distances[index] / speed;
            }
        }

        TravelMatrices {
            distances: Arc::new(distances),
            times: Arc::new(times),
            num_locations,
        }
    }

    #[inline(always)]
    fn index(&self, from: LocationIdx, to: LocationIdx) -> usize {
        assert!(
            from.get() < self.num_locations && to.get() < self.num_locations,
            "location pair ({from}, {to}) is outside a matrix of {} locations",
            self.num_locations
        );

        from.get() * self.num_locations + to.get()
    }

    #[inline(always)]
    pub fn travel_time(&self, from: LocationIdx, to: LocationIdx) -> Time {
        if from == to {
            return 0.0;
        }

        self.times[self.index(from, to)]
    }

    #[inline(always)]
    pub fn travel_distance(&self, from: LocationIdx, to: LocationIdx) -> Distance {
        if from == to {
            return 0.0;
        }

        self.distances[self.index(from, to)]
    }

    pub fn num_locations(&self) -> usize {
        self.num_locations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_travel_time_flat_index() {
        let matrices = TravelMatrices::from_times(vec![
            vec![0.0, 10.0, 20.0],
            vec![11.0, 0.0, 30.0],
            vec![21.0, 31.0, 0.0],
        ]);

        assert_eq!(matrices.num_locations(), 3);
        assert_eq!(matrices.travel_time(0.into(), 2.into()), 20.0);
        assert_eq!(matrices.travel_time(2.into(), 1.into()), 31.0);
        assert_eq!(matrices.travel_distance(1.into(), 2.into()), 30.0);
    }

    #[test]
    fn test_same_location_is_free() {
        let matrices = TravelMatrices::from_times(vec![vec![5.0]]);

        assert_eq!(matrices.travel_time(0.into(), 0.into()), 0.0);
    }

    #[test]
    fn test_from_euclidean() {
        let locations = vec![
            Location::from_cartesian(0.0, 0.0),
            Location::from_cartesian(30.0, 40.0),
        ];
        let matrices = TravelMatrices::from_euclidean(&locations, 10.0);

        assert_eq!(matrices.travel_distance(0.into(), 1.into()), 50.0);
        assert_eq!(matrices.travel_time(1.into(), 0.into()), 5.0);
    }

    #[test]
    #[should_panic(expected = "outside a matrix")]
    fn test_unknown_location_is_a_contract_violation() {
        let matrices = TravelMatrices::from_times(vec![vec![0.0, 1.0], vec![1.0, 0.0]]);

        matrices.travel_time(0.into(), 5.into());
    }
}
