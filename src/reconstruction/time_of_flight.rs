//! Time-of-flight hit reconstruction.
//!
//! Each point on a track is stamped with an arrival time derived from the
//! change in its distance to the origin:
//!
//! ```text
//! time = (distance - prior_distance) / c + prior_time
//! ```
//!
//! The accumulator lives in a [`FlightClock`] that is created fresh for
//! every track, so no timing state can leak from one track to the next.

use crate::geometry::Point3;
use crate::utils::config::SPEED_OF_LIGHT;

/// A track point with its reconstructed arrival time (ns)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub time: f64,
    pub position: Point3,
}

/// Per-track timing accumulator
#[derive(Debug, Clone, Copy)]
pub struct FlightClock {
    prior_distance: f64,
    prior_time: f64,
    speed: f64,
}

impl Default for FlightClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FlightClock {
    /// Start a clock at the origin using the speed of light
    pub fn new() -> Self {
        Self::with_speed(SPEED_OF_LIGHT)
    }

    /// Start a clock with a custom propagation speed (distance units per ns)
    pub fn with_speed(speed: f64) -> Self {
        Self {
            prior_distance: 0.0,
            prior_time: 0.0,
            speed,
        }
    }

    /// Stamp the next point and advance the clock
    pub fn stamp(&mut self, point: &Point3) -> f64 {
        let distance = point.distance_from_origin();
        let time = (distance - self.prior_distance) / self.speed + self.prior_time;

        self.prior_distance = distance;
        self.prior_time = time;

        time
    }

    pub fn prior_time(&self) -> f64 {
        self.prior_time
    }
}

/// Lazy adaptor turning a point sequence into a hit sequence
#[derive(Debug, Clone)]
pub struct TimeOfFlight<I> {
    points: I,
    clock: FlightClock,
}

impl<I> Iterator for TimeOfFlight<I>
where
    I: Iterator<Item = Point3>,
{
    type Item = Hit;

    fn next(&mut self) -> Option<Hit> {
        let position = self.points.next()?;
        let time = self.clock.stamp(&position);
        Some(Hit { time, position })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.points.size_hint()
    }
}

/// Stamp one track's points in the order given
///
/// **Public** - main entry point for reconstruction
///
/// # Arguments
/// * `points` - The track's points in traversal order
///
/// # Returns
/// An iterator of hits in the same order, driven by a fresh clock
pub fn time_of_flight<I>(points: I) -> TimeOfFlight<I::IntoIter>
where
    I: IntoIterator<Item = Point3>,
{
    time_of_flight_with_clock(points, FlightClock::new())
}

/// Same as [`time_of_flight`] but with a caller-supplied clock
pub fn time_of_flight_with_clock<I>(points: I, clock: FlightClock) -> TimeOfFlight<I::IntoIter>
where
    I: IntoIterator<Item = Point3>,
{
    TimeOfFlight {
        points: points.into_iter(),
        clock,
    }
}

/// Collect the hits of one track
pub fn reconstruct_hits<I>(points: I) -> Vec<Hit>
where
    I: IntoIterator<Item = Point3>,
{
    time_of_flight(points).collect()
}
