//! Reconstruction of hits from track points.
//!
//! The converter runs one pipeline for both output flavours. The
//! [`ReconstructionMode`] decides what a track point becomes:
//! - `Positions` passes points through untouched
//! - `TimeOfFlight` stamps each point with an arrival time

pub mod time_of_flight;

pub use time_of_flight::{
    reconstruct_hits, time_of_flight, time_of_flight_with_clock, FlightClock, Hit, TimeOfFlight,
};

use crate::geometry::Point3;
use crate::utils::config::{POSITION_LENGTH_SCALE, TIME_OF_FLIGHT_LENGTH_SCALE};

/// Reconstruction strategy for a conversion run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconstructionMode {
    /// Bare positions, written as points
    Positions,
    /// Positions with arrival times, written as hits
    #[default]
    TimeOfFlight,
}

/// A reconstructed track element
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackElement {
    Point(Point3),
    Hit(Hit),
}

impl TrackElement {
    pub fn position(&self) -> Point3 {
        match self {
            TrackElement::Point(p) => *p,
            TrackElement::Hit(hit) => hit.position,
        }
    }

    /// Short name used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            TrackElement::Point(_) => "point",
            TrackElement::Hit(_) => "hit",
        }
    }
}

impl ReconstructionMode {
    /// Scale applied to raw polyline coordinates for this mode
    pub fn length_scale(&self) -> f64 {
        match self {
            ReconstructionMode::Positions => POSITION_LENGTH_SCALE,
            ReconstructionMode::TimeOfFlight => TIME_OF_FLIGHT_LENGTH_SCALE,
        }
    }

    /// Turn one track's points into elements, preserving order
    pub fn reconstruct<'a, I>(&self, points: I) -> Box<dyn Iterator<Item = TrackElement> + 'a>
    where
        I: IntoIterator<Item = Point3>,
        I::IntoIter: 'a,
    {
        match self {
            ReconstructionMode::Positions => Box::new(points.into_iter().map(TrackElement::Point)),
            ReconstructionMode::TimeOfFlight => {
                Box::new(time_of_flight(points).map(TrackElement::Hit))
            }
        }
    }
}
