//! Extracted event data.
//!
//! `TrackArrays` keeps the JiveXML layout: parallel per-track arrays plus
//! flattened polyline coordinates. Track `i` owns the coordinate slice
//! starting at the sum of the preceding `num_polyline` entries.

use crate::geometry::Point3;
use crate::utils::error::MalformedInput;

/// Document-level event attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventHeader {
    pub run: i64,
    pub event: i64,
    pub lumi_section: i64,
    pub date_time: String,
}

/// Parallel track arrays of the selected track collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackArrays {
    pub pt: Vec<f64>,
    pub num_polyline: Vec<usize>,
    pub polyline_x: Vec<f64>,
    pub polyline_y: Vec<f64>,
    pub polyline_z: Vec<f64>,

    /// Optional per-track columns (empty when absent)
    pub id: Vec<i64>,
    pub phi0: Vec<f64>,
    pub cot_theta: Vec<f64>,
}

impl TrackArrays {
    pub fn track_count(&self) -> usize {
        self.pt.len()
    }

    pub fn point_count(&self) -> usize {
        self.polyline_x.len()
    }

    /// Check the slicing invariant between all arrays
    ///
    /// # Errors
    /// * `MalformedInput::DataInconsistency` - any pair of lengths disagrees
    pub fn validate(&self) -> Result<(), MalformedInput> {
        let tracks = self.pt.len();

        if self.num_polyline.len() != tracks {
            return Err(inconsistent(format!(
                "{} pt values but {} numPolyline values",
                tracks,
                self.num_polyline.len()
            )));
        }

        let points = self.polyline_x.len();
        if self.polyline_y.len() != points || self.polyline_z.len() != points {
            return Err(inconsistent(format!(
                "polyline coordinate counts differ (x={}, y={}, z={})",
                points,
                self.polyline_y.len(),
                self.polyline_z.len()
            )));
        }

        let declared = self
            .num_polyline
            .iter()
            .try_fold(0usize, |acc, &n| acc.checked_add(n));
        match declared {
            Some(declared) if declared == points => {}
            Some(declared) => {
                return Err(inconsistent(format!(
                    "numPolyline sums to {} but {} polyline points were given",
                    declared, points
                )))
            }
            None => return Err(inconsistent("numPolyline sum overflows".to_string())),
        }

        for (name, len) in [
            ("id", self.id.len()),
            ("phi0", self.phi0.len()),
            ("cotTheta", self.cot_theta.len()),
        ] {
            if len != 0 && len != tracks {
                return Err(inconsistent(format!(
                    "{} has {} values for {} tracks",
                    name, len, tracks
                )));
            }
        }

        Ok(())
    }

    /// Iterate tracks in input order
    ///
    /// Call [`TrackArrays::validate`] first; slices are clamped to the
    /// available points otherwise.
    pub fn tracks(&self) -> impl Iterator<Item = TrackView<'_>> {
        let mut offset = 0usize;

        (0..self.track_count()).map(move |index| {
            let start = offset;
            let end = start.saturating_add(self.num_polyline.get(index).copied().unwrap_or(0));
            offset = end;

            TrackView {
                index,
                pt: self.pt[index],
                id: self.id.get(index).copied(),
                phi0: self.phi0.get(index).copied(),
                cot_theta: self.cot_theta.get(index).copied(),
                x: window(&self.polyline_x, start, end),
                y: window(&self.polyline_y, start, end),
                z: window(&self.polyline_z, start, end),
            }
        })
    }
}

fn window(values: &[f64], start: usize, end: usize) -> &[f64] {
    let len = values.len();
    &values[start.min(len)..end.min(len)]
}

fn inconsistent(message: String) -> MalformedInput {
    MalformedInput::DataInconsistency(message)
}

/// One track and its slice of the polyline arrays
#[derive(Debug, Clone, Copy)]
pub struct TrackView<'a> {
    pub index: usize,
    pub pt: f64,
    pub id: Option<i64>,
    pub phi0: Option<f64>,
    pub cot_theta: Option<f64>,
    pub x: &'a [f64],
    pub y: &'a [f64],
    pub z: &'a [f64],
}

impl<'a> TrackView<'a> {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Points in array order
    pub fn points(&self) -> impl Iterator<Item = Point3> + 'a {
        let (x, y, z) = (self.x, self.y, self.z);
        x.iter()
            .zip(y)
            .zip(z)
            .map(|((&x, &y), &z)| Point3::new(x, y, z))
    }

    /// Sign of pt: +1, -1 or 0
    pub fn charge(&self) -> i64 {
        if self.pt > 0.0 {
            1
        } else if self.pt < 0.0 {
            -1
        } else {
            0
        }
    }

    pub fn phi(&self) -> f64 {
        self.phi0.unwrap_or(0.0)
    }

    /// Pseudorapidity from cot(theta)
    pub fn eta(&self) -> f64 {
        self.cot_theta.map(f64::asinh).unwrap_or(0.0)
    }
}

/// Everything the converter needs from one JiveXML document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JiveEvent {
    pub header: EventHeader,
    pub tracks: TrackArrays,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_tracks() -> TrackArrays {
        TrackArrays {
            pt: vec![1.5, -2.0],
            num_polyline: vec![2, 1],
            polyline_x: vec![0.0, 1.0, 2.0],
            polyline_y: vec![0.0, 0.0, 0.0],
            polyline_z: vec![0.0, 0.0, 5.0],
            ..Default::default()
        }
    }

    #[test]
    fn test_tracks_slice_polylines() {
        let arrays = two_tracks();
        arrays.validate().unwrap();

        let tracks: Vec<TrackView> = arrays.tracks().collect();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].len(), 2);
        assert_eq!(tracks[1].points().collect::<Vec<_>>(), vec![Point3::new(2.0, 0.0, 5.0)]);
        assert_eq!(tracks[0].charge(), 1);
        assert_eq!(tracks[1].charge(), -1);
    }

    #[test]
    fn test_validate_sum_mismatch() {
        let mut arrays = two_tracks();
        arrays.num_polyline = vec![2, 2];
        assert!(matches!(
            arrays.validate(),
            Err(MalformedInput::DataInconsistency(_))
        ));
    }

    #[test]
    fn test_validate_optional_column_length() {
        let mut arrays = two_tracks();
        arrays.id = vec![10];
        assert!(arrays.validate().is_err());

        arrays.id = vec![10, 11];
        assert!(arrays.validate().is_ok());
    }

    #[test]
    fn test_eta_from_cot_theta() {
        let mut arrays = two_tracks();
        arrays.cot_theta = vec![0.0, 1.0];
        let tracks: Vec<TrackView> = arrays.tracks().collect();

        assert_eq!(tracks[0].eta(), 0.0);
        assert!((tracks[1].eta() - 1.0f64.asinh()).abs() < 1e-12);
    }
}
