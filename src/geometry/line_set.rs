//! Line-segment sets and their vertex traversal.
//!
//! A line set stores vertices once and refers to them from segments.
//! Traversal walks the segments in order and yields each vertex as it is
//! visited. The order produced here is the order hits are timed in, so
//! consumers must not reorder it.

use super::Point3;
use log::warn;

/// How a track's points are ordered before reconstruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalKind {
    /// Raw polyline slice order
    #[default]
    Polyline,
    /// Visitation order of the track's line set
    LineSet,
}

/// Vertices plus index pairs describing line segments
#[derive(Debug, Clone, Default)]
pub struct LineSet {
    pub vertices: Vec<Point3>,
    pub segments: Vec<(usize, usize)>,
}

impl LineSet {
    /// Build a line set joining consecutive polyline points
    ///
    /// A single point yields a degenerate segment so it is still visited.
    pub fn from_polyline(points: impl IntoIterator<Item = Point3>) -> Self {
        let vertices: Vec<Point3> = points.into_iter().collect();

        let segments = match vertices.len() {
            0 => Vec::new(),
            1 => vec![(0, 0)],
            n => (0..n - 1).map(|i| (i, i + 1)).collect(),
        };

        Self { vertices, segments }
    }

    /// Walk the segments and yield vertices in visitation order
    pub fn traverse(&self) -> Traversal<'_> {
        Traversal {
            set: self,
            segment: 0,
            pending_end: None,
            last_emitted: None,
        }
    }
}

/// Lazy single-pass vertex iterator over a [`LineSet`]
#[derive(Debug)]
pub struct Traversal<'a> {
    set: &'a LineSet,
    segment: usize,
    pending_end: Option<usize>,
    last_emitted: Option<usize>,
}

impl<'a> Traversal<'a> {
    fn emit(&mut self, index: usize) -> Option<Point3> {
        if self.last_emitted == Some(index) {
            return None;
        }
        self.last_emitted = Some(index);
        self.set.vertices.get(index).copied()
    }
}

impl<'a> Iterator for Traversal<'a> {
    type Item = Point3;

    fn next(&mut self) -> Option<Point3> {
        loop {
            if let Some(end) = self.pending_end.take() {
                if let Some(point) = self.emit(end) {
                    return Some(point);
                }
                continue;
            }

            let &(start, end) = self.set.segments.get(self.segment)?;
            self.segment += 1;

            let len = self.set.vertices.len();
            if start >= len || end >= len {
                warn!(
                    "Skipping segment ({}, {}) outside {} vertices",
                    start, end, len
                );
                continue;
            }

            self.pending_end = Some(end);
            if let Some(point) = self.emit(start) {
                return Some(point);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64) -> Point3 {
        Point3::new(x, 0.0, 0.0)
    }

    #[test]
    fn test_polyline_traversal_keeps_order() {
        let set = LineSet::from_polyline(vec![p(1.0), p(5.0), p(2.0)]);
        let visited: Vec<Point3> = set.traverse().collect();
        assert_eq!(visited, vec![p(1.0), p(5.0), p(2.0)]);
    }

    #[test]
    fn test_single_point_is_visited_once() {
        let set = LineSet::from_polyline(vec![p(7.0)]);
        assert_eq!(set.traverse().count(), 1);
    }

    #[test]
    fn test_empty_line_set() {
        let set = LineSet::from_polyline(Vec::new());
        assert_eq!(set.traverse().next(), None);
    }

    #[test]
    fn test_out_of_range_segment_is_skipped() {
        let set = LineSet {
            vertices: vec![p(0.0), p(1.0)],
            segments: vec![(0, 9), (0, 1)],
        };
        let visited: Vec<Point3> = set.traverse().collect();
        assert_eq!(visited, vec![p(0.0), p(1.0)]);
    }

    #[test]
    fn test_disjoint_segments_follow_segment_order() {
        let set = LineSet {
            vertices: vec![p(0.0), p(1.0), p(2.0), p(3.0)],
            segments: vec![(2, 3), (0, 1)],
        };
        let visited: Vec<Point3> = set.traverse().collect();
        assert_eq!(visited, vec![p(2.0), p(3.0), p(0.0), p(1.0)]);
    }
}
