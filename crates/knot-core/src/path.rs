//! Cubic Bezier segments chained into a cyclic path.
//!
//! A [`Path`] always holds at least one segment, and consecutive segments
//! share their joint anchor: `segments[i].p3 == segments[i + 1].p0`. The
//! last segment's `p3` is the loop's start/end anchor, which matches the
//! first segment's `p0` only when the path actually closes.

use crate::point::Point3;
use serde::Serialize;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Segment {
    pub p0: Point3,
    pub p1: Point3,
    pub p2: Point3,
    pub p3: Point3,
}

impl Segment {
    /// Segment with anchors set and both control points left at zero
    pub fn from_anchors(p0: Point3, p3: Point3) -> Self {
        Self {
            p0,
            p1: Point3::ZERO,
            p2: Point3::ZERO,
            p3,
        }
    }

    pub fn point_at(&self, t: f64) -> Point3 {
        let u = 1.0 - t;
        self.p0 * (u * u * u)
            + self.p1 * (3.0 * u * u * t)
            + self.p2 * (3.0 * u * t * t)
            + self.p3 * (t * t * t)
    }

    pub fn derivative_at(&self, t: f64) -> Point3 {
        let u = 1.0 - t;
        (self.p1 - self.p0) * (3.0 * u * u)
            + (self.p2 - self.p1) * (6.0 * u * t)
            + (self.p3 - self.p2) * (3.0 * t * t)
    }

    pub fn second_derivative_at(&self, t: f64) -> Point3 {
        let u = 1.0 - t;
        (self.p2 - self.p1 * 2.0 + self.p0) * (6.0 * u)
            + (self.p3 - self.p2 * 2.0 + self.p1) * (6.0 * t)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum PathError {
    #[error("a path needs at least one segment")]
    Empty,

    #[error("segment {index} ends at {end:?} but segment {next} starts at {start:?}", next = .index + 1)]
    Disconnected {
        index: usize,
        end: Point3,
        start: Point3,
    },
}

/// Mismatch between the segments meeting at one joint.
///
/// Joint `index` is where segment `index - 1` (cyclically) hands over to
/// segment `index`; joint 0 is the wrap-around joint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JointResidual {
    pub index: usize,
    pub position: f64,
    pub first: f64,
    pub second: f64,
}

impl JointResidual {
    pub fn max(&self) -> f64 {
        self.position.max(self.first).max(self.second)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    pub fn new(segments: Vec<Segment>) -> Result<Self, PathError> {
        if segments.is_empty() {
            return Err(PathError::Empty);
        }
        for (index, pair) in segments.windows(2).enumerate() {
            if pair[0].p3 != pair[1].p0 {
                return Err(PathError::Disconnected {
                    index,
                    end: pair[0].p3,
                    start: pair[1].p0,
                });
            }
        }
        Ok(Self { segments })
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segments_mut(&mut self) -> &mut [Segment] {
        &mut self.segments
    }

    pub fn start(&self) -> Point3 {
        self.segments[0].p0
    }

    pub fn end(&self) -> Point3 {
        self.segments[self.segments.len() - 1].p3
    }

    /// The polyline through every joint: each segment's `p0`, then the final `p3`
    pub fn anchors(&self) -> Vec<Point3> {
        self.segments
            .iter()
            .map(|s| s.p0)
            .chain(std::iter::once(self.end()))
            .collect()
    }

    /// All `3n + 1` points in output order: `p0, p1, p2` per segment, then the final `p3`
    pub fn control_points(&self) -> impl ExactSizeIterator<Item = Point3> + '_ {
        ControlPoints {
            segments: &self.segments,
            next: 0,
        }
    }

    pub fn control_point_count(&self) -> usize {
        3 * self.segments.len() + 1
    }

    pub fn is_closed(&self, tol: f64) -> bool {
        self.end().approx_eq(self.start(), tol)
    }

    pub fn joint_residuals(&self) -> Vec<JointResidual> {
        let n = self.segments.len();
        (0..n)
            .map(|index| {
                let prev = &self.segments[(index + n - 1) % n];
                let next = &self.segments[index];
                JointResidual {
                    index,
                    position: prev.p3.distance(next.p0),
                    first: prev.derivative_at(1.0).distance(next.derivative_at(0.0)),
                    second: prev
                        .second_derivative_at(1.0)
                        .distance(next.second_derivative_at(0.0)),
                }
            })
            .collect()
    }

    /// Largest mismatch over all joints, including the wrap-around joint
    pub fn max_residual(&self) -> f64 {
        self.joint_residuals()
            .iter()
            .map(JointResidual::max)
            .fold(0.0, f64::max)
    }
}

struct ControlPoints<'a> {
    segments: &'a [Segment],
    next: usize,
}

impl Iterator for ControlPoints<'_> {
    type Item = Point3;

    fn next(&mut self) -> Option<Point3> {
        let total = 3 * self.segments.len() + 1;
        if self.next >= total {
            return None;
        }
        let idx = self.next;
        self.next += 1;

        if idx == total - 1 {
            return Some(self.segments[self.segments.len() - 1].p3);
        }
        let seg = &self.segments[idx / 3];
        Some(match idx % 3 {
            0 => seg.p0,
            1 => seg.p1,
            _ => seg.p2,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = 3 * self.segments.len() + 1 - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ControlPoints<'_> {}
