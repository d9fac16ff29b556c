// Closed-form solver for periodic cubic Bezier splines
//
// Continuity of the first and second derivative at joint k gives
//
//   p1[k] = 2 p0[k] - p2[k-1]
//   p2[k] = 4 p0[k] + p1[k-1] - 4 p2[k-1]
//
// with indices taken mod n. Eliminating p1 leaves a constant-coefficient
// recurrence whose characteristic equation is t^2 + 4t + 1 = 0. The
// periodic particular solution is a geometric sum over all anchors in the
// two roots, which seeds segment 0; the remaining segments follow from the
// recurrence above.

use crate::{path::Path, point::Point3};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SolveError {
    #[error("control points of segment {segment} are not finite ({p1:?}, {p2:?})")]
    NonFinite {
        segment: usize,
        p1: Point3,
        p2: Point3,
    },
}

/// Roots of `t^2 + 4t + 1 = 0`.
///
/// `|x1| < 1 < |x2|`, so `x1^n != 1` and `x2^n != 1` for every `n >= 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacteristicRoots {
    pub x1: f64,
    pub x2: f64,
}

impl CharacteristicRoots {
    pub fn new() -> Self {
        let s = 3.0_f64.sqrt();
        Self {
            x1: -2.0 + s,
            x2: -2.0 - s,
        }
    }

    /// Weights of the two geometric modes in the periodic seed
    pub fn seed_weights(&self) -> [f64; 2] {
        let dx = self.x1 - self.x2;
        [(2.0 * self.x2 + 4.0) / dx, (-2.0 * self.x1 - 4.0) / dx]
    }

    /// Accumulate `q0[i] = sum_k x_i^(n-k) * z0[i] * p0[k] / (1 - x_i^n)`
    pub fn periodic_sums(&self, anchors: &[Point3]) -> [Point3; 2] {
        let n = anchors.len() as f64;
        let roots = [self.x1, self.x2];
        let weights = self.seed_weights();
        let inv = [1.0 / (1.0 - roots[0].powf(n)), 1.0 / (1.0 - roots[1].powf(n))];

        let mut q0 = [Point3::ZERO; 2];
        for (k, p) in anchors.iter().enumerate() {
            let exp = n - k as f64;
            for i in 0..2 {
                let s = inv[i] * roots[i].powf(exp) * weights[i];
                q0[i] += *p * s;
            }
        }
        q0
    }
}

impl Default for CharacteristicRoots {
    fn default() -> Self {
        Self::new()
    }
}

/// Fill `p1` and `p2` of every segment so the closed curve is C2 at each joint.
///
/// Only each segment's `p0` is read; the loop is treated as cyclic whether
/// or not the final `p3` returns to the start.
pub fn solve(path: &mut Path) -> Result<(), SolveError> {
    let roots = CharacteristicRoots::new();
    let anchors: Vec<Point3> = path.segments().iter().map(|s| s.p0).collect();
    let q0 = roots.periodic_sums(&anchors);

    let segments = path.segments_mut();
    segments[0].p1 = -q0[0] - q0[1];
    segments[0].p2 = q0[0] * roots.x1 + q0[1] * roots.x2;

    for k in 1..segments.len() {
        let prev = segments[k - 1];
        let seg = &mut segments[k];
        seg.p1 = seg.p0 * 2.0 - prev.p2;
        seg.p2 = seg.p0 * 4.0 + prev.p1 - prev.p2 * 4.0;
    }

    // The recurrence grows like |x2|^k, so very long paths can overflow.
    for (segment, seg) in segments.iter().enumerate() {
        if !seg.p1.is_finite() || !seg.p2.is_finite() {
            return Err(SolveError::NonFinite {
                segment,
                p1: seg.p1,
                p2: seg.p2,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Segment;

    const TOL: f64 = 1e-9;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn loop_through(corners: &[Point3]) -> Path {
        let n = corners.len();
        let segments = (0..n)
            .map(|i| Segment::from_anchors(corners[i], corners[(i + 1) % n]))
            .collect();
        Path::new(segments).unwrap()
    }

    #[test]
    fn roots_satisfy_characteristic_equation() {
        let roots = CharacteristicRoots::new();
        for t in [roots.x1, roots.x2] {
            assert!((t * t + 4.0 * t + 1.0).abs() < 1e-12);
        }
        assert!(roots.x1.abs() < 1.0);
        assert!(roots.x2.abs() > 1.0);
        assert!((roots.x1 * roots.x2 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn unit_square() {
        let mut path = loop_through(&[
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(1.0, -1.0, 0.0),
            p(0.0, -1.0, 0.0),
        ]);
        solve(&mut path).unwrap();

        let expected = [
            (p(0.25, 0.25, 0.0), p(0.75, 0.25, 0.0)),
            (p(1.25, -0.25, 0.0), p(1.25, -0.75, 0.0)),
            (p(0.75, -1.25, 0.0), p(0.25, -1.25, 0.0)),
            (p(-0.25, -0.75, 0.0), p(-0.25, -0.25, 0.0)),
        ];
        for (seg, (p1, p2)) in path.segments().iter().zip(expected) {
            assert!(seg.p1.approx_eq(p1, TOL), "{:?} != {:?}", seg.p1, p1);
            assert!(seg.p2.approx_eq(p2, TOL), "{:?} != {:?}", seg.p2, p2);
        }
    }

    #[test]
    fn closed_loop_is_c2_at_every_joint() {
        let mut path = loop_through(&[
            p(0.0, 0.0, 0.0),
            p(2.0, 0.0, 0.0),
            p(2.0, -1.0, 1.0),
            p(0.0, -1.0, 1.0),
        ]);
        solve(&mut path).unwrap();

        for residual in path.joint_residuals() {
            assert!(residual.max() < TOL, "{residual:?}");
        }
    }

    #[test]
    fn recurrence_holds_exactly() {
        let mut path = loop_through(&[
            p(0.0, 0.0, 0.0),
            p(3.0, 0.0, 0.0),
            p(3.0, 0.0, 2.0),
            p(3.0, 5.0, 2.0),
            p(-1.0, 5.0, 2.0),
        ]);
        solve(&mut path).unwrap();

        let segs = path.segments();
        for k in 1..segs.len() {
            assert_eq!(segs[k].p1, segs[k].p0 * 2.0 - segs[k - 1].p2);
            assert_eq!(
                segs[k].p2,
                segs[k].p0 * 4.0 + segs[k - 1].p1 - segs[k - 1].p2 * 4.0
            );
        }
    }

    #[test]
    fn single_segment_at_origin_has_zero_controls() {
        let segment = Segment::from_anchors(p(0.0, 0.0, 0.0), p(5.0, 0.0, 0.0));
        let mut path = Path::new(vec![segment]).unwrap();
        solve(&mut path).unwrap();

        let seg = path.segments()[0];
        assert!(seg.p1.approx_eq(Point3::ZERO, TOL));
        assert!(seg.p2.approx_eq(Point3::ZERO, TOL));
        assert_eq!(seg.p3, p(5.0, 0.0, 0.0));
    }

    #[test]
    fn open_two_segment_path() {
        let segments = vec![
            Segment::from_anchors(p(0.0, 0.0, 0.0), p(3.0, 0.0, 0.0)),
            Segment::from_anchors(p(3.0, 0.0, 0.0), p(3.0, -2.0, 0.0)),
        ];
        let mut path = Path::new(segments).unwrap();
        solve(&mut path).unwrap();

        let segs = path.segments();
        assert!(segs[0].p1.approx_eq(p(0.0, 0.0, 0.0), TOL));
        assert!(segs[0].p2.approx_eq(p(3.0, 0.0, 0.0), TOL));
        assert!(segs[1].p1.approx_eq(p(3.0, 0.0, 0.0), TOL));
        assert!(segs[1].p2.approx_eq(p(0.0, 0.0, 0.0), TOL));
    }

    #[test]
    fn solving_is_deterministic() {
        let corners = [
            p(0.0, 0.0, 0.0),
            p(7.0, 0.0, 0.0),
            p(7.0, 0.0, -3.0),
            p(7.0, 4.0, -3.0),
        ];
        let mut a = loop_through(&corners);
        let mut b = loop_through(&corners);
        solve(&mut a).unwrap();
        solve(&mut b).unwrap();
        assert_eq!(a, b);
    }
}
