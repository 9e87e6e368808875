//! Closed-form inverse kinematics for a 3-DOF leg.
//!
//! The chain is hip abduction (about the forward axis), thigh and knee
//! (both about the abducted lateral axis). Every reachable foot position has
//! two solutions that differ in the knee bend direction; the solver returns
//! the one nearest the supplied joint angles.
//!
//! Solver output is `[abduction, thigh - π/2, knee]`. The thigh angle is
//! measured from straight down, so a standing leg has a thigh near `+1.0`
//! and a knee near `-2.0` rad.

use std::f64::consts::{FRAC_PI_2, PI};

use nalgebra::Vector3;

use quadpose_core::error::KinematicsError;
use quadpose_core::types::Side;

use crate::geometry::LegGeometry;

/// Slack applied to the reachability checks so targets produced by the
/// workspace clamp are never rejected for rounding.
const REACH_EPSILON: f64 = 1e-9;

/// Two branches closer than this are treated as equally near the hint.
const TIE_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// LegIk
// ---------------------------------------------------------------------------

/// Leg inverse kinematics.
///
/// `current` is the joint triple the leg is at now, in solver order. The
/// returned triple uses the same order. `is_even_leg` selects the left-hand
/// geometry (FL and RL).
pub trait LegIk: Send {
    fn solve(
        &self,
        foot: &Vector3<f64>,
        current: &[f64; 3],
        is_even_leg: bool,
    ) -> Result<[f64; 3], KinematicsError>;
}

// ---------------------------------------------------------------------------
// AnalyticLegSolver
// ---------------------------------------------------------------------------

/// Analytic solver for the abduction-thigh-knee leg.
///
/// Unreachable targets are reported as errors, never approximated:
/// [`KinematicsError::InsideAbductionOffset`] when the foot is closer to the
/// abduction axis than the offset link and [`KinematicsError::Unreachable`]
/// when the in-plane extension exceeds the thigh-calf triangle.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticLegSolver {
    geometry: LegGeometry,
}

impl AnalyticLegSolver {
    pub const fn new(geometry: LegGeometry) -> Self {
        Self { geometry }
    }

    pub const fn geometry(&self) -> &LegGeometry {
        &self.geometry
    }

    /// Foot position produced by a joint triple in solver order.
    #[must_use]
    pub fn forward(&self, angles: &[f64; 3], is_even_leg: bool) -> Vector3<f64> {
        let g = &self.geometry;
        let s = side_for(is_even_leg).sign();
        let [abduction, thigh, knee] = *angles;
        let thigh = thigh + FRAC_PI_2;

        let plane = g.thigh_length.mul_add(thigh.cos(), g.calf_length * (thigh + knee).cos());
        let z = -g.thigh_length.mul_add(thigh.sin(), g.calf_length * (thigh + knee).sin());
        let (sin, cos) = abduction.sin_cos();
        Vector3::new(
            (s * g.abduction_offset).mul_add(cos, -plane * sin),
            (s * g.abduction_offset).mul_add(sin, plane * cos),
            z,
        )
    }
}

impl LegIk for AnalyticLegSolver {
    fn solve(
        &self,
        foot: &Vector3<f64>,
        current: &[f64; 3],
        is_even_leg: bool,
    ) -> Result<[f64; 3], KinematicsError> {
        if !foot.iter().all(|v| v.is_finite()) {
            return Err(KinematicsError::NonFiniteTarget);
        }
        let g = &self.geometry;
        let (l1, l2, l3) = (g.abduction_offset, g.thigh_length, g.calf_length);
        let s = side_for(is_even_leg).sign();

        let radius = foot.x.hypot(foot.y);
        if radius < l1 - REACH_EPSILON {
            return Err(KinematicsError::InsideAbductionOffset { radius, offset: l1 });
        }
        let plane = radius.mul_add(radius, -l1 * l1).max(0.0).sqrt();
        let abduction = wrap_angle(foot.y.atan2(foot.x) - plane.atan2(s * l1));

        let extension_sq = plane.mul_add(plane, foot.z * foot.z);
        let cos_knee = (extension_sq - l2 * l2 - l3 * l3) / (2.0 * l2 * l3);
        if cos_knee.abs() > 1.0 + REACH_EPSILON {
            return Err(KinematicsError::Unreachable {
                extension: extension_sq.sqrt(),
                min: g.min_reach(),
                max: g.max_reach(),
            });
        }
        let knee_magnitude = cos_knee.clamp(-1.0, 1.0).acos();

        let branch = |knee: f64| {
            let thigh =
                (-foot.z).atan2(plane) - (l3 * knee.sin()).atan2(l3.mul_add(knee.cos(), l2));
            [abduction, thigh - FRAC_PI_2, knee]
        };
        let bent_back = branch(-knee_magnitude);
        let bent_forward = branch(knee_magnitude);

        // Ties go to the backward knee, the A1 standing configuration.
        let forward = branch_distance(&bent_forward, current);
        let back = branch_distance(&bent_back, current);
        if forward < back - TIE_EPSILON {
            Ok(bent_forward)
        } else {
            Ok(bent_back)
        }
    }
}

const fn side_for(is_even_leg: bool) -> Side {
    if is_even_leg { Side::Left } else { Side::Right }
}

/// Wrap an angle into `(-π, π]`.
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.sin().atan2(angle.cos());
    if wrapped <= -PI { wrapped + 2.0 * PI } else { wrapped }
}

fn branch_distance(candidate: &[f64; 3], current: &[f64; 3]) -> f64 {
    candidate
        .iter()
        .zip(current)
        .map(|(a, b)| wrap_angle(a - b).abs())
        .sum()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    const HINT_AT_REST: [f64; 3] = [0.0, -FRAC_PI_2, 0.0];

    #[test]
    fn stand_pose_solution() {
        let solver = AnalyticLegSolver::default();
        let out = solver
            .solve(&Vector3::new(-0.0838, 0.225, 0.0), &HINT_AT_REST, true)
            .unwrap();
        assert_relative_eq!(out[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(out[1] + FRAC_PI_2, 0.973_389_910_149_546_6, epsilon = 1e-9);
        assert_relative_eq!(out[2], -1.946_779_820_299_093, epsilon = 1e-9);
    }

    #[test]
    fn forward_of_solution_reaches_target() {
        let solver = AnalyticLegSolver::default();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..200 {
            let even = rng.r#gen::<bool>();
            let angles = [
                rng.gen_range(-0.6..0.6),
                rng.gen_range(-1.0..0.0),
                rng.gen_range(-2.4..-0.4),
            ];
            let foot = solver.forward(&angles, even);
            let out = solver.solve(&foot, &angles, even).unwrap();
            assert_relative_eq!(solver.forward(&out, even), foot, epsilon = 1e-9);
            for (a, b) in out.iter().zip(&angles) {
                assert_relative_eq!(*a, *b, epsilon = 1e-7);
            }
        }
    }

    #[test]
    fn nearest_branch_follows_hint() {
        let solver = AnalyticLegSolver::default();
        let forward_bent = [0.1, -0.9, 1.2];
        let foot = solver.forward(&forward_bent, false);
        let out = solver.solve(&foot, &forward_bent, false).unwrap();
        assert!(out[2] > 0.0);
        let back_hint = [0.1, -0.5, -1.2];
        let out = solver.solve(&foot, &back_hint, false).unwrap();
        assert!(out[2] < 0.0);
    }

    #[test]
    fn parity_mirrors_abduction() {
        let solver = AnalyticLegSolver::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..100 {
            let x = rng.gen_range(-0.12..0.12);
            let y = rng.gen_range(0.15..0.3);
            let z = rng.gen_range(-0.1..0.1);
            let left = solver
                .solve(&Vector3::new(x, y, z), &HINT_AT_REST, true)
                .unwrap();
            let right = solver
                .solve(&Vector3::new(-x, y, z), &HINT_AT_REST, false)
                .unwrap();
            assert_relative_eq!(left[0], -right[0], epsilon = 1e-9);
            assert_relative_eq!(left[1], right[1], epsilon = 1e-9);
            assert_relative_eq!(left[2], right[2], epsilon = 1e-9);
        }
    }

    #[test]
    fn parity_selects_handedness() {
        let solver = AnalyticLegSolver::default();
        let foot = Vector3::new(0.0, 0.25, 0.02);
        let even = solver.solve(&foot, &HINT_AT_REST, true).unwrap();
        let odd = solver.solve(&foot, &HINT_AT_REST, false).unwrap();
        assert!(even[0] < 0.0);
        assert!(odd[0] > 0.0);
        assert_relative_eq!(even[0], -odd[0], epsilon = 1e-12);
    }

    #[test]
    fn unreachable_extension() {
        let solver = AnalyticLegSolver::default();
        let err = solver
            .solve(&Vector3::new(-0.0838, 0.45, 0.0), &HINT_AT_REST, true)
            .unwrap_err();
        assert!(matches!(
            err,
            KinematicsError::Unreachable { max, .. } if (max - 0.4).abs() < 1e-12
        ));
    }

    #[test]
    fn inside_abduction_offset() {
        let solver = AnalyticLegSolver::default();
        let err = solver
            .solve(&Vector3::new(0.01, 0.02, 0.2), &HINT_AT_REST, false)
            .unwrap_err();
        assert!(matches!(err, KinematicsError::InsideAbductionOffset { .. }));
    }

    #[test]
    fn non_finite_target() {
        let solver = AnalyticLegSolver::default();
        assert_eq!(
            solver.solve(&Vector3::new(0.0, f64::INFINITY, 0.0), &HINT_AT_REST, true),
            Err(KinematicsError::NonFiniteTarget)
        );
    }

    #[test]
    fn wrap_angle_range() {
        assert_relative_eq!(wrap_angle(3.0 * PI), PI, epsilon = 1e-12);
        assert_relative_eq!(wrap_angle(-0.5), -0.5, epsilon = 1e-15);
        assert_relative_eq!(wrap_angle(2.0 * PI + 0.25), 0.25, epsilon = 1e-12);
    }
}
