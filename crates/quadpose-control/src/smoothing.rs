//! First-order pose smoothing.
//!
//! Each tick the committed pose moves `1/N` of the way to the target. There
//! is no integral or derivative term: a held target is approached
//! geometrically and never overshot.

use quadpose_core::types::Pose;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseSmoother {
    current: Pose,
    divisor: f64,
}

impl PoseSmoother {
    /// `divisor` must be at least 1; config validation enforces this.
    pub const fn new(initial: Pose, divisor: f64) -> Self {
        Self {
            current: initial,
            divisor,
        }
    }

    pub const fn current(&self) -> Pose {
        self.current
    }

    pub const fn divisor(&self) -> f64 {
        self.divisor
    }

    /// Per-tick step `(target - current) / N`. Does not commit.
    #[must_use]
    pub fn error(&self, target: &Pose) -> Pose {
        let n = self.divisor;
        let d = *target - self.current;
        Pose::new(d.roll / n, d.pitch / n, d.yaw / n, d.height / n)
    }

    /// Advance the committed pose by a step from [`error`](Self::error).
    pub fn commit(&mut self, error: &Pose) {
        self.current = self.current + *error;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn error_is_fraction_of_gap() {
        let smoother = PoseSmoother::new(Pose::neutral(0.225), 10.0);
        let e = smoother.error(&Pose::new(0.5, -0.2, 0.1, 0.175));
        assert_relative_eq!(e.roll, 0.05, epsilon = 1e-15);
        assert_relative_eq!(e.pitch, -0.02, epsilon = 1e-15);
        assert_relative_eq!(e.yaw, 0.01, epsilon = 1e-15);
        assert_relative_eq!(e.height, -0.005, epsilon = 1e-15);
        assert_eq!(smoother.current(), Pose::neutral(0.225));
    }

    #[test]
    fn at_target_error_is_zero() {
        let target = Pose::new(0.1, 0.2, -0.3, 0.2);
        let smoother = PoseSmoother::new(target, 10.0);
        assert!(smoother.error(&target).max_abs() < f64::EPSILON);
    }

    #[test]
    fn gap_shrinks_monotonically_without_overshoot() {
        let target = Pose::new(0.4, -0.3, 0.2, 0.175);
        let mut smoother = PoseSmoother::new(Pose::neutral(0.225), 10.0);
        let mut previous = (target - smoother.current()).max_abs();
        for _ in 0..100 {
            let e = smoother.error(&target);
            smoother.commit(&e);
            let gap = target - smoother.current();
            assert!(gap.max_abs() < previous);
            assert!(gap.roll >= 0.0 && gap.pitch <= 0.0 && gap.yaw >= 0.0 && gap.height <= 0.0);
            previous = gap.max_abs();
        }
        assert!(previous < 0.4 * 0.9_f64.powi(99));
    }

    #[test]
    fn divisor_one_jumps_to_target() {
        let target = Pose::new(0.1, 0.1, 0.1, 0.2);
        let mut smoother = PoseSmoother::new(Pose::neutral(0.225), 1.0);
        let e = smoother.error(&target);
        smoother.commit(&e);
        assert_relative_eq!(smoother.current().height, 0.2, epsilon = 1e-15);
    }
}
