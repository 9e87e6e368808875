//! Leg frame geometry.
//!
//! Every leg has a local frame with its origin at the hip joint. Axes are
//! shared with the trunk frame: `x` lateral (left negative), `y` vertical
//! (down positive, so a standing foot has `y` equal to the stand height) and
//! `z` forward. Converting between the two frames is a pure translation by
//! the hip position; body orientation is applied separately by [`rotate`].

use nalgebra::{Rotation3, Vector3};

use quadpose_core::config::LegGeometryConfig;
use quadpose_core::error::KinematicsError;
use quadpose_core::types::{Leg, Side};

// ---------------------------------------------------------------------------
// LegGeometry
// ---------------------------------------------------------------------------

/// Link lengths and hip placement shared by all four legs (meters).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegGeometry {
    pub abduction_offset: f64,
    pub thigh_length: f64,
    pub calf_length: f64,
    pub body_half_length: f64,
    pub body_half_width: f64,
    pub min_extension: f64,
    pub max_extension: f64,
}

impl Default for LegGeometry {
    fn default() -> Self {
        Self::from_config(&LegGeometryConfig::default())
    }
}

impl LegGeometry {
    #[must_use]
    pub const fn from_config(config: &LegGeometryConfig) -> Self {
        Self {
            abduction_offset: config.abduction_offset,
            thigh_length: config.thigh_length,
            calf_length: config.calf_length,
            body_half_length: config.body_half_length,
            body_half_width: config.body_half_width,
            min_extension: config.min_extension,
            max_extension: config.max_extension,
        }
    }

    /// Hip joint position in the trunk frame.
    #[must_use]
    pub fn hip_position(&self, leg: Leg) -> Vector3<f64> {
        let x = leg.side().sign() * self.body_half_width;
        let z = if leg.is_front() {
            self.body_half_length
        } else {
            -self.body_half_length
        };
        Vector3::new(x, 0.0, z)
    }

    /// Foot position in the trunk frame from a hip-to-toe offset.
    #[must_use]
    pub fn global_position(&self, leg: Leg, local: &Vector3<f64>) -> Vector3<f64> {
        local + self.hip_position(leg)
    }

    /// Hip-to-toe offset from a trunk-frame foot position.
    #[must_use]
    pub fn local_position(&self, leg: Leg, global: &Vector3<f64>) -> Vector3<f64> {
        global - self.hip_position(leg)
    }

    /// Fully folded hip-to-foot distance in the leg plane.
    #[must_use]
    pub fn min_reach(&self) -> f64 {
        (self.thigh_length - self.calf_length).abs()
    }

    /// Fully stretched hip-to-foot distance in the leg plane.
    #[must_use]
    pub fn max_reach(&self) -> f64 {
        self.thigh_length + self.calf_length
    }

    /// Pull a hip-to-toe target into the configured workspace.
    ///
    /// The lateral radius `hypot(x, y)` is raised to at least the abduction
    /// offset and the in-plane extension is limited to
    /// `[min_extension, max_extension]`, keeping the abduction angle and the
    /// direction in the leg plane. Targets already inside are returned
    /// bit-for-bit unchanged.
    pub fn clamp_to_workspace(
        &self,
        foot: &Vector3<f64>,
        side: Side,
    ) -> Result<Vector3<f64>, KinematicsError> {
        if !foot.iter().all(|v| v.is_finite()) {
            return Err(KinematicsError::NonFiniteTarget);
        }
        let l1 = self.abduction_offset;
        let s = side.sign();
        let radius = foot.x.hypot(foot.y);
        let inside_offset = radius < l1;

        let plane = if inside_offset {
            0.0
        } else {
            (radius * radius - l1 * l1).sqrt()
        };
        let extension = plane.hypot(foot.z);
        if !inside_offset && (self.min_extension..=self.max_extension).contains(&extension) {
            return Ok(*foot);
        }

        let (plane, z) = if extension <= f64::EPSILON {
            (self.min_extension, 0.0)
        } else {
            let limited = extension.clamp(self.min_extension, self.max_extension);
            let factor = limited / extension;
            (plane * factor, foot.z * factor)
        };

        // Abduction angle that would place the leg plane through the target.
        let abduction = if radius <= f64::EPSILON {
            0.0
        } else if inside_offset {
            foot.y.atan2(foot.x) - 0.0_f64.atan2(s * l1)
        } else {
            foot.y.atan2(foot.x) - (radius * radius - l1 * l1).sqrt().atan2(s * l1)
        };
        let (sin, cos) = abduction.sin_cos();
        let x = (s * l1).mul_add(cos, -plane * sin);
        let y = (s * l1).mul_add(sin, plane * cos);
        Ok(Vector3::new(x, y, z))
    }
}

// ---------------------------------------------------------------------------
// Rotation
// ---------------------------------------------------------------------------

/// Body rotation `R = R_yaw · R_pitch · R_roll`.
///
/// Roll turns about the forward `z` axis, pitch about the lateral `x` axis
/// and yaw about the vertical `y` axis. Applied to a column vector, roll acts
/// first.
#[must_use]
pub fn body_rotation(roll: f64, pitch: f64, yaw: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Vector3::y_axis(), yaw)
        * Rotation3::from_axis_angle(&Vector3::x_axis(), pitch)
        * Rotation3::from_axis_angle(&Vector3::z_axis(), roll)
}

/// Rotate a trunk-frame point about the trunk origin.
#[must_use]
pub fn rotate(point: &Vector3<f64>, roll: f64, pitch: f64, yaw: f64) -> Vector3<f64> {
    body_rotation(roll, pitch, yaw) * point
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

    fn random_offset(rng: &mut ChaCha8Rng) -> Vector3<f64> {
        Vector3::new(
            rng.gen_range(-0.3..0.3),
            rng.gen_range(-0.1..0.4),
            rng.gen_range(-0.3..0.3),
        )
    }

    #[test]
    fn hip_positions_a1() {
        let geometry = LegGeometry::default();
        assert_relative_eq!(
            geometry.hip_position(Leg::FrontLeft),
            Vector3::new(-0.047, 0.0, 0.1805)
        );
        assert_relative_eq!(
            geometry.hip_position(Leg::FrontRight),
            Vector3::new(0.047, 0.0, 0.1805)
        );
        assert_relative_eq!(
            geometry.hip_position(Leg::RearLeft),
            Vector3::new(-0.047, 0.0, -0.1805)
        );
        assert_relative_eq!(
            geometry.hip_position(Leg::RearRight),
            Vector3::new(0.047, 0.0, -0.1805)
        );
    }

    #[test]
    fn local_global_roundtrip() {
        let geometry = LegGeometry::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..200 {
            let v = random_offset(&mut rng);
            for leg in Leg::ALL {
                let back = geometry.local_position(leg, &geometry.global_position(leg, &v));
                assert_relative_eq!(back, v, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn zero_rotation_is_identity() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..50 {
            let v = random_offset(&mut rng);
            assert_eq!(rotate(&v, 0.0, 0.0, 0.0), v);
        }
    }

    #[test]
    fn rotation_axes() {
        let forward = Vector3::new(0.0, 0.0, 1.0);
        let lateral = Vector3::new(1.0, 0.0, 0.0);
        let half_pi = std::f64::consts::FRAC_PI_2;

        // Roll leaves the forward axis alone.
        assert_relative_eq!(rotate(&forward, 0.3, 0.0, 0.0), forward, epsilon = 1e-12);
        // Pitch leaves the lateral axis alone.
        assert_relative_eq!(rotate(&lateral, 0.0, 0.3, 0.0), lateral, epsilon = 1e-12);
        // Yaw about the vertical axis turns forward into lateral.
        assert_relative_eq!(rotate(&forward, 0.0, 0.0, half_pi), lateral, epsilon = 1e-12);
    }

    #[test]
    fn rotation_order_roll_first() {
        let v = Vector3::new(0.1, 0.2, 0.3);
        let (roll, pitch, yaw) = (0.2, -0.1, 0.3);
        let stepwise = rotate(
            &rotate(&rotate(&v, roll, 0.0, 0.0), 0.0, pitch, 0.0),
            0.0,
            0.0,
            yaw,
        );
        assert_relative_eq!(rotate(&v, roll, pitch, yaw), stepwise, epsilon = 1e-12);
    }

    #[test]
    fn rotation_preserves_length() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..50 {
            let v = random_offset(&mut rng);
            let r = rotate(
                &v,
                rng.gen_range(-0.5..0.5),
                rng.gen_range(-0.5..0.5),
                rng.gen_range(-0.5..0.5),
            );
            assert_relative_eq!(r.norm(), v.norm(), epsilon = 1e-12);
        }
    }

    #[test]
    fn clamp_leaves_reachable_target_untouched() {
        let geometry = LegGeometry::default();
        let foot = Vector3::new(-0.0838, 0.225, 0.01);
        assert_eq!(geometry.clamp_to_workspace(&foot, Side::Left).unwrap(), foot);
    }

    #[test]
    fn clamp_limits_extension() {
        let geometry = LegGeometry::default();
        let foot = Vector3::new(-0.0838, 0.5, 0.0);
        let clamped = geometry.clamp_to_workspace(&foot, Side::Left).unwrap();
        assert_relative_eq!(clamped, Vector3::new(-0.0838, 0.39, 0.0), epsilon = 1e-12);

        let short = Vector3::new(0.0838, 0.02, 0.01);
        let clamped = geometry.clamp_to_workspace(&short, Side::Right).unwrap();
        let plane = (clamped.x.hypot(clamped.y).powi(2) - 0.0838_f64.powi(2)).sqrt();
        assert_relative_eq!(plane.hypot(clamped.z), 0.08, epsilon = 1e-9);
    }

    #[test]
    fn clamp_pushes_out_of_abduction_offset() {
        let geometry = LegGeometry::default();
        let foot = Vector3::new(0.0, 0.01, 0.1);
        let clamped = geometry.clamp_to_workspace(&foot, Side::Right).unwrap();
        assert!(clamped.x.hypot(clamped.y) >= 0.0838 - 1e-12);
    }

    #[test]
    fn clamp_rejects_nan() {
        let geometry = LegGeometry::default();
        let foot = Vector3::new(f64::NAN, 0.2, 0.0);
        assert_eq!(
            geometry.clamp_to_workspace(&foot, Side::Left),
            Err(KinematicsError::NonFiniteTarget)
        );
    }
}
