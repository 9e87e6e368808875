//! Deterministic RNG utilities for reproducible tests.

use nalgebra::Vector3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use quadpose_core::config::InputConfig;
use quadpose_core::types::{Leg, Pose};

/// Create a deterministic `ChaCha8Rng` from a seed.
///
/// All test randomization should go through this to ensure reproducibility.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Random hip-to-toe offset for `leg` well inside the A1 workspace.
pub fn reachable_foot(rng: &mut ChaCha8Rng, leg: Leg) -> Vector3<f64> {
    let [x, _, _] = leg.nominal_hip_to_toe();
    Vector3::new(
        x + rng.gen_range(-0.03..0.03),
        rng.gen_range(0.15..0.30),
        rng.gen_range(-0.08..0.08),
    )
}

/// Random pose target inside the travel limits of `input`.
pub fn random_pose(rng: &mut ChaCha8Rng, input: &InputConfig, baseline: f64) -> Pose {
    let a = input.angle_limit;
    let h = input.height_travel;
    Pose::new(
        rng.gen_range(-a..=a),
        rng.gen_range(-a..=a),
        rng.gen_range(-a..=a),
        baseline + rng.gen_range(-h..=h),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
