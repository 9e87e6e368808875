//! Rest-to-stand startup ramp.
//!
//! Yields `steps` joint vectors; vector `k` (1-based) is the convex
//! combination with weight `k / steps` toward the stand pose, so the last
//! one is exactly the stand pose.

use quadpose_core::types::JointVector;

#[derive(Debug, Clone)]
pub struct StartupRamp {
    rest: JointVector,
    stand: JointVector,
    steps: u32,
    emitted: u32,
}

impl StartupRamp {
    pub const fn new(rest: JointVector, stand: JointVector, steps: u32) -> Self {
        Self {
            rest,
            stand,
            steps,
            emitted: 0,
        }
    }

    pub const fn steps(&self) -> u32 {
        self.steps
    }

    /// Interpolation weight of the `k`-th emitted vector.
    #[must_use]
    pub fn weight(&self, k: u32) -> f64 {
        if self.steps == 0 {
            1.0
        } else {
            f64::from(k.min(self.steps)) / f64::from(self.steps)
        }
    }

    pub const fn remaining(&self) -> u32 {
        self.steps - self.emitted
    }

    pub const fn is_finished(&self) -> bool {
        self.emitted >= self.steps
    }
}

impl Iterator for StartupRamp {
    type Item = JointVector;

    fn next(&mut self) -> Option<JointVector> {
        if self.is_finished() {
            return None;
        }
        self.emitted += 1;
        Some(self.rest.lerp(&self.stand, self.weight(self.emitted)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining() as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for StartupRamp {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
