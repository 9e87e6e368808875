//! Virtual stick input mapped to pose targets.
//!
//! Three sticks drive the pose:
//!
//! | Stick | x axis | y axis |
//! |-------|--------|--------|
//! | 1 | roll | |
//! | 2 | yaw | height (down lowers the body) |
//! | 3 | pitch | |
//!
//! Raw deltas are measured from the stick centre in input units and limited
//! to the travel disc before scaling.

use std::fmt;

use quadpose_core::config::{InputConfig, ReleasePolicy};
use quadpose_core::types::Pose;

// ---------------------------------------------------------------------------
// Stick
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stick {
    Roll,
    YawHeight,
    Pitch,
}

impl Stick {
    pub const ALL: [Self; 3] = [Self::Roll, Self::YawHeight, Self::Pitch];

    /// Stick by its 1-based number on the operator surface.
    #[must_use]
    pub const fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::Roll),
            2 => Some(Self::YawHeight),
            3 => Some(Self::Pitch),
            _ => None,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Stick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stick {}", self.index() + 1)
    }
}

/// Limit a raw `(dx, dy)` delta to the travel disc and normalize it to the
/// unit disc.
#[must_use]
pub fn normalize_deflection(dx: f64, dy: f64, travel: f64) -> [f64; 2] {
    let distance = dx.hypot(dy);
    let scale = if distance > travel { travel / distance } else { 1.0 };
    [dx * scale / travel, dy * scale / travel]
}

// ---------------------------------------------------------------------------
// StickState
// ---------------------------------------------------------------------------

/// Normalized deflection of each stick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StickState {
    deflection: [[f64; 2]; 3],
}

impl StickState {
    pub const fn deflection(&self, stick: Stick) -> [f64; 2] {
        self.deflection[stick.index()]
    }

    pub const fn set(&mut self, stick: Stick, deflection: [f64; 2]) {
        self.deflection[stick.index()] = deflection;
    }

    pub fn center_all(&mut self) {
        self.deflection = [[0.0; 2]; 3];
    }
}

// ---------------------------------------------------------------------------
// PoseMapper
// ---------------------------------------------------------------------------

/// Turns stick movements into pose targets.
#[derive(Debug, Clone)]
pub struct PoseMapper {
    input: InputConfig,
    baseline: f64,
    sticks: StickState,
}

impl PoseMapper {
    pub fn new(input: InputConfig, baseline: f64) -> Self {
        Self {
            input,
            baseline,
            sticks: StickState::default(),
        }
    }

    pub const fn sticks(&self) -> &StickState {
        &self.sticks
    }

    /// Move `stick` to the raw delta `(dx, dy)` and return the new target.
    pub fn move_stick(&mut self, stick: Stick, dx: f64, dy: f64) -> Pose {
        let deflection = normalize_deflection(dx, dy, self.input.stick_travel);
        self.sticks.set(stick, deflection);
        self.target()
    }

    /// Let go of every stick. Sticks spring back to centre unless the
    /// release policy holds the last target.
    pub fn release_all(&mut self) {
        if self.input.release_policy == ReleasePolicy::ReturnToNeutral {
            self.sticks.center_all();
        }
    }

    /// Pose target for the current stick state.
    #[must_use]
    pub fn target(&self) -> Pose {
        let [roll_x, _] = self.sticks.deflection(Stick::Roll);
        let [yaw_x, height_y] = self.sticks.deflection(Stick::YawHeight);
        let [pitch_x, _] = self.sticks.deflection(Stick::Pitch);
        Pose::new(
            self.input.roll.apply(roll_x),
            self.input.pitch.apply(pitch_x),
            self.input.yaw.apply(yaw_x),
            self.baseline - self.input.height.apply(height_y),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
