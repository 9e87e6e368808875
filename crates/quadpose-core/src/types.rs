use std::fmt;
use std::ops::{Add, Index, IndexMut, Sub};

use serde::{Deserialize, Serialize};

use crate::error::FeedbackError;

/// Number of legs on the robot.
pub const NUM_LEGS: usize = 4;
/// Actuated joints per leg.
pub const JOINTS_PER_LEG: usize = 3;
/// Total actuated joints.
pub const NUM_JOINTS: usize = NUM_LEGS * JOINTS_PER_LEG;

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// Which side of the trunk a leg is mounted on.
///
/// Left legs sit at negative lateral `x` in the leg frame, right legs at
/// positive `x`. The IK solver uses this to pick the mirrored geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Sign of the lateral axis for this side (`-1.0` left, `+1.0` right).
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Leg
// ---------------------------------------------------------------------------

/// One of the four fixed leg identities, in command order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Leg {
    FrontLeft,
    FrontRight,
    RearLeft,
    RearRight,
}

impl Leg {
    /// All legs in the fixed FL, FR, RL, RR order.
    pub const ALL: [Self; NUM_LEGS] = [
        Self::FrontLeft,
        Self::FrontRight,
        Self::RearLeft,
        Self::RearRight,
    ];

    /// Position of this leg in the command order.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Leg at `index` in the command order, if any.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::FrontLeft),
            1 => Some(Self::FrontRight),
            2 => Some(Self::RearLeft),
            3 => Some(Self::RearRight),
            _ => None,
        }
    }

    /// Parity bit used for IK handedness (`true` for FL and RL).
    #[must_use]
    pub const fn is_even(self) -> bool {
        self.index() % 2 == 0
    }

    /// Mounting side, derived from parity.
    #[must_use]
    pub const fn side(self) -> Side {
        if self.is_even() { Side::Left } else { Side::Right }
    }

    /// Whether the leg is on the front axle.
    #[must_use]
    pub const fn is_front(self) -> bool {
        matches!(self, Self::FrontLeft | Self::FrontRight)
    }

    /// Short label used in channel names and logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FrontLeft => "FL",
            Self::FrontRight => "FR",
            Self::RearLeft => "RL",
            Self::RearRight => "RR",
        }
    }

    /// Nominal standing hip-to-toe offset `[x, y, z]` in meters.
    ///
    /// `x` is lateral (the abduction link length, signed by side), `y` the
    /// stand height below the hip and `z` forward.
    #[must_use]
    pub const fn nominal_hip_to_toe(self) -> [f64; 3] {
        match self.side() {
            Side::Left => [-0.0838, 0.225, 0.0],
            Side::Right => [0.0838, 0.225, 0.0],
        }
    }
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// JointKind
// ---------------------------------------------------------------------------

/// Joint slot within a leg, in transport order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JointKind {
    Calf,
    Hip,
    Thigh,
}

impl JointKind {
    /// All joints in per-leg slot order.
    pub const ALL: [Self; JOINTS_PER_LEG] = [Self::Calf, Self::Hip, Self::Thigh];

    /// Slot of this joint within its leg's triple.
    #[must_use]
    pub const fn slot(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Calf => "calf",
            Self::Hip => "hip",
            Self::Thigh => "thigh",
        }
    }
}

// ---------------------------------------------------------------------------
// JointVector
// ---------------------------------------------------------------------------

/// Twelve joint angles (radians) in the fixed positional order:
/// legs FL, FR, RL, RR, each as `[calf, hip, thigh]`.
///
/// The order is positional at the transport boundary, so every producer and
/// consumer goes through [`JointVector::index_of`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct JointVector([f64; NUM_JOINTS]);

impl JointVector {
    #[must_use]
    pub const fn new(values: [f64; NUM_JOINTS]) -> Self {
        Self(values)
    }

    #[must_use]
    pub const fn zeros() -> Self {
        Self([0.0; NUM_JOINTS])
    }

    /// Flat index of `joint` on `leg`.
    #[must_use]
    pub const fn index_of(leg: Leg, joint: JointKind) -> usize {
        leg.index() * JOINTS_PER_LEG + joint.slot()
    }

    #[must_use]
    pub const fn as_array(&self) -> &[f64; NUM_JOINTS] {
        &self.0
    }

    #[must_use]
    pub const fn get(&self, leg: Leg, joint: JointKind) -> f64 {
        self.0[Self::index_of(leg, joint)]
    }

    pub const fn set(&mut self, leg: Leg, joint: JointKind, value: f64) {
        self.0[Self::index_of(leg, joint)] = value;
    }

    /// The `[calf, hip, thigh]` triple of one leg.
    #[must_use]
    pub const fn leg(&self, leg: Leg) -> [f64; JOINTS_PER_LEG] {
        let base = leg.index() * JOINTS_PER_LEG;
        [self.0[base], self.0[base + 1], self.0[base + 2]]
    }

    pub const fn set_leg(&mut self, leg: Leg, values: [f64; JOINTS_PER_LEG]) {
        let base = leg.index() * JOINTS_PER_LEG;
        self.0[base] = values[0];
        self.0[base + 1] = values[1];
        self.0[base + 2] = values[2];
    }

    /// Convex combination `(1 - weight) * self + weight * other`.
    ///
    /// At `weight == 1.0` the result is exactly `other`.
    #[must_use]
    pub fn lerp(&self, other: &Self, weight: f64) -> Self {
        let mut out = [0.0; NUM_JOINTS];
        for (i, value) in out.iter_mut().enumerate() {
            *value = (1.0 - weight).mul_add(self.0[i], weight * other.0[i]);
        }
        Self(out)
    }

    /// Largest absolute element-wise difference.
    #[must_use]
    pub fn max_abs_diff(&self, other: &Self) -> f64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }
}

impl Index<usize> for JointVector {
    type Output = f64;
    fn index(&self, i: usize) -> &f64 {
        &self.0[i]
    }
}

impl IndexMut<usize> for JointVector {
    fn index_mut(&mut self, i: usize) -> &mut f64 {
        &mut self.0[i]
    }
}

impl From<[f64; NUM_JOINTS]> for JointVector {
    fn from(values: [f64; NUM_JOINTS]) -> Self {
        Self(values)
    }
}

impl TryFrom<&[f64]> for JointVector {
    type Error = FeedbackError;

    fn try_from(values: &[f64]) -> Result<Self, Self::Error> {
        let array: [f64; NUM_JOINTS] =
            values
                .try_into()
                .map_err(|_| FeedbackError::LengthMismatch {
                    expected: NUM_JOINTS,
                    got: values.len(),
                })?;
        if let Some(index) = array.iter().position(|v| !v.is_finite()) {
            return Err(FeedbackError::NonFinite { index });
        }
        Ok(Self(array))
    }
}

// ---------------------------------------------------------------------------
// Pose
// ---------------------------------------------------------------------------

/// Commanded body pose: roll, pitch, yaw (radians) and height (meters).
///
/// `height` is the absolute hip-to-toe stand height; the neutral pose sits
/// at the configured baseline.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub height: f64,
}

impl Pose {
    #[must_use]
    pub const fn new(roll: f64, pitch: f64, yaw: f64, height: f64) -> Self {
        Self {
            roll,
            pitch,
            yaw,
            height,
        }
    }

    /// Level pose at `baseline` height.
    #[must_use]
    pub const fn neutral(baseline: f64) -> Self {
        Self::new(0.0, 0.0, 0.0, baseline)
    }

    /// Every component multiplied by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(
            self.roll * factor,
            self.pitch * factor,
            self.yaw * factor,
            self.height * factor,
        )
    }

    /// Largest absolute component.
    #[must_use]
    pub fn max_abs(&self) -> f64 {
        self.roll
            .abs()
            .max(self.pitch.abs())
            .max(self.yaw.abs())
            .max(self.height.abs())
    }

    pub fn is_finite(&self) -> bool {
        self.roll.is_finite()
            && self.pitch.is_finite()
            && self.yaw.is_finite()
            && self.height.is_finite()
    }
}

impl Add for Pose {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.roll + rhs.roll,
            self.pitch + rhs.pitch,
            self.yaw + rhs.yaw,
            self.height + rhs.height,
        )
    }
}

impl Sub for Pose {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.roll - rhs.roll,
            self.pitch - rhs.pitch,
            self.yaw - rhs.yaw,
            self.height - rhs.height,
        )
    }
}

// ---------------------------------------------------------------------------
// JointFeedback
// ---------------------------------------------------------------------------

/// Latest reported joint positions and velocities, same order as commands.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct JointFeedback {
    pub positions: JointVector,
    pub velocities: JointVector,
}

impl JointFeedback {
    /// Build from raw slices, validating length and finiteness.
    pub fn from_slices(positions: &[f64], velocities: &[f64]) -> Result<Self, FeedbackError> {
        Ok(Self {
            positions: JointVector::try_from(positions)?,
            velocities: JointVector::try_from(velocities)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
