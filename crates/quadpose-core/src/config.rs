use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{JointVector, Leg, NUM_JOINTS, NUM_LEGS, Pose};

/// Joint angles of the A1 lying on the ground, `[calf, hip, thigh]` per leg.
pub const A1_REST_POSE: [f64; NUM_JOINTS] = [
    -2.696_531_040_037_293_7, 0.498_887_344_565_424_94, 1.120_544_218_976_467,
    -2.696_531_979_625_671_5, -0.497_018_026_527_111_8, 1.120_613_411_204_782_8,
    -2.696_527_603_682_461, 0.495_765_037_428_792_1, 1.120_499_922_673_902_3,
    -2.696_530_048_416_36, -0.493_840_318_288_508_05, 1.120_652_791_112_583_2,
];

/// Joint angles of the A1 standing at the baseline height.
pub const A1_STAND_POSE: [f64; NUM_JOINTS] = [
    -1.958_359_198_375_735_1, -0.000_797_457_825_512_992_7, 0.979_443_459_240_087_6,
    -1.958_015_827_876_052_7, 0.000_487_515_197_375_998_35, 0.978_968_696_741_12,
    -1.968_766_039_552_742, 0.000_550_815_081_657_773_9, 0.965_129_518_670_196_7,
    -1.968_942_195_136_563, 0.000_275_368_677_195_686_5, 0.963_965_278_391_704_3,
];

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_control_hz() -> f64 {
    25.0
}
const fn default_startup_steps() -> u32 {
    100
}
const fn default_smoothing_divisor() -> f64 {
    10.0
}
const fn default_baseline_height() -> f64 {
    0.225
}
const fn default_rest_pose() -> [f64; NUM_JOINTS] {
    A1_REST_POSE
}
const fn default_stand_pose() -> [f64; NUM_JOINTS] {
    A1_STAND_POSE
}
fn default_hip_to_toe() -> [[f64; 3]; NUM_LEGS] {
    Leg::ALL.map(Leg::nominal_hip_to_toe)
}
const fn default_true() -> bool {
    true
}
const fn default_feedback_timeout_s() -> f64 {
    0.5
}
const fn default_kp() -> f64 {
    300.0
}
const fn default_kd() -> f64 {
    5.0
}
const fn default_motor_mode() -> u8 {
    10
}
const fn default_abduction_offset() -> f64 {
    0.0838
}
const fn default_link_length() -> f64 {
    0.2
}
const fn default_body_half_length() -> f64 {
    0.1805
}
const fn default_body_half_width() -> f64 {
    0.047
}
const fn default_min_extension() -> f64 {
    0.08
}
const fn default_max_extension() -> f64 {
    0.39
}
const fn default_angle_scale() -> AxisMapping {
    AxisMapping::new(0.5)
}
const fn default_height_scale() -> AxisMapping {
    AxisMapping::new(0.1)
}
const fn default_angle_limit() -> f64 {
    0.5
}
const fn default_height_travel() -> f64 {
    0.1
}
const fn default_stick_travel() -> f64 {
    35.0
}

// ---------------------------------------------------------------------------
// MotorGains
// ---------------------------------------------------------------------------

/// Fixed actuator gains and mode sent with every joint command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotorGains {
    /// Position gain (`Nm/rad`).
    #[serde(default = "default_kp")]
    pub kp: f64,
    /// Damping gain (`Nm·s/rad`).
    #[serde(default = "default_kd")]
    pub kd: f64,
    /// Actuator mode identifier (10 = closed-loop servo).
    #[serde(default = "default_motor_mode")]
    pub mode: u8,
}

impl Default for MotorGains {
    fn default() -> Self {
        Self {
            kp: default_kp(),
            kd: default_kd(),
            mode: default_motor_mode(),
        }
    }
}

// ---------------------------------------------------------------------------
// ControlConfig
// ---------------------------------------------------------------------------

/// Control loop configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Tick rate in Hz (default: 25).
    #[serde(default = "default_control_hz")]
    pub control_hz: f64,

    /// Interpolation steps from rest to stand (default: 100). Zero starts
    /// tracking immediately.
    #[serde(default = "default_startup_steps")]
    pub startup_steps: u32,

    /// Divisor N in `error = (target - current) / N` (default: 10).
    #[serde(default = "default_smoothing_divisor")]
    pub smoothing_divisor: f64,

    /// Neutral stand height in meters (default: 0.225).
    #[serde(default = "default_baseline_height")]
    pub baseline_height: f64,

    /// Joint vector the robot starts from.
    #[serde(default = "default_rest_pose")]
    pub rest_pose: [f64; NUM_JOINTS],

    /// Joint vector reached at the end of startup.
    #[serde(default = "default_stand_pose")]
    pub stand_pose: [f64; NUM_JOINTS],

    /// Initial hip-to-toe offset per leg, FL, FR, RL, RR.
    #[serde(default = "default_hip_to_toe")]
    pub hip_to_toe: [[f64; 3]; NUM_LEGS],

    #[serde(default)]
    pub gains: MotorGains,

    /// Clamp foot targets into the reachable workspace before solving IK.
    #[serde(default = "default_true")]
    pub clamp_to_workspace: bool,

    /// Feedback older than this (seconds) is reported as stale.
    #[serde(default = "default_feedback_timeout_s")]
    pub feedback_timeout_s: f64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            control_hz: default_control_hz(),
            startup_steps: default_startup_steps(),
            smoothing_divisor: default_smoothing_divisor(),
            baseline_height: default_baseline_height(),
            rest_pose: default_rest_pose(),
            stand_pose: default_stand_pose(),
            hip_to_toe: default_hip_to_toe(),
            gains: MotorGains::default(),
            clamp_to_workspace: true,
            feedback_timeout_s: default_feedback_timeout_s(),
        }
    }
}

impl ControlConfig {
    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.control_hz.is_finite() && self.control_hz > 0.0) {
            return Err(ConfigError::InvalidControlRate(self.control_hz));
        }
        match Duration::try_from_secs_f64(1.0 / self.control_hz) {
            Ok(period) if !period.is_zero() => {}
            _ => return Err(ConfigError::InvalidControlRate(self.control_hz)),
        }
        if !(self.smoothing_divisor.is_finite() && self.smoothing_divisor >= 1.0) {
            return Err(ConfigError::InvalidSmoothingDivisor(self.smoothing_divisor));
        }
        if !(self.baseline_height.is_finite() && self.baseline_height > 0.0) {
            return Err(invalid("baseline_height", "must be positive"));
        }
        if self.rest_pose.iter().any(|v| !v.is_finite()) {
            return Err(invalid("rest_pose", "contains a non-finite angle"));
        }
        if self.stand_pose.iter().any(|v| !v.is_finite()) {
            return Err(invalid("stand_pose", "contains a non-finite angle"));
        }
        if self.hip_to_toe.iter().flatten().any(|v| !v.is_finite()) {
            return Err(invalid("hip_to_toe", "contains a non-finite coordinate"));
        }
        if !(self.feedback_timeout_s.is_finite() && self.feedback_timeout_s > 0.0) {
            return Err(invalid("feedback_timeout_s", "must be positive and finite"));
        }
        if Duration::try_from_secs_f64(self.feedback_timeout_s).is_err() {
            return Err(invalid("feedback_timeout_s", "does not fit in a duration"));
        }
        Ok(())
    }

    /// Duration of one tick. Saturates at [`Duration::MAX`] for rates that
    /// [`validate`](Self::validate) rejects.
    pub fn tick_period(&self) -> Duration {
        Duration::try_from_secs_f64(1.0 / self.control_hz).unwrap_or(Duration::MAX)
    }

    pub fn feedback_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.feedback_timeout_s).unwrap_or(Duration::MAX)
    }

    pub const fn rest_joints(&self) -> JointVector {
        JointVector::new(self.rest_pose)
    }

    pub const fn stand_joints(&self) -> JointVector {
        JointVector::new(self.stand_pose)
    }

    /// Neutral pose at the baseline height.
    pub const fn neutral_pose(&self) -> Pose {
        Pose::neutral(self.baseline_height)
    }
}

// ---------------------------------------------------------------------------
// LegGeometryConfig
// ---------------------------------------------------------------------------

/// Link lengths and hip placement of the leg kinematic chain (meters).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegGeometryConfig {
    /// Lateral hip-to-thigh offset.
    #[serde(default = "default_abduction_offset")]
    pub abduction_offset: f64,
    #[serde(default = "default_link_length")]
    pub thigh_length: f64,
    #[serde(default = "default_link_length")]
    pub calf_length: f64,
    /// Trunk center to hip, forward axis.
    #[serde(default = "default_body_half_length")]
    pub body_half_length: f64,
    /// Trunk center to hip, lateral axis.
    #[serde(default = "default_body_half_width")]
    pub body_half_width: f64,
    /// Shortest hip-to-foot distance in the leg plane accepted by the clamp.
    #[serde(default = "default_min_extension")]
    pub min_extension: f64,
    /// Longest hip-to-foot distance in the leg plane accepted by the clamp.
    #[serde(default = "default_max_extension")]
    pub max_extension: f64,
}

impl Default for LegGeometryConfig {
    fn default() -> Self {
        Self {
            abduction_offset: default_abduction_offset(),
            thigh_length: default_link_length(),
            calf_length: default_link_length(),
            body_half_length: default_body_half_length(),
            body_half_width: default_body_half_width(),
            min_extension: default_min_extension(),
            max_extension: default_max_extension(),
        }
    }
}

impl LegGeometryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("abduction_offset", self.abduction_offset),
            ("thigh_length", self.thigh_length),
            ("calf_length", self.calf_length),
            ("body_half_length", self.body_half_length),
            ("body_half_width", self.body_half_width),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(field, "must be positive"));
            }
        }
        let folded = (self.thigh_length - self.calf_length).abs();
        let stretched = self.thigh_length + self.calf_length;
        if !(self.min_extension >= folded && self.min_extension < self.max_extension) {
            return Err(invalid(
                "min_extension",
                "must be >= |thigh - calf| and < max_extension",
            ));
        }
        if self.max_extension > stretched {
            return Err(invalid("max_extension", "must be <= thigh + calf"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Input mapping
// ---------------------------------------------------------------------------

/// What the pose targets do when the operator lets go of every stick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleasePolicy {
    /// Targets return to roll = pitch = yaw = 0 at the baseline height.
    #[default]
    ReturnToNeutral,
    /// Targets keep the last commanded value.
    HoldLast,
}

/// Scaling and dead zone for one normalized stick axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisMapping {
    /// Scale factor applied to the normalized deflection.
    pub scale: f64,
    /// Deflections below this magnitude are treated as zero.
    #[serde(default)]
    pub dead_zone: f64,
}

impl AxisMapping {
    /// Create a mapping with the given scale and no dead zone.
    #[must_use]
    pub const fn new(scale: f64) -> Self {
        Self {
            scale,
            dead_zone: 0.0,
        }
    }

    /// Set the dead zone threshold.
    #[must_use]
    pub const fn with_dead_zone(mut self, dead_zone: f64) -> Self {
        self.dead_zone = dead_zone;
        self
    }

    /// Apply dead zone and scaling to a normalized deflection.
    #[must_use]
    pub fn apply(&self, raw: f64) -> f64 {
        if raw.abs() < self.dead_zone {
            0.0
        } else {
            raw * self.scale
        }
    }
}

/// Operator input mapping and travel limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_angle_scale")]
    pub roll: AxisMapping,
    #[serde(default = "default_angle_scale")]
    pub pitch: AxisMapping,
    #[serde(default = "default_angle_scale")]
    pub yaw: AxisMapping,
    /// Stick-down lowers the body by `deflection * scale` meters.
    #[serde(default = "default_height_scale")]
    pub height: AxisMapping,
    /// Largest accepted |roll|, |pitch|, |yaw| target (radians).
    #[serde(default = "default_angle_limit")]
    pub angle_limit: f64,
    /// Largest accepted height offset from the baseline (meters).
    #[serde(default = "default_height_travel")]
    pub height_travel: f64,
    /// Raw stick delta that counts as full deflection (input units, e.g.
    /// pixels).
    #[serde(default = "default_stick_travel")]
    pub stick_travel: f64,
    #[serde(default)]
    pub release_policy: ReleasePolicy,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            roll: default_angle_scale(),
            pitch: default_angle_scale(),
            yaw: default_angle_scale(),
            height: default_height_scale(),
            angle_limit: default_angle_limit(),
            height_travel: default_height_travel(),
            stick_travel: default_stick_travel(),
            release_policy: ReleasePolicy::default(),
        }
    }
}

impl InputConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.angle_limit.is_finite() && self.angle_limit > 0.0) {
            return Err(invalid("angle_limit", "must be positive"));
        }
        if !(self.height_travel.is_finite() && self.height_travel >= 0.0) {
            return Err(invalid("height_travel", "must be non-negative"));
        }
        if !(self.stick_travel.is_finite() && self.stick_travel > 0.0) {
            return Err(invalid("stick_travel", "must be positive"));
        }
        for (field, mapping) in [
            ("roll", self.roll),
            ("pitch", self.pitch),
            ("yaw", self.yaw),
            ("height", self.height),
        ] {
            if !mapping.scale.is_finite() || !(0.0..1.0).contains(&mapping.dead_zone) {
                return Err(invalid(field, "scale must be finite, dead_zone in [0, 1)"));
            }
        }
        Ok(())
    }

    /// Clamp a pose target to the travel limits around `baseline`.
    #[must_use]
    pub fn clamp(&self, pose: Pose, baseline: f64) -> Pose {
        let a = self.angle_limit;
        Pose::new(
            pose.roll.clamp(-a, a),
            pose.pitch.clamp(-a, a),
            pose.yaw.clamp(-a, a),
            pose.height
                .clamp(baseline - self.height_travel, baseline + self.height_travel),
        )
    }
}

// ---------------------------------------------------------------------------
// QuadposeConfig
// ---------------------------------------------------------------------------

/// Complete configuration file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuadposeConfig {
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub geometry: LegGeometryConfig,
    #[serde(default)]
    pub input: InputConfig,
}

impl QuadposeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.control.validate()?;
        self.geometry.validate()?;
        self.input.validate()?;
        Ok(())
    }

    /// Parse from a TOML string and validate.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
