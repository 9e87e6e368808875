// quadpose-core: Leg identities, pose and joint vectors, config and errors.

pub mod config;
pub mod error;
pub mod types;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::config::{
        AxisMapping, ControlConfig, InputConfig, LegGeometryConfig, MotorGains, QuadposeConfig,
        ReleasePolicy,
    };
    pub use crate::error::{
        ConfigError, FeedbackError, KinematicsError, QuadposeError, TransportError,
    };
    pub use crate::types::{
        JOINTS_PER_LEG, JointFeedback, JointKind, JointVector, Leg, NUM_JOINTS, NUM_LEGS, Pose,
        Side,
    };
}
