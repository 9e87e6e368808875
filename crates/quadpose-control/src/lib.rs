//! Body pose control loop for a four-legged robot.
//!
//! # Pipeline
//!
//! ```text
//! PoseCommander ──► PoseController ──► JointTransport ──► actuators
//!   (target)        startup ramp,         (12 channels)       │
//!                   smoothing, IK                              │
//!      FeedbackCell ◄──────────────────── joint feedback ◄─────┘
//! ```
//!
//! [`PoseController`] is the clock-free core: one call to
//! [`tick`](PoseController::tick) per period. [`ControlRunner`] wraps it in
//! a fixed-rate thread that snapshots the pose target and feedback, ticks,
//! and sends the command.
//!
//! # Quick Start
//!
//! ```no_run
//! use quadpose_control::prelude::*;
//! use quadpose_core::config::QuadposeConfig;
//! use quadpose_teleop::PoseCommander;
//!
//! let config = QuadposeConfig::default();
//! let (transport, commands) = ChannelTransport::bounded(8);
//! let commander = PoseCommander::new(config.input.clone(), config.control.baseline_height);
//! let feedback = FeedbackCell::new();
//!
//! let runner = ControlRunner::new(
//!     &config.control,
//!     PoseController::from_config(&config),
//!     transport,
//!     commander.clone(),
//!     feedback,
//! );
//! let handle = runner.spawn().unwrap();
//! commander.set_target(0.0, 0.1, 0.0, 0.2);
//! let first = commands.recv().unwrap();
//! assert_eq!(first.motor_commands().count(), 12);
//! handle.stop();
//! handle.join().unwrap();
//! ```

pub mod controller;
pub mod feedback;
pub mod runner;
pub mod smoothing;
pub mod startup;
pub mod transport;

pub use controller::{ControlError, Phase, PoseController, TickOutput};
pub use feedback::{FeedbackCell, FeedbackSnapshot, Freshness, StalenessMonitor};
pub use runner::{ControlRunner, Pacer, RunSummary, RunnerHandle, StopHandle, TickReport};
pub use smoothing::PoseSmoother;
pub use startup::StartupRamp;
pub use transport::{
    CHANNEL_NAMES, ChannelTransport, JointCommand, JointTransport, MotorCommand, channel_name,
};

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::controller::{ControlError, Phase, PoseController};
    pub use crate::feedback::FeedbackCell;
    pub use crate::runner::{ControlRunner, RunSummary, StopHandle};
    pub use crate::transport::{ChannelTransport, JointCommand, JointTransport};
}
