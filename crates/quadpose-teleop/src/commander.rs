//! Shared pose target cell.
//!
//! [`PoseCommander`] is the single point where an input surface hands pose
//! targets to the control thread. Writers and the reader swap whole [`Pose`]
//! values under a short lock, so a read never observes a half-written target.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};
use parking_lot::Mutex;

use quadpose_core::config::{InputConfig, ReleasePolicy};
use quadpose_core::types::Pose;

// ---------------------------------------------------------------------------
// PoseCommander
// ---------------------------------------------------------------------------

/// Cloneable handle to the operator's pose target.
///
/// Every clone shares the same target. Targets are clamped to the input
/// travel limits on write. Dropping the input surface does not stop the
/// loop; call [`disconnect`](Self::disconnect) for that.
///
/// # Example
///
/// ```
/// use quadpose_core::config::InputConfig;
/// use quadpose_teleop::PoseCommander;
///
/// let commander = PoseCommander::new(InputConfig::default(), 0.225);
/// commander.set_target(0.1, 0.0, 0.0, 0.2);
///
/// let target = commander.read_target();
/// assert!((target.roll - 0.1).abs() < f64::EPSILON);
///
/// commander.release();
/// assert_eq!(commander.read_target(), commander.neutral());
/// ```
#[derive(Debug, Clone)]
pub struct PoseCommander {
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    target: Mutex<Pose>,
    connected: AtomicBool,
    input: InputConfig,
    baseline: f64,
}

impl PoseCommander {
    /// Create a commander with the target at the neutral pose.
    pub fn new(input: InputConfig, baseline: f64) -> Self {
        Self {
            shared: Arc::new(Shared {
                target: Mutex::new(Pose::neutral(baseline)),
                connected: AtomicBool::new(true),
                input,
                baseline,
            }),
        }
    }

    /// Neutral pose: level at the baseline height.
    pub fn neutral(&self) -> Pose {
        Pose::neutral(self.shared.baseline)
    }

    pub fn input_config(&self) -> &InputConfig {
        &self.shared.input
    }

    /// Replace the target. Values are clamped to the travel limits and
    /// non-finite writes are ignored.
    pub fn set_target(&self, roll: f64, pitch: f64, yaw: f64, height: f64) {
        self.set_pose(Pose::new(roll, pitch, yaw, height));
    }

    pub fn set_pose(&self, pose: Pose) {
        if !pose.is_finite() {
            debug!("Ignoring non-finite pose target {pose:?}");
            return;
        }
        let clamped = self.shared.input.clamp(pose, self.shared.baseline);
        *self.shared.target.lock() = clamped;
    }

    /// Snapshot of the current target.
    pub fn read_target(&self) -> Pose {
        *self.shared.target.lock()
    }

    /// The operator let go of every input.
    ///
    /// With [`ReleasePolicy::ReturnToNeutral`] the target snaps back to the
    /// neutral pose; with [`ReleasePolicy::HoldLast`] it is left alone.
    pub fn release(&self) {
        match self.shared.input.release_policy {
            ReleasePolicy::ReturnToNeutral => {
                *self.shared.target.lock() = self.neutral();
            }
            ReleasePolicy::HoldLast => {}
        }
    }

    /// Mark the input surface as closed. The control loop stops after its
    /// current tick.
    pub fn disconnect(&self) {
        if self.shared.connected.swap(false, Ordering::AcqRel) {
            info!("Operator input disconnected");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::Acquire)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
