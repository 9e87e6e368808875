//! Transport that stands in for the robot.
//!
//! Every command is logged and its positions are published back as joint
//! feedback, as if each actuator reached its target within one tick.

use log::{debug, trace};

use quadpose_control::feedback::FeedbackCell;
use quadpose_control::transport::{JointCommand, JointTransport};
use quadpose_core::error::TransportError;
use quadpose_core::types::{JointFeedback, JointVector};

#[derive(Debug, Clone)]
pub struct LoopbackTransport {
    feedback: FeedbackCell,
    sent: u64,
}

impl LoopbackTransport {
    pub const fn new(feedback: FeedbackCell) -> Self {
        Self { feedback, sent: 0 }
    }

    /// Commands accepted so far.
    pub const fn sent(&self) -> u64 {
        self.sent
    }
}

impl JointTransport for LoopbackTransport {
    fn send(&mut self, command: &JointCommand) -> Result<(), TransportError> {
        debug!("Command {}: {:?}", self.sent, command.positions.as_array());
        for (channel, motor) in command.motor_commands() {
            trace!("  {channel}: q={:.4} kp={} kd={}", motor.q, motor.kp, motor.kd);
        }
        self.feedback.publish(JointFeedback {
            positions: command.positions,
            velocities: JointVector::zeros(),
        });
        self.sent += 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
