//! Outbound joint commands.
//!
//! One [`JointCommand`] per tick fans out to twelve actuator channels named
//! `<LEG>_<joint>`, in the fixed order FL, FR, RL, RR and calf, hip, thigh.
//! Position is carried per channel; gains and mode are shared.

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

use quadpose_core::config::MotorGains;
use quadpose_core::error::TransportError;
use quadpose_core::types::{JointKind, JointVector, Leg, NUM_JOINTS};

/// Actuator channel names in command order.
pub const CHANNEL_NAMES: [&str; NUM_JOINTS] = [
    "FL_calf", "FL_hip", "FL_thigh", "FR_calf", "FR_hip", "FR_thigh", "RL_calf", "RL_hip",
    "RL_thigh", "RR_calf", "RR_hip", "RR_thigh",
];

/// Channel name for one joint.
#[must_use]
pub const fn channel_name(leg: Leg, joint: JointKind) -> &'static str {
    CHANNEL_NAMES[JointVector::index_of(leg, joint)]
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Message for a single actuator channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorCommand {
    /// Target position (rad).
    pub q: f64,
    pub kp: f64,
    pub kd: f64,
    pub mode: u8,
}

/// Joint targets for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointCommand {
    pub positions: JointVector,
    pub gains: MotorGains,
}

impl JointCommand {
    pub const fn new(positions: JointVector, gains: MotorGains) -> Self {
        Self { positions, gains }
    }

    /// Per-channel messages in command order.
    pub fn motor_commands(&self) -> impl Iterator<Item = (&'static str, MotorCommand)> + '_ {
        CHANNEL_NAMES
            .iter()
            .zip(self.positions.iter())
            .map(|(name, q)| {
                (
                    *name,
                    MotorCommand {
                        q,
                        kp: self.gains.kp,
                        kd: self.gains.kd,
                        mode: self.gains.mode,
                    },
                )
            })
    }
}

// ---------------------------------------------------------------------------
// JointTransport
// ---------------------------------------------------------------------------

/// Sink for joint commands.
///
/// `send` must not block the control thread. A failed send drops that
/// tick's command; the next tick sends a fresh one.
pub trait JointTransport: Send {
    fn send(&mut self, command: &JointCommand) -> Result<(), TransportError>;
}

impl<T: JointTransport + ?Sized> JointTransport for Box<T> {
    fn send(&mut self, command: &JointCommand) -> Result<(), TransportError> {
        (**self).send(command)
    }
}

/// Bounded in-process channel to an actuator driver thread.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: Sender<JointCommand>,
}

impl ChannelTransport {
    /// Create a transport and the receiver the driver reads from.
    pub fn bounded(capacity: usize) -> (Self, Receiver<JointCommand>) {
        let (tx, rx) = bounded(capacity);
        (Self { tx }, rx)
    }
}

impl JointTransport for ChannelTransport {
    fn send(&mut self, command: &JointCommand) -> Result<(), TransportError> {
        self.tx.try_send(*command).map_err(|e| match e {
            TrySendError::Full(_) => TransportError::Full,
            TrySendError::Disconnected(_) => TransportError::Disconnected,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn command(value: f64) -> JointCommand {
        JointCommand::new(JointVector::new([value; NUM_JOINTS]), MotorGains::default())
    }

    #[test]
    fn channel_names_follow_layout() {
        for leg in Leg::ALL {
            for joint in JointKind::ALL {
                assert_eq!(
                    channel_name(leg, joint),
                    format!("{}_{}", leg.label(), joint.label())
                );
            }
        }
    }

    #[test]
    fn motor_commands_carry_gains() {
        let mut positions = JointVector::zeros();
        positions.set(Leg::RearRight, JointKind::Hip, 0.3);
        let cmd = JointCommand::new(positions, MotorGains::default());
        let messages: Vec<_> = cmd.motor_commands().collect();
        assert_eq!(messages.len(), NUM_JOINTS);
        let (name, msg) = messages[10];
        assert_eq!(name, "RR_hip");
        assert!((msg.q - 0.3).abs() < f64::EPSILON);
        assert!((msg.kp - 300.0).abs() < f64::EPSILON);
        assert!((msg.kd - 5.0).abs() < f64::EPSILON);
        assert_eq!(msg.mode, 10);
    }

    #[test]
    fn channel_transport_delivers() {
        let (mut transport, rx) = ChannelTransport::bounded(4);
        transport.send(&command(1.0)).unwrap();
        assert_eq!(rx.try_recv().unwrap(), command(1.0));
    }

    #[test]
    fn channel_transport_full() {
        let (mut transport, _rx) = ChannelTransport::bounded(1);
        transport.send(&command(1.0)).unwrap();
        assert_eq!(transport.send(&command(2.0)), Err(TransportError::Full));
    }

    #[test]
    fn channel_transport_disconnected() {
        let (mut transport, rx) = ChannelTransport::bounded(1);
        drop(rx);
        assert_eq!(
            transport.send(&command(1.0)),
            Err(TransportError::Disconnected)
        );
    }
}
