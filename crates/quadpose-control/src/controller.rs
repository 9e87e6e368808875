//! Per-tick pose controller.
//!
//! [`PoseController`] owns all state that persists across ticks: the startup
//! ramp, the committed pose and the per-leg hip-to-toe targets. It has no
//! clock and does no I/O, so every tick is a pure function of the previous
//! state, the pose target and the joint feedback.

use log::info;
use nalgebra::Vector3;
use thiserror::Error;

use quadpose_core::config::{ControlConfig, QuadposeConfig};
use quadpose_core::error::KinematicsError;
use quadpose_core::types::{JointVector, Leg, NUM_LEGS, Pose};
use quadpose_ik::{AnalyticLegSolver, KinematicsAdapter, LegGeometry, LegIk, rotate};

use crate::smoothing::PoseSmoother;
use crate::startup::StartupRamp;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Interpolating from the rest pose to the stand pose.
    Startup,
    /// Following operator pose targets.
    Tracking,
}

/// Joint targets produced by one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutput {
    /// Phase the tick ran in.
    pub phase: Phase,
    pub positions: JointVector,
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ControlError {
    #[error("IK failed for leg {leg}: {source}")]
    Kinematics {
        leg: Leg,
        #[source]
        source: KinematicsError,
    },
}

// ---------------------------------------------------------------------------
// PoseController
// ---------------------------------------------------------------------------

pub struct PoseController<S = AnalyticLegSolver> {
    adapter: KinematicsAdapter<S>,
    ramp: StartupRamp,
    smoother: PoseSmoother,
    hip_to_toe: [Vector3<f64>; NUM_LEGS],
    last_command: Option<JointVector>,
    phase: Phase,
}

impl PoseController<AnalyticLegSolver> {
    /// Controller with the analytic solver over the configured geometry.
    pub fn from_config(config: &QuadposeConfig) -> Self {
        let geometry = LegGeometry::from_config(&config.geometry);
        let adapter = KinematicsAdapter::analytic(geometry)
            .with_workspace_clamp(config.control.clamp_to_workspace);
        Self::new(&config.control, adapter)
    }
}

impl<S: LegIk> PoseController<S> {
    pub fn new(control: &ControlConfig, adapter: KinematicsAdapter<S>) -> Self {
        let ramp = StartupRamp::new(
            control.rest_joints(),
            control.stand_joints(),
            control.startup_steps,
        );
        let phase = if ramp.is_finished() {
            Phase::Tracking
        } else {
            Phase::Startup
        };
        Self {
            adapter,
            ramp,
            smoother: PoseSmoother::new(control.neutral_pose(), control.smoothing_divisor),
            hip_to_toe: control.hip_to_toe.map(Vector3::from),
            last_command: None,
            phase,
        }
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub const fn startup_steps(&self) -> u32 {
        self.ramp.steps()
    }

    /// Committed (smoothed) pose.
    pub const fn current_pose(&self) -> Pose {
        self.smoother.current()
    }

    pub const fn hip_to_toe(&self, leg: Leg) -> Vector3<f64> {
        self.hip_to_toe[leg.index()]
    }

    /// Last successfully produced joint targets.
    pub const fn last_command(&self) -> Option<JointVector> {
        self.last_command
    }

    pub const fn adapter(&self) -> &KinematicsAdapter<S> {
        &self.adapter
    }

    /// Run one tick.
    ///
    /// During startup the next ramp vector is returned and `target` is
    /// ignored. While tracking, the committed pose moves one smoothing step
    /// toward `target` and every leg is solved with `feedback` steering the
    /// branch choice. A failed leg leaves all controller state untouched.
    pub fn tick(
        &mut self,
        target: &Pose,
        feedback: &JointVector,
    ) -> Result<TickOutput, ControlError> {
        if self.phase == Phase::Startup {
            if let Some(positions) = self.ramp.next() {
                if self.ramp.is_finished() {
                    info!("Startup complete, tracking pose targets");
                    self.phase = Phase::Tracking;
                }
                self.last_command = Some(positions);
                return Ok(TickOutput {
                    phase: Phase::Startup,
                    positions,
                });
            }
            self.phase = Phase::Tracking;
        }
        self.track(target, feedback)
    }

    fn track(&mut self, target: &Pose, feedback: &JointVector) -> Result<TickOutput, ControlError> {
        let error = self.smoother.error(target);
        let geometry = *self.adapter.geometry();

        let mut next = self.hip_to_toe;
        let mut positions = JointVector::zeros();
        for leg in Leg::ALL {
            let mut local = next[leg.index()];
            local.y += error.height;

            let global = rotate(
                &geometry.global_position(leg, &local),
                error.roll,
                error.pitch,
                error.yaw,
            );
            let local = geometry.local_position(leg, &global);

            let slots = self
                .adapter
                .leg_targets(leg, &local, feedback.leg(leg))
                .map_err(|source| ControlError::Kinematics { leg, source })?;
            next[leg.index()] = local;
            positions.set_leg(leg, slots);
        }

        self.hip_to_toe = next;
        self.smoother.commit(&error);
        self.last_command = Some(positions);
        Ok(TickOutput {
            phase: Phase::Tracking,
            positions,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
