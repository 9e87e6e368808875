//! Kinematics adapter between the control loop and a [`LegIk`] solver.
//!
//! The control loop works in actuator slot order `[calf, hip, thigh]`, the
//! solver in `[abduction, thigh - π/2, knee]`. The adapter owns both
//! conversions and the optional workspace clamp; it holds no per-tick state.

use std::f64::consts::FRAC_PI_2;

use log::trace;
use nalgebra::Vector3;

use quadpose_core::error::KinematicsError;
use quadpose_core::types::{JOINTS_PER_LEG, Leg};

use crate::geometry::LegGeometry;
use crate::solver::{AnalyticLegSolver, LegIk};

/// Reorder a solver triple into actuator slots `[calf, hip, thigh]`.
#[must_use]
pub const fn joint_slots(solution: [f64; 3]) -> [f64; JOINTS_PER_LEG] {
    [solution[2], solution[0], solution[1] + FRAC_PI_2]
}

/// Solver hint from actuator slots; inverse of [`joint_slots`].
#[must_use]
pub const fn solver_hint(slots: [f64; JOINTS_PER_LEG]) -> [f64; 3] {
    [slots[1], slots[2] - FRAC_PI_2, slots[0]]
}

/// Turns a hip-to-toe target into the three actuator angles of one leg.
#[derive(Debug, Clone)]
pub struct KinematicsAdapter<S = AnalyticLegSolver> {
    solver: S,
    geometry: LegGeometry,
    clamp_to_workspace: bool,
}

impl KinematicsAdapter<AnalyticLegSolver> {
    /// Analytic solver over `geometry`, workspace clamp enabled.
    pub const fn analytic(geometry: LegGeometry) -> Self {
        Self::new(AnalyticLegSolver::new(geometry), geometry)
    }
}

impl<S: LegIk> KinematicsAdapter<S> {
    pub const fn new(solver: S, geometry: LegGeometry) -> Self {
        Self {
            solver,
            geometry,
            clamp_to_workspace: true,
        }
    }

    #[must_use]
    pub const fn with_workspace_clamp(mut self, enabled: bool) -> Self {
        self.clamp_to_workspace = enabled;
        self
    }

    pub const fn geometry(&self) -> &LegGeometry {
        &self.geometry
    }

    pub const fn solver(&self) -> &S {
        &self.solver
    }

    /// Actuator angles `[calf, hip, thigh]` placing `leg`'s foot at `foot`.
    ///
    /// `feedback` is the leg's last reported slots; it only steers branch
    /// selection.
    pub fn leg_targets(
        &self,
        leg: Leg,
        foot: &Vector3<f64>,
        feedback: [f64; JOINTS_PER_LEG],
    ) -> Result<[f64; JOINTS_PER_LEG], KinematicsError> {
        let target = if self.clamp_to_workspace {
            self.geometry.clamp_to_workspace(foot, leg.side())?
        } else {
            *foot
        };
        let solution = self
            .solver
            .solve(&target, &solver_hint(feedback), leg.is_even())?;
        let slots = joint_slots(solution);
        trace!(
            "{leg}: foot=({:.4}, {:.4}, {:.4}) -> calf={:.4} hip={:.4} thigh={:.4}",
            target.x, target.y, target.z, slots[0], slots[1], slots[2]
        );
        Ok(slots)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
