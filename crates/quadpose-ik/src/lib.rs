//! Leg kinematics for the quadpose control loop.
//!
//! # Architecture
//!
//! ```text
//! hip-to-toe ──► LegGeometry (frame transform, rotate, clamp)
//!            ──► KinematicsAdapter ──► LegIk solver ──► [calf, hip, thigh]
//! ```
//!
//! [`LegGeometry`] converts between leg and trunk frames and applies body
//! rotation. [`AnalyticLegSolver`] is the closed-form solver for the
//! abduction-thigh-knee leg; any other solver can be plugged in through the
//! [`LegIk`] trait. [`KinematicsAdapter`] reorders solver output into the
//! actuator slots used on the wire.

pub mod adapter;
pub mod geometry;
pub mod solver;

pub use adapter::{KinematicsAdapter, joint_slots, solver_hint};
pub use geometry::{LegGeometry, body_rotation, rotate};
pub use solver::{AnalyticLegSolver, LegIk, wrap_angle};
