//! Operator pose input for the quadpose control loop.
//!
//! This crate is input-source agnostic:
//!
//! - [`PoseCommander`]: shared pose target cell written by any input surface
//!   and read once per tick by the control thread
//! - [`PoseMapper`]: converts virtual stick deltas into clamped pose targets
//!
//! Any front end (console, gamepad, network) drives the loop by moving
//! sticks on a [`PoseMapper`] and publishing the result to a
//! [`PoseCommander`], or by writing targets directly.

pub mod commander;
pub mod mapping;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use commander::PoseCommander;
pub use mapping::{PoseMapper, Stick, StickState, normalize_deflection};

pub mod prelude {
    pub use crate::commander::PoseCommander;
    pub use crate::mapping::{PoseMapper, Stick, StickState};
}
