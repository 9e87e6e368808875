//! Shared test fixtures and utilities for quadpose crates.
//!
//! Provides mock transports and solvers, ready-made configurations and
//! runners, and deterministic RNG setup.

pub mod fixtures;
pub mod mocks;
pub mod rng;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use fixtures::{TestRig, fast_config, test_rig, tracking_config};
pub use mocks::{FailingTransport, FixedSolver, RecordingTransport, UnreachableSolver};
pub use rng::{random_pose, reachable_foot, seeded_rng};
