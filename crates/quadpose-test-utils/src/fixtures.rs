//! Ready-made configurations and runner wiring.

use quadpose_control::controller::PoseController;
use quadpose_control::feedback::FeedbackCell;
use quadpose_control::runner::ControlRunner;
use quadpose_core::config::QuadposeConfig;
use quadpose_teleop::PoseCommander;

use crate::mocks::RecordingTransport;

/// Default A1 configuration that skips the startup ramp.
pub fn tracking_config() -> QuadposeConfig {
    let mut config = QuadposeConfig::default();
    config.control.startup_steps = 0;
    config
}

/// Default A1 configuration at 1 kHz with `startup_steps` ramp steps.
pub fn fast_config(startup_steps: u32) -> QuadposeConfig {
    let mut config = QuadposeConfig::default();
    config.control.control_hz = 1000.0;
    config.control.startup_steps = startup_steps;
    config
}

/// A runner wired to a recording transport, with handles to every input.
pub struct TestRig {
    pub runner: ControlRunner<RecordingTransport>,
    pub transport: RecordingTransport,
    pub commander: PoseCommander,
    pub feedback: FeedbackCell,
}

/// Build a [`TestRig`] for `config` with the analytic solver.
pub fn test_rig(config: &QuadposeConfig) -> TestRig {
    let transport = RecordingTransport::new();
    let commander = PoseCommander::new(config.input.clone(), config.control.baseline_height);
    let feedback = FeedbackCell::new();
    let runner = ControlRunner::new(
        &config.control,
        PoseController::from_config(config),
        transport.clone(),
        commander.clone(),
        feedback.clone(),
    );
    TestRig {
        runner,
        transport,
        commander,
        feedback,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
