//! Integration test: the paced control loop with faulty collaborators.
//!
//! Covers transport refusals, solvers that never find a solution, operator
//! disconnects and the channel transport on a spawned control thread.

use std::time::Duration;

use quadpose_control::controller::PoseController;
use quadpose_control::feedback::FeedbackCell;
use quadpose_control::runner::{ControlRunner, TickReport};
use quadpose_control::transport::ChannelTransport;
use quadpose_core::config::{A1_REST_POSE, A1_STAND_POSE};
use quadpose_core::error::TransportError;
use quadpose_core::types::{JointKind, JointVector, Leg};
use quadpose_ik::{KinematicsAdapter, LegGeometry};
use quadpose_teleop::PoseCommander;
use quadpose_test_utils::{
    FailingTransport, FixedSolver, RecordingTransport, UnreachableSolver, fast_config,
    tracking_config,
};

#[test]
fn refused_commands_do_not_stop_the_loop() {
    let config = fast_config(4);
    let transport = FailingTransport::every(3);
    let commander = PoseCommander::new(config.input.clone(), config.control.baseline_height);
    let runner = ControlRunner::new(
        &config.control,
        PoseController::from_config(&config),
        transport.clone(),
        commander,
        FeedbackCell::new(),
    )
    .with_tick_limit(12);

    let summary = runner.run();
    assert_eq!(summary.ticks, 12);
    assert_eq!(summary.startup_ticks, 4);
    assert_eq!(summary.transport_failures, 4);
    assert_eq!(summary.ik_failures, 0);
    assert_eq!(transport.attempts(), 12);
    assert_eq!(transport.accepted().len(), 8);
}

#[test]
fn disconnected_transport_counts_every_tick() {
    let config = fast_config(0);
    let transport = FailingTransport::always(TransportError::Disconnected);
    let commander = PoseCommander::new(config.input.clone(), config.control.baseline_height);
    let mut runner = ControlRunner::new(
        &config.control,
        PoseController::from_config(&config),
        transport,
        commander,
        FeedbackCell::new(),
    );
    for _ in 0..3 {
        assert!(matches!(runner.step(), TickReport::Dropped(_)));
    }
    assert_eq!(runner.summary().transport_failures, 3);
}

#[test]
fn unsolvable_targets_send_nothing() {
    let config = tracking_config();
    let adapter = KinematicsAdapter::new(UnreachableSolver, LegGeometry::default());
    let controller = PoseController::new(&config.control, adapter);
    let transport = RecordingTransport::new();
    let commander = PoseCommander::new(config.input.clone(), config.control.baseline_height);
    let mut runner = ControlRunner::new(
        &config.control,
        controller,
        transport.clone(),
        commander,
        FeedbackCell::new(),
    );

    for _ in 0..5 {
        assert_eq!(runner.step(), TickReport::Failed);
    }
    let summary = runner.summary();
    assert_eq!(summary.ik_failures, 5);
    assert_eq!(summary.ticks, 5);
    assert!(transport.is_empty());
    assert!(runner.controller().last_command().is_none());
}

#[test]
fn startup_runs_even_when_solver_cannot() {
    let mut config = tracking_config();
    config.control.startup_steps = 2;
    let adapter = KinematicsAdapter::new(UnreachableSolver, LegGeometry::default());
    let transport = RecordingTransport::new();
    let mut runner = ControlRunner::new(
        &config.control,
        PoseController::new(&config.control, adapter),
        transport.clone(),
        PoseCommander::new(config.input.clone(), config.control.baseline_height),
        FeedbackCell::new(),
    );

    assert!(matches!(runner.step(), TickReport::Sent(_)));
    assert!(matches!(runner.step(), TickReport::Sent(_)));
    assert_eq!(runner.step(), TickReport::Failed);
    assert_eq!(transport.len(), 2);
    // The last successful command is still the stand pose.
    assert_eq!(
        runner.controller().last_command(),
        Some(JointVector::new(A1_STAND_POSE))
    );
}

#[test]
fn solver_output_maps_onto_actuator_slots() {
    let config = tracking_config();
    let solver = FixedSolver::new([0.1, -0.4, -1.2]);
    let adapter =
        KinematicsAdapter::new(solver, LegGeometry::default()).with_workspace_clamp(false);
    let transport = RecordingTransport::new();
    let mut runner = ControlRunner::new(
        &config.control,
        PoseController::new(&config.control, adapter),
        transport.clone(),
        PoseCommander::new(config.input.clone(), config.control.baseline_height),
        FeedbackCell::new(),
    );
    runner.step();

    let sent = transport.last().unwrap();
    for leg in Leg::ALL {
        assert!((sent.positions.get(leg, JointKind::Calf) + 1.2).abs() < 1e-12);
        assert!((sent.positions.get(leg, JointKind::Hip) - 0.1).abs() < 1e-12);
        assert!(
            (sent.positions.get(leg, JointKind::Thigh) - (-0.4 + std::f64::consts::FRAC_PI_2)).abs()
                < 1e-12
        );
    }
    assert_eq!(sent.gains, config.control.gains);
}

#[test]
fn operator_disconnect_stops_spawned_loop() {
    let config = fast_config(1_000_000);
    let commander = PoseCommander::new(config.input.clone(), config.control.baseline_height);
    let runner = ControlRunner::new(
        &config.control,
        PoseController::from_config(&config),
        RecordingTransport::new(),
        commander.clone(),
        FeedbackCell::new(),
    );
    let handle = runner.spawn().unwrap();
    std::thread::sleep(Duration::from_millis(20));
    commander.disconnect();

    let summary = handle.join().unwrap();
    assert!(summary.ticks >= 1);
    assert_eq!(summary.ticks, summary.startup_ticks);
}

#[test]
fn stop_handle_stops_spawned_loop() {
    let config = fast_config(0);
    let runner = ControlRunner::new(
        &config.control,
        PoseController::from_config(&config),
        RecordingTransport::new(),
        PoseCommander::new(config.input.clone(), config.control.baseline_height),
        FeedbackCell::new(),
    );
    let handle = runner.spawn().unwrap();
    std::thread::sleep(Duration::from_millis(10));
    handle.stop();
    let summary = handle.join().unwrap();
    assert!(summary.ticks >= 1);
    assert_eq!(summary.startup_ticks, 0);
}

#[test]
fn channel_transport_delivers_ramp_in_order() {
    let steps = 5;
    let config = fast_config(steps);
    let (transport, commands) = ChannelTransport::bounded(16);
    let runner = ControlRunner::new(
        &config.control,
        PoseController::from_config(&config),
        transport,
        PoseCommander::new(config.input.clone(), config.control.baseline_height),
        FeedbackCell::new(),
    )
    .with_tick_limit(u64::from(steps));

    let summary = runner.spawn().unwrap().join().unwrap();
    assert_eq!(summary.ticks, u64::from(steps));
    assert_eq!(summary.transport_failures, 0);

    let rest = JointVector::new(A1_REST_POSE);
    let stand = JointVector::new(A1_STAND_POSE);
    let received: Vec<_> = commands.try_iter().collect();
    assert_eq!(received.len(), 5);
    for (k, command) in (1..=steps).zip(&received) {
        let expected = rest.lerp(&stand, f64::from(k) / f64::from(steps));
        assert!(command.positions.max_abs_diff(&expected) < 1e-12);
    }
    assert_eq!(received[4].positions, stand);
}
