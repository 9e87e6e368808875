//! Integration test: startup ramp and pose tracking through the full
//! runner pipeline (commander, controller, analytic IK, transport).
//!
//! Feedback is looped back from each accepted command, as if every actuator
//! tracked its target perfectly.

use approx::assert_abs_diff_eq;

use quadpose_control::controller::Phase;
use quadpose_core::config::{A1_REST_POSE, A1_STAND_POSE};
use quadpose_core::types::{JointFeedback, JointKind, JointVector, Leg, NUM_JOINTS, Pose};
use quadpose_test_utils::{TestRig, fast_config, random_pose, seeded_rng, test_rig, tracking_config};

const BASELINE: f64 = 0.225;

/// Step once and feed the sent positions back as feedback.
fn step_looped(rig: &mut TestRig) -> JointVector {
    rig.runner.step();
    let positions = rig
        .transport
        .last()
        .map(|c| c.positions)
        .unwrap_or_default();
    rig.feedback.publish(JointFeedback {
        positions,
        velocities: JointVector::zeros(),
    });
    positions
}

#[test]
fn startup_is_convex_and_monotone() {
    let steps = 100;
    let mut rig = test_rig(&fast_config(steps));
    let rest = JointVector::new(A1_REST_POSE);
    let stand = JointVector::new(A1_STAND_POSE);

    let mut previous_weight = 0.0;
    for k in 1..=steps {
        let v = step_looped(&mut rig);
        let mut weight: Option<f64> = None;
        for i in 0..NUM_JOINTS {
            let span = stand[i] - rest[i];
            let w = (v[i] - rest[i]) / span;
            assert!((-1e-9..=1.0 + 1e-9).contains(&w), "joint {i} left the segment");
            if let Some(first) = weight {
                assert!((w - first).abs() < 1e-9, "joints disagree on weight");
            } else {
                weight = Some(w);
            }
        }
        let w = weight.unwrap();
        assert!(w >= previous_weight - 1e-12);
        assert!((w - f64::from(k) / f64::from(steps)).abs() < 1e-9);
        previous_weight = w;
    }

    assert_eq!(rig.transport.last().unwrap().positions, stand);
    assert_eq!(rig.runner.controller().phase(), Phase::Tracking);
    assert_eq!(rig.runner.summary().startup_ticks, u64::from(steps));
}

#[test]
fn steady_state_is_constant() {
    let mut rig = test_rig(&tracking_config());
    let first = step_looped(&mut rig);
    for _ in 0..49 {
        let v = step_looped(&mut rig);
        assert!(v.max_abs_diff(&first) < 1e-9);
    }
    assert_eq!(rig.transport.len(), 50);
    assert_eq!(rig.runner.controller().current_pose(), Pose::neutral(BASELINE));
}

#[test]
fn height_step_converges_monotonically() {
    let mut rig = test_rig(&tracking_config());
    let target_height = BASELINE - 0.05;
    rig.commander.set_target(0.0, 0.0, 0.0, target_height);

    let mut previous = step_looped(&mut rig);
    let mut previous_gap = (rig.runner.controller().current_pose().height - target_height).abs();
    for _ in 0..150 {
        let v = step_looped(&mut rig);
        for leg in Leg::ALL {
            let calf = v.get(leg, JointKind::Calf) - previous.get(leg, JointKind::Calf);
            let thigh = v.get(leg, JointKind::Thigh) - previous.get(leg, JointKind::Thigh);
            let hip = v.get(leg, JointKind::Hip) - previous.get(leg, JointKind::Hip);
            assert!(calf <= 1e-12, "{leg} calf moved back: {calf}");
            assert!(thigh >= -1e-12, "{leg} thigh moved back: {thigh}");
            assert!(hip.abs() < 1e-9);
        }
        let gap = (rig.runner.controller().current_pose().height - target_height).abs();
        assert!(gap < previous_gap || gap < 1e-12);
        previous_gap = gap;
        previous = v;
    }

    let current = rig.runner.controller().current_pose();
    assert_abs_diff_eq!(current.height, target_height, epsilon = 1e-3);
    for leg in Leg::ALL {
        let foot = rig.runner.controller().hip_to_toe(leg);
        assert_abs_diff_eq!(foot.y, target_height, epsilon = 1e-3);
    }
}

#[test]
fn lower_stance_bends_knees() {
    let mut rig = test_rig(&tracking_config());
    let upright = step_looped(&mut rig);
    rig.commander.set_target(0.0, 0.0, 0.0, BASELINE - 0.08);
    let mut crouched = upright;
    for _ in 0..100 {
        crouched = step_looped(&mut rig);
    }
    for leg in Leg::ALL {
        assert!(crouched.get(leg, JointKind::Calf) < upright.get(leg, JointKind::Calf) - 0.1);
        assert!(crouched.get(leg, JointKind::Thigh) > upright.get(leg, JointKind::Thigh) + 0.05);
    }
}

#[test]
fn release_returns_current_pose_to_neutral() {
    let mut rig = test_rig(&tracking_config());
    rig.commander.set_target(0.3, -0.2, 0.1, BASELINE + 0.05);
    for _ in 0..40 {
        step_looped(&mut rig);
    }
    let deflected = rig.runner.controller().current_pose();
    assert!(deflected.roll > 0.25);

    rig.commander.release();
    assert_eq!(rig.commander.read_target(), Pose::neutral(BASELINE));
    for _ in 0..200 {
        step_looped(&mut rig);
    }
    let settled = rig.runner.controller().current_pose() - Pose::neutral(BASELINE);
    assert!(settled.max_abs() < 1e-6);
}

#[test]
fn random_targets_never_fail_with_workspace_clamp() {
    let config = tracking_config();
    let mut rig = test_rig(&config);
    let mut rng = seeded_rng(2024);
    for _ in 0..20 {
        let target = random_pose(&mut rng, &config.input, BASELINE);
        rig.commander.set_pose(target);
        for _ in 0..30 {
            let v = step_looped(&mut rig);
            assert!(v.is_finite());
        }
    }
    let summary = rig.runner.summary();
    assert_eq!(summary.ticks, 600);
    assert_eq!(summary.ik_failures, 0);
    assert_eq!(rig.transport.len(), 600);
}

#[test]
fn missing_feedback_uses_zero_hint() {
    // No loopback: the solver always sees zero feedback, which still picks
    // the standing branch.
    let mut rig = test_rig(&tracking_config());
    rig.runner.step();
    let v = rig.transport.last().unwrap().positions;
    for leg in Leg::ALL {
        assert!(v.get(leg, JointKind::Calf) < -1.5);
        assert!(v.get(leg, JointKind::Thigh) > 0.5);
    }
}
