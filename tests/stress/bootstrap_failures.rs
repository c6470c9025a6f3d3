//! Bootstrap failure tests: hard failure short-circuit, soft failure
//! accumulation, bounded waits, restart after error.

use geospatial_gate::ports::{FeatureSupport, LocationStatus, PermissionKind};
use geospatial_gate::sim::{SimScript, SimulatedPlatform};
use geospatial_gate::{BootstrapSequencer, BootstrapState, GateConfig, HardFailure, SoftFailure};

const FRAME: u64 = 16_000;

fn run(
    seq: &mut BootstrapSequencer,
    platform: &mut SimulatedPlatform,
    max_frames: u64,
) -> BootstrapState {
    seq.start();
    for frame in 0..max_frames {
        let state = seq.tick(frame * FRAME, platform);
        if state.is_terminal() {
            return state;
        }
        platform.advance();
    }
    seq.state()
}

#[test]
fn failure_unsupported_never_enables_capability() {
    let mut seq = BootstrapSequencer::new(&GateConfig::default());
    let mut platform = SimulatedPlatform::new(SimScript {
        feature_support: FeatureSupport::Unsupported,
        ..SimScript::default()
    });
    assert_eq!(run(&mut seq, &mut platform, 5_000), BootstrapState::Error);
    assert_eq!(seq.hard_failure(), Some(HardFailure::GeospatialUnsupported));
    assert_eq!(platform.counters().configure_calls, 0);
}

#[test]
fn failure_every_soft_failure_still_completes() {
    let mut seq = BootstrapSequencer::new(&GateConfig::default());
    let mut platform = SimulatedPlatform::new(SimScript {
        location_permission: false,
        grant_location_on_request: false,
        camera_permission: false,
        grant_camera_on_request: false,
        ..SimScript::default()
    });
    assert_eq!(run(&mut seq, &mut platform, 5_000), BootstrapState::Complete);
    assert_eq!(
        seq.soft_failures(),
        &[SoftFailure::LocationDisabled, SoftFailure::CameraPermissionDenied]
    );
    assert_eq!(
        platform.counters().permission_requests(PermissionKind::FineLocation),
        1
    );
    assert_eq!(platform.counters().permission_requests(PermissionKind::Camera), 1);
}

#[test]
fn failure_location_start_timeout_is_soft() {
    let config = GateConfig::from_json_str(r#"{ "location_start_timeout_ms": 500 }"#).unwrap();
    let mut seq = BootstrapSequencer::new(&config);
    let mut platform = SimulatedPlatform::new(SimScript {
        location_startup_ticks: u32::MAX,
        ..SimScript::default()
    });
    assert_eq!(run(&mut seq, &mut platform, 5_000), BootstrapState::Complete);
    assert_eq!(seq.soft_failures(), &[SoftFailure::LocationStartTimedOut]);
    assert_eq!(platform.counters().location_stops, 1);
}

#[test]
fn failure_runtime_request_timeout_is_soft() {
    let config = GateConfig::from_json_str(r#"{ "runtime_op_timeout_ms": 200 }"#).unwrap();
    let mut seq = BootstrapSequencer::new(&config);
    let mut platform = SimulatedPlatform::new(SimScript {
        runtime_op_ticks: u32::MAX,
        ..SimScript::default()
    });
    // The runtime never reaches a session, so the feature step polls forever.
    let state = run(&mut seq, &mut platform, 2_000);
    assert_eq!(state, BootstrapState::StartFeatureSupportCheck);
    assert_eq!(seq.soft_failures(), &[SoftFailure::RuntimeRequestTimedOut]);
}

#[test]
fn failure_degraded_location_is_stopped() {
    for outcome in [LocationStatus::Failed, LocationStatus::Stopped] {
        let mut seq = BootstrapSequencer::new(&GateConfig::default());
        let mut platform = SimulatedPlatform::new(SimScript {
            location_outcome: outcome,
            ..SimScript::default()
        });
        assert_eq!(run(&mut seq, &mut platform, 5_000), BootstrapState::Complete);
        assert_eq!(seq.soft_failures(), &[SoftFailure::LocationNotRunning(outcome)]);
        assert_eq!(platform.counters().location_stops, 1);
    }
}

#[test]
fn failure_unknown_support_polls_until_known() {
    let mut seq = BootstrapSequencer::new(&GateConfig::default());
    let mut platform = SimulatedPlatform::new(SimScript {
        feature_support: FeatureSupport::Unknown,
        ..SimScript::default()
    });
    assert_eq!(
        run(&mut seq, &mut platform, 3_000),
        BootstrapState::StartFeatureSupportCheck
    );
    assert_eq!(platform.counters().configure_calls, 0);
}

#[test]
fn failure_restart_after_error() {
    let mut seq = BootstrapSequencer::new(&GateConfig::default());
    let mut platform = SimulatedPlatform::new(SimScript {
        feature_support: FeatureSupport::Unsupported,
        ..SimScript::default()
    });
    assert_eq!(run(&mut seq, &mut platform, 5_000), BootstrapState::Error);

    seq.reset();
    let mut fixed = SimulatedPlatform::new(SimScript::default());
    assert_eq!(run(&mut seq, &mut fixed, 5_000), BootstrapState::Complete);
    assert!(seq.hard_failure().is_none());
}

#[test]
fn failure_install_timeout_is_soft() {
    let config = GateConfig::from_json_str(r#"{ "runtime_op_timeout_ms": 300 }"#).unwrap();
    let mut seq = BootstrapSequencer::new(&config);
    let mut platform = SimulatedPlatform::new(SimScript {
        needs_install: true,
        runtime_op_ticks: 1,
        ..SimScript::default()
    });
    seq.start();
    let mut installing_frames = 0;
    for frame in 0..2_000u64 {
        let state = seq.tick(frame * FRAME, &mut platform);
        if state.is_terminal() {
            break;
        }
        // Hold the install open once it has been requested.
        if platform.counters().installs == 1 && installing_frames < 1_000 {
            installing_frames += 1;
            continue;
        }
        platform.advance();
    }
    assert_eq!(platform.counters().installs, 1);
    assert_eq!(seq.soft_failures(), &[SoftFailure::RuntimeRequestTimedOut]);
}
