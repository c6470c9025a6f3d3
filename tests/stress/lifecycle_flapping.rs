//! Lifecycle stress tests: accuracy flapping around the threshold, long runs,
//! and the terminal error state.

use geospatial_gate::ports::FeatureSupport;
use geospatial_gate::sim::{SimScript, SimulatedPlatform};
use geospatial_gate::{GateConfig, LifecycleController, LifecycleState, PoseSample};

const FRAME: u64 = 16_000;

fn bring_up(platform: &mut SimulatedPlatform, controller: &mut LifecycleController) -> u64 {
    let mut now = 0;
    while controller.state() == LifecycleState::Initializing && now < 20_000 * FRAME {
        controller.tick(now, platform);
        platform.advance();
        now += FRAME;
    }
    now
}

#[test]
fn flapping_accuracy_drops_on_the_first_bad_sample() {
    let mut platform = SimulatedPlatform::new(SimScript::default());
    let mut controller = LifecycleController::new(&GateConfig::default());
    let mut now = bring_up(&mut platform, &mut controller);
    assert_eq!(controller.state(), LifecycleState::Localizing);

    let good = PoseSample::with_accuracy(4.9, 4.9, 4.9);
    let bad = PoseSample::with_accuracy(4.9, 5.1, 4.9);
    let mut drops = 0;

    for round in 0..200 {
        // Good sample: Localizing -> Loading -> Ready takes two ticks.
        platform.set_pose(good);
        controller.tick(now, &mut platform);
        now += FRAME;
        controller.tick(now, &mut platform);
        now += FRAME;
        assert_eq!(controller.state(), LifecycleState::Ready, "round {round}");

        // A single bad sample drops straight back.
        platform.set_pose(bad);
        let report = controller.tick(now, &mut platform);
        now += FRAME;
        assert_eq!(report.current, LifecycleState::Localizing, "round {round}");
        drops += 1;
    }
    assert_eq!(drops, 200);
}

#[test]
fn flapping_tracking_loss_drops_from_ready() {
    let mut platform = SimulatedPlatform::new(SimScript::default());
    let mut controller = LifecycleController::new(&GateConfig::default());
    let mut now = bring_up(&mut platform, &mut controller);

    for _ in 0..3 {
        controller.tick(now, &mut platform);
        now += FRAME;
    }
    assert_eq!(controller.state(), LifecycleState::Ready);

    platform.set_tracking(false);
    controller.tick(now, &mut platform);
    assert_eq!(controller.state(), LifecycleState::Localizing);
    assert!(!controller.is_tracking());
    assert_eq!(controller.pose(), PoseSample::NOT_TRACKING);
}

#[test]
fn flapping_steady_ready_emits_no_transitions() {
    let mut platform = SimulatedPlatform::new(SimScript::default());
    let mut controller = LifecycleController::new(&GateConfig::default());
    let mut now = bring_up(&mut platform, &mut controller);
    for _ in 0..3 {
        controller.tick(now, &mut platform);
        now += FRAME;
    }

    for _ in 0..10_000 {
        let report = controller.tick(now, &mut platform);
        assert!(!report.transitioned());
        assert!(report.effects.is_empty());
        now += FRAME;
    }
}

#[test]
fn flapping_error_is_terminal() {
    let mut platform = SimulatedPlatform::new(SimScript {
        feature_support: FeatureSupport::Unsupported,
        ..SimScript::default()
    });
    let mut controller = LifecycleController::new(&GateConfig::default());
    let mut now = bring_up(&mut platform, &mut controller);
    assert_eq!(controller.state(), LifecycleState::Error);

    platform.set_pose(PoseSample::with_accuracy(0.1, 0.1, 0.1));
    for _ in 0..1_000 {
        let report = controller.tick(now, &mut platform);
        assert_eq!(report.current, LifecycleState::Error);
        assert!(report.effects.is_empty());
        platform.advance();
        now += FRAME;
    }
    assert_eq!(platform.counters().configure_calls, 0);
}
