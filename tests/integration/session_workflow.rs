//! Integration test: the UI-facing session across app launches.
//!
//! 1. First launch shows the privacy prompt and probes nothing
//! 2. Accepting the prompt starts the availability probe
//! 3. Anchors placed today survive a relaunch and are resolved once
//! 4. Anchors from yesterday are evicted on the next day's launch
//! 5. Everything persists through a preferences file

use chrono::{NaiveDate, NaiveDateTime};

use geospatial_gate::ports::PositioningAvailability;
use geospatial_gate::sim::{SimScript, SimulatedPlatform};
use geospatial_gate::storage::{KeyValueStore, ANCHOR_HISTORY_KEY};
use geospatial_gate::{
    AnchorKind, GateConfig, GeoCoordinates, GeospatialSession, LifecycleController,
    LifecycleState, PrefsFile, ProbeSignals, ProbeStatus, Quaternion,
};

const FRAME: u64 = 16_000;

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 10, day)
        .unwrap()
        .and_hms_opt(hour, 15, 0)
        .unwrap()
}

#[test]
fn session_across_launches() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");
    let config = GateConfig::default();

    // ── Launch 1: privacy prompt, accept, run the probe ─────────────────
    let mut session = GeospatialSession::open(PrefsFile::open(&path).unwrap(), &config, at(5, 9))
        .expect("open should succeed");
    assert!(session.is_privacy_prompt_visible());
    assert!(session.probe().is_none());

    session.accept_privacy_prompt().unwrap();
    assert!(session.is_ar_view_visible());

    let mut platform = SimulatedPlatform::new(SimScript {
        location_startup_ticks: 0,
        ..SimScript::default()
    });
    let mut controller = LifecycleController::new(&config);
    let mut now = 0;
    let mut probe_status = None;
    while now < 2_000 * FRAME {
        let report = controller.tick(now, &mut platform);
        for effect in report.effects {
            session.apply(effect);
        }
        let signals = ProbeSignals {
            location_starting: controller.bootstrap().is_waiting_for_location(),
            session_returning: false,
        };
        probe_status = session.tick_probe(now, &mut platform, &signals);
        if controller.state() == LifecycleState::Ready
            && probe_status.map(|s| s.is_finished()).unwrap_or(false)
        {
            break;
        }
        platform.advance();
        now += FRAME;
    }
    assert_eq!(controller.state(), LifecycleState::Ready);
    match probe_status {
        Some(ProbeStatus::Completed { availability, .. }) => {
            assert_eq!(availability, PositioningAvailability::Available)
        }
        other => panic!("probe should complete, got {other:?}"),
    }
    assert_eq!(platform.counters().positioning_queries, 1);

    // Place two anchors.
    session.set_anchor_kind(AnchorKind::Terrain);
    let first = session
        .record_anchor(GeoCoordinates::new(37.0, -122.0, 0.0), Quaternion::IDENTITY, at(5, 10))
        .unwrap();
    session.set_anchor_kind(AnchorKind::Geospatial);
    session
        .record_anchor(GeoCoordinates::new(37.1, -122.1, 5.0), Quaternion::IDENTITY, at(5, 11))
        .unwrap();
    drop(session);

    // ── Launch 2 (same day): AR view straight away, history resolved once
    let mut session =
        GeospatialSession::open(PrefsFile::open(&path).unwrap(), &config, at(5, 20)).unwrap();
    assert!(session.is_ar_view_visible());
    assert!(session.probe().is_some());
    assert!(session.should_resolve_history());
    let resolved = session.take_history_to_resolve();
    assert_eq!(resolved.len(), 2);
    assert_eq!(resolved[0].id, first.id);
    assert_eq!(resolved[0].kind, AnchorKind::Terrain);
    assert!(!session.should_resolve_history());
    drop(session);

    // ── Launch 3 (next day, early morning): yesterday's anchors evicted ─
    let session =
        GeospatialSession::open(PrefsFile::open(&path).unwrap(), &config, at(6, 0)).unwrap();
    assert!(session.history().is_empty());
    assert!(!session.should_resolve_history());

    // The eviction was written back to disk.
    let reopened = PrefsFile::open(&path).unwrap();
    let blob = reopened.get_string(ANCHOR_HISTORY_KEY).unwrap();
    let records = geospatial_gate::history::decode_history(&blob).unwrap();
    assert!(records.is_empty());
}

#[test]
fn history_capacity_is_enforced_across_launches() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");
    let config = GateConfig::from_json_str(r#"{ "history": { "max_entries": 3 } }"#).unwrap();

    let mut session =
        GeospatialSession::open(PrefsFile::open(&path).unwrap(), &config, at(7, 8)).unwrap();
    let mut ids = Vec::new();
    for hour in 8..13 {
        let record = session
            .record_anchor(GeoCoordinates::default(), Quaternion::IDENTITY, at(7, hour))
            .unwrap();
        ids.push(record.id);
    }
    assert_eq!(session.history().len(), 3);
    drop(session);

    let session =
        GeospatialSession::open(PrefsFile::open(&path).unwrap(), &config, at(7, 18)).unwrap();
    let kept: Vec<_> = session.history().iter().map(|r| r.id.clone()).collect();
    assert_eq!(kept, ids[2..].to_vec());
}
