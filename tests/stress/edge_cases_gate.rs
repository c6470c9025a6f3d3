//! Edge case tests for the accuracy gate: boundaries, non-finite values,
//! exhaustive metric grids.

use geospatial_gate::{is_localized, PoseSample, DEFAULT_ACCURACY_THRESHOLD};

#[test]
fn edge_each_metric_at_threshold_fails() {
    let t = DEFAULT_ACCURACY_THRESHOLD;
    let just_below = t - f64::EPSILON * 8.0;
    for (h, v, y) in [(t, 1.0, 1.0), (1.0, t, 1.0), (1.0, 1.0, t)] {
        assert!(!is_localized(&PoseSample::with_accuracy(h, v, y), true, t));
    }
    assert!(is_localized(
        &PoseSample::with_accuracy(just_below, just_below, just_below),
        true,
        t
    ));
}

#[test]
fn edge_grid_matches_predicate() {
    let values = [0.0, 0.5, 4.99, 5.0, 5.01, 100.0];
    for &h in &values {
        for &v in &values {
            for &y in &values {
                for tracking in [true, false] {
                    let expected = tracking && h < 5.0 && v < 5.0 && y < 5.0;
                    let pose = PoseSample::with_accuracy(h, v, y);
                    assert_eq!(
                        is_localized(&pose, tracking, 5.0),
                        expected,
                        "h={h} v={v} y={y} tracking={tracking}"
                    );
                }
            }
        }
    }
}

#[test]
fn edge_non_finite_accuracy_is_never_localized() {
    for bad in [f64::NAN, f64::INFINITY] {
        assert!(!is_localized(&PoseSample::with_accuracy(bad, 1.0, 1.0), true, 5.0));
        assert!(!is_localized(&PoseSample::with_accuracy(1.0, bad, 1.0), true, 5.0));
        assert!(!is_localized(&PoseSample::with_accuracy(1.0, 1.0, bad), true, 5.0));
    }
}

#[test]
fn edge_not_tracking_sample_is_zero() {
    let zero = PoseSample::NOT_TRACKING;
    assert_eq!(zero.horizontal_accuracy, 0.0);
    assert_eq!(zero.heading_rotation.w, 0.0);
    // Zero accuracies would pass the metric checks; only the tracking flag rejects it.
    assert!(!is_localized(&zero, false, 5.0));
}

#[test]
fn edge_zero_threshold_rejects_everything() {
    let pose = PoseSample::with_accuracy(0.0, 0.0, 0.0);
    assert!(!is_localized(&pose, true, 0.0));
}

#[test]
fn edge_gate_is_callable_from_many_threads() {
    let handles: Vec<_> = (0..8)
        .map(|i| {
            std::thread::spawn(move || {
                let pose = PoseSample::with_accuracy(i as f64, 1.0, 1.0);
                is_localized(&pose, true, 5.0)
            })
        })
        .collect();
    let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, vec![true, true, true, true, true, false, false, false]);
}
