//! Stress tests for anchor history: calendar-day eviction around midnight,
//! capacity eviction at scale, repeated loads.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use geospatial_gate::history::{decode_history, encode_history};
use geospatial_gate::storage::{KeyValueStore, ANCHOR_HISTORY_KEY};
use geospatial_gate::{
    AnchorHistoryCollection, AnchorHistoryStore, AnchorKind, AnchorRecord, GeoCoordinates,
    HistoryConfig, MemoryStore, Quaternion,
};

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

fn record(created_at: NaiveDateTime) -> AnchorRecord {
    AnchorRecord::new(
        AnchorKind::Geospatial,
        GeoCoordinates::new(51.5, -0.12, 20.0),
        Quaternion::IDENTITY,
        created_at,
    )
}

fn seeded(records: Vec<AnchorRecord>, config: HistoryConfig) -> AnchorHistoryStore<MemoryStore> {
    let mut mem = MemoryStore::new();
    let all = AnchorHistoryCollection::from_records(records, usize::MAX);
    mem.set_string(ANCHOR_HISTORY_KEY, &encode_history(&all).unwrap())
        .unwrap();
    AnchorHistoryStore::new(mem, config)
}

#[test]
fn stress_one_minute_before_midnight_is_evicted_after_midnight() {
    let mut store = seeded(vec![record(at(2024, 12, 31, 23, 59))], HistoryConfig::default());
    let loaded = store.load(at(2025, 1, 1, 0, 1)).unwrap();
    assert!(loaded.is_empty(), "a record two minutes old from yesterday is evicted");
}

#[test]
fn stress_same_day_records_survive_almost_a_day() {
    let mut store = seeded(vec![record(at(2024, 6, 1, 0, 0))], HistoryConfig::default());
    let loaded = store.load(at(2024, 6, 1, 23, 59)).unwrap();
    assert_eq!(loaded.len(), 1);
}

#[test]
fn stress_many_days_of_records() {
    let start = at(2024, 1, 1, 12, 0);
    let records: Vec<_> = (0..200)
        .map(|i| record(start + Duration::hours(i * 3)))
        .collect();
    let config = HistoryConfig {
        max_entries: 1_000,
        max_age_days: 2,
    };
    let now = start + Duration::hours(199 * 3);
    let mut store = seeded(records.clone(), config);

    let loaded = store.load(now).unwrap();
    let expected: Vec<_> = records
        .iter()
        .filter(|r| (now.date() - r.created_at.date()).num_days() < 2)
        .map(|r| r.id.clone())
        .collect();
    let got: Vec<_> = loaded.iter().map(|r| r.id.clone()).collect();
    assert_eq!(got, expected);
}

#[test]
fn stress_capacity_eviction_keeps_newest() {
    let mut collection = AnchorHistoryCollection::new(20);
    let base = at(2024, 3, 3, 8, 0);
    let mut evicted = 0;
    for i in 0..1_000 {
        if collection
            .push(record(base + Duration::seconds(i)))
            .is_some()
        {
            evicted += 1;
        }
        assert!(collection.len() <= 20);
    }
    assert_eq!(evicted, 980);
    let first = collection.records()[0].created_at;
    assert_eq!(first, base + Duration::seconds(980));
}

#[test]
fn stress_out_of_order_inserts_evict_by_creation_time() {
    let mut collection = AnchorHistoryCollection::new(3);
    let base = at(2024, 3, 3, 8, 0);
    collection.push(record(base + Duration::minutes(30)));
    collection.push(record(base));
    collection.push(record(base + Duration::minutes(10)));

    let evicted = collection.push(record(base + Duration::minutes(40))).unwrap();
    assert_eq!(evicted.created_at, base);
    let evicted = collection.push(record(base + Duration::minutes(50))).unwrap();
    assert_eq!(evicted.created_at, base + Duration::minutes(10));
}

#[test]
fn stress_repeated_loads_are_stable() {
    let records = vec![
        record(at(2024, 5, 1, 9, 0)),
        record(at(2024, 5, 2, 9, 0)),
        record(at(2024, 5, 2, 10, 0)),
    ];
    let mut store = seeded(records, HistoryConfig::default());
    let now = at(2024, 5, 2, 18, 0);
    let first = store.load(now).unwrap();
    for _ in 0..50 {
        assert_eq!(store.load(now).unwrap(), first);
    }
    let blob = store.store().get_string(ANCHOR_HISTORY_KEY).unwrap();
    assert_eq!(decode_history(&blob).unwrap().len(), 2);
}
