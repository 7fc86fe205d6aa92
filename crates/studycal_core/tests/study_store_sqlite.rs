use std::collections::BTreeSet;
use std::sync::Arc;
use studycal_core::db::open_db_in_memory;
use studycal_core::{
    DateKey, LookupConfig, StoreError, StudiedDateLookup, StudyRecord, StudyStore,
    SqliteStudyStore, UserIdentity,
};

fn key(value: u32) -> DateKey {
    DateKey::try_from(value).unwrap()
}

fn seeded_store() -> SqliteStudyStore {
    let store = SqliteStudyStore::open_in_memory().unwrap();
    for (user, day) in [
        ("mina", 20240229),
        ("mina", 20240301),
        ("mina", 20240301),
        ("mina", 20240318),
        ("mina", 20240331),
        ("mina", 20240401),
        ("jun", 20240310),
    ] {
        store
            .insert_record(user, &StudyRecord::new(key(day), "reading", 25))
            .unwrap();
    }
    store
}

#[tokio::test]
async fn ranged_query_matches_per_day_scan() {
    let store = seeded_store();

    let ranged = store
        .studied_days_in_range("mina", key(20240301), key(20240331))
        .await
        .unwrap()
        .expect("sqlite supports ranged queries");

    let mut scanned = BTreeSet::new();
    for day in 1..=31 {
        let day = DateKey::from_ymd(2024, 3, day).unwrap();
        if store.day_has_records("mina", day).await.unwrap() {
            scanned.insert(day);
        }
    }

    assert_eq!(ranged, scanned);
    assert_eq!(
        ranged.into_iter().collect::<Vec<_>>(),
        vec![key(20240301), key(20240318), key(20240331)]
    );
}

#[tokio::test]
async fn lookup_over_sqlite_uses_the_month_range() {
    let store = Arc::new(seeded_store());
    let lookup = StudiedDateLookup::with_config(store, LookupConfig::default());
    let user = UserIdentity::new("jun").unwrap();

    let days = lookup
        .fetch_studied_days(Some(&user), key(20240320))
        .await
        .unwrap();

    assert_eq!(days.into_iter().collect::<Vec<_>>(), vec![key(20240310)]);
}

#[test]
fn list_records_returns_one_day_sub_collection() {
    let store = seeded_store();

    let records = store.list_records("mina", key(20240301)).unwrap();

    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|record| record.day == key(20240301)));
    assert!(store.list_records("mina", key(20240302)).unwrap().is_empty());
}

#[test]
fn insert_rejects_invalid_records_and_user_ids() {
    let store = SqliteStudyStore::open_in_memory().unwrap();

    let zero = store.insert_record("mina", &StudyRecord::new(key(20240301), "math", 0));
    assert!(matches!(zero, Err(StoreError::Validation(_))));

    let nobody = store.insert_record("  ", &StudyRecord::new(key(20240301), "math", 10));
    assert!(matches!(nobody, Err(StoreError::InvalidUserId(_))));
}

#[tokio::test]
async fn corrupted_day_keys_surface_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO study_records (uuid, user_id, day_key, subject, duration_minutes, recorded_at)
         VALUES ('11111111-2222-4333-8444-555555555555', 'mina', 20240231, 'math', 10, 0);",
        [],
    )
    .unwrap();
    let store = SqliteStudyStore::from_connection(conn);

    let err = store
        .studied_days_in_range("mina", key(20240201), key(20240229))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::InvalidData(_)));
}

#[test]
fn file_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("studycal.sqlite3");

    let record = StudyRecord::new(key(20240105), "grammar", 40);
    SqliteStudyStore::open(&path)
        .unwrap()
        .insert_record("mina", &record)
        .unwrap();

    let reopened = SqliteStudyStore::open(&path).unwrap();
    let records = reopened.list_records("mina", key(20240105)).unwrap();
    assert_eq!(records, vec![record]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_day_checks_run_off_the_runtime_workers() {
    let store = Arc::new(seeded_store());
    let mut checks = tokio::task::JoinSet::new();
    for day in 1..=31 {
        let store = Arc::clone(&store);
        checks.spawn(async move {
            let day = DateKey::from_ymd(2024, 3, day).unwrap();
            (day, store.day_has_records("mina", day).await.unwrap())
        });
    }

    let mut studied = BTreeSet::new();
    while let Some(joined) = checks.join_next().await {
        let (day, has_records) = joined.unwrap();
        if has_records {
            studied.insert(day);
        }
    }

    let ranged = store
        .studied_days_in_range("mina", key(20240301), key(20240331))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(studied, ranged);
}
