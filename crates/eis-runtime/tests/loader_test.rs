//! Feature loading through the registry and an in-memory store

use chrono::NaiveDate;
use eis_core::{EntityId, TargetUnit, Value};
use eis_runtime::{
    BackingStore, FeatureLoader, FeatureRegistry, MemoryStore, QueryResult, RuntimeError,
};
use std::sync::Arc;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn loader(store: MemoryStore) -> FeatureLoader {
    let store: Arc<dyn BackingStore> = Arc::new(store);
    FeatureLoader::new(store, FeatureRegistry::default())
}

#[tokio::test]
async fn test_duplicate_rows_collapse_to_first() {
    let store = MemoryStore::new().with_response(
        "avg(weight_int)",
        QueryResult::from_rows(
            &["newid", "avg_weight", "avg_height_inches"],
            vec![
                vec!["E1".into(), 180.0.into(), 70.0.into()],
                vec!["E2".into(), 150.0.into(), 64.0.into()],
                vec!["E1".into(), 999.0.into(), 99.0.into()],
                vec![Value::Null, 1.0.into(), 1.0.into()],
            ],
        ),
    );

    let (frame, names) = loader(store)
        .load("height_weight", date(2016, 1, 1))
        .await
        .unwrap();

    assert_eq!(names, vec!["weight", "height"]);
    assert_eq!(frame.len(), 2);
    assert_eq!(
        frame.get(&EntityId::from("E1")),
        Some(&[Some(180.0), Some(70.0)][..])
    );
}

#[tokio::test]
async fn test_categorical_feature_is_expanded() {
    let store = MemoryStore::new().with_response(
        "empl_race_cleaned",
        QueryResult::from_rows(
            &["newid", "race"],
            vec![
                vec!["E1".into(), "W".into()],
                vec!["E2".into(), "B".into()],
                vec!["E3".into(), "A".into()],
                vec!["E1".into(), "B".into()],
            ],
        ),
    );

    let (frame, names) = loader(store).load("race", date(2016, 1, 1)).await.unwrap();

    assert_eq!(names, vec!["is_w", "is_b", "is_a"]);
    assert_eq!(frame.columns(), names.as_slice());
    assert_eq!(
        frame.get(&EntityId::from("E1")),
        Some(&[Some(1.0), Some(0.0), Some(0.0)][..])
    );
}

#[tokio::test]
async fn test_series_feature_is_flattened() {
    let store = MemoryStore::new().with_response(
        "as fi_timeseries",
        QueryResult::from_rows(
            &["newid", "fi_timeseries"],
            vec![vec!["E1".into(), Value::from(vec![0i64, 1, 0, 2, 0, 0, 3, 1, 4])]],
        ),
    );

    let (frame, names) = loader(store)
        .load("fi_timeseries", date(2016, 1, 1))
        .await
        .unwrap();

    assert_eq!(names.len(), 9);
    assert_eq!(names[0], "fi_timeseries_0");
    assert_eq!(names[8], "fi_timeseries_8");
    let row = frame.get(&EntityId::from("E1")).unwrap();
    assert_eq!(row[8], Some(4.0));
}

#[tokio::test]
async fn test_missing_alias_is_a_query_error() {
    let store = MemoryStore::new().with_response(
        "avg(weight_int)",
        QueryResult::from_rows(&["newid", "weight"], vec![vec!["E1".into(), 180.0.into()]]),
    );

    let err = loader(store)
        .load("height_weight", date(2016, 1, 1))
        .await
        .unwrap_err();
    assert!(matches!(err.root_cause(), RuntimeError::QueryExecution { .. }));
}

#[tokio::test]
async fn test_text_in_numeric_feature_is_type_error() {
    let store = MemoryStore::new().with_response(
        "as yrs_experience",
        QueryResult::from_rows(
            &["newid", "yrs_experience"],
            vec![vec!["E1".into(), "ten".into()]],
        ),
    );

    let err = loader(store)
        .load("years_experience", date(2016, 1, 1))
        .await
        .unwrap_err();
    assert!(matches!(err.root_cause(), RuntimeError::TypeError(_)));
}

#[tokio::test]
async fn test_dispatch_unit_is_rejected_without_querying() {
    let store = Arc::new(MemoryStore::new());
    let shared: Arc<dyn BackingStore> = store.clone();
    let loader = FeatureLoader::new(shared, FeatureRegistry::default()).with_unit(TargetUnit::Dispatch);

    let err = loader.load("race", date(2016, 1, 1)).await.unwrap_err();
    assert!(matches!(err, RuntimeError::UnsupportedUnit { .. }));
    assert!(store.executed_queries().await.is_empty());
}
