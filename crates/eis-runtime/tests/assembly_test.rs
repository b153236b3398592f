//! End-to-end assembly against an in-memory store

use chrono::NaiveDate;
use eis_core::{EntityId, Value};
use eis_runtime::{
    BackingStore, DatasetAssembler, DeclaredPolicy, FeatureToggles, Identity, LabelWindow,
    MemoryStore, QueryResult, RuntimeError, SeededShuffle, TableConfig,
};
use std::sync::Arc;

const LABEL_SQL: &str = "FROM si_table";
const SEX_SQL: &str = "empl_sex_clean";
const ARRESTS_SQL: &str = "count(distinct aa_id) as agg_value from arrest_charges_table";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn window() -> LabelWindow {
    LabelWindow::new(date(2020, 1, 1), date(2020, 12, 31)).unwrap()
}

fn labels(rows: Vec<(&str, i64)>) -> QueryResult {
    QueryResult::from_rows(
        &["newid", "adverse_by_ourdef", "dateoccured"],
        rows.into_iter()
            .map(|(id, outcome)| vec![id.into(), outcome.into(), "2020-06-01".into()])
            .collect(),
    )
}

fn sexes(rows: Vec<(&str, &str)>) -> QueryResult {
    QueryResult::from_rows(
        &["newid", "male_female"],
        rows.into_iter()
            .map(|(id, sex)| vec![id.into(), sex.into()])
            .collect(),
    )
}

fn counts(rows: Vec<(&str, i64)>) -> QueryResult {
    QueryResult::from_rows(
        &["newid", "agg_value"],
        rows.into_iter()
            .map(|(id, n)| vec![id.into(), n.into()])
            .collect(),
    )
}

fn assembler(store: Arc<MemoryStore>) -> DatasetAssembler {
    let store: Arc<dyn BackingStore> = store;
    DatasetAssembler::new(store, TableConfig::default()).with_row_order(Box::new(Identity))
}

#[tokio::test]
async fn test_male_female_scenario() {
    let store = Arc::new(
        MemoryStore::new()
            .with_response(LABEL_SQL, labels(vec![("E1", 1), ("E2", 0)]))
            .with_response(SEX_SQL, sexes(vec![("E1", "Male"), ("E2", "female")])),
    );
    let toggles = FeatureToggles::new().with("male_female", true);

    let dataset = assembler(store)
        .assemble(&toggles, &window(), date(2021, 1, 1))
        .await
        .unwrap();

    assert_eq!(dataset.feature_names, vec!["is_male"]);
    assert_eq!(dataset.features.columns, vec!["is_male"]);
    assert_eq!(dataset.features.column("is_male"), Some(vec![1.0, 0.0]));
    assert_eq!(dataset.labels, vec![1.0, 0.0]);
    assert_eq!(
        dataset.entity_ids,
        vec![EntityId::from("E1"), EntityId::from("E2")]
    );
    assert_eq!(dataset.occurred_on, vec![Some(date(2020, 6, 1)); 2]);
}

#[tokio::test]
async fn test_no_features_enabled_is_empty_result() {
    let store = Arc::new(MemoryStore::new().with_response(LABEL_SQL, labels(vec![("E1", 1)])));
    let toggles = FeatureToggles::new().with("male_female", false);

    let err = assembler(store.clone())
        .assemble(&toggles, &window(), date(2021, 1, 1))
        .await
        .unwrap_err();

    assert!(matches!(err, RuntimeError::EmptyResult(_)));
    assert!(store.executed_queries().await.is_empty());
}

#[tokio::test]
async fn test_empty_label_window_is_empty_result() {
    let store = Arc::new(
        MemoryStore::new()
            .with_response(LABEL_SQL, labels(vec![]))
            .with_response(SEX_SQL, sexes(vec![("E1", "Male"), ("E2", "female")])),
    );
    let toggles = FeatureToggles::new().with("male_female", true);

    let err = assembler(store)
        .assemble(&toggles, &window(), date(2021, 1, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::EmptyResult(ref msg) if msg.contains("2020-01-01..2020-12-31")));
}

#[tokio::test]
async fn test_feature_without_rows_empties_dataset() {
    let store = Arc::new(
        MemoryStore::new()
            .with_response(LABEL_SQL, labels(vec![("E1", 1), ("E2", 0)]))
            .with_response(ARRESTS_SQL, counts(vec![])),
    );
    let toggles = FeatureToggles::new().with("career_arrests", true);

    let err = assembler(store)
        .assemble(&toggles, &window(), date(2021, 1, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::EmptyResult(_)));
}

#[tokio::test]
async fn test_declared_policy_fills_zero_counts() {
    let store = Arc::new(
        MemoryStore::new()
            .with_response(LABEL_SQL, labels(vec![("E1", 1), ("E2", 0)]))
            .with_response(ARRESTS_SQL, counts(vec![("E1", 4)])),
    );
    let toggles = FeatureToggles::new().with("career_arrests", true);

    let dataset = assembler(store)
        .with_imputation(Box::new(DeclaredPolicy))
        .assemble(&toggles, &window(), date(2021, 1, 1))
        .await
        .unwrap();

    assert_eq!(dataset.features.column("career_arrest_count"), Some(vec![4.0, 0.0]));
}

#[tokio::test]
async fn test_incomplete_rows_are_dropped_and_vectors_align() {
    let store = Arc::new(
        MemoryStore::new()
            .with_response(LABEL_SQL, labels(vec![("E1", 1), ("E2", 0), ("E3", 1), ("E4", 0)]))
            .with_response(
                SEX_SQL,
                sexes(vec![("E1", "Male"), ("E2", "female"), ("E3", "male"), ("E4", "female")]),
            )
            .with_response(ARRESTS_SQL, counts(vec![("E2", 1), ("E3", 2), ("E3", 9)])),
    );
    let toggles = FeatureToggles::new()
        .with("male_female", true)
        .with("career_arrests", true);

    let dataset = assembler(store)
        .with_row_order(Box::new(SeededShuffle::seeded(11)))
        .assemble(&toggles, &window(), date(2021, 1, 1))
        .await
        .unwrap();

    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.features.n_rows(), dataset.labels.len());
    assert_eq!(dataset.entity_ids.len(), dataset.labels.len());
    assert_eq!(dataset.feature_names, vec!["is_male", "career_arrest_count"]);
    assert!(dataset.features.rows.iter().flatten().all(|v| v.is_finite()));

    let e3 = dataset
        .entity_ids
        .iter()
        .position(|id| id.as_str() == "E3")
        .unwrap();
    assert_eq!(dataset.features.rows[e3], vec![1.0, 2.0]);
}

#[tokio::test]
async fn test_parallel_loads_keep_toggle_order() {
    let build = || {
        Arc::new(
            MemoryStore::new()
                .with_response(LABEL_SQL, labels(vec![("E1", 1), ("E2", 0)]))
                .with_response(SEX_SQL, sexes(vec![("E1", "Male"), ("E2", "female")]))
                .with_response(ARRESTS_SQL, counts(vec![("E1", 3), ("E2", 5)])),
        )
    };
    let toggles = FeatureToggles::new()
        .with("career_arrests", true)
        .with("male_female", true);

    let sequential = assembler(build())
        .assemble(&toggles, &window(), date(2021, 1, 1))
        .await
        .unwrap();
    let parallel = assembler(build())
        .with_parallel_loads(true)
        .assemble(&toggles, &window(), date(2021, 1, 1))
        .await
        .unwrap();

    assert_eq!(parallel, sequential);
    assert_eq!(parallel.feature_names, vec!["career_arrest_count", "is_male"]);
}

#[tokio::test]
async fn test_unknown_feature_fails_before_querying() {
    let store = Arc::new(MemoryStore::new().with_response(LABEL_SQL, labels(vec![("E1", 1)])));
    let toggles = FeatureToggles::new().with("shoe_size", true);

    let err = assembler(store.clone())
        .assemble(&toggles, &window(), date(2021, 1, 1))
        .await
        .unwrap_err();

    assert!(matches!(err, RuntimeError::UnknownFeature(ref n) if n == "shoe_size"));
    assert!(store.executed_queries().await.is_empty());
}

#[tokio::test]
async fn test_query_failure_names_feature_and_date() {
    let store = Arc::new(
        MemoryStore::new()
            .with_response(LABEL_SQL, labels(vec![("E1", 1)]))
            .with_failure("arrest_charges_table", "relation does not exist"),
    );
    let toggles = FeatureToggles::new().with("recent_arrests", true);

    let err = assembler(store)
        .assemble(&toggles, &window(), date(2021, 1, 1))
        .await
        .unwrap_err();

    match &err {
        RuntimeError::FeatureLoad {
            feature,
            reference_date,
            ..
        } => {
            assert_eq!(feature, "recent_arrests");
            assert_eq!(*reference_date, date(2021, 1, 1));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(matches!(err.root_cause(), RuntimeError::QueryExecution { .. }));
}

#[tokio::test]
async fn test_feature_queries_respect_reference_date() {
    let store = Arc::new(
        MemoryStore::new()
            .with_response(LABEL_SQL, labels(vec![("E1", 1)]))
            .with_response(
                "count(distinct aa_id) as agg_value",
                counts(vec![("E1", 2)]),
            ),
    );
    let toggles = FeatureToggles::new()
        .with("career_arrests", true)
        .with("recent_arrests", true);

    assembler(store.clone())
        .with_lookback(Some(90))
        .assemble(&toggles, &window(), date(2019, 12, 31))
        .await
        .unwrap();

    let queries = store.executed_queries().await;
    assert_eq!(queries.len(), 3);
    assert!(queries[1].contains("arrest_date <= '2019-12-31'::date"));
    assert!(!queries[1].contains(">="));
    assert!(queries[2].contains(
        "arrest_date <= '2019-12-31'::date and arrest_date >= '2019-10-02'::date"
    ));
}

#[tokio::test]
async fn test_numeric_ids_join_text_ids() {
    let store = Arc::new(
        MemoryStore::new()
            .with_response(LABEL_SQL, labels(vec![("17", 1)]))
            .with_response(
                ARRESTS_SQL,
                QueryResult::from_rows(
                    &["newid", "agg_value"],
                    vec![vec![Value::Number(17.0), Value::Number(3.0)]],
                ),
            ),
    );
    let toggles = FeatureToggles::new().with("career_arrests", true);

    let dataset = assembler(store)
        .assemble(&toggles, &window(), date(2021, 1, 1))
        .await
        .unwrap();
    assert_eq!(dataset.features.rows, vec![vec![3.0]]);
}

#[tokio::test]
async fn test_categorical_without_rows_is_empty_result() {
    let store = Arc::new(
        MemoryStore::new()
            .with_response(LABEL_SQL, labels(vec![("E1", 1), ("E2", 0)]))
            .with_response(SEX_SQL, QueryResult::empty(&["newid", "male_female"])),
    );
    let toggles = FeatureToggles::new().with("male_female", true);

    let err = assembler(store)
        .assemble(&toggles, &window(), date(2021, 1, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::EmptyResult(ref msg) if msg.contains("male_female")));
}

#[tokio::test]
async fn test_single_category_alone_is_empty_result() {
    let store = Arc::new(
        MemoryStore::new()
            .with_response(LABEL_SQL, labels(vec![("E1", 1), ("E2", 0)]))
            .with_response(SEX_SQL, sexes(vec![("E1", "Male"), ("E2", "MALE")])),
    );

    let only_sex = FeatureToggles::new().with("male_female", true);
    let err = assembler(store.clone())
        .assemble(&only_sex, &window(), date(2021, 1, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::EmptyResult(_)));

    let store = Arc::new(
        MemoryStore::new()
            .with_response(LABEL_SQL, labels(vec![("E1", 1), ("E2", 0)]))
            .with_response(SEX_SQL, sexes(vec![("E1", "Male"), ("E2", "MALE")]))
            .with_response(ARRESTS_SQL, counts(vec![("E1", 2), ("E2", 5)])),
    );
    let with_arrests = only_sex.with("career_arrests", true);
    let dataset = assembler(store)
        .assemble(&with_arrests, &window(), date(2021, 1, 1))
        .await
        .unwrap();
    assert_eq!(dataset.feature_names, vec!["career_arrest_count"]);
    assert_eq!(dataset.len(), 2);
}

#[tokio::test]
async fn test_colliding_indicator_columns_are_rejected() {
    let categories = |column: &str, values: [&str; 3]| {
        QueryResult::from_rows(
            &["newid", column],
            values
                .iter()
                .enumerate()
                .map(|(i, v)| vec![format!("E{}", i + 1).into(), (*v).into()])
                .collect(),
        )
    };
    let store = Arc::new(
        MemoryStore::new()
            .with_response(
                LABEL_SQL,
                labels(vec![("E1", 1), ("E2", 0), ("E3", 1)]),
            )
            .with_response("empl_race_cleaned", categories("race", ["W", "B", "Unknown"]))
            .with_response(
                "marital_status as married",
                categories("married", ["Married", "Single", "Unknown"]),
            ),
    );
    let toggles = FeatureToggles::new()
        .with("race", true)
        .with("marital_status", true);

    let err = assembler(store)
        .assemble(&toggles, &window(), date(2021, 1, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::DuplicateColumn(ref c) if c == "is_unknown"));
}
