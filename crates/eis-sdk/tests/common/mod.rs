//! Common fixtures for SDK integration tests

#![allow(dead_code)]

use chrono::NaiveDate;
use eis_sdk::{
    EisEngine, EisEngineBuilder, ExperimentConfig, LabelWindow, MemoryStore, QueryResult,
    ShuffleConfig,
};
use std::sync::Arc;

pub const LABEL_SQL: &str = "FROM si_table";
pub const SEX_SQL: &str = "empl_sex_clean";
pub const ARRESTS_SQL: &str = "count(distinct aa_id) as agg_value from arrest_charges_table";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Labels for E1..E6, alternating outcomes
pub fn labels() -> QueryResult {
    QueryResult::from_rows(
        &["newid", "adverse_by_ourdef", "dateoccured"],
        (1..=6)
            .map(|i| {
                vec![
                    format!("E{}", i).into(),
                    ((i % 2) as i64).into(),
                    format!("2015-0{}-15", i).into(),
                ]
            })
            .collect(),
    )
}

pub fn sexes() -> QueryResult {
    QueryResult::from_rows(
        &["newid", "male_female"],
        (1..=6)
            .map(|i| {
                let sex = if i % 3 == 0 { "female" } else { "male" };
                vec![format!("E{}", i).into(), sex.into()]
            })
            .collect(),
    )
}

/// Arrest counts for E1..E4 only
pub fn arrests() -> QueryResult {
    QueryResult::from_rows(
        &["newid", "agg_value"],
        (1..=4)
            .map(|i| vec![format!("E{}", i).into(), (i as i64 * 2).into()])
            .collect(),
    )
}

pub fn store() -> MemoryStore {
    MemoryStore::new()
        .with_name("fixture")
        .with_response(LABEL_SQL, labels())
        .with_response(SEX_SQL, sexes())
        .with_response(ARRESTS_SQL, arrests())
}

pub fn experiment() -> ExperimentConfig {
    let window = LabelWindow::new(date(2015, 1, 1), date(2015, 12, 31)).unwrap();
    ExperimentConfig::new(window, date(2015, 1, 1))
        .with_feature("male_female", true)
        .with_feature("career_arrests", true)
        .with_shuffle(ShuffleConfig {
            enabled: false,
            seed: None,
        })
}

pub async fn engine(config: ExperimentConfig, store: Arc<MemoryStore>) -> EisEngine {
    match EisEngineBuilder::new()
        .with_config(config)
        .with_store(store)
        .build()
        .await
    {
        Ok(engine) => engine,
        Err(e) => panic!("failed to build engine: {}", e),
    }
}
