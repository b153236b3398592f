//! Dataset Building Example
//!
//! Builds a small officer dataset from an inline experiment configuration
//! against an in-memory store, then runs a feature sweep over two dates.
//!
//! To run this example:
//! ```bash
//! cargo run --package eis-sdk --example build_dataset
//! RUST_LOG=eis_runtime=debug cargo run --package eis-sdk --example build_dataset
//! ```

use eis_sdk::{
    init_tracing, EisEngineBuilder, ExperimentConfig, MemoryStore, QueryResult, Value,
    DEFAULT_LOG_FILTER,
};
use std::sync::Arc;

const EXPERIMENT: &str = r#"
features:
  officer:
    male_female: true
    years_experience: true
  arrests:
    career_arrests: true
    recent_arrests: false
label_window:
  start_date: 2015-01-01
  end_date: 2015-12-31
fake_today: 2015-01-01
fake_todays: [2014-01-01, 2015-01-01]
shuffle:
  seed: 2015
imputation: declared
"#;

fn fixture_store() -> MemoryStore {
    let officers = ["1017", "1022", "1045", "1101", "1187"];

    let labels = officers
        .iter()
        .enumerate()
        .map(|(i, id)| {
            vec![
                Value::from(*id),
                Value::from((i % 2) as i64),
                Value::from(format!("2015-0{}-01", i + 1)),
            ]
        })
        .collect();
    let sexes = officers
        .iter()
        .enumerate()
        .map(|(i, id)| vec![Value::from(*id), Value::from(if i == 2 { "Female" } else { "Male" })])
        .collect();
    let experience = officers
        .iter()
        .enumerate()
        .map(|(i, id)| vec![Value::from(*id), Value::from(3 + i as i64)])
        .collect();
    // 1187 has no arrests on record
    let arrests = officers[..4]
        .iter()
        .enumerate()
        .map(|(i, id)| vec![Value::from(*id), Value::from(10 * (i as i64 + 1))])
        .collect();

    MemoryStore::new()
        .with_name("demo")
        .with_response(
            "FROM si_table",
            QueryResult::from_rows(&["newid", "adverse_by_ourdef", "dateoccured"], labels),
        )
        .with_response(
            "empl_sex_clean",
            QueryResult::from_rows(&["newid", "male_female"], sexes),
        )
        .with_response(
            "as yrs_experience",
            QueryResult::from_rows(&["newid", "yrs_experience"], experience),
        )
        .with_response(
            "from arrest_charges_table",
            QueryResult::from_rows(&["newid", "agg_value"], arrests),
        )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing(DEFAULT_LOG_FILTER)?;

    let config = ExperimentConfig::from_yaml_str(EXPERIMENT)?;
    let engine = EisEngineBuilder::new()
        .with_config(config)
        .with_store(Arc::new(fixture_store()))
        .build()
        .await?;

    println!("📊 Building dataset");
    let dataset = engine.build_dataset().await?;
    println!("Features: {}", dataset.feature_names.join(", "));
    for (i, id) in dataset.entity_ids.iter().enumerate() {
        println!(
            "  {:>5}  label={}  {:?}",
            id, dataset.labels[i], dataset.features.rows[i]
        );
    }

    println!("\n🔁 Feature sweep");
    for summary in engine.evaluate_configured_features().await? {
        println!(
            "  {} as of {}: {} rows, columns [{}]",
            summary.feature,
            summary.reference_date,
            summary.rows,
            summary.columns.join(", ")
        );
    }

    println!("\nDataset as JSON:\n{}", serde_json::to_string_pretty(&dataset)?);
    Ok(())
}
