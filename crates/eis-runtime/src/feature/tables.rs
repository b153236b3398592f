//! Logical table names
//!
//! Feature and label SQL never hardcodes physical table names; deployments map
//! the logical names below onto their warehouse layout. Names stay unqualified
//! and resolve through the connection's `search_path`, so the datasource
//! schema is the only schema setting.

use serde::{Deserialize, Serialize};

/// Logical table and column naming for the EIS warehouse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Entity id column shared by every table
    #[serde(default = "default_id_column")]
    pub id_column: String,

    /// Internal affairs / supervisor investigation cases (labels)
    #[serde(default = "default_si_table")]
    pub si_table: String,

    #[serde(default = "default_officer_table")]
    pub officer_table: String,

    #[serde(default = "default_arrest_charges_table")]
    pub arrest_charges_table: String,

    #[serde(default = "default_citations_table")]
    pub citations_table: String,

    /// CAD dispatch assignments
    #[serde(default = "default_dispatch_table")]
    pub dispatch_table: String,

    /// Field interviews
    #[serde(default = "default_field_int_table")]
    pub field_int_table: String,

    #[serde(default = "default_incidents_table")]
    pub incidents_table: String,

    /// Sub-beat polygons (PostGIS)
    #[serde(default = "default_sub_beats")]
    pub sub_beats: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            id_column: default_id_column(),
            si_table: default_si_table(),
            officer_table: default_officer_table(),
            arrest_charges_table: default_arrest_charges_table(),
            citations_table: default_citations_table(),
            dispatch_table: default_dispatch_table(),
            field_int_table: default_field_int_table(),
            incidents_table: default_incidents_table(),
            sub_beats: default_sub_beats(),
        }
    }
}

fn default_id_column() -> String {
    "newid".to_string()
}

fn default_si_table() -> String {
    "si_table".to_string()
}

fn default_officer_table() -> String {
    "officer_table".to_string()
}

fn default_arrest_charges_table() -> String {
    "arrest_charges_table".to_string()
}

fn default_citations_table() -> String {
    "citations_table".to_string()
}

fn default_dispatch_table() -> String {
    "dispatch_table".to_string()
}

fn default_field_int_table() -> String {
    "field_int_table".to_string()
}

fn default_incidents_table() -> String {
    "incidents_table".to_string()
}

fn default_sub_beats() -> String {
    "sub_beats".to_string()
}
