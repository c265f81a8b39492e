//! Response models of the Fivetran REST API
//!
//! Only the fields the client surfaces are modelled; unknown fields are
//! ignored and missing ones take their defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A group of connectors sharing one destination
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub created_at: Option<String>,
}

/// A connector inside a group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Connector {
    pub id: String,
    pub group_id: String,
    /// Source type, e.g. `postgres` or `salesforce`
    pub service: String,
    /// Destination schema name
    pub schema: String,
    pub connected_by: Option<String>,
    pub created_at: Option<String>,
    pub paused: bool,
    /// Sync frequency in minutes
    pub sync_frequency: Option<u32>,
    pub status: Option<ConnectorStatus>,
}

/// Sync status reported for a connector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorStatus {
    pub setup_state: Option<String>,
    pub sync_state: Option<String>,
    pub update_state: Option<String>,
}

/// Schema configuration of a connector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSchemas {
    pub enable_new_by_default: Option<bool>,
    pub schema_change_handling: Option<String>,
    pub schemas: BTreeMap<String, Schema>,
}

/// One source schema
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Schema {
    pub name_in_destination: Option<String>,
    pub enabled: bool,
    pub tables: BTreeMap<String, Table>,
}

/// One source table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Table {
    pub name_in_destination: Option<String>,
    pub enabled: bool,
    pub sync_mode: Option<String>,
    pub columns: BTreeMap<String, Column>,
}

/// One source column
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Column {
    pub name_in_destination: Option<String>,
    pub enabled: bool,
    pub hashed: bool,
}

impl DataSchemas {
    /// Names of enabled schemas
    pub fn enabled_schemas(&self) -> impl Iterator<Item = &str> {
        self.schemas
            .iter()
            .filter(|(_, schema)| schema.enabled)
            .map(|(name, _)| name.as_str())
    }
}
