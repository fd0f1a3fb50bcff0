//! VTAdmin payload shapes.
//!
//! Every field is defaulted so that partial or older API responses still
//! decode; a missing collection key decodes as an empty collection.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Clusters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Cluster reference embedded in keyspace, tablet and schema entries.
pub type ClusterRef = Cluster;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClustersPayload {
    #[serde(default)]
    pub clusters: Vec<Cluster>,
}

// ---------------------------------------------------------------------------
// Keyspaces
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyspace {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRange {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

impl KeyRange {
    /// `start-end` with an open start shown as `0` and an open end as `max`.
    #[must_use]
    pub fn display(&self) -> String {
        let start = self.start.as_deref().filter(|s| !s.is_empty()).unwrap_or("0");
        let end = self.end.as_deref().filter(|s| !s.is_empty()).unwrap_or("max");
        format!("{start}-{end}")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardInfo {
    #[serde(default)]
    pub is_primary_serving: bool,
    #[serde(default)]
    pub key_range: Option<KeyRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardEntry {
    #[serde(default)]
    pub shard: ShardInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyspaceEntry {
    #[serde(default)]
    pub cluster: ClusterRef,
    #[serde(default)]
    pub keyspace: Keyspace,
    #[serde(default)]
    pub shards: BTreeMap<String, ShardEntry>,
}

impl KeyspaceEntry {
    #[must_use]
    pub fn shard_names(&self) -> Vec<&str> {
        self.shards.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn is_sharded(&self) -> bool {
        self.shards.len() > 1
    }

    /// Selector used by the VSchema tab: `<cluster id>/<keyspace name>`.
    #[must_use]
    pub fn selector(&self) -> String {
        format!("{}/{}", self.cluster.id, self.keyspace.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyspacesPayload {
    #[serde(default)]
    pub keyspaces: Vec<KeyspaceEntry>,
}

// ---------------------------------------------------------------------------
// Tablets
// ---------------------------------------------------------------------------

/// Serving state value reported for a healthy tablet.
pub const TABLET_SERVING_STATE: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TabletType {
    Unknown,
    Primary,
    Replica,
    Rdonly,
    Batch,
    Spare,
    Experimental,
    Backup,
    Restore,
    Drained,
}

impl TabletType {
    #[must_use]
    pub fn from_code(code: i64) -> Option<Self> {
        let kind = match code {
            0 => Self::Unknown,
            1 => Self::Primary,
            2 => Self::Replica,
            3 => Self::Rdonly,
            4 => Self::Batch,
            5 => Self::Spare,
            6 => Self::Experimental,
            7 => Self::Backup,
            8 => Self::Restore,
            9 => Self::Drained,
            _ => return None,
        };
        Some(kind)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Primary => "PRIMARY",
            Self::Replica => "REPLICA",
            Self::Rdonly => "RDONLY",
            Self::Batch => "BATCH",
            Self::Spare => "SPARE",
            Self::Experimental => "EXPERIMENTAL",
            Self::Backup => "BACKUP",
            Self::Restore => "RESTORE",
            Self::Drained => "DRAINED",
        }
    }
}

impl fmt::Display for TabletType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabletAlias {
    #[serde(default)]
    pub cell: String,
    #[serde(default)]
    pub uid: u64,
}

impl fmt::Display for TabletAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:010}", self.cell, self.uid)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tablet {
    #[serde(default)]
    pub alias: TabletAlias,
    #[serde(default)]
    pub keyspace: String,
    #[serde(default)]
    pub shard: String,
    #[serde(default, rename = "type")]
    pub tablet_type: i64,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub port_map: BTreeMap<String, u32>,
}

impl Tablet {
    /// Named type, or the raw numeric code when the API reports a newer type.
    #[must_use]
    pub fn type_label(&self) -> String {
        match TabletType::from_code(self.tablet_type) {
            Some(kind) => kind.as_str().to_string(),
            None => self.tablet_type.to_string(),
        }
    }

    #[must_use]
    pub fn vt_port(&self) -> Option<u32> {
        self.port_map.get("vt").copied()
    }

    #[must_use]
    pub fn debug_status_url(&self) -> Option<String> {
        self.vt_port()
            .map(|port| format!("http://{}:{port}/debug/status", self.hostname))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabletEntry {
    #[serde(default)]
    pub cluster: ClusterRef,
    #[serde(default)]
    pub state: i64,
    #[serde(default)]
    pub tablet: Tablet,
}

impl TabletEntry {
    #[must_use]
    pub fn is_serving(&self) -> bool {
        self.state == TABLET_SERVING_STATE
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabletsPayload {
    #[serde(default)]
    pub tablets: Vec<TabletEntry>,
}

// ---------------------------------------------------------------------------
// Schemas
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub schema: Option<String>,
}

impl TableDefinition {
    /// Number of backquoted identifiers in the table DDL.
    #[must_use]
    pub fn column_count(&self) -> usize {
        static IDENT: OnceLock<Option<Regex>> = OnceLock::new();
        let Some(ddl) = self.schema.as_deref() else {
            return 0;
        };
        match IDENT.get_or_init(|| Regex::new(r"`\w+`").ok()) {
            Some(re) => re.find_iter(ddl).count(),
            None => 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaEntry {
    #[serde(default)]
    pub cluster: ClusterRef,
    #[serde(default)]
    pub keyspace: String,
    #[serde(default)]
    pub table_definitions: Vec<TableDefinition>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemasPayload {
    #[serde(default)]
    pub schemas: Vec<SchemaEntry>,
}

// ---------------------------------------------------------------------------
// VSchema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnVindex {
    #[serde(default)]
    pub column: Option<String>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_unique: bool,
}

impl ColumnVindex {
    /// Single column, else the joined column list, else `N/A`.
    #[must_use]
    pub fn column_label(&self) -> String {
        if let Some(column) = self.column.as_deref().filter(|c| !c.is_empty()) {
            return column.to_string();
        }
        if !self.columns.is_empty() {
            return self.columns.join(", ");
        }
        "N/A".to_string()
    }
}

/// One table of a keyspace VSchema. `raw` keeps the full configuration for
/// display; the typed fields are decoded leniently from it.
#[derive(Debug, Clone, PartialEq)]
pub struct VSchemaTable {
    pub name: String,
    pub column_vindexes: Vec<ColumnVindex>,
    pub auto_increment: Option<Value>,
    pub raw: Value,
}

/// Table map of a VSchema document, read from `tables` or `v_schema.tables`.
#[must_use]
pub fn vschema_table_map(vschema: &Value) -> Option<&Map<String, Value>> {
    vschema
        .get("tables")
        .and_then(Value::as_object)
        .or_else(|| {
            vschema
                .get("v_schema")
                .and_then(|inner| inner.get("tables"))
                .and_then(Value::as_object)
        })
}

/// Decode the tables of a VSchema document in key order. `None` when the
/// document carries no table map at all.
#[must_use]
pub fn vschema_tables(vschema: &Value) -> Option<Vec<VSchemaTable>> {
    let map = vschema_table_map(vschema)?;
    let tables = map
        .iter()
        .map(|(name, config)| {
            let column_vindexes = config
                .get("column_vindexes")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|item| serde_json::from_value(item.clone()).ok())
                        .collect()
                })
                .unwrap_or_default();
            let auto_increment = config
                .get("auto_increment")
                .filter(|value| !value.is_null())
                .cloned();
            VSchemaTable {
                name: name.clone(),
                column_vindexes,
                auto_increment,
                raw: config.clone(),
            }
        })
        .collect();
    Some(tables)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn missing_collection_key_decodes_as_empty() {
        let payload: ClustersPayload = serde_json::from_value(json!({})).unwrap();
        assert!(payload.clusters.is_empty());
        let payload: TabletsPayload = serde_json::from_value(json!({"other": 1})).unwrap();
        assert!(payload.tablets.is_empty());
    }

    #[test]
    fn keyspace_entry_decodes_shards_in_key_order() {
        let entry: KeyspaceEntry = serde_json::from_value(json!({
            "cluster": {"id": "c1", "name": "Cluster1"},
            "keyspace": {"name": "commerce"},
            "shards": {
                "80-": {"shard": {"is_primary_serving": false}},
                "-80": {"shard": {"is_primary_serving": true, "key_range": {"end": "gA=="}}}
            }
        }))
        .unwrap();
        assert_eq!(entry.shard_names(), vec!["-80", "80-"]);
        assert!(entry.is_sharded());
        assert_eq!(entry.selector(), "c1/commerce");
        let first = &entry.shards["-80"].shard;
        assert!(first.is_primary_serving);
        assert_eq!(first.key_range.as_ref().unwrap().display(), "0-gA==");
    }

    #[test]
    fn tablet_alias_is_zero_padded() {
        let alias = TabletAlias {
            cell: "zone1".into(),
            uid: 101,
        };
        assert_eq!(alias.to_string(), "zone1-0000000101");
    }

    #[test]
    fn tablet_type_label_falls_back_to_code() {
        let mut tablet = Tablet {
            tablet_type: 2,
            ..Tablet::default()
        };
        assert_eq!(tablet.type_label(), "REPLICA");
        tablet.tablet_type = 42;
        assert_eq!(tablet.type_label(), "42");
    }

    #[test]
    fn tablet_decodes_type_and_ports() {
        let entry: TabletEntry = serde_json::from_value(json!({
            "cluster": {"id": "c1"},
            "state": 1,
            "tablet": {
                "alias": {"cell": "zone1", "uid": 100},
                "keyspace": "commerce",
                "shard": "0",
                "type": 1,
                "hostname": "host-a",
                "port_map": {"vt": 15100, "grpc": 16100}
            }
        }))
        .unwrap();
        assert!(entry.is_serving());
        assert_eq!(entry.tablet.type_label(), "PRIMARY");
        assert_eq!(
            entry.tablet.debug_status_url().as_deref(),
            Some("http://host-a:15100/debug/status")
        );
    }

    #[test]
    fn column_count_counts_backquoted_identifiers() {
        let table = TableDefinition {
            name: "corder".into(),
            schema: Some(
                "CREATE TABLE `corder` (\n  `order_id` bigint,\n  `sku` varbinary(128)\n)".into(),
            ),
        };
        assert_eq!(table.column_count(), 3);
        let empty = TableDefinition::default();
        assert_eq!(empty.column_count(), 0);
    }

    #[test]
    fn vschema_tables_reads_nested_document() {
        let doc = json!({
            "v_schema": {
                "tables": {
                    "customer": {
                        "column_vindexes": [{"column": "customer_id", "name": "hash"}],
                        "auto_increment": {"column": "customer_id", "sequence": "customer_seq"}
                    },
                    "corder": {
                        "column_vindexes": [{"columns": ["a", "b"], "name": "multi"}]
                    }
                }
            }
        });
        let tables = vschema_tables(&doc).unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].name, "corder");
        assert_eq!(tables[0].column_vindexes[0].column_label(), "a, b");
        assert!(tables[0].auto_increment.is_none());
        assert_eq!(tables[1].column_vindexes[0].column_label(), "customer_id");
        assert!(tables[1].auto_increment.is_some());
    }

    #[test]
    fn vschema_without_tables_is_none() {
        assert!(vschema_tables(&json!({"sharded": true})).is_none());
    }

    #[test]
    fn column_vindex_label_defaults_to_na() {
        assert_eq!(ColumnVindex::default().column_label(), "N/A");
    }
}
