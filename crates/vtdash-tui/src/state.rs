//! Application state shared by the loaders.
//!
//! Holds the last successfully fetched collection per view. A failed or
//! superseded load never touches it.

use serde_json::Value;
use vtdash_core::models::{Cluster, KeyspaceEntry, SchemaEntry, TabletEntry};

/// The VSchema document currently shown and the keyspace it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct VSchemaSelection {
    /// `<cluster id>/<keyspace name>`.
    pub selector: String,
    pub document: Value,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub clusters: Vec<Cluster>,
    pub keyspaces: Vec<KeyspaceEntry>,
    pub tablets: Vec<TabletEntry>,
    pub schemas: Vec<SchemaEntry>,
    pub vschema: Option<VSchemaSelection>,
}

impl AppState {
    /// Keyspace selectors in API order, as offered by the VSchema view.
    #[must_use]
    pub fn keyspace_selectors(&self) -> Vec<String> {
        self.keyspaces.iter().map(KeyspaceEntry::selector).collect()
    }
}
