//! Client-side joins between collections fetched from different endpoints.
//!
//! The API has no relational queries; detail views filter related
//! collections by the cluster id (and keyspace name) embedded in each entry.
//! An absent related collection is passed in as an empty slice and simply
//! yields no matches.

use vtdash_core::models::{Cluster, KeyspaceEntry, TabletEntry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardSummary {
    pub name: String,
    pub primary_serving: bool,
    pub key_range: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyspaceSummary {
    pub name: String,
    pub shards: Vec<ShardSummary>,
    pub tablet_count: usize,
}

/// A cluster joined with its keyspaces and tablets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterDetail {
    pub cluster: Cluster,
    pub keyspaces: Vec<KeyspaceSummary>,
    pub tablet_count: usize,
}

/// A keyspace joined with the tablets serving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyspaceDetail {
    pub entry: KeyspaceEntry,
    pub tablet_count: usize,
}

/// Tablets of one keyspace, in the order the API listed them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabletGroup {
    pub keyspace: String,
    pub tablets: Vec<TabletEntry>,
}

#[must_use]
pub fn keyspaces_for_cluster<'a>(
    keyspaces: &'a [KeyspaceEntry],
    cluster_id: &str,
) -> Vec<&'a KeyspaceEntry> {
    keyspaces
        .iter()
        .filter(|ks| ks.cluster.id == cluster_id)
        .collect()
}

#[must_use]
pub fn tablets_for_cluster<'a>(tablets: &'a [TabletEntry], cluster_id: &str) -> Vec<&'a TabletEntry> {
    tablets
        .iter()
        .filter(|t| t.cluster.id == cluster_id)
        .collect()
}

#[must_use]
pub fn tablets_for_keyspace<'a>(
    tablets: &'a [TabletEntry],
    cluster_id: &str,
    keyspace: &str,
) -> Vec<&'a TabletEntry> {
    tablets
        .iter()
        .filter(|t| t.cluster.id == cluster_id && t.tablet.keyspace == keyspace)
        .collect()
}

fn summarize_keyspace(entry: &KeyspaceEntry, tablets: &[TabletEntry]) -> KeyspaceSummary {
    let shards = entry
        .shards
        .iter()
        .map(|(name, shard)| ShardSummary {
            name: name.clone(),
            primary_serving: shard.shard.is_primary_serving,
            key_range: shard.shard.key_range.as_ref().map(|range| range.display()),
        })
        .collect();
    KeyspaceSummary {
        name: entry.keyspace.name.clone(),
        shards,
        tablet_count: tablets_for_keyspace(tablets, &entry.cluster.id, &entry.keyspace.name).len(),
    }
}

#[must_use]
pub fn cluster_details(
    clusters: &[Cluster],
    keyspaces: &[KeyspaceEntry],
    tablets: &[TabletEntry],
) -> Vec<ClusterDetail> {
    clusters
        .iter()
        .map(|cluster| ClusterDetail {
            cluster: cluster.clone(),
            keyspaces: keyspaces_for_cluster(keyspaces, &cluster.id)
                .into_iter()
                .map(|entry| summarize_keyspace(entry, tablets))
                .collect(),
            tablet_count: tablets_for_cluster(tablets, &cluster.id).len(),
        })
        .collect()
}

#[must_use]
pub fn keyspace_details(keyspaces: &[KeyspaceEntry], tablets: &[TabletEntry]) -> Vec<KeyspaceDetail> {
    keyspaces
        .iter()
        .map(|entry| KeyspaceDetail {
            entry: entry.clone(),
            tablet_count: tablets_for_keyspace(tablets, &entry.cluster.id, &entry.keyspace.name)
                .len(),
        })
        .collect()
}

#[must_use]
pub fn group_by_keyspace(tablets: &[TabletEntry]) -> Vec<TabletGroup> {
    let mut groups: Vec<TabletGroup> = Vec::new();
    for tablet in tablets {
        match groups
            .iter_mut()
            .find(|group| group.keyspace == tablet.tablet.keyspace)
        {
            Some(group) => group.tablets.push(tablet.clone()),
            None => groups.push(TabletGroup {
                keyspace: tablet.tablet.keyspace.clone(),
                tablets: vec![tablet.clone()],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use serde_json::json;
    use vtdash_core::models::{KeyspacesPayload, TabletsPayload};

    use super::*;

    fn tablet(cluster: &str, keyspace: &str, uid: u64) -> TabletEntry {
        serde_json::from_value(json!({
            "cluster": {"id": cluster},
            "state": 1,
            "tablet": {"alias": {"cell": "zone1", "uid": uid}, "keyspace": keyspace, "shard": "0"}
        }))
        .unwrap()
    }

    #[test]
    fn tablets_filtered_by_cluster_id() {
        let tablets = vec![tablet("c1", "ks1", 1), tablet("c2", "ks1", 2), tablet("c1", "ks2", 3)];
        let matched: Vec<u64> = tablets_for_cluster(&tablets, "c1")
            .iter()
            .map(|t| t.tablet.alias.uid)
            .collect();
        assert_eq!(matched, vec![1, 3]);
        assert!(tablets_for_cluster(&tablets, "c9").is_empty());
    }

    #[test]
    fn empty_tablet_collection_joins_to_empty() {
        assert!(tablets_for_cluster(&[], "c1").is_empty());
        assert!(tablets_for_keyspace(&[], "c1", "ks1").is_empty());
    }

    #[test]
    fn keyspace_join_requires_cluster_and_name() {
        let tablets = vec![tablet("c1", "ks1", 1), tablet("c2", "ks1", 2), tablet("c1", "ks2", 3)];
        assert_eq!(tablets_for_keyspace(&tablets, "c1", "ks1").len(), 1);
    }

    #[test]
    fn cluster_detail_reports_primary_serving_shard() {
        let clusters = vec![Cluster {
            id: "c1".into(),
            name: "Cluster1".into(),
        }];
        let keyspaces: KeyspacesPayload = serde_json::from_value(json!({
            "keyspaces": [{
                "cluster": {"id": "c1"},
                "keyspace": {"name": "ks1"},
                "shards": {"-80": {"shard": {"is_primary_serving": true}}}
            }]
        }))
        .unwrap();

        let details = cluster_details(&clusters, &keyspaces.keyspaces, &[]);
        assert_eq!(details.len(), 1);
        let detail = &details[0];
        assert_eq!(detail.keyspaces.len(), 1);
        assert_eq!(detail.keyspaces[0].name, "ks1");
        assert_eq!(
            detail.keyspaces[0].shards,
            vec![ShardSummary {
                name: "-80".into(),
                primary_serving: true,
                key_range: None,
            }]
        );
        assert_eq!(detail.tablet_count, 0);
    }

    #[test]
    fn keyspace_details_count_matching_tablets() {
        let keyspaces: KeyspacesPayload = serde_json::from_value(json!({
            "keyspaces": [
                {"cluster": {"id": "c1"}, "keyspace": {"name": "ks1"}},
                {"cluster": {"id": "c2"}, "keyspace": {"name": "ks1"}}
            ]
        }))
        .unwrap();
        let tablets: TabletsPayload = serde_json::from_value(json!({
            "tablets": [
                {"cluster": {"id": "c1"}, "tablet": {"keyspace": "ks1"}},
                {"cluster": {"id": "c1"}, "tablet": {"keyspace": "ks1"}},
                {"cluster": {"id": "c2"}, "tablet": {"keyspace": "other"}}
            ]
        }))
        .unwrap();
        let details = keyspace_details(&keyspaces.keyspaces, &tablets.tablets);
        assert_eq!(details[0].tablet_count, 2);
        assert_eq!(details[1].tablet_count, 0);
    }

    #[test]
    fn grouping_keeps_first_seen_keyspace_order() {
        let tablets = vec![
            tablet("c1", "lookup", 1),
            tablet("c1", "commerce", 2),
            tablet("c1", "lookup", 3),
        ];
        let groups = group_by_keyspace(&tablets);
        let names: Vec<&str> = groups.iter().map(|g| g.keyspace.as_str()).collect();
        assert_eq!(names, vec!["lookup", "commerce"]);
        assert_eq!(groups[0].tablets.len(), 2);
    }
}
