//! Pure data-to-markup mapping, one function per view.
//!
//! Nothing here fetches or touches regions; loaders call these with data they
//! already hold and write the returned fragment.

use serde_json::Value;
use vtdash_core::models::{SchemaEntry, TabletEntry, TabletType, VSchemaTable};

use crate::join::{ClusterDetail, KeyspaceDetail, KeyspaceSummary, TabletGroup};
use crate::markup::{Block, Fragment, InfoItem, Inline, Tone};

#[must_use]
pub fn loading(message: &str) -> Fragment {
    Fragment::new(vec![Block::Loading(message.to_string())])
}

#[must_use]
pub fn error(title: &str, message: &str) -> Fragment {
    Fragment::new(vec![Block::Error {
        title: title.to_string(),
        message: message.to_string(),
    }])
}

#[must_use]
pub fn empty(title: &str, message: &str) -> Fragment {
    Fragment::new(vec![Block::Empty {
        title: title.to_string(),
        message: message.to_string(),
    }])
}

fn heading(level: u8, text: &str) -> Block {
    Block::Heading {
        level,
        text: text.to_string(),
    }
}

fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

// ---------------------------------------------------------------------------
// Clusters
// ---------------------------------------------------------------------------

fn shard_badge(name: &str, primary_serving: bool) -> Inline {
    if primary_serving {
        Inline::badge(Tone::Success, format!("{name} (primary serving)"))
    } else {
        Inline::badge(Tone::Warning, format!("{name} (not primary serving)"))
    }
}

fn keyspace_summary_item(summary: &KeyspaceSummary) -> InfoItem {
    InfoItem::new(
        summary.name.clone(),
        format!(
            "{} shard(s), {} tablet(s)",
            summary.shards.len(),
            summary.tablet_count
        ),
    )
    .with_extra(
        summary
            .shards
            .iter()
            .map(|shard| shard_badge(&shard.name, shard.primary_serving))
            .collect(),
    )
}

#[must_use]
pub fn clusters(details: &[ClusterDetail]) -> Fragment {
    let mut fragment = Fragment::new(vec![heading(2, "Cluster Overview")]);
    for detail in details {
        fragment.push(Block::Card {
            title: detail.cluster.name.clone(),
            badges: Vec::new(),
            body: vec![Block::InfoGrid(vec![InfoItem::new(
                "Cluster ID",
                detail.cluster.id.clone(),
            )])],
        });
    }

    let cards = details
        .iter()
        .map(|detail| {
            let mut body = Vec::new();
            if !detail.keyspaces.is_empty() {
                body.push(Block::Section {
                    title: "Keyspaces".into(),
                    body: vec![Block::InfoGrid(
                        detail.keyspaces.iter().map(keyspace_summary_item).collect(),
                    )],
                });
            }
            Block::Card {
                title: format!("{} - Details", detail.cluster.name),
                badges: vec![Inline::badge(
                    Tone::Info,
                    format!("{} tablet(s)", detail.tablet_count),
                )],
                body,
            }
        })
        .collect();
    fragment.push(Block::Section {
        title: "Cluster Details".into(),
        body: cards,
    });
    fragment
}

// ---------------------------------------------------------------------------
// Keyspaces
// ---------------------------------------------------------------------------

fn keyspace_card(detail: &KeyspaceDetail) -> Block {
    let entry = &detail.entry;
    let shard_names = entry.shard_names();

    let mut body = vec![Block::InfoGrid(vec![
        InfoItem::new(
            "Keyspace Type",
            if entry.is_sharded() {
                "Sharded"
            } else {
                "Unsharded"
            },
        ),
        InfoItem::new(
            "Shards",
            if shard_names.is_empty() {
                "None".to_string()
            } else {
                shard_names.join(", ")
            },
        ),
    ])];

    if !entry.shards.is_empty() {
        let items = entry
            .shards
            .iter()
            .map(|(name, shard)| {
                let mut value = vec![if shard.shard.is_primary_serving {
                    Inline::badge(Tone::Success, "Primary Serving")
                } else {
                    Inline::badge(Tone::Warning, "Not Primary Serving")
                }];
                if let Some(range) = &shard.shard.key_range {
                    value.push(Inline::badge(
                        Tone::Info,
                        format!("Range: {}", range.display()),
                    ));
                }
                InfoItem {
                    label: format!("Shard {name}"),
                    value,
                    extra: Vec::new(),
                }
            })
            .collect();
        body.push(Block::Section {
            title: "Shard Details".into(),
            body: vec![Block::InfoGrid(items)],
        });
    }

    Block::Card {
        title: entry.keyspace.name.clone(),
        badges: vec![
            Inline::badge(Tone::Primary, entry.cluster.name.clone()),
            Inline::badge(Tone::Success, format!("{} shard(s)", shard_names.len())),
            Inline::badge(Tone::Info, format!("{} tablet(s)", detail.tablet_count)),
        ],
        body,
    }
}

#[must_use]
pub fn keyspaces(details: &[KeyspaceDetail]) -> Fragment {
    let mut fragment = Fragment::new(vec![heading(2, "Keyspaces")]);
    for detail in details {
        fragment.push(keyspace_card(detail));
    }
    fragment
}

// ---------------------------------------------------------------------------
// Tablets
// ---------------------------------------------------------------------------

fn type_tone(tablet_type: i64) -> Tone {
    match TabletType::from_code(tablet_type) {
        Some(TabletType::Primary) => Tone::Primary,
        Some(TabletType::Replica) => Tone::Replica,
        _ => Tone::Info,
    }
}

fn tablet_row(entry: &TabletEntry) -> Vec<Vec<Inline>> {
    let tablet = &entry.tablet;
    let serving = entry.is_serving();
    let (state, state_tone) = if serving {
        ("SERVING", Tone::Success)
    } else {
        ("NOT_SERVING", Tone::Warning)
    };
    let actions = match tablet.debug_status_url() {
        Some(href) => vec![Inline::Link {
            href,
            text: "View".into(),
        }],
        None => Vec::new(),
    };
    vec![
        vec![Inline::strong(tablet.alias.to_string())],
        vec![Inline::text(tablet.shard.clone())],
        vec![Inline::badge(type_tone(tablet.tablet_type), tablet.type_label())],
        vec![Inline::Status { serving }, Inline::badge(state_tone, state)],
        vec![Inline::text(tablet.hostname.clone())],
        vec![Inline::text(
            tablet
                .vt_port()
                .map_or_else(|| "N/A".to_string(), |port| port.to_string()),
        )],
        actions,
    ]
}

#[must_use]
pub fn tablets(groups: &[TabletGroup]) -> Fragment {
    let mut fragment = Fragment::new(vec![heading(2, "Tablets")]);
    for group in groups {
        fragment.push(Block::Card {
            title: group.keyspace.clone(),
            badges: vec![Inline::badge(
                Tone::Primary,
                format!("{} tablet(s)", group.tablets.len()),
            )],
            body: vec![Block::Table {
                headers: ["Alias", "Shard", "Type", "State", "Hostname", "Port", "Actions"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
                rows: group.tablets.iter().map(tablet_row).collect(),
            }],
        });
    }
    fragment
}

// ---------------------------------------------------------------------------
// Schemas
// ---------------------------------------------------------------------------

fn schema_card(schema: &SchemaEntry) -> Block {
    let tables = &schema.table_definitions;
    let mut body = Vec::new();
    if !tables.is_empty() {
        body.push(Block::Table {
            headers: vec!["Table Name".into(), "Columns".into()],
            rows: tables
                .iter()
                .map(|table| {
                    vec![
                        vec![Inline::strong(table.name.clone())],
                        vec![Inline::text(format!("{} columns", table.column_count()))],
                    ]
                })
                .collect(),
        });
        for table in tables {
            body.push(Block::Details {
                summary: format!("View Schema: {}", table.name),
                body: table
                    .schema
                    .clone()
                    .filter(|ddl| !ddl.is_empty())
                    .unwrap_or_else(|| "No schema available".to_string()),
            });
        }
    }
    Block::Card {
        title: schema.keyspace.clone(),
        badges: vec![
            Inline::badge(Tone::Primary, schema.cluster.name.clone()),
            Inline::badge(Tone::Success, format!("{} table(s)", tables.len())),
        ],
        body,
    }
}

#[must_use]
pub fn schemas(entries: &[SchemaEntry]) -> Fragment {
    let mut fragment = Fragment::new(vec![heading(2, "Schemas")]);
    for schema in entries {
        fragment.push(schema_card(schema));
    }
    fragment
}

// ---------------------------------------------------------------------------
// VSchema
// ---------------------------------------------------------------------------

fn vschema_table_card(table: &VSchemaTable) -> Block {
    let mut body = Vec::new();
    if !table.column_vindexes.is_empty() {
        body.push(Block::Section {
            title: "Vindexes".into(),
            body: table
                .column_vindexes
                .iter()
                .map(|vindex| {
                    let mut line = vec![
                        Inline::strong("Column:"),
                        Inline::text(vindex.column_label()),
                        Inline::strong("Name:"),
                        Inline::text(vindex.name.clone()),
                    ];
                    if vindex.is_unique {
                        line.push(Inline::badge(Tone::Success, "Unique"));
                    }
                    Block::Line(line)
                })
                .collect(),
        });
    }
    if let Some(auto_increment) = &table.auto_increment {
        body.push(Block::InfoGrid(vec![InfoItem::new(
            "Auto Increment",
            auto_increment.to_string(),
        )]));
    }
    body.push(Block::Details {
        summary: "View Full Configuration".into(),
        body: pretty_json(&table.raw),
    });
    Block::Card {
        title: table.name.clone(),
        badges: Vec::new(),
        body,
    }
}

/// Routing configuration of one keyspace. `choices` lists the selectors the
/// operator can switch to, `selected` the one shown.
#[must_use]
pub fn vschema(keyspace: &str, selected: &str, choices: &[String], document: &Value) -> Fragment {
    let mut fragment = Fragment::new(Vec::new());
    if !choices.is_empty() {
        let mut line = vec![Inline::strong("Keyspace:")];
        line.extend(choices.iter().map(|choice| {
            if choice == selected {
                Inline::badge(Tone::Primary, choice.clone())
            } else {
                Inline::text(choice.clone())
            }
        }));
        fragment.push(Block::Line(line));
    }
    fragment.push(heading(3, &format!("VSchema for {keyspace}")));

    match vtdash_core::models::vschema_tables(document) {
        Some(tables) => {
            for table in &tables {
                fragment.push(vschema_table_card(table));
            }
        }
        None => fragment.push(Block::Warning(
            "No table definitions found in VSchema.".into(),
        )),
    }

    fragment.push(Block::Section {
        title: "Raw VSchema (JSON)".into(),
        body: vec![Block::Details {
            summary: "Show/Hide Full VSchema".into(),
            body: pretty_json(document),
        }],
    });
    fragment
}
