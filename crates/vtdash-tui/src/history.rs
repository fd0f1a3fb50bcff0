//! Address encoding and the navigation history stack.
//!
//! The address is `<base path>?tab=<tab>[&key=value...]`. The history keeps
//! one slot per pushed address plus a cursor; moving the cursor produces a
//! pop event carrying whatever state the slot was pushed with.

use std::collections::BTreeMap;

use url::form_urlencoded;
use vtdash_core::TabId;

pub const TAB_PARAM: &str = "tab";

pub type Params = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub tab: TabId,
    pub params: Params,
}

/// Delivered when the history cursor moves. `state` is `None` for slots
/// that were never given state (for example the initial address before
/// initialization).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopEvent {
    pub state: Option<HistoryEntry>,
}

/// Decoded address query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuery {
    /// Recognized tab, `None` when absent or unknown.
    pub tab: Option<TabId>,
    /// Raw `tab` value as it appeared, for diagnostics.
    pub raw_tab: Option<String>,
    /// Every other non-empty parameter.
    pub params: Params,
}

/// `tab=<tab>&k=v...` with empty values and any stray `tab` key dropped.
#[must_use]
pub fn encode_query(tab: TabId, params: &Params) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    serializer.append_pair(TAB_PARAM, tab.as_str());
    for (key, value) in params {
        if key == TAB_PARAM || value.is_empty() {
            continue;
        }
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

#[must_use]
pub fn build_location(base_path: &str, tab: TabId, params: &Params) -> String {
    format!("{base_path}?{}", encode_query(tab, params))
}

/// Decode a full location (`/path?query`), a `?query` or a bare query.
#[must_use]
pub fn decode_query(location: &str) -> ParsedQuery {
    let query = match location.split_once('?') {
        Some((_, query)) => query,
        None if location.starts_with('/') => "",
        None => location,
    };

    let mut parsed = ParsedQuery::default();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if key == TAB_PARAM {
            if parsed.raw_tab.is_none() {
                parsed.tab = TabId::parse(&value);
                parsed.raw_tab = Some(value.into_owned());
            }
            continue;
        }
        if value.is_empty() {
            continue;
        }
        parsed
            .params
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }
    parsed
}

#[derive(Debug, Clone)]
struct Slot {
    location: String,
    state: Option<HistoryEntry>,
}

/// In-process history stack.
#[derive(Debug, Clone)]
pub struct History {
    slots: Vec<Slot>,
    cursor: usize,
}

impl History {
    #[must_use]
    pub fn new(initial_location: impl Into<String>) -> Self {
        Self {
            slots: vec![Slot {
                location: initial_location.into(),
                state: None,
            }],
            cursor: 0,
        }
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.slots[self.cursor].location
    }

    #[must_use]
    pub fn current_state(&self) -> Option<&HistoryEntry> {
        self.slots[self.cursor].state.as_ref()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Add a slot after the cursor, dropping any forward slots.
    pub fn push(&mut self, entry: HistoryEntry, location: String) {
        self.slots.truncate(self.cursor + 1);
        self.slots.push(Slot {
            location,
            state: Some(entry),
        });
        self.cursor = self.slots.len() - 1;
    }

    /// Attach state to the current slot without adding one.
    pub fn replace(&mut self, entry: HistoryEntry) {
        self.slots[self.cursor].state = Some(entry);
    }

    pub fn back(&mut self) -> Option<PopEvent> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.pop_event())
    }

    pub fn forward(&mut self) -> Option<PopEvent> {
        if self.cursor + 1 >= self.slots.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.pop_event())
    }

    fn pop_event(&self) -> PopEvent {
        PopEvent {
            state: self.slots[self.cursor].state.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn every_tab_round_trips_through_the_query() {
        for tab in TabId::ORDER {
            let location = build_location("/", tab, &Params::new());
            assert_eq!(decode_query(&location).tab, Some(tab), "{location}");
        }
    }

    #[test]
    fn extra_params_are_encoded_and_empty_values_dropped() {
        let encoded = encode_query(
            TabId::VSchema,
            &params(&[("keyspace", "c1/commerce"), ("filter", ""), ("tab", "tablets")]),
        );
        assert_eq!(encoded, "tab=vschema&keyspace=c1%2Fcommerce");

        let parsed = decode_query(&format!("/dash?{encoded}"));
        assert_eq!(parsed.tab, Some(TabId::VSchema));
        assert_eq!(parsed.params, params(&[("keyspace", "c1/commerce")]));
    }

    #[test]
    fn unknown_or_missing_tab_decodes_as_none() {
        let parsed = decode_query("?tab=bogus&x=1");
        assert_eq!(parsed.tab, None);
        assert_eq!(parsed.raw_tab.as_deref(), Some("bogus"));
        assert_eq!(parsed.params, params(&[("x", "1")]));

        assert_eq!(decode_query("/").tab, None);
        assert_eq!(decode_query("").tab, None);
        assert_eq!(decode_query("tab=schemas").tab, Some(TabId::Schemas));
    }

    #[test]
    fn first_tab_value_wins() {
        assert_eq!(decode_query("?tab=tablets&tab=schemas").tab, Some(TabId::Tablets));
    }

    #[test]
    fn push_truncates_forward_slots() {
        let entry = |tab| HistoryEntry {
            tab,
            params: Params::new(),
        };
        let mut history = History::new("/");
        history.push(entry(TabId::Keyspaces), "/?tab=keyspaces".into());
        history.push(entry(TabId::Tablets), "/?tab=tablets".into());
        assert_eq!(history.len(), 3);

        let popped = history.back().unwrap_or(PopEvent { state: None });
        assert_eq!(popped.state.map(|e| e.tab), Some(TabId::Keyspaces));
        assert_eq!(history.location(), "/?tab=keyspaces");

        history.push(entry(TabId::Schemas), "/?tab=schemas".into());
        assert_eq!(history.len(), 3);
        assert!(history.forward().is_none());
    }

    #[test]
    fn initial_slot_pops_without_state_until_replaced() {
        let mut history = History::new("/?tab=tablets");
        history.push(
            HistoryEntry {
                tab: TabId::Schemas,
                params: Params::new(),
            },
            "/?tab=schemas".into(),
        );
        assert_eq!(history.back(), Some(PopEvent { state: None }));
        assert!(history.back().is_none());

        history.replace(HistoryEntry {
            tab: TabId::Tablets,
            params: Params::new(),
        });
        assert_eq!(history.current_state().map(|e| e.tab), Some(TabId::Tablets));
        assert_eq!(history.len(), 2);
    }
}
