//! Navigation controller: owns tab selection and keeps it in sync with the
//! address and history stack.
//!
//! User-driven activations push exactly one history slot. Activations caused
//! by a history pop never push, so walking back and forth cannot grow the
//! stack.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::debug;
use vtdash_core::TabId;

use crate::context::{LoadOutcome, ViewContext};
use crate::history::{build_location, decode_query, History, HistoryEntry, Params, PopEvent};
use crate::loaders::KEYSPACE_PARAM;

pub struct NavigationController {
    ctx: Arc<ViewContext>,
    history: History,
    base_path: String,
    default_tab: TabId,
    initialized: bool,
}

impl NavigationController {
    /// `location` is the starting address (`<path>?<query>`); it becomes
    /// the first history slot.
    pub fn new(
        ctx: Arc<ViewContext>,
        location: impl Into<String>,
        base_path: impl Into<String>,
        default_tab: TabId,
    ) -> Self {
        Self {
            ctx,
            history: History::new(location),
            base_path: base_path.into(),
            default_tab,
            initialized: false,
        }
    }

    pub fn context(&self) -> &Arc<ViewContext> {
        &self.ctx
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn location(&self) -> &str {
        self.history.location()
    }

    pub fn current_tab(&self) -> Option<TabId> {
        self.ctx.current_tab()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Activate the tab named by the starting address, or the default tab
    /// when it names none or an unknown one, and start accepting pops.
    pub fn initialize(&mut self) -> JoinHandle<LoadOutcome> {
        let parsed = decode_query(self.history.location());
        let tab = match parsed.tab {
            Some(tab) => tab,
            None => {
                if let Some(raw) = &parsed.raw_tab {
                    debug!(tab = %raw, fallback = %self.default_tab, "unknown tab in address");
                }
                self.default_tab
            }
        };
        self.history.replace(HistoryEntry {
            tab,
            params: parsed.params.clone(),
        });
        self.initialized = true;
        self.activate_with_params(tab, parsed.params, false)
    }

    pub fn activate_tab(&mut self, tab: TabId, persist_to_history: bool) -> JoinHandle<LoadOutcome> {
        self.activate_with_params(tab, Params::new(), persist_to_history)
    }

    /// Make `tab` current, optionally record it in history, move the active
    /// marker and start its loader.
    pub fn activate_with_params(
        &mut self,
        tab: TabId,
        params: Params,
        persist_to_history: bool,
    ) -> JoinHandle<LoadOutcome> {
        let params: Params = params.into_iter().filter(|(_, v)| !v.is_empty()).collect();
        self.ctx.set_navigation(tab, params.clone());
        if persist_to_history {
            let location = build_location(&self.base_path, tab, &params);
            debug!(%tab, %location, "push history");
            self.history.push(HistoryEntry { tab, params }, location);
        }
        self.ctx.regions().mark_active(tab);
        self.ctx.spawn_load(tab)
    }

    /// Replay a popped history slot. Slots without state, and pops that
    /// arrive before `initialize`, are ignored.
    pub fn on_history_popped(&mut self, event: PopEvent) -> Option<JoinHandle<LoadOutcome>> {
        if !self.initialized {
            debug!("history pop before initialization ignored");
            return None;
        }
        let entry = event.state?;
        Some(self.activate_with_params(entry.tab, entry.params, false))
    }

    pub fn back(&mut self) -> Option<JoinHandle<LoadOutcome>> {
        let event = self.history.back()?;
        self.on_history_popped(event)
    }

    pub fn forward(&mut self) -> Option<JoinHandle<LoadOutcome>> {
        let event = self.history.forward()?;
        self.on_history_popped(event)
    }

    /// Show the VSchema of `selector` (`<cluster>/<keyspace>`).
    pub fn select_keyspace(&mut self, selector: &str) -> JoinHandle<LoadOutcome> {
        let params = Params::from([(KEYSPACE_PARAM.to_string(), selector.to_string())]);
        self.activate_with_params(TabId::VSchema, params, true)
    }

    /// Selector following the one currently shown, wrapping around.
    pub fn next_keyspace(&self) -> Option<String> {
        let choices = self.ctx.state().keyspace_selectors();
        let current = self
            .ctx
            .param(KEYSPACE_PARAM)
            .or_else(|| self.ctx.state().vschema.map(|selection| selection.selector));
        let position = current.and_then(|current| choices.iter().position(|c| *c == current));
        match position {
            Some(idx) => choices.get((idx + 1) % choices.len()).cloned(),
            None => choices.first().cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use serde_json::json;
    use vtdash_client::MockApiClient;

    use super::*;

    fn controller(location: &str) -> NavigationController {
        let mock = MockApiClient::new()
            .with_json("/clusters", json!({"clusters": []}))
            .with_json("/keyspaces", json!({"keyspaces": []}))
            .with_json("/tablets", json!({"tablets": []}))
            .with_json("/schemas", json!({"schemas": []}));
        let ctx = Arc::new(ViewContext::new(Arc::new(mock)));
        NavigationController::new(ctx, location, "/", TabId::Clusters)
    }

    #[tokio::test]
    async fn initialize_reads_tab_from_address() {
        let mut nav = controller("/?tab=tablets");
        nav.initialize().await.unwrap();
        assert_eq!(nav.current_tab(), Some(TabId::Tablets));
        assert_eq!(nav.history().len(), 1);
        assert_eq!(nav.location(), "/?tab=tablets");
    }

    #[tokio::test]
    async fn unknown_tab_falls_back_to_default() {
        let mut nav = controller("/?tab=nope");
        nav.initialize().await.unwrap();
        assert_eq!(nav.current_tab(), Some(TabId::Clusters));
        assert!(nav.context().regions().is_active(TabId::Clusters));
    }

    #[tokio::test]
    async fn pops_before_initialize_are_ignored() {
        let mut nav = controller("/");
        let event = PopEvent {
            state: Some(HistoryEntry {
                tab: TabId::Schemas,
                params: Params::new(),
            }),
        };
        assert!(nav.on_history_popped(event).is_none());
        assert_eq!(nav.current_tab(), None);
    }

    #[tokio::test]
    async fn persisted_activation_encodes_tab_and_params() {
        let mut nav = controller("/");
        nav.initialize().await.unwrap();
        let params = Params::from([
            ("keyspace".to_string(), "c1/commerce".to_string()),
            ("empty".to_string(), String::new()),
        ]);
        nav.activate_with_params(TabId::Schemas, params, true)
            .await
            .unwrap();
        assert_eq!(nav.location(), "/?tab=schemas&keyspace=c1%2Fcommerce");
        assert_eq!(nav.history().len(), 2);
        assert_eq!(
            nav.context().navigation().params,
            Params::from([("keyspace".to_string(), "c1/commerce".to_string())])
        );
    }

    #[tokio::test]
    async fn back_returns_to_initial_tab_without_pushing() {
        let mut nav = controller("/?tab=keyspaces");
        nav.initialize().await.unwrap();
        nav.activate_tab(TabId::Schemas, true).await.unwrap();

        nav.back().unwrap().await.unwrap();
        assert_eq!(nav.current_tab(), Some(TabId::Keyspaces));
        assert_eq!(nav.history().len(), 2);
        assert!(nav.back().is_none());

        nav.forward().unwrap().await.unwrap();
        assert_eq!(nav.current_tab(), Some(TabId::Schemas));
        assert_eq!(nav.history().len(), 2);
    }

    #[tokio::test]
    async fn next_keyspace_cycles_through_known_keyspaces() {
        let mock = MockApiClient::new().with_json(
            "/keyspaces",
            json!({"keyspaces": [
                {"cluster": {"id": "c1"}, "keyspace": {"name": "a"}},
                {"cluster": {"id": "c1"}, "keyspace": {"name": "b"}}
            ]}),
        );
        let ctx = Arc::new(ViewContext::new(Arc::new(mock)));
        let mut nav = NavigationController::new(ctx, "/?tab=keyspaces", "/", TabId::Clusters);
        assert_eq!(nav.next_keyspace(), None);

        nav.initialize().await.unwrap();
        assert_eq!(nav.next_keyspace().as_deref(), Some("c1/a"));
        nav.select_keyspace("c1/a").await.unwrap();
        assert_eq!(nav.next_keyspace().as_deref(), Some("c1/b"));
        nav.select_keyspace("c1/b").await.unwrap();
        assert_eq!(nav.next_keyspace().as_deref(), Some("c1/a"));
    }
}
