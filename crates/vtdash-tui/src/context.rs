//! Shared view context: API client, regions, application state, navigation
//! state and per-tab load generations.
//!
//! Every load takes a ticket carrying a fresh generation for its tab. Only
//! the holder of the newest ticket may write the region or commit state;
//! anything older completes as `Superseded` and is dropped.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;
use tracing::{debug, warn};
use vtdash_client::{ApiClient, FetchError};
use vtdash_core::TabId;

use crate::history::Params;
use crate::markup::Fragment;
use crate::registry::{self, ViewSpec};
use crate::render;
use crate::state::AppState;
use crate::surface::Regions;

/// Current tab and the extra parameters it was activated with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    pub current_tab: Option<TabId>,
    pub params: Params,
}

/// Identifies one load of one tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub tab: TabId,
    pub generation: u64,
}

/// How a load ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Rendered,
    Empty,
    Failed { message: String },
    /// A newer load of the same tab started first; nothing was written.
    Superseded,
}

pub struct ViewContext {
    client: Arc<dyn ApiClient>,
    regions: Regions,
    state: Mutex<AppState>,
    navigation: Mutex<NavigationState>,
    generations: Mutex<Vec<u64>>,
}

impl ViewContext {
    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self::with_state(client, AppState::default())
    }

    pub fn with_state(client: Arc<dyn ApiClient>, state: AppState) -> Self {
        Self {
            client,
            regions: Regions::new(),
            state: Mutex::new(state),
            navigation: Mutex::new(NavigationState::default()),
            generations: Mutex::new(vec![0; TabId::ORDER.len()]),
        }
    }

    pub fn client(&self) -> &dyn ApiClient {
        self.client.as_ref()
    }

    pub fn regions(&self) -> &Regions {
        &self.regions
    }

    /// Snapshot of the application state.
    pub fn state(&self) -> AppState {
        lock(&self.state).clone()
    }

    pub fn navigation(&self) -> NavigationState {
        lock(&self.navigation).clone()
    }

    pub fn current_tab(&self) -> Option<TabId> {
        lock(&self.navigation).current_tab
    }

    pub fn param(&self, key: &str) -> Option<String> {
        lock(&self.navigation).params.get(key).cloned()
    }

    pub(crate) fn set_navigation(&self, tab: TabId, params: Params) {
        let mut navigation = lock(&self.navigation);
        navigation.current_tab = Some(tab);
        navigation.params = params;
    }

    /// Start a new load of `tab`, superseding any load still in flight.
    pub fn begin_load(&self, tab: TabId) -> LoadTicket {
        let mut generations = lock(&self.generations);
        generations[tab.index()] += 1;
        LoadTicket {
            tab,
            generation: generations[tab.index()],
        }
    }

    pub fn is_latest(&self, ticket: &LoadTicket) -> bool {
        lock(&self.generations)[ticket.tab.index()] == ticket.generation
    }

    /// Commit a state update made during a load, if it is still the latest.
    pub fn commit<F>(&self, ticket: &LoadTicket, update: F) -> bool
    where
        F: FnOnce(&mut AppState),
    {
        if !self.is_latest(ticket) {
            return false;
        }
        update(&mut lock(&self.state));
        true
    }

    /// Finish a load: apply `update` and write `fragment`, or drop both when
    /// a newer load of the same tab has started.
    pub fn complete<F>(
        &self,
        ticket: &LoadTicket,
        update: F,
        fragment: Fragment,
        outcome: LoadOutcome,
    ) -> LoadOutcome
    where
        F: FnOnce(&mut AppState),
    {
        if !self.is_latest(ticket) {
            debug!(tab = %ticket.tab, generation = ticket.generation, "discarding superseded load");
            return LoadOutcome::Superseded;
        }
        update(&mut lock(&self.state));
        self.regions.write(ticket.tab, fragment);
        outcome
    }

    /// Finish a load with an error fragment. State is left untouched.
    pub fn fail(&self, ticket: &LoadTicket, view: &ViewSpec, message: String) -> LoadOutcome {
        if !self.is_latest(ticket) {
            debug!(
                tab = %ticket.tab,
                generation = ticket.generation,
                error = %message,
                "discarding superseded failure"
            );
            return LoadOutcome::Superseded;
        }
        warn!(tab = %ticket.tab, error = %message, "{}", view.failure_title);
        self.complete(
            ticket,
            |_| {},
            render::error(view.failure_title, &message),
            LoadOutcome::Failed { message },
        )
    }

    pub fn fail_fetch(&self, ticket: &LoadTicket, view: &ViewSpec, err: &FetchError) -> LoadOutcome {
        self.fail(ticket, view, err.message())
    }

    /// Run the registered loader for `tab` as a task. The loading fragment is
    /// written before this returns.
    pub fn spawn_load(self: &Arc<Self>, tab: TabId) -> JoinHandle<LoadOutcome> {
        let view = registry::view(tab);
        let ticket = self.begin_load(tab);
        self.regions.write(tab, render::loading(view.loading_message));
        debug!(%tab, generation = ticket.generation, "load started");
        tokio::spawn((view.loader)(Arc::clone(self), ticket))
    }

    /// Reload whatever tab is current right now.
    pub fn reload_current(self: &Arc<Self>) -> Option<JoinHandle<LoadOutcome>> {
        let tab = self.current_tab()?;
        Some(self.spawn_load(tab))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
