//! Per-tab content regions.
//!
//! Each tab owns exactly one region. Regions only receive whole fragments
//! and at most one region carries the active marker. Every change bumps a
//! version published on a watch channel so a host can repaint.

use std::sync::{Mutex, MutexGuard};

use tokio::sync::watch;
use vtdash_core::TabId;

use crate::markup::Fragment;

#[derive(Debug)]
struct Inner {
    fragments: Vec<Fragment>,
    writes: Vec<u64>,
    active: Option<TabId>,
    version: u64,
}

#[derive(Debug)]
pub struct Regions {
    inner: Mutex<Inner>,
    changes: watch::Sender<u64>,
}

impl Default for Regions {
    fn default() -> Self {
        Self::new()
    }
}

impl Regions {
    #[must_use]
    pub fn new() -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            inner: Mutex::new(Inner {
                fragments: vec![Fragment::default(); TabId::ORDER.len()],
                writes: vec![0; TabId::ORDER.len()],
                active: None,
                version: 0,
            }),
            changes,
        }
    }

    /// Replace the whole content of `tab`'s region.
    pub fn write(&self, tab: TabId, fragment: Fragment) {
        let version = {
            let mut inner = lock(&self.inner);
            inner.fragments[tab.index()] = fragment;
            inner.writes[tab.index()] += 1;
            inner.version += 1;
            inner.version
        };
        self.changes.send_replace(version);
    }

    /// Move the active marker (tab and region) to `tab`.
    pub fn mark_active(&self, tab: TabId) {
        let version = {
            let mut inner = lock(&self.inner);
            inner.active = Some(tab);
            inner.version += 1;
            inner.version
        };
        self.changes.send_replace(version);
    }

    #[must_use]
    pub fn fragment(&self, tab: TabId) -> Fragment {
        lock(&self.inner).fragments[tab.index()].clone()
    }

    /// Number of fragments written into `tab`'s region so far.
    #[must_use]
    pub fn write_count(&self, tab: TabId) -> u64 {
        lock(&self.inner).writes[tab.index()]
    }

    #[must_use]
    pub fn active(&self) -> Option<TabId> {
        lock(&self.inner).active
    }

    #[must_use]
    pub fn is_active(&self, tab: TabId) -> bool {
        self.active() == Some(tab)
    }

    /// Tabs currently carrying the active marker; at most one.
    #[must_use]
    pub fn active_tabs(&self) -> Vec<TabId> {
        let active = self.active();
        TabId::ORDER
            .into_iter()
            .filter(|tab| Some(*tab) == active)
            .collect()
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        lock(&self.inner).version
    }

    /// Receiver that observes the version after every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
