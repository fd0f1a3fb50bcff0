//! Declarative view registry: one entry per tab naming its loader, primary
//! endpoint and user-facing messages. Regions are addressed by the same
//! `TabId`, so the entry also identifies the region a loader writes.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use vtdash_client::client::{
    CLUSTERS_ENDPOINT, KEYSPACES_ENDPOINT, SCHEMAS_ENDPOINT, TABLETS_ENDPOINT,
};
use vtdash_core::TabId;

use crate::context::{LoadOutcome, LoadTicket, ViewContext};
use crate::loaders;

pub type LoadFuture = Pin<Box<dyn Future<Output = LoadOutcome> + Send>>;

pub type Loader = fn(Arc<ViewContext>, LoadTicket) -> LoadFuture;

#[derive(Debug)]
pub struct ViewSpec {
    pub tab: TabId,
    pub endpoint: &'static str,
    pub loading_message: &'static str,
    pub failure_title: &'static str,
    pub empty_title: &'static str,
    pub empty_message: &'static str,
    pub loader: Loader,
}

static VIEWS: [ViewSpec; 5] = [
    ViewSpec {
        tab: TabId::Clusters,
        endpoint: CLUSTERS_ENDPOINT,
        loading_message: "Loading cluster information...",
        failure_title: "Failed to load clusters",
        empty_title: "No clusters found",
        empty_message: "No Vitess clusters are currently configured.",
        loader: loaders::clusters,
    },
    ViewSpec {
        tab: TabId::Keyspaces,
        endpoint: KEYSPACES_ENDPOINT,
        loading_message: "Loading keyspaces...",
        failure_title: "Failed to load keyspaces",
        empty_title: "No keyspaces found",
        empty_message: "No keyspaces are currently configured in the cluster.",
        loader: loaders::keyspaces,
    },
    ViewSpec {
        tab: TabId::Tablets,
        endpoint: TABLETS_ENDPOINT,
        loading_message: "Loading tablets...",
        failure_title: "Failed to load tablets",
        empty_title: "No tablets found",
        empty_message: "No tablets are currently running in the cluster.",
        loader: loaders::tablets,
    },
    ViewSpec {
        tab: TabId::Schemas,
        endpoint: SCHEMAS_ENDPOINT,
        loading_message: "Loading schemas...",
        failure_title: "Failed to load schemas",
        empty_title: "No schemas found",
        empty_message: "Schema information is not available or no tables are defined.",
        loader: loaders::schemas,
    },
    ViewSpec {
        tab: TabId::VSchema,
        endpoint: "/vschema/{cluster}/{keyspace}",
        loading_message: "Loading VSchema...",
        failure_title: "Failed to load VSchema",
        empty_title: "No keyspaces found",
        empty_message: "A VSchema needs a keyspace; none are currently configured.",
        loader: loaders::vschema,
    },
];

#[must_use]
pub fn view(tab: TabId) -> &'static ViewSpec {
    &VIEWS[tab.index()]
}

#[must_use]
pub fn views() -> &'static [ViewSpec] {
    &VIEWS
}
