//! Per-view loaders.
//!
//! A loader fetches its view's data, renders it and writes the region
//! through the context. It is the only place fetch errors are handled:
//! every error ends as an error fragment and the region is never left in
//! the loading state. Related collections used for client-side joins
//! degrade to empty when they cannot be fetched.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;
use vtdash_client::client::{
    vschema_endpoint, CLUSTERS_ENDPOINT, KEYSPACES_ENDPOINT, SCHEMAS_ENDPOINT, TABLETS_ENDPOINT,
};
use vtdash_client::{decode_payload, FetchError};
use vtdash_core::models::{
    ClustersPayload, KeyspaceEntry, KeyspacesPayload, SchemasPayload, TabletEntry, TabletsPayload,
};
use vtdash_core::TabId;

use crate::context::{LoadOutcome, LoadTicket, ViewContext};
use crate::join::{cluster_details, group_by_keyspace, keyspace_details};
use crate::registry::{self, LoadFuture, ViewSpec};
use crate::render;
use crate::state::{AppState, VSchemaSelection};

/// Extra parameter selecting the VSchema keyspace as `<cluster>/<keyspace>`.
pub const KEYSPACE_PARAM: &str = "keyspace";

pub fn clusters(ctx: Arc<ViewContext>, ticket: LoadTicket) -> LoadFuture {
    Box::pin(load_clusters(ctx, ticket))
}

pub fn keyspaces(ctx: Arc<ViewContext>, ticket: LoadTicket) -> LoadFuture {
    Box::pin(load_keyspaces(ctx, ticket))
}

pub fn tablets(ctx: Arc<ViewContext>, ticket: LoadTicket) -> LoadFuture {
    Box::pin(load_tablets(ctx, ticket))
}

pub fn schemas(ctx: Arc<ViewContext>, ticket: LoadTicket) -> LoadFuture {
    Box::pin(load_schemas(ctx, ticket))
}

pub fn vschema(ctx: Arc<ViewContext>, ticket: LoadTicket) -> LoadFuture {
    Box::pin(load_vschema(ctx, ticket))
}

/// Wrap a bare array under `key` so both payload conventions decode the
/// same way.
fn keyed_collection(value: Value, key: &str) -> Value {
    match value {
        Value::Array(items) => {
            let mut map = Map::new();
            map.insert(key.to_string(), Value::Array(items));
            Value::Object(map)
        }
        other => other,
    }
}

async fn fetch_collection<T: DeserializeOwned>(
    ctx: &ViewContext,
    endpoint: &str,
    key: &str,
) -> Result<T, FetchError> {
    let value = ctx.client().fetch(endpoint).await?;
    decode_payload(keyed_collection(value, key))
}

async fn fetch_keyspaces(ctx: &ViewContext) -> Result<Vec<KeyspaceEntry>, FetchError> {
    fetch_collection::<KeyspacesPayload>(ctx, KEYSPACES_ENDPOINT, "keyspaces")
        .await
        .map(|payload| payload.keyspaces)
}

async fn fetch_tablets(ctx: &ViewContext) -> Result<Vec<TabletEntry>, FetchError> {
    fetch_collection::<TabletsPayload>(ctx, TABLETS_ENDPOINT, "tablets")
        .await
        .map(|payload| payload.tablets)
}

/// A related collection for a join; failures count as empty.
fn related<T>(tab: TabId, endpoint: &str, result: Result<Vec<T>, FetchError>) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(err) => {
            warn!(%tab, endpoint, error = %err, "related collection unavailable, joining as empty");
            Vec::new()
        }
    }
}

fn finish_empty<F>(ctx: &ViewContext, ticket: &LoadTicket, view: &ViewSpec, update: F) -> LoadOutcome
where
    F: FnOnce(&mut AppState),
{
    ctx.complete(
        ticket,
        update,
        render::empty(view.empty_title, view.empty_message),
        LoadOutcome::Empty,
    )
}

async fn load_clusters(ctx: Arc<ViewContext>, ticket: LoadTicket) -> LoadOutcome {
    let view = registry::view(TabId::Clusters);
    let fetched = fetch_collection::<ClustersPayload>(&ctx, CLUSTERS_ENDPOINT, "clusters").await;
    let clusters = match fetched {
        Ok(payload) => payload.clusters,
        Err(err) => return ctx.fail_fetch(&ticket, view, &err),
    };
    if clusters.is_empty() {
        return finish_empty(&ctx, &ticket, view, |state| state.clusters.clear());
    }

    let (keyspaces, tablets) = tokio::join!(fetch_keyspaces(&ctx), fetch_tablets(&ctx));
    let keyspaces = related(TabId::Clusters, KEYSPACES_ENDPOINT, keyspaces);
    let tablets = related(TabId::Clusters, TABLETS_ENDPOINT, tablets);

    let fragment = render::clusters(&cluster_details(&clusters, &keyspaces, &tablets));
    ctx.complete(
        &ticket,
        |state| state.clusters = clusters,
        fragment,
        LoadOutcome::Rendered,
    )
}

async fn load_keyspaces(ctx: Arc<ViewContext>, ticket: LoadTicket) -> LoadOutcome {
    let view = registry::view(TabId::Keyspaces);
    let keyspaces = match fetch_keyspaces(&ctx).await {
        Ok(keyspaces) => keyspaces,
        Err(err) => return ctx.fail_fetch(&ticket, view, &err),
    };
    if keyspaces.is_empty() {
        return finish_empty(&ctx, &ticket, view, |state| state.keyspaces.clear());
    }

    let tablets = related(TabId::Keyspaces, TABLETS_ENDPOINT, fetch_tablets(&ctx).await);
    let fragment = render::keyspaces(&keyspace_details(&keyspaces, &tablets));
    ctx.complete(
        &ticket,
        |state| state.keyspaces = keyspaces,
        fragment,
        LoadOutcome::Rendered,
    )
}

async fn load_tablets(ctx: Arc<ViewContext>, ticket: LoadTicket) -> LoadOutcome {
    let view = registry::view(TabId::Tablets);
    let tablets = match fetch_tablets(&ctx).await {
        Ok(tablets) => tablets,
        Err(err) => return ctx.fail_fetch(&ticket, view, &err),
    };
    if tablets.is_empty() {
        return finish_empty(&ctx, &ticket, view, |state| state.tablets.clear());
    }

    let fragment = render::tablets(&group_by_keyspace(&tablets));
    ctx.complete(
        &ticket,
        |state| state.tablets = tablets,
        fragment,
        LoadOutcome::Rendered,
    )
}

async fn load_schemas(ctx: Arc<ViewContext>, ticket: LoadTicket) -> LoadOutcome {
    let view = registry::view(TabId::Schemas);
    let fetched = fetch_collection::<SchemasPayload>(&ctx, SCHEMAS_ENDPOINT, "schemas").await;
    let schemas = match fetched {
        Ok(payload) => payload.schemas,
        Err(err) => return ctx.fail_fetch(&ticket, view, &err),
    };
    if schemas.is_empty() {
        return finish_empty(&ctx, &ticket, view, |state| state.schemas.clear());
    }

    let fragment = render::schemas(&schemas);
    ctx.complete(
        &ticket,
        |state| state.schemas = schemas,
        fragment,
        LoadOutcome::Rendered,
    )
}

/// Split `<cluster>/<keyspace>`; both halves must be non-empty.
#[must_use]
pub fn parse_selector(selector: &str) -> Option<(&str, &str)> {
    let (cluster, keyspace) = selector.split_once('/')?;
    let (cluster, keyspace) = (cluster.trim(), keyspace.trim());
    (!cluster.is_empty() && !keyspace.is_empty() && !keyspace.contains('/'))
        .then_some((cluster, keyspace))
}

async fn load_vschema(ctx: Arc<ViewContext>, ticket: LoadTicket) -> LoadOutcome {
    let view = registry::view(TabId::VSchema);
    let requested = ctx.param(KEYSPACE_PARAM);

    let known = ctx.state().keyspaces;
    let keyspaces = if !known.is_empty() {
        known
    } else {
        match fetch_keyspaces(&ctx).await {
            Ok(fetched) => {
                let committed = fetched.clone();
                ctx.commit(&ticket, |state| state.keyspaces = committed);
                fetched
            }
            // An explicit selection does not need the keyspace list.
            Err(err) if requested.is_some() => {
                warn!(tab = %TabId::VSchema, error = %err, "keyspace list unavailable");
                Vec::new()
            }
            Err(err) => return ctx.fail_fetch(&ticket, view, &err),
        }
    };
    let choices: Vec<String> = keyspaces.iter().map(KeyspaceEntry::selector).collect();

    let selector = match requested.or_else(|| choices.first().cloned()) {
        Some(selector) => selector,
        None => return finish_empty(&ctx, &ticket, view, |state| state.vschema = None),
    };
    let Some((cluster_id, keyspace)) = parse_selector(&selector) else {
        return ctx.fail(
            &ticket,
            view,
            format!("invalid keyspace selector {selector:?}, expected <cluster>/<keyspace>"),
        );
    };

    let document = match ctx.client().fetch(&vschema_endpoint(cluster_id, keyspace)).await {
        Ok(document) => document,
        Err(err) => return ctx.fail_fetch(&ticket, view, &err),
    };

    let fragment = render::vschema(keyspace, &selector, &choices, &document);
    let selection = VSchemaSelection {
        selector: selector.clone(),
        document,
    };
    ctx.complete(
        &ticket,
        |state| state.vschema = Some(selection),
        fragment,
        LoadOutcome::Rendered,
    )
}
