//! vtdash-tui: the view-refresh controller for the VTAdmin dashboard and its
//! terminal host.
//!
//! Layering, leaf first:
//! - `markup` / `render`: pure data-to-fragment mapping
//! - `join`: client-side joins between API collections
//! - `surface` / `state` / `context`: regions, application state, load tickets
//! - `registry` / `loaders`: one loader per tab
//! - `history` / `navigation`: address encoding and tab selection
//! - `refresh`: auto-refresh timer
//! - `terminal`: key mapping and repainting for the `vtdash` binary

pub mod context;
pub mod history;
pub mod join;
pub mod loaders;
pub mod markup;
pub mod navigation;
pub mod refresh;
pub mod registry;
pub mod render;
pub mod state;
pub mod surface;
pub mod terminal;

pub use context::{LoadOutcome, LoadTicket, ViewContext};
pub use markup::Fragment;
pub use navigation::NavigationController;
pub use refresh::RefreshScheduler;
pub use state::AppState;

/// Stable crate label used for bootstrap smoke tests.
pub fn crate_label() -> &'static str {
    "vtdash-tui"
}
