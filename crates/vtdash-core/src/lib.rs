//! vtdash-core: tab identifiers, VTAdmin payload models, and configuration
//! shared by the vtdash crates.

pub mod config;
pub mod models;
pub mod tab;

pub use tab::TabId;

/// Crate identity label used by bootstrap smoke tests.
pub fn crate_label() -> &'static str {
    "vtdash-core"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_label_is_stable() {
        assert_eq!(crate_label(), "vtdash-core");
    }

    #[test]
    fn modules_are_accessible() {
        let _ = TabId::Clusters;
        let _ = config::Config::default();
        let _ = models::TabletType::Primary;
    }
}
