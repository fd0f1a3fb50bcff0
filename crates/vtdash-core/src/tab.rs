//! Closed set of dashboard tabs.

use std::fmt;
use std::str::FromStr;

/// A dashboard tab. Each tab owns exactly one content region and one loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TabId {
    Clusters,
    Keyspaces,
    Tablets,
    Schemas,
    VSchema,
}

impl TabId {
    pub const ORDER: [TabId; 5] = [
        TabId::Clusters,
        TabId::Keyspaces,
        TabId::Tablets,
        TabId::Schemas,
        TabId::VSchema,
    ];

    /// Tab shown when the address carries no usable `tab` value.
    pub const DEFAULT: TabId = TabId::Clusters;

    /// Identifier used in the `tab` query parameter and as the region id.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Clusters => "clusters",
            Self::Keyspaces => "keyspaces",
            Self::Tablets => "tablets",
            Self::Schemas => "schemas",
            Self::VSchema => "vschema",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Clusters => "Clusters",
            Self::Keyspaces => "Keyspaces",
            Self::Tablets => "Tablets",
            Self::Schemas => "Schemas",
            Self::VSchema => "VSchema",
        }
    }

    /// Parse a query value; unknown identifiers yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ORDER.into_iter().find(|tab| tab.as_str() == value)
    }

    /// Position in the tab strip, starting at zero.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Clusters => 0,
            Self::Keyspaces => 1,
            Self::Tablets => 2,
            Self::Schemas => 3,
            Self::VSchema => 4,
        }
    }

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ORDER.get(index).copied()
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    #[must_use]
    pub fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tab {0:?}")]
pub struct UnknownTab(pub String);

impl FromStr for TabId {
    type Err = UnknownTab;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownTab(s.to_string()))
    }
}
