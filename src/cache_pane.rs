//! Cache-inspection collaborator seam and cache pane state.

use color_eyre::Result;
use serde_json::Value;

/// What the cache pane shows for the current query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheReport {
    pub cache_key: String,
    pub hit: bool,
    /// Pre-aggregation backing the query, when one matches.
    pub pre_aggregation: Option<String>,
    /// Age of the cached entry, when it is a hit.
    pub age_seconds: Option<i64>,
}

/// External cache inspector. The panel only displays the report; it holds
/// no caching logic of its own.
pub trait CacheSource {
    fn inspect(&self, query: &Value) -> Result<CacheReport>;
}

/// Cache pane fetch state, refreshed each time the tab activates.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum CachePaneState {
    #[default]
    Idle,
    Loaded(CacheReport),
    Failed(String),
}
