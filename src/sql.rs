//! Compiled-SQL collaborator seam and SQL pane state.

use color_eyre::Result;
use serde_json::Value;
use sqlformat::{Dialect, FormatOptions, Indent, QueryParams};

/// Backend that compiles a query to SQL text. May return several parallel
/// statements for comparison-style queries; the panel displays the first.
pub trait SqlSource {
    fn sql(&self, query: &Value) -> Result<Vec<String>>;
}

/// SQL pane fetch state. Loading doubles as the in-flight guard: the pane
/// never issues a second fetch while one is pending.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum SqlPaneState {
    #[default]
    Idle,
    Loading,
    Loaded(String),
    Failed(String),
}

impl SqlPaneState {
    /// Whether activating the SQL pane should start a fetch.
    pub fn needs_fetch(&self) -> bool {
        matches!(self, Self::Idle | Self::Failed(_))
    }
}

/// First statement of a compiled-SQL result. Comparison queries yield
/// parallel SQL with identical text, so the first stands for all.
pub fn first_sql(mut statements: Vec<String>) -> Option<String> {
    if statements.is_empty() {
        None
    } else {
        Some(statements.swap_remove(0))
    }
}

/// Format SQL for display.
pub fn format_sql(sql: &str) -> String {
    let options = FormatOptions {
        indent: Indent::Spaces(2),
        uppercase: Some(true),
        lines_between_queries: 1,
        ignore_case_convert: None,
        inline: false,
        max_inline_block: 50,
        max_inline_arguments: None,
        max_inline_top_level: None,
        joins_as_top_level: false,
        dialect: Dialect::Generic,
    };
    sqlformat::format(sql, &QueryParams::None, &options)
}
