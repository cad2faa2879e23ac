//! Dashboard collaborator seam and the add-to-dashboard workflow state.

use color_eyre::Result;

/// Outcome of the dashboard capability check. An explicit discriminant:
/// either static charts can be added, they cannot, or loading the
/// dashboard app failed with a description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddChartSupport {
    Supported,
    Unsupported,
    Error(String),
}

/// External dashboard integration. Both calls may block; the host drives
/// them through its event loop and surfaces every outcome in the UI.
pub trait DashboardSource {
    /// Whether the dashboard app can accept a static chart right now.
    fn can_add_chart(&self) -> Result<AddChartSupport>;

    /// Add the generated code as a chart. Called at most once per attempt,
    /// only after a Supported capability check.
    fn add_chart(&self, code: &str) -> Result<()>;
}

/// Add-to-dashboard attempt state. Every failure is terminal for the
/// attempt; a new user action starts over from Idle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DashboardAddState {
    #[default]
    Idle,
    InProgress,
    Redirecting,
}

impl DashboardAddState {
    pub fn in_progress(self) -> bool {
        self == Self::InProgress
    }

    /// Button label; shows the preparing message while a check runs.
    pub fn label(self) -> &'static str {
        match self {
            Self::InProgress => "Preparing dashboard app, this may take a while",
            _ => "Add to Dashboard",
        }
    }
}

/// Modal copy for the Unsupported outcome.
pub const UNSUPPORTED_TITLE: &str =
    "Your dashboard app does not support adding of static charts";
pub const UNSUPPORTED_CONTENT: &str = "Please use static dashboard template";

/// Modal copy for the Error outcome. Acknowledging navigates to the
/// dashboard anyway.
pub const LOAD_ERROR_TITLE: &str = "There is an error loading your dashboard app";
pub const LOAD_ERROR_OK: &str = "Fix";
