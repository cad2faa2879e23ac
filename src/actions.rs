//! Structured log of playground user actions.

/// Record a user action.
pub fn playground_action(name: &str) {
    tracing::info!(target: "playground", action = name);
}

/// Record a user action with a detail value (selected framework,
/// library, and so on).
pub fn playground_action_detail(name: &str, detail: &str) {
    tracing::info!(target: "playground", action = name, detail = detail);
}
