//! Non-blocking notifications and the blocking error dialog.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Success,
    Error,
}

/// A transient, non-blocking message shown in the status line. It never
/// interrupts interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotifyLevel,
    pub message: String,
    pub description: Option<String>,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotifyLevel::Success,
            message: message.into(),
            description: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotifyLevel::Error,
            message: message.into(),
            description: None,
        }
    }

    pub fn error_with(message: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NotifyLevel::Error,
            message: message.into(),
            description: Some(description.into()),
        }
    }
}

/// Blocking error dialog. While active it captures input; acknowledging
/// may navigate (the dashboard load-error flow navigates to the dashboard
/// even on failure).
#[derive(Debug, Default)]
pub struct ErrorModal {
    pub active: bool,
    pub title: String,
    pub content: String,
    pub ok_label: String,
    pub navigate_on_ok: Option<String>,
}

impl ErrorModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
        ok_label: impl Into<String>,
        navigate_on_ok: Option<String>,
    ) {
        self.active = true;
        self.title = title.into();
        self.content = content.into();
        self.ok_label = ok_label.into();
        self.navigate_on_ok = navigate_on_ok;
    }

    /// Acknowledge the dialog. Returns the navigation target, if any.
    pub fn acknowledge(&mut self) -> Option<String> {
        self.active = false;
        self.navigate_on_ok.take()
    }

    /// Dismiss without acknowledging.
    pub fn close(&mut self) {
        self.active = false;
        self.navigate_on_ok = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acknowledge_returns_navigation_target() {
        let mut modal = ErrorModal::new();
        modal.open("title", "content", "Fix", Some("/dashboard".to_string()));
        assert!(modal.active);
        assert_eq!(modal.acknowledge().as_deref(), Some("/dashboard"));
        assert!(!modal.active);
    }

    #[test]
    fn close_discards_navigation() {
        let mut modal = ErrorModal::new();
        modal.open("title", "content", "OK", Some("/dashboard".to_string()));
        modal.close();
        assert!(!modal.active);
        assert_eq!(modal.acknowledge(), None);
    }

    #[test]
    fn notification_constructors() {
        let ok = Notification::success("Copied to clipboard");
        assert_eq!(ok.level, NotifyLevel::Success);
        assert!(ok.description.is_none());
        let err = Notification::error_with("Can't copy to clipboard", "denied");
        assert_eq!(err.level, NotifyLevel::Error);
        assert_eq!(err.description.as_deref(), Some("denied"));
    }
}
