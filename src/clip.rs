//! Copy-to-clipboard action with capability probing.

use arboard::Clipboard;
use color_eyre::eyre::eyre;
use color_eyre::Result;

use crate::notify::Notification;

/// Clipboard seam. The system implementation probes for a clipboard on
/// every use; tests substitute a mock.
pub trait ClipboardAccess {
    fn available(&self) -> bool;
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// The real system clipboard via arboard.
#[derive(Default)]
pub struct SystemClipboard;

impl ClipboardAccess for SystemClipboard {
    fn available(&self) -> bool {
        Clipboard::new().is_ok()
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        let mut clipboard = Clipboard::new().map_err(|e| eyre!(e.to_string()))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| eyre!(e.to_string()))
    }
}

/// Copy text to the clipboard and report the outcome as a non-blocking
/// notification. A missing clipboard produces zero write attempts.
pub fn copy_to_clipboard(clipboard: &mut dyn ClipboardAccess, text: &str) -> Notification {
    if !clipboard.available() {
        return Notification::error("Clipboard is not available on this system");
    }
    match clipboard.write_text(text) {
        Ok(()) => Notification::success("Copied to clipboard"),
        Err(e) => Notification::error_with("Can't copy to clipboard", e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotifyLevel;

    struct MockClipboard {
        available: bool,
        fail_write: bool,
        writes: usize,
    }

    impl MockClipboard {
        fn new(available: bool, fail_write: bool) -> Self {
            Self {
                available,
                fail_write,
                writes: 0,
            }
        }
    }

    impl ClipboardAccess for MockClipboard {
        fn available(&self) -> bool {
            self.available
        }

        fn write_text(&mut self, _text: &str) -> Result<()> {
            self.writes += 1;
            if self.fail_write {
                Err(eyre!("denied"))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn missing_clipboard_makes_no_write_attempt() {
        let mut clipboard = MockClipboard::new(false, false);
        let note = copy_to_clipboard(&mut clipboard, "payload");
        assert_eq!(clipboard.writes, 0);
        assert_eq!(note.level, NotifyLevel::Error);
    }

    #[test]
    fn successful_write_notifies_success() {
        let mut clipboard = MockClipboard::new(true, false);
        let note = copy_to_clipboard(&mut clipboard, "payload");
        assert_eq!(clipboard.writes, 1);
        assert_eq!(note.level, NotifyLevel::Success);
        assert_eq!(note.message, "Copied to clipboard");
    }

    #[test]
    fn failed_write_includes_detail() {
        let mut clipboard = MockClipboard::new(true, true);
        let note = copy_to_clipboard(&mut clipboard, "payload");
        assert_eq!(clipboard.writes, 1);
        assert_eq!(note.level, NotifyLevel::Error);
        assert_eq!(note.description.as_deref(), Some("denied"));
    }
}
