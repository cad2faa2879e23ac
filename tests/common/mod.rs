use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chartui::clip::ClipboardAccess;
use chartui::{App, AppEvent};
use color_eyre::eyre::eyre;
use color_eyre::Result;

/// Write a query file into the given directory and return its path.
pub fn write_query_file(dir: &std::path::Path, content: &str) -> PathBuf {
    let path = dir.join("query.json");
    let mut file = File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

/// Feed an event and all of its follow-ups through the app.
pub fn drain(app: &mut App, first: AppEvent) {
    let mut next = app.event(&first);
    while let Some(event) = next {
        next = app.event(&event);
    }
}

/// Clipboard test double that counts write attempts.
pub struct CountingClipboard {
    available: bool,
    writes: Arc<AtomicUsize>,
    last_text: Arc<Mutex<Option<String>>>,
}

impl CountingClipboard {
    pub fn new(available: bool) -> (Self, Arc<AtomicUsize>, Arc<Mutex<Option<String>>>) {
        let writes = Arc::new(AtomicUsize::new(0));
        let last_text = Arc::new(Mutex::new(None));
        (
            Self {
                available,
                writes: writes.clone(),
                last_text: last_text.clone(),
            },
            writes,
            last_text,
        )
    }
}

impl ClipboardAccess for CountingClipboard {
    fn available(&self) -> bool {
        self.available
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if !self.available {
            return Err(eyre!("clipboard unavailable"));
        }
        *self.last_text.lock().unwrap() = Some(text.to_string());
        Ok(())
    }
}
