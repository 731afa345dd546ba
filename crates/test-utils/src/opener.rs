use std::sync::{Arc, Mutex};

use anyhow::{Result, bail};
use releasedag::exec::UrlOpener;

/// A `UrlOpener` that remembers every URL instead of starting a browser.
#[derive(Debug, Clone, Default)]
pub struct RecordingOpener {
    opened: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl RecordingOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// An opener that records the URL and then reports an error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl UrlOpener for RecordingOpener {
    fn open(&self, url: &str) -> Result<()> {
        self.opened.lock().unwrap().push(url.to_string());
        if self.fail {
            bail!("no browser available");
        }
        Ok(())
    }
}
