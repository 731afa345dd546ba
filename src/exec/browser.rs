// src/exec/browser.rs

//! Opening URLs of long-lived tasks (the demo server) for `--open`.

use std::fmt::Debug;

use anyhow::{Context, Result};
use tracing::debug;

/// Something that can show a URL to the user.
pub trait UrlOpener: Send + Sync + Debug {
    fn open(&self, url: &str) -> Result<()>;
}

/// Opens URLs with the platform's default browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

impl UrlOpener for SystemOpener {
    fn open(&self, url: &str) -> Result<()> {
        debug!(%url, "opening in default browser");
        open::that_detached(url).with_context(|| format!("opening {url} in a browser"))
    }
}
