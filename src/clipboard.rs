use anyhow::{Context, Result};
use arboard::Clipboard;

pub(crate) trait ClipboardSource {
    fn read_text(&mut self) -> Result<String>;
}

/// The desktop clipboard, opened on first use.
#[derive(Default)]
pub(crate) struct SystemClipboard {
    inner: Option<Clipboard>,
}

impl ClipboardSource for SystemClipboard {
    fn read_text(&mut self) -> Result<String> {
        let clipboard = match self.inner.take() {
            Some(clipboard) => clipboard,
            None => Clipboard::new().context("open clipboard")?,
        };
        self.inner
            .insert(clipboard)
            .get_text()
            .context("read clipboard text")
    }
}
