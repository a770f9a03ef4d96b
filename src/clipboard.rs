use crate::host::Clipboard;
use anyhow::{Context, Result};

/// OS clipboard. The `arboard` handle is opened lazily and kept for the
/// session; some platforms drop clipboard contents when it is released.
#[derive(Default)]
pub struct SystemClipboard {
    handle: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        if self.handle.is_none() {
            self.handle = Some(arboard::Clipboard::new().context("Failed to open system clipboard")?);
        }
        let handle = self.handle.as_mut().context("System clipboard unavailable")?;
        handle.set_text(text.to_string()).context("Failed to write clipboard text")
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    pub contents: Option<String>,
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}
