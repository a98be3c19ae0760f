use arboard::Clipboard;

/// The system clipboard, opened on first use.
///
/// The handle stays open for the session: on X11 the copied text is only
/// served while the handle that set it is alive.
#[derive(Default)]
pub struct MessageClipboard {
    inner: Option<Clipboard>,
}

impl MessageClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the clipboard contents with `text`
    pub fn copy(&mut self, text: &str) -> Result<(), String> {
        let clipboard = match self.inner.take() {
            Some(clipboard) => clipboard,
            None => Clipboard::new().map_err(|e| format!("Clipboard context error: {}", e))?,
        };
        let clipboard = self.inner.insert(clipboard);

        clipboard
            .set_text(text.to_owned())
            .map_err(|e| format!("Clipboard error: {}", e))
    }
}
