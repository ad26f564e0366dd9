//! The system clipboard behind the `+` and `*` registers.

use tracing::debug;

use crate::traits::Clipboard;

/// [`Clipboard`] backed by the operating system through `arboard`.
///
/// Clipboard access is best effort: a headless session or a denied request
/// reads as an empty register and drops writes.
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    /// `None` when no clipboard is reachable.
    pub fn new() -> Option<Self> {
        match arboard::Clipboard::new() {
            Ok(inner) => Some(Self { inner }),
            Err(err) => {
                debug!(%err, "system clipboard unavailable");
                None
            }
        }
    }
}

impl Clipboard for SystemClipboard {
    fn get(&mut self) -> Option<String> {
        self.inner
            .get_text()
            .map_err(|err| debug!(%err, "clipboard read failed"))
            .ok()
    }

    fn set(&mut self, text: String) {
        if let Err(err) = self.inner.set_text(text) {
            debug!(%err, "clipboard write failed");
        }
    }
}
