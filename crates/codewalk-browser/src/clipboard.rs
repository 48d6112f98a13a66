//! Browser clipboard implementation.
//!
//! Uses the async Clipboard API, which needs a secure context and usually a
//! user gesture.

use codewalk_core::{Clipboard, ClipboardError};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::Window;

#[derive(Clone)]
pub struct BrowserClipboard {
    window: Window,
}

impl BrowserClipboard {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl Clipboard for BrowserClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let clipboard = self.window.navigator().clipboard();
        // Missing outside secure contexts.
        if JsValue::is_undefined(&clipboard) {
            return Err(ClipboardError::Unavailable);
        }

        JsFuture::from(clipboard.write_text(text))
            .await
            .map(|_| ())
            .map_err(|e| ClipboardError::Rejected(format!("{e:?}")))?;
        tracing::debug!("Wrote {} bytes to clipboard", text.len());
        Ok(())
    }
}
