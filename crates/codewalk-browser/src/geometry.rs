//! Live note geometry read from the DOM.

use codewalk_core::GeometryProvider;
use codewalk_core::view::NOTE_INDEX_ATTRIBUTE;
use wasm_bindgen::JsCast;
use web_sys::{Element, Window};

/// Reads note positions under a widget root.
///
/// Notes are found by their index attribute, in document order, which is
/// catalog order for markup produced by the view.
#[derive(Clone)]
pub struct DomGeometry {
    window: Window,
    root: Element,
}

impl DomGeometry {
    pub fn new(window: Window, root: Element) -> Self {
        Self { window, root }
    }

    fn notes(&self) -> Vec<Element> {
        let selector = format!("[{NOTE_INDEX_ATTRIBUTE}]");
        let Ok(nodes) = self.root.query_selector_all(&selector) else {
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }
}

impl GeometryProvider for DomGeometry {
    fn viewport_height(&self) -> Option<f64> {
        self.window.inner_height().ok()?.as_f64()
    }

    fn note_tops(&self) -> Vec<f64> {
        self.notes()
            .iter()
            .map(|note| note.get_bounding_client_rect().top())
            .collect()
    }
}
