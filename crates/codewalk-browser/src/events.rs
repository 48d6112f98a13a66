//! DOM event subscriptions for the widget.
//!
//! Listeners are `gloo-events` guards: dropping one removes it.

use std::rc::Rc;

use codewalk_core::view::COPY_ATTRIBUTE;
use gloo_events::{EventListener, EventListenerOptions};
use wasm_bindgen::JsCast;
use web_sys::{Element, Window};

/// Scroll and resize listeners on the window.
pub struct ViewportListeners {
    _scroll: EventListener,
    _resize: EventListener,
}

/// Call `on_change` on every scroll (of the page or any scroll container)
/// and every resize. Both listeners are passive.
pub fn on_viewport_change(window: &Window, on_change: impl Fn() + 'static) -> ViewportListeners {
    let on_change = Rc::new(on_change);

    // Scroll does not bubble; capturing on the window sees nested scrollers too.
    let scroll = {
        let on_change = Rc::clone(&on_change);
        EventListener::new_with_options(
            window,
            "scroll",
            EventListenerOptions::run_in_capture_phase(),
            move |_| on_change(),
        )
    };
    let resize = EventListener::new(window, "resize", move |_| on_change());

    ViewportListeners {
        _scroll: scroll,
        _resize: resize,
    }
}

/// Call `on_copy` when a copy button under `root` is clicked.
pub fn on_copy_click(root: &Element, on_copy: impl Fn() + 'static) -> EventListener {
    let selector = format!("[{COPY_ATTRIBUTE}]");
    EventListener::new(root, "click", move |event| {
        let Some(target) = event
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
        else {
            return;
        };
        if matches!(target.closest(&selector), Ok(Some(_))) {
            on_copy();
        }
    })
}
