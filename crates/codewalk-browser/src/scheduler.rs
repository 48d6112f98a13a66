//! `requestAnimationFrame` and `setTimeout` behind the core [`Scheduler`].
//!
//! Dropping a [`BrowserHandle`] cancels the callback. Handles must not be
//! dropped from inside their own callback; the core keeps them until the
//! next request replaces them.

use codewalk_core::{Scheduler, SchedulerError, Task};
use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Window;

#[derive(Clone)]
pub struct BrowserScheduler {
    window: Window,
}

impl BrowserScheduler {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

/// A pending animation frame. Cancelled on drop.
pub struct FrameRequest {
    window: Window,
    id: i32,
    _closure: Closure<dyn FnMut()>,
}

impl Drop for FrameRequest {
    fn drop(&mut self) {
        // Harmless if the frame already ran.
        let _ = self.window.cancel_animation_frame(self.id);
    }
}

pub enum BrowserHandle {
    Frame(FrameRequest),
    Timeout(Timeout),
}

impl Scheduler for BrowserScheduler {
    type Handle = BrowserHandle;

    fn request_frame(&self, task: Task) -> Result<BrowserHandle, SchedulerError> {
        let closure = Closure::once(move || task());
        let id = self
            .window
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .map_err(|e| SchedulerError(format!("requestAnimationFrame failed: {e:?}")))?;

        Ok(BrowserHandle::Frame(FrameRequest {
            window: self.window.clone(),
            id,
            _closure: closure,
        }))
    }

    fn set_timeout(&self, delay_ms: u32, task: Task) -> Result<BrowserHandle, SchedulerError> {
        Ok(BrowserHandle::Timeout(Timeout::new(delay_ms, move || task())))
    }
}
