//! Platform abstraction traits for the widget.
//!
//! These traits define the interface between the walkthrough logic and
//! platform-specific implementations (browser DOM, test doubles). The core
//! never touches a viewport, a clipboard or an event loop directly.

use crate::annotate::LineAnnotator;
use crate::error::{ClipboardError, HighlightError, SchedulerError};

/// A deferred callback.
pub type Task = Box<dyn FnOnce() + 'static>;

/// Frame and timer scheduling on a single-threaded event loop.
///
/// Dropping a returned handle withdraws its task if it has not run yet.
/// Dropping it after the task ran is a no-op. Handles must not be dropped
/// from inside their own task.
pub trait Scheduler {
    type Handle: 'static;

    /// Run `task` before the next paint.
    fn request_frame(&self, task: Task) -> Result<Self::Handle, SchedulerError>;

    /// Run `task` after `delay_ms` milliseconds.
    fn set_timeout(&self, delay_ms: u32, task: Task) -> Result<Self::Handle, SchedulerError>;
}

/// Live layout of the notes pane.
pub trait GeometryProvider {
    /// Current viewport height, if it can be read.
    fn viewport_height(&self) -> Option<f64>;

    /// Top offset of every mounted note element relative to the viewport,
    /// in catalog order. Empty when nothing is mounted.
    fn note_tops(&self) -> Vec<f64>;
}

/// System clipboard access.
#[allow(async_fn_in_trait)]
pub trait Clipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Parameters for a single highlighting invocation.
#[derive(Clone, Copy)]
pub struct HighlightRequest<'a> {
    pub code: &'a str,
    pub language: &'a str,
    pub theme: &'a str,
    pub annotator: &'a dyn LineAnnotator,
}

/// Syntax highlighting capability.
#[allow(async_fn_in_trait)]
pub trait Highlighter {
    /// Render `request.code` as markup, running the annotator on the block
    /// and on every line.
    async fn highlight(&self, request: HighlightRequest<'_>) -> Result<String, HighlightError>;
}

impl<H: Highlighter> Highlighter for &H {
    async fn highlight(&self, request: HighlightRequest<'_>) -> Result<String, HighlightError> {
        (**self).highlight(request).await
    }
}
