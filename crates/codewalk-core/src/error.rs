//! Error types for catalog construction and the external capabilities.
//!
//! Only construction can fail outright. Highlight and clipboard errors are
//! recovered where they happen; they exist as types so the failure can be
//! logged with some detail before it is swallowed.

use smol_str::SmolStr;
use thiserror::Error;

/// Errors raised while building a [`Catalog`](crate::Catalog).
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CatalogError {
    /// A catalog needs at least one section to have an active one.
    #[error("catalog has no sections")]
    Empty,

    /// Two sections share an id.
    #[error("duplicate section id: {0}")]
    DuplicateId(SmolStr),

    /// Highlight lines are 1-based.
    #[error("section {id} asks to highlight line 0 (lines are 1-based)")]
    ZeroHighlightLine {
        /// Id of the offending section.
        id: SmolStr,
    },

    /// Catalog JSON could not be decoded.
    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A highlighting capability could not render a section.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HighlightError {
    /// No grammar is registered for the language tag.
    #[error("no syntax for language {0:?}")]
    UnknownLanguage(SmolStr),

    /// No theme is registered under the name.
    #[error("no theme named {0:?}")]
    UnknownTheme(SmolStr),

    /// The syntect parser or HTML generator failed.
    #[error("syntect error: {0}")]
    Syntect(#[from] syntect::Error),

    /// Any other highlighter reported failure.
    #[error("highlighter failed: {0}")]
    Other(String),
}

/// Writing to the system clipboard failed.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum ClipboardError {
    /// No clipboard is reachable from this context.
    #[error("clipboard unavailable")]
    Unavailable,

    /// The platform refused the write (permissions, insecure context, ...).
    #[error("clipboard write rejected: {0}")]
    Rejected(String),
}

/// A scheduler could not queue a callback.
#[derive(Error, Debug, Clone)]
#[error("scheduler error: {0}")]
pub struct SchedulerError(pub String);

impl From<&str> for SchedulerError {
    fn from(s: &str) -> Self {
        SchedulerError(s.to_string())
    }
}

impl From<String> for SchedulerError {
    fn from(s: String) -> Self {
        SchedulerError(s)
    }
}
