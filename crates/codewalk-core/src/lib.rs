//! codewalk-core: scroll-synchronized code walkthrough logic without
//! framework dependencies.
//!
//! This crate provides:
//! - `Catalog` - the fixed, ordered list of walkthrough sections
//! - `HighlightCache` - every section highlighted once, up front
//! - `ActiveSectionTracker` - picks the note closest to a viewport anchor
//! - `Shell` - composes the above into a paintable `ShellView`
//!
//! Browser access goes through the traits in [`platform`], so everything
//! here runs (and is tested) natively.

pub mod annotate;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod highlight;
pub mod platform;
pub mod shell;
pub mod testing;
pub mod tracker;
pub mod view;

pub use annotate::{BlockNode, EmphasisAnnotator, LineAnnotator, LineNode, NodeProps};
pub use cache::{HighlightCache, RenderedResult};
pub use catalog::{Catalog, Section};
pub use config::{HighlightConfig, TrackerConfig, WidgetConfig};
pub use error::{CatalogError, ClipboardError, HighlightError, SchedulerError};
pub use highlight::SyntectHighlighter;
pub use platform::{Clipboard, GeometryProvider, HighlightRequest, Highlighter, Scheduler, Task};
pub use shell::{CopyOutcome, Shell, ShellChange, WeakShell};
pub use smol_str::SmolStr;
pub use tracker::{ActiveSectionTracker, closest_to_anchor};
pub use view::{CodeBody, CodePane, NoteEntry, ReadyView, ShellView};
