//! Browser DOM layer for the codewalk widget.
//!
//! Implements the core platform traits on top of `web-sys` and wires a
//! [`Shell`](codewalk_core::Shell) to a root element. It assumes a
//! `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `geometry`: note positions and viewport height
//! - `scheduler`: animation frames and timeouts
//! - `clipboard`: async Clipboard API
//! - `events`: scroll, resize and copy-click listeners
//! - `mount`: painting and lifecycle
//!
//! # Re-exports
//!
//! This crate re-exports `codewalk-core` for convenience, so consumers
//! only need to depend on `codewalk-browser`.

pub use codewalk_core;
pub use codewalk_core::*;

pub mod clipboard;
pub mod events;
pub mod geometry;
pub mod mount;
pub mod scheduler;

pub use clipboard::BrowserClipboard;
pub use geometry::DomGeometry;
pub use mount::{BrowserShell, CodeWalkWidget, MountError};
pub use scheduler::{BrowserHandle, BrowserScheduler, FrameRequest};
