//! Mounting the widget into a page.
//!
//! The root element's contents belong to the widget while it is mounted.
//! The first paint shows the loading indicator; highlighting runs after a
//! yield to the event loop so that paint can happen. With
//! `WidgetConfig::precompute` set, highlighting runs before the first paint
//! instead and the widget starts ready.
//!
//! Repaints after the first are partial and driven by the shell's view: note
//! markers follow each [`NoteEntry`]'s `active` flag and the code pane is
//! re-rendered from its [`CodePane`].

use std::cell::RefCell;

use codewalk_core::view::{ACTIVE_NOTE_CLASS, CODE_PANE_CLASS, NOTE_INDEX_ATTRIBUTE};
use codewalk_core::{
    Catalog, CatalogError, CodePane, CopyOutcome, HighlightCache, NoteEntry, Shell, ShellChange,
    ShellView, SyntectHighlighter, WeakShell, WidgetConfig,
};
use gloo_events::EventListener;
use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::JsCast;
use web_sys::{Element, Window};

use crate::clipboard::BrowserClipboard;
use crate::events::{ViewportListeners, on_copy_click, on_viewport_change};
use crate::geometry::DomGeometry;
use crate::scheduler::BrowserScheduler;

pub type BrowserShell = Shell<DomGeometry, BrowserScheduler, BrowserClipboard>;
type WeakBrowserShell = WeakShell<DomGeometry, BrowserScheduler, BrowserClipboard>;

#[derive(Debug, thiserror::Error)]
pub enum MountError {
    #[error("no global window")]
    NoWindow,

    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("invalid config: {0}")]
    Config(String),
}

struct Listeners {
    _viewport: ViewportListeners,
    _copy: EventListener,
}

/// A mounted widget. Unmounts when dropped.
pub struct CodeWalkWidget {
    shell: BrowserShell,
    root: Element,
    listeners: RefCell<Option<Listeners>>,
}

impl CodeWalkWidget {
    /// Take over `root` and start highlighting `catalog`.
    pub fn mount(
        root: &Element,
        catalog: Catalog,
        config: WidgetConfig,
    ) -> Result<Self, MountError> {
        let window = web_sys::window().ok_or(MountError::NoWindow)?;
        let geometry = DomGeometry::new(window.clone(), root.clone());
        let scheduler = BrowserScheduler::new(window.clone());
        let clipboard = BrowserClipboard::new(window.clone());

        let shell = if config.precompute {
            let results = HighlightCache::build_blocking(
                &catalog,
                &SyntectHighlighter::load_defaults(),
                &config.highlight,
            );
            Shell::with_results(catalog, config, geometry, scheduler, clipboard, results)
        } else {
            Shell::new(catalog, config, geometry, scheduler, clipboard)
        };

        paint(root, &shell.view());

        let weak = shell.downgrade();
        let paint_root = root.clone();
        shell.set_listener(move |change| {
            if let Some(shell) = weak.upgrade() {
                repaint(&paint_root, &shell, change);
            }
        });
        shell.mount();

        let listeners = attach_listeners(&window, root, shell.downgrade());

        if !shell.is_ready() {
            spawn_deferred_load(shell.downgrade());
        }

        tracing::debug!(sections = shell.catalog().len(), "codewalk mounted");
        Ok(Self {
            shell,
            root: root.clone(),
            listeners: RefCell::new(Some(listeners)),
        })
    }

    pub fn shell(&self) -> &BrowserShell {
        &self.shell
    }

    pub fn active_index(&self) -> usize {
        self.shell.active_index()
    }

    pub fn is_mounted(&self) -> bool {
        !self.shell.is_torn_down()
    }

    /// Remove listeners, cancel pending callbacks and clear the root.
    pub fn unmount(&self) {
        if self.shell.is_torn_down() {
            return;
        }
        self.listeners.borrow_mut().take();
        self.shell.tear_down();
        self.root.set_inner_html("");
        tracing::debug!("codewalk unmounted");
    }
}

impl Drop for CodeWalkWidget {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn attach_listeners(window: &Window, root: &Element, shell: WeakBrowserShell) -> Listeners {
    let viewport = {
        let shell = shell.clone();
        on_viewport_change(window, move || {
            if let Some(shell) = shell.upgrade() {
                shell.on_scroll();
            }
        })
    };

    let copy = on_copy_click(root, move || {
        let Some(shell) = shell.upgrade() else {
            return;
        };
        let copying = shell.copy_active();
        wasm_bindgen_futures::spawn_local(async move {
            if copying.await == CopyOutcome::Abandoned {
                tracing::debug!("copy finished after unmount");
            }
        });
    });

    Listeners {
        _viewport: viewport,
        _copy: copy,
    }
}

fn spawn_deferred_load(weak: WeakBrowserShell) {
    wasm_bindgen_futures::spawn_local(async move {
        TimeoutFuture::new(0).await;
        let Some(shell) = weak.upgrade() else {
            return;
        };
        if shell.is_torn_down() {
            tracing::debug!("unmounted before highlighting started");
            return;
        }
        let loading = shell.load(SyntectHighlighter::load_defaults());
        drop(shell);
        loading.await;
    });
}

fn paint(root: &Element, view: &ShellView) {
    root.set_inner_html(&view.render_html());
}

fn repaint(root: &Element, shell: &BrowserShell, change: ShellChange) {
    let view = shell.view();
    let ShellView::Ready(ready) = &view else {
        return;
    };

    match change {
        ShellChange::Ready => paint(root, &view),
        ShellChange::ActiveIndex(_) => {
            sync_note_markers(root, &ready.notes);
            replace_code_pane(root, &ready.code);
        }
        ShellChange::Copied(_) => replace_code_pane(root, &ready.code),
    }
}

fn sync_note_markers(root: &Element, notes: &[NoteEntry]) {
    let Ok(elements) = root.query_selector_all(&format!("[{NOTE_INDEX_ATTRIBUTE}]")) else {
        return;
    };
    for i in 0..elements.length() {
        let Some(element) = elements.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        let entry = element
            .get_attribute(NOTE_INDEX_ATTRIBUTE)
            .and_then(|v| v.parse::<usize>().ok())
            .and_then(|index| notes.get(index));
        let active = entry.is_some_and(|e| e.active);
        let _ = element
            .class_list()
            .toggle_with_force(ACTIVE_NOTE_CLASS, active);
    }
}

fn replace_code_pane(root: &Element, pane: &CodePane) {
    match root.query_selector(&format!(".{CODE_PANE_CLASS}")) {
        Ok(Some(element)) => element.set_outer_html(&pane.render_html()),
        _ => tracing::warn!("code pane missing from the widget root"),
    }
}
