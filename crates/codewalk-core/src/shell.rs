//! The presentation shell: catalog, highlight cache and tracker composed into
//! a two-pane view.
//!
//! The shell owns no layout of its own. It decides *what* to paint (loading
//! indicator, or the active section's code next to the full list of notes)
//! and exposes that as a [`ShellView`]. Platform layers render the view and
//! forward scroll signals and copy clicks back in.
//!
//! State changes are announced through a single listener as
//! [`ShellChange`]s, always after internal borrows are released, so a
//! listener may read [`Shell::view`] straight away.

use std::cell::RefCell;
use std::future::Future;
use std::rc::{Rc, Weak};

use crate::cache::{HighlightCache, RenderedResult};
use crate::catalog::{Catalog, Section};
use crate::config::WidgetConfig;
use crate::platform::{Clipboard, GeometryProvider, Highlighter, Scheduler};
use crate::tracker::ActiveSectionTracker;
use crate::view::{CodeBody, CodePane, NoteEntry, ReadyView, ShellView};

/// What changed, for repaint decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellChange {
    /// Results are in; paint the two panes.
    Ready,
    /// A different section is active.
    ActiveIndex(usize),
    /// The copy acknowledgment appeared (`true`) or went away (`false`).
    Copied(bool),
}

/// Result of a copy attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    Failed,
    /// The shell was torn down before the clipboard answered.
    Abandoned,
}

enum Phase {
    Loading,
    Ready(HighlightCache),
}

struct ShellState<H> {
    phase: Phase,
    copied: bool,
    copied_timer: Option<H>,
    torn_down: bool,
}

type Listener = Rc<RefCell<Option<Box<dyn Fn(ShellChange)>>>>;

struct ShellInner<G, S: Scheduler, C> {
    catalog: Catalog,
    config: WidgetConfig,
    tracker: ActiveSectionTracker<G, S>,
    scheduler: S,
    clipboard: Rc<C>,
    state: RefCell<ShellState<S::Handle>>,
    listener: Listener,
}

/// Composes the widget. Clones share state.
pub struct Shell<G, S: Scheduler, C> {
    inner: Rc<ShellInner<G, S, C>>,
}

/// Non-owning reference to a [`Shell`], for callbacks stored inside it.
pub struct WeakShell<G, S: Scheduler, C> {
    inner: Weak<ShellInner<G, S, C>>,
}

impl<G, S: Scheduler, C> Clone for Shell<G, S, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<G, S: Scheduler, C> Clone for WeakShell<G, S, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<G, S: Scheduler, C> WeakShell<G, S, C> {
    pub fn upgrade(&self) -> Option<Shell<G, S, C>> {
        self.inner.upgrade().map(|inner| Shell { inner })
    }
}

fn notify(listener: &Listener, change: ShellChange) {
    if let Some(listener) = listener.borrow().as_ref() {
        listener(change);
    }
}

impl<G, S, C> Shell<G, S, C>
where
    G: GeometryProvider + 'static,
    S: Scheduler + Clone + 'static,
    C: Clipboard + 'static,
{
    /// A shell in the `Loading` phase; call [`load`](Self::load) or
    /// [`publish_results`](Self::publish_results) to make it ready.
    pub fn new(
        catalog: Catalog,
        config: WidgetConfig,
        geometry: G,
        scheduler: S,
        clipboard: C,
    ) -> Self {
        Self::with_phase(catalog, config, geometry, scheduler, clipboard, Phase::Loading)
    }

    /// A shell that starts `Ready` with results computed ahead of time.
    ///
    /// Results that do not line up with the catalog are discarded and the
    /// shell starts `Loading` instead.
    pub fn with_results(
        catalog: Catalog,
        config: WidgetConfig,
        geometry: G,
        scheduler: S,
        clipboard: C,
        results: HighlightCache,
    ) -> Self {
        let phase = if results.len() == catalog.len() {
            Phase::Ready(results)
        } else {
            tracing::warn!(
                target: "codewalk::shell",
                results = results.len(),
                sections = catalog.len(),
                "precomputed results do not match the catalog, ignoring them"
            );
            Phase::Loading
        };
        Self::with_phase(catalog, config, geometry, scheduler, clipboard, phase)
    }

    fn with_phase(
        catalog: Catalog,
        config: WidgetConfig,
        geometry: G,
        scheduler: S,
        clipboard: C,
        phase: Phase,
    ) -> Self {
        let tracker = ActiveSectionTracker::new(geometry, scheduler.clone(), config.tracker.clone());
        let listener: Listener = Rc::new(RefCell::new(None));

        let forward = Rc::clone(&listener);
        tracker.set_listener(move |index| notify(&forward, ShellChange::ActiveIndex(index)));

        Self {
            inner: Rc::new(ShellInner {
                catalog,
                config,
                tracker,
                scheduler,
                clipboard: Rc::new(clipboard),
                state: RefCell::new(ShellState {
                    phase,
                    copied: false,
                    copied_timer: None,
                    torn_down: false,
                }),
                listener,
            }),
        }
    }

    pub fn downgrade(&self) -> WeakShell<G, S, C> {
        WeakShell {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.inner.config
    }

    pub fn tracker(&self) -> &ActiveSectionTracker<G, S> {
        &self.inner.tracker
    }

    /// The tracker's index, clamped to the catalog.
    pub fn active_index(&self) -> usize {
        let last = self.inner.catalog.len().saturating_sub(1);
        self.inner.tracker.active_index().min(last)
    }

    pub fn active_section(&self) -> &Section {
        &self.inner.catalog[self.active_index()]
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.inner.state.borrow().phase, Phase::Ready(_))
    }

    pub fn is_copied(&self) -> bool {
        self.inner.state.borrow().copied
    }

    pub fn is_torn_down(&self) -> bool {
        self.inner.state.borrow().torn_down
    }

    /// The published results, once ready.
    pub fn results(&self) -> Option<HighlightCache> {
        match &self.inner.state.borrow().phase {
            Phase::Ready(cache) => Some(cache.clone()),
            Phase::Loading => None,
        }
    }

    /// Receive every [`ShellChange`]. Replaces any earlier listener.
    pub fn set_listener(&self, listener: impl Fn(ShellChange) + 'static) {
        *self.inner.listener.borrow_mut() = Some(Box::new(listener));
    }

    /// The view is in the page: start tracking and pick the active section.
    pub fn mount(&self) {
        if self.is_torn_down() {
            return;
        }
        self.inner.tracker.attach();
    }

    /// Forward a scroll or resize signal to the tracker.
    pub fn on_scroll(&self) -> bool {
        self.inner.tracker.signal()
    }

    /// Highlight the whole catalog and publish the results.
    ///
    /// The returned future does not keep the shell alive. Nothing is
    /// highlighted if, when first polled, the shell is gone, torn down or
    /// already ready; results that settle after teardown are dropped.
    pub fn load<H>(&self, highlighter: H) -> impl Future<Output = ()> + use<G, S, C, H>
    where
        H: Highlighter + 'static,
    {
        let weak = self.downgrade();
        let catalog = self.inner.catalog.clone();
        let highlight = self.inner.config.highlight.clone();
        async move {
            let wanted = weak
                .upgrade()
                .is_some_and(|shell| !shell.is_torn_down() && !shell.is_ready());
            if !wanted {
                tracing::debug!(target: "codewalk::shell", "highlighting skipped");
                return;
            }

            let results = HighlightCache::build(&catalog, &highlighter, &highlight).await;
            match weak.upgrade() {
                Some(shell) => shell.publish_results(results),
                None => tracing::debug!(
                    target: "codewalk::shell",
                    "shell dropped before highlighting finished"
                ),
            }
        }
    }

    /// Replace the loading state with a complete result list, atomically.
    ///
    /// Ignored after teardown, once already ready, or when the list does not
    /// line up with the catalog.
    pub fn publish_results(&self, results: HighlightCache) {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.torn_down || matches!(state.phase, Phase::Ready(_)) {
                return;
            }
            if results.len() != self.inner.catalog.len() {
                tracing::warn!(
                    target: "codewalk::shell",
                    results = results.len(),
                    sections = self.inner.catalog.len(),
                    "result list does not match the catalog, ignoring it"
                );
                return;
            }
            state.phase = Phase::Ready(results);
        }

        notify(&self.inner.listener, ShellChange::Ready);
        // Notes only get their real layout once content is in.
        self.inner.tracker.content_ready();
    }

    /// Copy the active section's raw code to the clipboard.
    ///
    /// Never fails outward: a clipboard error is logged and reported as
    /// [`CopyOutcome::Failed`] without an acknowledgment.
    pub fn copy_active(&self) -> impl Future<Output = CopyOutcome> + use<G, S, C> {
        let weak = self.downgrade();
        let clipboard = Rc::clone(&self.inner.clipboard);
        let section = self.active_section();
        let id = section.id.clone();
        let code = section.code.clone();

        async move {
            match clipboard.write_text(&code).await {
                Ok(()) => match weak.upgrade() {
                    Some(shell) if !shell.is_torn_down() => {
                        shell.acknowledge_copy();
                        CopyOutcome::Copied
                    }
                    _ => CopyOutcome::Abandoned,
                },
                Err(e) => {
                    tracing::warn!(
                        target: "codewalk::shell",
                        section = %id,
                        "copy to clipboard failed: {e}"
                    );
                    CopyOutcome::Failed
                }
            }
        }
    }

    fn acknowledge_copy(&self) {
        let weak = self.downgrade();
        let timer = self.inner.scheduler.set_timeout(
            self.inner.config.copy_ack_ms,
            Box::new(move || {
                if let Some(shell) = weak.upgrade() {
                    shell.clear_copied();
                }
            }),
        );

        let (was_copied, stale) = {
            let mut state = self.inner.state.borrow_mut();
            let was_copied = std::mem::replace(&mut state.copied, true);
            let stale = match timer {
                Ok(handle) => state.copied_timer.replace(handle),
                Err(e) => {
                    tracing::warn!(
                        target: "codewalk::shell",
                        "could not schedule copy acknowledgment reset: {e}"
                    );
                    state.copied = was_copied;
                    return;
                }
            };
            (was_copied, stale)
        };
        drop(stale);

        if !was_copied {
            notify(&self.inner.listener, ShellChange::Copied(true));
        }
    }

    fn clear_copied(&self) {
        let was_copied = std::mem::replace(&mut self.inner.state.borrow_mut().copied, false);
        if was_copied {
            notify(&self.inner.listener, ShellChange::Copied(false));
        }
    }

    /// Withdraw every pending callback and stop publishing changes.
    pub fn tear_down(&self) {
        let timer = {
            let mut state = self.inner.state.borrow_mut();
            if state.torn_down {
                return;
            }
            state.torn_down = true;
            state.copied = false;
            state.copied_timer.take()
        };
        drop(timer);
        self.inner.tracker.detach();
        if let Ok(mut listener) = self.inner.listener.try_borrow_mut() {
            listener.take();
        }
        tracing::debug!(target: "codewalk::shell", "torn down");
    }

    /// What to paint right now.
    pub fn view(&self) -> ShellView {
        let state = self.inner.state.borrow();
        let Phase::Ready(results) = &state.phase else {
            return ShellView::Loading;
        };

        let active = self.active_index();
        let section = &self.inner.catalog[active];
        let body = match &results[active] {
            RenderedResult::Markup(html) => CodeBody::Markup(html.clone()),
            RenderedResult::Failed => CodeBody::Raw(section.code.clone()),
        };

        ShellView::Ready(ReadyView {
            code: CodePane {
                index: active,
                filename: section.filename.clone(),
                body,
                copied: state.copied,
            },
            notes: self
                .inner
                .catalog
                .iter()
                .enumerate()
                .map(|(index, s)| NoteEntry {
                    index,
                    id: s.id.clone(),
                    title: s.title.clone(),
                    note: s.note.clone(),
                    active: index == active,
                })
                .collect(),
        })
    }
}
