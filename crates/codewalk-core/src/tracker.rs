//! Active-section tracking.
//!
//! The active section is the note whose top edge sits closest to an anchor
//! line a fixed fraction of the way down the viewport. Scroll and resize
//! signals can arrive hundreds of times a second, so they only *request* an
//! evaluation: at most one frame is outstanding at a time, and signals that
//! arrive while it is pending are dropped. The evaluation itself reads live
//! geometry, so the dropped signals lose nothing.
//!
//! # Lifecycle
//!
//! ```text
//! new ──attach()──▶ attached ──detach()──▶ detached
//!         │ evaluates     │ signal() ─▶ frame ─▶ evaluate
//!         ▼ immediately   │ content_ready() ─▶ evaluate
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::config::TrackerConfig;
use crate::platform::{GeometryProvider, Scheduler};

/// Index of the note closest to `anchor`.
///
/// Ties go to the lowest index. Returns `None` only for an empty slice;
/// otherwise some index is always chosen, even if every distance is NaN.
pub fn closest_to_anchor(tops: &[f64], anchor: f64) -> Option<usize> {
    if tops.is_empty() {
        return None;
    }

    let mut best_index = 0;
    let mut best_distance = f64::INFINITY;
    for (index, top) in tops.iter().enumerate() {
        let distance = (top - anchor).abs();
        if distance < best_distance {
            best_distance = distance;
            best_index = index;
        }
    }
    Some(best_index)
}

type ChangeListener = Box<dyn Fn(usize)>;

struct TrackerState<H> {
    active: usize,
    attached: bool,
    /// Handle of the most recent frame request. Kept after the frame runs and
    /// replaced by the next request.
    frame: Option<H>,
    frame_pending: bool,
    evaluations: u64,
}

struct TrackerInner<G, S: Scheduler> {
    geometry: G,
    scheduler: S,
    config: TrackerConfig,
    state: RefCell<TrackerState<S::Handle>>,
    listener: RefCell<Option<ChangeListener>>,
}

/// Owns the active index and keeps it in step with the viewport.
///
/// Clones share state.
pub struct ActiveSectionTracker<G, S: Scheduler> {
    inner: Rc<TrackerInner<G, S>>,
}

impl<G, S: Scheduler> Clone for ActiveSectionTracker<G, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<G, S> ActiveSectionTracker<G, S>
where
    G: GeometryProvider + 'static,
    S: Scheduler + 'static,
{
    pub fn new(geometry: G, scheduler: S, config: TrackerConfig) -> Self {
        Self {
            inner: Rc::new(TrackerInner {
                geometry,
                scheduler,
                config,
                state: RefCell::new(TrackerState {
                    active: 0,
                    attached: false,
                    frame: None,
                    frame_pending: false,
                    evaluations: 0,
                }),
                listener: RefCell::new(None),
            }),
        }
    }

    pub fn active_index(&self) -> usize {
        self.inner.state.borrow().active
    }

    /// Number of evaluations run so far.
    pub fn evaluation_count(&self) -> u64 {
        self.inner.state.borrow().evaluations
    }

    /// Whether a frame is requested and has not run yet.
    pub fn frame_pending(&self) -> bool {
        self.inner.state.borrow().frame_pending
    }

    pub fn is_attached(&self) -> bool {
        self.inner.state.borrow().attached
    }

    pub fn geometry(&self) -> &G {
        &self.inner.geometry
    }

    /// Called with the new index whenever it changes.
    pub fn set_listener(&self, listener: impl Fn(usize) + 'static) {
        *self.inner.listener.borrow_mut() = Some(Box::new(listener));
    }

    /// Start reacting to signals and evaluate right away.
    pub fn attach(&self) {
        self.inner.state.borrow_mut().attached = true;
        self.inner.evaluate();
    }

    /// Stop reacting to signals and withdraw any pending frame.
    pub fn detach(&self) {
        let frame = {
            let mut state = self.inner.state.borrow_mut();
            state.attached = false;
            state.frame_pending = false;
            state.frame.take()
        };
        drop(frame);
        if let Ok(mut listener) = self.inner.listener.try_borrow_mut() {
            listener.take();
        }
    }

    /// Content changed shape (e.g. highlighting finished): re-evaluate now.
    pub fn content_ready(&self) {
        if self.is_attached() {
            self.inner.evaluate();
        }
    }

    /// A scroll or resize happened.
    ///
    /// Returns `true` if this signal requested a frame, `false` if it was
    /// coalesced into one already pending (or the tracker is detached).
    pub fn signal(&self) -> bool {
        {
            let state = self.inner.state.borrow();
            if !state.attached || state.frame_pending {
                return false;
            }
        }

        let weak: Weak<TrackerInner<G, S>> = Rc::downgrade(&self.inner);
        let requested = self.inner.scheduler.request_frame(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.run_frame();
            }
        }));

        match requested {
            Ok(handle) => {
                let stale = {
                    let mut state = self.inner.state.borrow_mut();
                    state.frame_pending = true;
                    state.frame.replace(handle)
                };
                drop(stale);
                true
            }
            Err(e) => {
                tracing::warn!(
                    target: "codewalk::tracker",
                    "frame request failed, evaluating immediately: {e}"
                );
                self.inner.evaluate();
                false
            }
        }
    }

    /// Evaluate now, bypassing frame coalescing. Returns the active index.
    pub fn evaluate(&self) -> usize {
        self.inner.evaluate()
    }
}

impl<G: GeometryProvider, S: Scheduler> TrackerInner<G, S> {
    fn run_frame(&self) {
        let attached = {
            let mut state = self.state.borrow_mut();
            state.frame_pending = false;
            state.attached
        };
        if attached {
            self.evaluate();
        }
    }

    fn evaluate(&self) -> usize {
        let anchor = self.config.anchor_for(self.geometry.viewport_height());
        let tops = self.geometry.note_tops();

        let changed = {
            let mut state = self.state.borrow_mut();
            state.evaluations += 1;
            match closest_to_anchor(&tops, anchor) {
                Some(index) if index != state.active => {
                    tracing::debug!(
                        target: "codewalk::tracker",
                        from = state.active,
                        to = index,
                        anchor,
                        "active section changed"
                    );
                    state.active = index;
                    Some(index)
                }
                Some(_) => None,
                None => {
                    tracing::trace!(target: "codewalk::tracker", "no notes mounted");
                    None
                }
            }
        };

        if let Some(index) = changed {
            if let Some(listener) = self.listener.borrow().as_ref() {
                listener(index);
            }
        }
        self.state.borrow().active
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::testing::ManualScheduler;

    /// Synthetic geometry that counts reads.
    #[derive(Clone, Default)]
    struct FakeGeometry {
        height: Rc<Cell<Option<f64>>>,
        tops: Rc<RefCell<Vec<f64>>>,
        reads: Rc<Cell<usize>>,
    }

    impl FakeGeometry {
        fn new(height: Option<f64>, tops: &[f64]) -> Self {
            let geo = Self::default();
            geo.height.set(height);
            *geo.tops.borrow_mut() = tops.to_vec();
            geo
        }

        fn set_tops(&self, tops: &[f64]) {
            *self.tops.borrow_mut() = tops.to_vec();
        }
    }

    impl GeometryProvider for FakeGeometry {
        fn viewport_height(&self) -> Option<f64> {
            self.height.get()
        }

        fn note_tops(&self) -> Vec<f64> {
            self.reads.set(self.reads.get() + 1);
            self.tops.borrow().clone()
        }
    }

    fn tracker(
        geo: &FakeGeometry,
        scheduler: &ManualScheduler,
    ) -> ActiveSectionTracker<FakeGeometry, ManualScheduler> {
        ActiveSectionTracker::new(geo.clone(), scheduler.clone(), TrackerConfig::default())
    }

    #[test]
    fn test_closest_prefers_lower_index_on_tie() {
        assert_eq!(closest_to_anchor(&[100.0, 140.0], 120.0), Some(0));
        assert_eq!(closest_to_anchor(&[300.0, 100.0, 140.0], 120.0), Some(1));
        assert_eq!(closest_to_anchor(&[], 120.0), None);
        assert_eq!(closest_to_anchor(&[f64::NAN, f64::NAN], 120.0), Some(0));
    }

    #[test]
    fn test_anchor_hit_exactly() {
        let geo = FakeGeometry::new(Some(800.0), &[120.0]);
        let t = tracker(&geo, &ManualScheduler::new());
        assert_eq!(t.evaluate(), 0);
    }

    #[test]
    fn test_nearest_above_wins() {
        // |50-120| = 70 beats |200-120| = 80
        let geo = FakeGeometry::new(Some(800.0), &[50.0, 200.0]);
        let t = tracker(&geo, &ManualScheduler::new());
        t.attach();
        assert_eq!(t.active_index(), 0);

        geo.set_tops(&[-400.0, 130.0]);
        assert_eq!(t.evaluate(), 1);
    }

    #[test]
    fn test_missing_viewport_height_uses_fallback() {
        // fallback 800 -> anchor 120
        let geo = FakeGeometry::new(None, &[0.0, 119.0, 500.0]);
        let t = tracker(&geo, &ManualScheduler::new());
        assert_eq!(t.evaluate(), 1);
    }

    #[test]
    fn test_no_notes_leaves_index_unchanged() {
        let geo = FakeGeometry::new(Some(800.0), &[-500.0, 120.0]);
        let t = tracker(&geo, &ManualScheduler::new());
        assert_eq!(t.evaluate(), 1);

        geo.set_tops(&[]);
        assert_eq!(t.evaluate(), 1);
        assert_eq!(t.active_index(), 1);
    }

    #[test]
    fn test_double_evaluation_is_idempotent() {
        let geo = FakeGeometry::new(Some(600.0), &[10.0, 95.0, 400.0]);
        let t = tracker(&geo, &ManualScheduler::new());
        let first = t.evaluate();
        let second = t.evaluate();
        assert_eq!(first, second);
        assert_eq!(first, 1);
    }

    #[test]
    fn test_listener_only_fires_on_change() {
        let geo = FakeGeometry::new(Some(800.0), &[120.0, 600.0]);
        let t = tracker(&geo, &ManualScheduler::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        t.set_listener(move |i| sink.borrow_mut().push(i));

        t.evaluate();
        geo.set_tops(&[-480.0, 120.0]);
        t.evaluate();
        t.evaluate();

        assert_eq!(*seen.borrow(), vec![1]);
    }

    #[test]
    fn test_burst_of_signals_coalesces_into_one_evaluation() {
        let geo = FakeGeometry::new(Some(800.0), &[50.0, 200.0]);
        let scheduler = ManualScheduler::new();
        let t = tracker(&geo, &scheduler);
        t.attach();
        let before = t.evaluation_count();

        let requested = (0..50).filter(|_| t.signal()).count();
        assert_eq!(requested, 1);
        assert!(t.frame_pending());
        assert_eq!(t.evaluation_count(), before);

        assert_eq!(scheduler.run_frames(), 1);
        assert_eq!(t.evaluation_count(), before + 1);
        assert!(!t.frame_pending());

        // The next burst gets a fresh frame.
        assert!(t.signal());
        assert!(!t.signal());
        scheduler.run_frames();
        assert_eq!(t.evaluation_count(), before + 2);
    }

    #[test]
    fn test_frame_reads_latest_geometry() {
        let geo = FakeGeometry::new(Some(800.0), &[120.0, 900.0]);
        let scheduler = ManualScheduler::new();
        let t = tracker(&geo, &scheduler);
        t.attach();

        t.signal();
        geo.set_tops(&[-700.0, 125.0]);
        scheduler.run_frames();

        assert_eq!(t.active_index(), 1);
    }

    #[test]
    fn test_signals_ignored_until_attached() {
        let geo = FakeGeometry::new(Some(800.0), &[0.0]);
        let scheduler = ManualScheduler::new();
        let t = tracker(&geo, &scheduler);

        assert!(!t.signal());
        assert_eq!(scheduler.pending_frames(), 0);
        assert_eq!(geo.reads.get(), 0);
    }

    #[test]
    fn test_detach_withdraws_pending_frame() {
        let geo = FakeGeometry::new(Some(800.0), &[0.0, 120.0]);
        let scheduler = ManualScheduler::new();
        let t = tracker(&geo, &scheduler);
        t.attach();
        let reads = geo.reads.get();

        assert!(t.signal());
        t.detach();

        assert_eq!(scheduler.pending_frames(), 0);
        assert_eq!(scheduler.run_frames(), 0);
        assert_eq!(geo.reads.get(), reads);
        assert!(!t.signal());
    }

    #[test]
    fn test_dropped_tracker_frame_is_a_no_op() {
        let geo = FakeGeometry::new(Some(800.0), &[0.0]);
        let scheduler = ManualScheduler::new();
        let t = tracker(&geo, &scheduler);
        t.attach();
        t.signal();
        let reads = geo.reads.get();

        drop(t);
        scheduler.run_frames();
        assert_eq!(geo.reads.get(), reads);
    }

    #[test]
    fn test_content_ready_reevaluates_when_attached() {
        let geo = FakeGeometry::new(Some(800.0), &[]);
        let t = tracker(&geo, &ManualScheduler::new());
        t.content_ready();
        assert_eq!(t.evaluation_count(), 0);

        t.attach();
        geo.set_tops(&[-300.0, 118.0]);
        t.content_ready();
        assert_eq!(t.active_index(), 1);
    }
}
