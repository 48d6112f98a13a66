//! A deterministic [`Scheduler`] for tests.
//!
//! Frames run only when [`ManualScheduler::run_frames`] is called, and
//! timeouts fire only as a virtual clock is advanced.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::error::SchedulerError;
use crate::platform::{Scheduler, Task};

#[derive(Default)]
struct Queue {
    next_id: u64,
    now_ms: u64,
    frames: Vec<(u64, Task)>,
    timeouts: Vec<(u64, u64, Task)>,
}

/// Scheduler driven by hand. Clones share one queue.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    queue: Rc<RefCell<Queue>>,
}

/// Withdraws its task when dropped.
pub struct ManualHandle {
    id: u64,
    queue: Weak<RefCell<Queue>>,
}

impl Drop for ManualHandle {
    fn drop(&mut self) {
        let Some(queue) = self.queue.upgrade() else {
            return;
        };
        let Ok(mut queue) = queue.try_borrow_mut() else {
            return;
        };
        queue.frames.retain(|(id, _)| *id != self.id);
        queue.timeouts.retain(|(id, _, _)| *id != self.id);
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.queue.borrow().now_ms
    }

    pub fn pending_frames(&self) -> usize {
        self.queue.borrow().frames.len()
    }

    pub fn pending_timeouts(&self) -> usize {
        self.queue.borrow().timeouts.len()
    }

    /// Run every frame queued so far. Frames requested while these run wait
    /// for the next call. Returns how many ran.
    pub fn run_frames(&self) -> usize {
        let frames = std::mem::take(&mut self.queue.borrow_mut().frames);
        let count = frames.len();
        for (_, task) in frames {
            task();
        }
        count
    }

    /// Move the clock forward, firing due timeouts in deadline order.
    /// Returns how many fired.
    pub fn advance(&self, ms: u64) -> usize {
        let target = self.queue.borrow().now_ms + ms;
        let mut fired = 0;
        loop {
            let next = {
                let mut queue = self.queue.borrow_mut();
                let due = queue
                    .timeouts
                    .iter()
                    .enumerate()
                    .filter(|(_, (_, deadline, _))| *deadline <= target)
                    .min_by_key(|(_, (id, deadline, _))| (*deadline, *id))
                    .map(|(pos, _)| pos);
                due.map(|pos| {
                    let (_, deadline, task) = queue.timeouts.remove(pos);
                    queue.now_ms = deadline;
                    task
                })
            };
            match next {
                Some(task) => {
                    task();
                    fired += 1;
                }
                None => break,
            }
        }
        self.queue.borrow_mut().now_ms = target;
        fired
    }

    fn push(&self, delay_ms: Option<u32>, task: Task) -> ManualHandle {
        let mut queue = self.queue.borrow_mut();
        queue.next_id += 1;
        let id = queue.next_id;
        match delay_ms {
            None => queue.frames.push((id, task)),
            Some(delay) => {
                let deadline = queue.now_ms + u64::from(delay);
                queue.timeouts.push((id, deadline, task));
            }
        }
        ManualHandle {
            id,
            queue: Rc::downgrade(&self.queue),
        }
    }
}

impl Scheduler for ManualScheduler {
    type Handle = ManualHandle;

    fn request_frame(&self, task: Task) -> Result<ManualHandle, SchedulerError> {
        Ok(self.push(None, task))
    }

    fn set_timeout(&self, delay_ms: u32, task: Task) -> Result<ManualHandle, SchedulerError> {
        Ok(self.push(Some(delay_ms), task))
    }
}
