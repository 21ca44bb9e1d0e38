//! Test Scheduler for deterministic testing of time-based producers.
//!
//! Provides virtual time that only advances when explicitly instructed,
//! enabling deterministic testing of `timer`, `interval`, scheduled sources
//! and races between them.
//!
//! # Usage
//!
//! ```rust
//! use std::rc::Rc;
//! use rxcore::prelude::*;
//!
//! let scheduler = TestScheduler::new();
//! observable::timer::<_, ()>(Duration::from_millis(100), 42, Rc::new(scheduler.clone()))
//!   .subscribe(|v| println!("{v}"));
//!
//! // Advance virtual time to trigger the emission
//! scheduler.advance_by(Duration::from_millis(100));
//!
//! // Or execute all pending tasks
//! scheduler.flush();
//! ```
//!
//! Each instance owns its own clock and queue; clones share them.

use std::{
  cell::{Cell, RefCell},
  cmp::Ordering,
  collections::BinaryHeap,
  rc::Rc,
};

use super::{Duration, Scheduler};
use crate::subscription::Subscription;

// ==================== Internal State ====================

#[derive(Default)]
struct TestSchedulerState {
  virtual_time: Duration,
  task_queue: BinaryHeap<ScheduledTask>,
  next_task_id: usize,
}

struct ScheduledTask {
  scheduled_time: Duration,
  task_id: usize,
  task: Box<dyn FnOnce()>,
  cancelled: Rc<Cell<bool>>,
  handle: Subscription,
}

impl PartialEq for ScheduledTask {
  fn eq(&self, other: &Self) -> bool {
    self.scheduled_time == other.scheduled_time && self.task_id == other.task_id
  }
}

impl Eq for ScheduledTask {}

impl PartialOrd for ScheduledTask {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for ScheduledTask {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier times first, then FIFO by task_id
    other
      .scheduled_time
      .cmp(&self.scheduled_time)
      .then_with(|| other.task_id.cmp(&self.task_id))
  }
}

// ==================== TestScheduler ====================

/// A virtual time scheduler for deterministic testing.
///
/// Tasks execute synchronously, in time order, when time is advanced.
#[derive(Clone, Default)]
pub struct TestScheduler(Rc<RefCell<TestSchedulerState>>);

impl TestScheduler {
  pub fn new() -> Self { Self::default() }

  /// Get the current virtual time.
  pub fn now(&self) -> Duration { self.0.borrow().virtual_time }

  /// Number of queued tasks that were not cancelled.
  pub fn pending_count(&self) -> usize {
    self
      .0
      .borrow()
      .task_queue
      .iter()
      .filter(|t| !t.cancelled.get())
      .count()
  }

  pub fn is_empty(&self) -> bool { self.pending_count() == 0 }

  /// Advance virtual time by `duration` and execute every task due by then.
  ///
  /// Tasks are executed in order of their scheduled time, with FIFO ordering
  /// for tasks scheduled at the same time. Tasks scheduled while advancing
  /// run too if they fall due before the target time.
  pub fn advance_by(&self, duration: Duration) {
    let target = self.now() + duration;
    self.advance_to(target);
  }

  /// Advance virtual time to the absolute time `target`. Moving backwards
  /// is a no-op.
  pub fn advance_to(&self, target: Duration) {
    if target < self.now() {
      return;
    }
    self.execute_tasks_until(Some(target));
    self.0.borrow_mut().virtual_time = target;
  }

  /// Execute all pending tasks by advancing time to each task's scheduled
  /// time. Never returns while repeating work keeps rescheduling itself.
  pub fn flush(&self) { self.execute_tasks_until(None); }

  fn execute_tasks_until(&self, target_time: Option<Duration>) {
    loop {
      let task = {
        let mut state = self.0.borrow_mut();
        let due = state
          .task_queue
          .peek()
          .is_some_and(|peek| target_time.is_none_or(|limit| peek.scheduled_time <= limit));
        if !due {
          break;
        }
        let task = state.task_queue.pop();
        if let Some(task) = &task {
          state.virtual_time = task.scheduled_time;
        }
        task
      };

      let Some(scheduled_task) = task else {
        break;
      };
      if !scheduled_task.cancelled.get() {
        (scheduled_task.task)();
      }
      // Finished tasks leave whatever subscription their handle was linked
      // under.
      scheduled_task.handle.dispose();
    }
  }
}

impl Scheduler for TestScheduler {
  fn schedule(&self, work: Box<dyn FnOnce()>, delay: Duration) -> Subscription {
    let cancelled = Rc::new(Cell::new(false));
    let c_cancelled = cancelled.clone();
    let handle = Subscription::new(move || c_cancelled.set(true));

    let mut state = self.0.borrow_mut();
    let task_id = state.next_task_id;
    state.next_task_id += 1;
    let scheduled_time = state.virtual_time + delay;
    state.task_queue.push(ScheduledTask {
      scheduled_time,
      task_id,
      task: work,
      cancelled,
      handle: handle.clone(),
    });
    handle
  }

  fn now(&self) -> Duration { TestScheduler::now(self) }
}
