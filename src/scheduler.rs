//! Scheduler abstraction.
//!
//! Producers that deliver asynchronously hand their work to an injected
//! [`Scheduler`]. The crate ships no production scheduler; the virtual-time
//! [`TestScheduler`] drives timed scenarios deterministically.

use std::{cell::RefCell, rc::Rc};

pub use std::time::Duration;

use crate::subscription::Subscription;

mod test_scheduler;

pub use test_scheduler::TestScheduler;

/// Orders units of work and runs them after a delay.
pub trait Scheduler {
  /// Run `work` once after `delay`. Unsubscribing the returned handle
  /// before the work ran cancels it.
  fn schedule(&self, work: Box<dyn FnOnce()>, delay: Duration) -> Subscription;

  /// Current time as seen by this scheduler.
  fn now(&self) -> Duration;
}

/// Shared handle to an injected scheduler.
pub type SchedulerRef = Rc<dyn Scheduler>;

pub trait SchedulerExt: Scheduler {
  /// Schedule `work`, handing it `state` when it runs.
  fn schedule_with_state<S: 'static>(
    &self, work: impl FnOnce(S) + 'static, delay: Duration, state: S,
  ) -> Subscription {
    self.schedule(Box::new(move || work(state)), delay)
  }
}

impl<T: Scheduler + ?Sized> SchedulerExt for T {}

type Step = Rc<RefCell<dyn FnMut() -> bool>>;

/// Run `step` on `scheduler` every `delay` until it returns `false` or
/// `owner` is closed. Each pending task handle is linked under `owner`.
pub(crate) fn schedule_repeating(
  scheduler: SchedulerRef, delay: Duration, owner: Subscription,
  step: impl FnMut() -> bool + 'static,
) {
  let step: Step = Rc::new(RefCell::new(step));
  schedule_step(scheduler, delay, owner, step);
}

fn schedule_step(scheduler: SchedulerRef, delay: Duration, owner: Subscription, step: Step) {
  if owner.is_closed() {
    return;
  }
  let (c_scheduler, c_owner) = (scheduler.clone(), owner.clone());
  let handle = scheduler.schedule(
    Box::new(move || {
      if c_owner.is_closed() {
        return;
      }
      let again = match step.try_borrow_mut() {
        Ok(mut step) => step(),
        Err(_) => false,
      };
      if again {
        schedule_step(c_scheduler, delay, c_owner, step);
      }
    }),
    delay,
  );
  owner.add(handle);
}
