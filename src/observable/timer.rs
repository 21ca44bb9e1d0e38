use std::cell::Cell;

use crate::{
  observable::Observable,
  scheduler::{schedule_repeating, Duration, SchedulerRef},
  subscription::Teardown,
};

/// Creates an observable that emits `value` after `delay`, then completes.
///
/// Racing a source against a timer is how timeouts are composed.
pub fn timer<Item, Err>(delay: Duration, value: Item, scheduler: SchedulerRef) -> Observable<Item, Err>
where
  Item: Clone + 'static,
  Err: 'static,
{
  Observable::new(move |subscriber| {
    let value = value.clone();
    let handle = scheduler.schedule(
      Box::new(move || {
        subscriber.next(value);
        subscriber.complete();
      }),
      delay,
    );
    Teardown::Subscription(handle)
  })
}

/// Creates an observable that emits `0, 1, 2, ...` every `period`. Never
/// completes.
pub fn interval<Err: 'static>(period: Duration, scheduler: SchedulerRef) -> Observable<usize, Err> {
  Observable::new(move |subscriber| {
    let count = Cell::new(0);
    let owner = subscriber.subscription().clone();
    schedule_repeating(scheduler.clone(), period, owner, move || {
      subscriber.next(count.get());
      count.set(count.get() + 1);
      !subscriber.is_closed()
    });
  })
}
