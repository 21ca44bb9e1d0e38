//! Observable: a lazy, cold producer of values.
//!
//! An [`Observable`] wraps a subscribe function. Every subscription runs the
//! function again with a fresh [`Subscriber`]; nothing is shared between
//! subscriptions. The free functions of this module are the factories.

use std::rc::Rc;

use crate::{
  observer::{FnMutObserver, Observer, ObserverAll, ObserverComp, ObserverErr},
  subscriber::Subscriber,
  subscription::{Subscription, Teardown},
};

mod create;
mod defer;
mod from;
mod from_future;
mod from_iter;
mod of;
mod timer;
mod trivial;

pub use create::create;
pub use defer::defer;
pub use from::{from, from_observable, scheduled};
pub use from_future::from_future;
pub use from_iter::{from_array, from_iter};
pub use of::{of, scalar};
pub use timer::{interval, timer};
pub use trivial::{empty, never, throw_err};

type SubscribeFn<Item, Err> = Rc<dyn Fn(Subscriber<Item, Err>) -> Teardown>;

/// A cold push-based stream of `Item`s that may fail with `Err`.
///
/// Cloning an observable is cheap and yields the same producer.
///
/// # Examples
///
/// ```rust
/// use rxcore::prelude::*;
///
/// let source = Observable::<i32, ()>::new(|subscriber| {
///   subscriber.next(1);
///   subscriber.next(2);
///   subscriber.complete();
/// });
///
/// source.subscribe(|v| println!("{v}"));
/// ```
pub struct Observable<Item, Err> {
  subscribe_fn: SubscribeFn<Item, Err>,
  scalar: bool,
}

impl<Item, Err> Clone for Observable<Item, Err> {
  fn clone(&self) -> Self {
    Observable { subscribe_fn: self.subscribe_fn.clone(), scalar: self.scalar }
  }
}

impl<Item: 'static, Err: 'static> Observable<Item, Err> {
  /// Build an observable from its subscribe function. The returned teardown
  /// runs when the subscription ends.
  pub fn new<F, T>(subscribe: F) -> Self
  where
    F: Fn(Subscriber<Item, Err>) -> T + 'static,
    T: Into<Teardown>,
  {
    Observable { subscribe_fn: Rc::new(move |s| subscribe(s).into()), scalar: false }
  }

  pub(crate) fn new_scalar<F>(subscribe: F) -> Self
  where
    F: Fn(Subscriber<Item, Err>) + 'static,
  {
    Observable {
      subscribe_fn: Rc::new(move |s| {
        subscribe(s);
        Teardown::Empty
      }),
      scalar: true,
    }
  }

  /// Whether this observable replays one fixed value and completes,
  /// synchronously, on every subscription.
  #[inline]
  pub fn is_scalar(&self) -> bool { self.scalar }

  /// Run the subscribe function with `subscriber` and link the teardown it
  /// returns under the subscriber's subscription.
  ///
  /// When the producer already terminated synchronously the teardown runs
  /// right away.
  pub fn actual_subscribe(&self, subscriber: Subscriber<Item, Err>) -> Subscription {
    let subscription = subscriber.subscription().clone();
    let teardown = (self.subscribe_fn)(subscriber);
    subscription.add(teardown);
    subscription
  }

  pub fn subscribe_with(&self, observer: impl Observer<Item, Err> + 'static) -> Subscription {
    self.actual_subscribe(Subscriber::new(observer))
  }

  /// Subscribe with a `next` handler only. Errors are reported through
  /// `tracing` and otherwise dropped.
  pub fn subscribe(&self, next: impl FnMut(Item) + 'static) -> Subscription {
    self.subscribe_with(FnMutObserver(next))
  }

  pub fn subscribe_err(
    &self, next: impl FnMut(Item) + 'static, error: impl FnMut(Err) + 'static,
  ) -> Subscription {
    self.subscribe_with(ObserverErr::new(next, error))
  }

  pub fn subscribe_complete(
    &self, next: impl FnMut(Item) + 'static, complete: impl FnMut() + 'static,
  ) -> Subscription {
    self.subscribe_with(ObserverComp::new(next, complete))
  }

  pub fn subscribe_all(
    &self, next: impl FnMut(Item) + 'static, error: impl FnMut(Err) + 'static,
    complete: impl FnMut() + 'static,
  ) -> Subscription {
    self.subscribe_with(ObserverAll::new(next, error, complete))
  }
}

#[cfg(test)]
mod tests {
  use std::cell::{Cell, RefCell};

  use super::*;

  #[test]
  fn cold_each_subscription_reruns() {
    let runs = Rc::new(Cell::new(0));
    let c_runs = runs.clone();
    let source = Observable::<i32, ()>::new(move |s| {
      c_runs.set(c_runs.get() + 1);
      s.next(c_runs.get());
      s.complete();
    });
    let seen = Rc::new(RefCell::new(vec![]));
    let (s1, s2) = (seen.clone(), seen.clone());
    source.subscribe(move |v| s1.borrow_mut().push(v));
    source.clone().subscribe(move |v| s2.borrow_mut().push(v));
    assert_eq!(*seen.borrow(), vec![1, 2]);
  }

  #[test]
  fn teardown_runs_on_unsubscribe() {
    let torn_down = Rc::new(Cell::new(false));
    let c_torn_down = torn_down.clone();
    let source = Observable::<i32, ()>::new(move |_| {
      let c_torn_down = c_torn_down.clone();
      Teardown::action(move || c_torn_down.set(true))
    });
    let subscription = source.subscribe(|_| {});
    assert!(!torn_down.get());
    subscription.unsubscribe().unwrap();
    assert!(torn_down.get());
  }

  #[test]
  fn teardown_runs_immediately_after_sync_completion() {
    let torn_down = Rc::new(Cell::new(false));
    let c_torn_down = torn_down.clone();
    let source = Observable::<i32, ()>::new(move |s| {
      s.complete();
      let c_torn_down = c_torn_down.clone();
      Teardown::action(move || c_torn_down.set(true))
    });
    let subscription = source.subscribe(|_| {});
    assert!(torn_down.get());
    assert!(subscription.is_closed());
  }

  #[test]
  fn subscribe_all_sees_error() {
    let log = Rc::new(RefCell::new(vec![]));
    let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
    Observable::<i32, &str>::new(|s| {
      s.next(1);
      s.error("oops");
      s.next(2);
    })
    .subscribe_all(
      move |v| l1.borrow_mut().push(format!("next {v}")),
      move |e| l2.borrow_mut().push(format!("error {e}")),
      move || l3.borrow_mut().push("complete".into()),
    );
    assert_eq!(*log.borrow(), vec!["next 1", "error oops"]);
  }
}
