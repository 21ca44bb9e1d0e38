//! A materialized event of an observable.

use crate::{
  observable::{self, Observable},
  observer::Observer,
};

/// One of the three kinds of events an observable can deliver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification<Item, Err> {
  Next(Item),
  Error(Err),
  Complete,
}

impl<Item, Err> Notification<Item, Err> {
  /// Only a `Next` carries a value.
  #[inline]
  pub fn has_value(&self) -> bool { matches!(self, Notification::Next(_)) }

  /// Dispatch to the matching callback of `observer`.
  pub fn observe(self, observer: &mut impl Observer<Item, Err>) {
    match self {
      Notification::Next(value) => observer.next(value),
      Notification::Error(err) => observer.error(err),
      Notification::Complete => observer.complete(),
    }
  }

  /// Dispatch to the matching closure and return what it returns.
  pub fn accept<R>(
    self, next: impl FnOnce(Item) -> R, error: impl FnOnce(Err) -> R, complete: impl FnOnce() -> R,
  ) -> R {
    match self {
      Notification::Next(value) => next(value),
      Notification::Error(err) => error(err),
      Notification::Complete => complete(),
    }
  }

  pub fn from_result(result: Result<Item, Err>) -> Self {
    match result {
      Ok(value) => Notification::Next(value),
      Err(err) => Notification::Error(err),
    }
  }
}

impl<Item, Err> Notification<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  /// A one-shot observable replaying this notification: a value followed by
  /// completion, the error, or just completion.
  pub fn to_observable(&self) -> Observable<Item, Err> {
    match self {
      Notification::Next(value) => observable::of(value.clone()),
      Notification::Error(err) => observable::throw_err(err.clone()),
      Notification::Complete => observable::empty(),
    }
  }
}
