use std::{cell::Cell, rc::Rc};

use crate::{
  observable::Observable,
  scheduler::{schedule_repeating, Duration, SchedulerRef},
};

/// Indexed access with a known length.
pub trait ArrayLike<Item> {
  fn length(&self) -> usize;

  /// The element at `index`, `None` past the end.
  fn item(&self, index: usize) -> Option<Item>;
}

impl<Item: Clone> ArrayLike<Item> for Vec<Item> {
  #[inline]
  fn length(&self) -> usize { self.len() }

  #[inline]
  fn item(&self, index: usize) -> Option<Item> { self.get(index).cloned() }
}

impl<Item: Clone, const N: usize> ArrayLike<Item> for [Item; N] {
  #[inline]
  fn length(&self) -> usize { N }

  #[inline]
  fn item(&self, index: usize) -> Option<Item> { self.get(index).cloned() }
}

impl<Item: Clone> ArrayLike<Item> for Rc<[Item]> {
  #[inline]
  fn length(&self) -> usize { self.len() }

  #[inline]
  fn item(&self, index: usize) -> Option<Item> { self.get(index).cloned() }
}

/// Emit the elements of `array` in index order, then complete.
///
/// Without a scheduler everything is delivered synchronously, stopping early
/// once the subscriber closes. With one, each element is delivered on its
/// own scheduled step and completion follows the last element.
pub(crate) fn observe_array<Item, Err>(
  array: Rc<dyn ArrayLike<Item>>, scheduler: Option<SchedulerRef>,
) -> Observable<Item, Err>
where
  Item: 'static,
  Err: 'static,
{
  Observable::new(move |subscriber| {
    let Some(scheduler) = scheduler.clone() else {
      for index in 0..array.length() {
        if subscriber.is_closed() {
          return;
        }
        if let Some(value) = array.item(index) {
          subscriber.next(value);
        }
      }
      subscriber.complete();
      return;
    };

    let (array, index) = (array.clone(), Cell::new(0));
    let owner = subscriber.subscription().clone();
    schedule_repeating(scheduler, Duration::ZERO, owner, move || {
      let at = index.get();
      if at < array.length() {
        if let Some(value) = array.item(at) {
          subscriber.next(value);
        }
        index.set(at + 1);
      }
      if index.get() >= array.length() {
        subscriber.complete();
        return false;
      }
      true
    });
  })
}
