use crate::{
  error::SubscribeToError,
  observable::Observable,
  scheduler::SchedulerRef,
  subscribe_to::{subscribe_to, subscribe_to_scheduled, ObservableInput},
};

/// Converts any supported input into an observable.
///
/// ```
/// use rxcore::prelude::*;
///
/// let chars: Observable<char, ()> = observable::from("abc").unwrap();
/// chars.subscribe(|c| println!("{c}"));
///
/// assert!(observable::from::<i32, ()>(None::<Vec<i32>>).is_err());
/// ```
pub fn from<Item, Err>(
  input: impl ObservableInput<Item, Err>,
) -> Result<Observable<Item, Err>, SubscribeToError>
where
  Item: 'static,
  Err: 'static,
{
  subscribe_to(&input)
}

/// Like [`from`], with delivery driven by `scheduler`.
pub fn scheduled<Item, Err>(
  input: impl ObservableInput<Item, Err>, scheduler: SchedulerRef,
) -> Result<Observable<Item, Err>, SubscribeToError>
where
  Item: 'static,
  Err: 'static,
{
  subscribe_to_scheduled(&input, scheduler)
}

/// Accepts only inputs that already are observables, native or interop.
pub fn from_observable<Item, Err>(
  input: impl ObservableInput<Item, Err>,
) -> Result<Observable<Item, Err>, SubscribeToError>
where
  Item: 'static,
  Err: 'static,
{
  if let Some(observable) = input.observable() {
    return Ok(observable);
  }
  match input.interop_observable() {
    Some(foreign) => Ok(Observable::new(move |subscriber| {
      foreign.actual_subscribe(subscriber);
    })),
    None => Err(SubscribeToError::UnsupportedInput { description: input.describe() }),
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;
  use crate::observable;

  #[test]
  fn from_observable_rejects_arrays() {
    assert!(from_observable::<i32, ()>(vec![1]).is_err());
    let source = from_observable::<i32, ()>(observable::of(1)).unwrap();
    let seen = Rc::new(RefCell::new(vec![]));
    let c_seen = seen.clone();
    source.subscribe(move |v| c_seen.borrow_mut().push(v));
    assert_eq!(*seen.borrow(), vec![1]);
  }

  #[test]
  fn from_dispatches() {
    let seen = Rc::new(RefCell::new(vec![]));
    let c_seen = seen.clone();
    from::<char, ()>("hi".to_string())
      .unwrap()
      .subscribe(move |c| c_seen.borrow_mut().push(c));
    assert_eq!(*seen.borrow(), vec!['h', 'i']);
  }
}
