use crate::{observable::Observable, subscriber::Subscriber, subscription::Teardown};

/// Creates an observable from a subscribe function.
///
/// The function runs once per subscription and drives the given subscriber.
/// Whatever teardown it returns runs when that subscription ends.
///
/// # Examples
///
/// ```rust
/// use rxcore::prelude::*;
///
/// let ticks = observable::create(|s: Subscriber<i32, ()>| {
///   s.next(1);
///   s.next(2);
///   s.complete();
///   Teardown::action(|| println!("released"))
/// });
/// ticks.subscribe(|v| println!("{v}"));
/// ```
pub fn create<Item, Err, F, T>(subscribe: F) -> Observable<Item, Err>
where
  Item: 'static,
  Err: 'static,
  F: Fn(Subscriber<Item, Err>) -> T + 'static,
  T: Into<Teardown>,
{
  Observable::new(subscribe)
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;

  #[test]
  fn producer_stops_once_unsubscribed() {
    let slot: Rc<RefCell<Option<Subscriber<i32, ()>>>> = Rc::new(RefCell::new(None));
    let c_slot = slot.clone();
    let source = create(move |s: Subscriber<i32, ()>| {
      *c_slot.borrow_mut() = Some(s);
    });

    let seen = Rc::new(RefCell::new(vec![]));
    let c_seen = seen.clone();
    let subscription = source.subscribe(move |v| c_seen.borrow_mut().push(v));
    let producer = slot.borrow_mut().take().unwrap();
    producer.next(1);
    subscription.unsubscribe().unwrap();
    producer.next(2);
    assert!(producer.is_closed());
    assert_eq!(*seen.borrow(), vec![1]);
  }
}
