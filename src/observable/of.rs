use crate::observable::Observable;

/// Creates an observable producing a multiple values.
///
/// Completes immediately after emitting the values given. Never emits an
/// error.
///
/// # Examples
///
/// ```
/// use rxcore::{of_sequence, prelude::*};
///
/// let source: Observable<i32, ()> = of_sequence!(1, 2, 3);
/// source.subscribe(|v| println!("{v},"));
///
/// // print log:
/// // 1
/// // 2
/// // 3
/// ```
#[macro_export]
macro_rules! of_sequence {
  ( $( $item:expr ),* $(,)? ) => {
    $crate::observable::from_array(vec![$( $item ),*])
  };
}

/// Creates an observable producing a single value.
///
/// Completes immediately after emitting the value given. Never emits an
/// error. The result is flagged scalar.
///
/// # Examples
///
/// ```
/// use rxcore::prelude::*;
///
/// observable::of::<_, ()>(123).subscribe(|v| println!("{v},"));
/// ```
pub fn of<Item, Err>(value: Item) -> Observable<Item, Err>
where
  Item: Clone + 'static,
  Err: 'static,
{
  scalar(value)
}

/// A scalar observable: every subscription synchronously receives `value`
/// then completion, without any scheduler hop.
pub fn scalar<Item, Err>(value: Item) -> Observable<Item, Err>
where
  Item: Clone + 'static,
  Err: 'static,
{
  Observable::new_scalar(move |s| {
    s.next(value.clone());
    s.complete();
  })
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;

  #[test]
  fn of_emits_then_completes() {
    let log = Rc::new(RefCell::new(vec![]));
    let (l1, l2) = (log.clone(), log.clone());
    let source = of::<_, ()>(7);
    assert!(source.is_scalar());
    source.subscribe_complete(
      move |v| l1.borrow_mut().push(format!("next {v}")),
      move || l2.borrow_mut().push("complete".to_string()),
    );
    source.subscribe_complete(
      {
        let log = log.clone();
        move |v| log.borrow_mut().push(format!("again {v}"))
      },
      || {},
    );
    assert_eq!(*log.borrow(), vec!["next 7", "complete", "again 7"]);
  }

  #[test]
  fn sequence_macro() {
    let seen = Rc::new(RefCell::new(vec![]));
    let c_seen = seen.clone();
    let source: Observable<i32, ()> = crate::of_sequence!(1, 2, 3);
    assert!(!source.is_scalar());
    source.subscribe(move |v| c_seen.borrow_mut().push(v));
    assert_eq!(*seen.borrow(), vec![1, 2, 3]);
  }
}
