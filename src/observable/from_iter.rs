use std::rc::Rc;

use crate::{
  observable::Observable,
  subscribe_to::{observe_array, observe_iterable, IterInput},
};

/// Creates an observable that emits every element of `items`, in order,
/// then completes.
///
/// # Examples
///
/// ```
/// use rxcore::prelude::*;
///
/// observable::from_array::<_, ()>(vec![0, 1, 2]).subscribe(|v| println!("{v},"));
///
/// // print log:
/// // 0
/// // 1
/// // 2
/// ```
pub fn from_array<Item, Err>(items: Vec<Item>) -> Observable<Item, Err>
where
  Item: Clone + 'static,
  Err: 'static,
{
  observe_array(Rc::new(items), None)
}

/// Creates an observable that produces values from an iterator.
///
/// Every subscription iterates a fresh clone of `iter`, stops early once the
/// subscriber closes and completes after the last value.
///
/// # Examples
///
/// ```
/// use rxcore::prelude::*;
///
/// observable::from_iter::<_, ()>(0..10).subscribe(|v| println!("{v},"));
/// ```
pub fn from_iter<I, Err>(iter: I) -> Observable<I::Item, Err>
where
  I: IntoIterator + Clone + 'static,
  I::IntoIter: 'static,
  I::Item: 'static,
  Err: 'static,
{
  observe_iterable(Rc::new(IterInput(iter)), None)
}
