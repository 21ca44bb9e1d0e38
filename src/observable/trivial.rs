use crate::observable::Observable;

/// Creates an observable that produces no values.
///
/// Completes immediately. Never emits an error.
///
/// # Examples
/// ```
/// use rxcore::prelude::*;
///
/// observable::empty::<i32, ()>().subscribe(|v| println!("{v},"));
///
/// // Result: no thing printed
/// ```
pub fn empty<Item: 'static, Err: 'static>() -> Observable<Item, Err> {
  Observable::new(|s| s.complete())
}

/// Creates an observable that never emits anything and never terminates.
pub fn never<Item: 'static, Err: 'static>() -> Observable<Item, Err> { Observable::new(|_| {}) }

/// Creates an observable that emits no items, just terminates with an error.
///
/// # Arguments
///
/// * `err` - An error to emit and terminate with
pub fn throw_err<Item, Err>(err: Err) -> Observable<Item, Err>
where
  Item: 'static,
  Err: Clone + 'static,
{
  Observable::new(move |s| s.error(err.clone()))
}
