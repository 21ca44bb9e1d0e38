use crate::observable::Observable;

/// Creates an observable that calls `factory` on every subscription and
/// subscribes the observable it returns.
///
/// # Examples
///
/// ```
/// use rxcore::prelude::*;
///
/// let source = observable::defer(|| observable::of::<_, ()>(std::process::id()));
/// source.subscribe(|pid| println!("{pid}"));
/// ```
pub fn defer<F, Item, Err>(factory: F) -> Observable<Item, Err>
where
  F: Fn() -> Observable<Item, Err> + 'static,
  Item: 'static,
  Err: 'static,
{
  Observable::new(move |subscriber| {
    factory().actual_subscribe(subscriber);
  })
}
