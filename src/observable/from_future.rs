use std::{future::Future, rc::Rc};

use futures::task::LocalSpawn;

use crate::{observable::Observable, subscribe_to::Deferred};

/// Converts a future into an observable.
///
/// The future runs once, on `spawner`, no matter how many subscribers there
/// are; each of them receives its outcome: `Ok(value)` then completion, or
/// `Err(err)` as an error.
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
/// use futures::{executor::LocalPool, future};
/// use rxcore::prelude::*;
///
/// let mut pool = LocalPool::new();
/// observable::from_future(future::ready(Ok::<_, ()>(1)), Rc::new(pool.spawner()))
///   .subscribe(|v| println!("{v}"));
/// pool.run();
/// ```
pub fn from_future<F, Item, Err>(future: F, spawner: Rc<dyn LocalSpawn>) -> Observable<Item, Err>
where
  F: Future<Output = Result<Item, Err>> + 'static,
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  Deferred::new(future, spawner).into_observable(None)
}

#[cfg(test)]
mod tests {
  use std::cell::Cell;

  use futures::{executor::LocalPool, future};

  use super::*;

  #[test]
  fn future_runs_once() {
    let mut pool = LocalPool::new();
    let polls = Rc::new(Cell::new(0));
    let c_polls = polls.clone();
    let source = from_future(
      future::lazy(move |_| {
        c_polls.set(c_polls.get() + 1);
        Ok::<_, ()>(10)
      }),
      Rc::new(pool.spawner()),
    );
    let sum = Rc::new(Cell::new(0));
    let (s1, s2) = (sum.clone(), sum.clone());
    source.subscribe(move |v| s1.set(s1.get() + v));
    source.subscribe(move |v| s2.set(s2.get() + v));
    pool.run();
    assert_eq!(sum.get(), 20);
    assert_eq!(polls.get(), 1);
  }
}
