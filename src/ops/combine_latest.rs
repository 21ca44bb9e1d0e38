use std::{cell::RefCell, rc::Rc};

use crate::{
  error::SubscribeToError,
  observable::Observable,
  subscribe_to::{resolve_all, ObservableInput},
  subscriber::{subscribe_to_result, OuterSubscriber, Subscriber},
  subscription::Subscription,
};

/// Combines the latest value of every source.
///
/// Nothing is emitted until every source has produced at least one value;
/// from then on every value of any source emits a snapshot of the latest
/// values, in input order. Completes once every source completed and fails
/// as soon as one source fails. Zero sources complete immediately.
///
/// # Examples
///
/// ```
/// use rxcore::prelude::*;
///
/// let sources: Vec<Input<i32, ()>> = vec![Input::new(vec![1]), Input::new(vec![2, 3])];
/// ops::combine_latest(sources)
///   .unwrap()
///   .subscribe(|v| println!("{v:?}"));
///
/// // print log:
/// // [1, 2]
/// // [1, 3]
/// ```
pub fn combine_latest<Item, Err, I, S>(sources: I) -> Result<Observable<Vec<Item>, Err>, SubscribeToError>
where
  Item: Clone + 'static,
  Err: 'static,
  I: IntoIterator<Item = S>,
  S: ObservableInput<Item, Err>,
{
  combine_latest_with(sources, |values| values)
}

/// Like [`combine_latest`], emitting `project(snapshot)` instead of the
/// snapshot itself.
pub fn combine_latest_with<Item, Out, Err, I, S, F>(
  sources: I, project: F,
) -> Result<Observable<Out, Err>, SubscribeToError>
where
  Item: Clone + 'static,
  Out: 'static,
  Err: 'static,
  I: IntoIterator<Item = S>,
  S: ObservableInput<Item, Err>,
  F: Fn(Vec<Item>) -> Out + 'static,
{
  let sources = resolve_all(sources)?;
  let project: Rc<dyn Fn(Vec<Item>) -> Out> = Rc::new(project);
  Ok(Observable::new(move |downstream: Subscriber<Out, Err>| {
    let len = sources.len();
    if len == 0 {
      downstream.complete();
      return;
    }
    let outer = Rc::new(CombineLatestOuter {
      downstream: downstream.clone(),
      subscription: Subscription::empty(),
      state: RefCell::new(CombineState { values: vec![None; len], to_respond: len, active: len }),
      project: project.clone(),
    });
    downstream.add(outer.subscription.clone());
    for (index, source) in sources.iter().enumerate() {
      subscribe_to_result(&outer, source, (), index);
    }
  }))
}

struct CombineState<Item> {
  values: Vec<Option<Item>>,
  // sources that have not produced a value yet
  to_respond: usize,
  // sources that have not completed yet
  active: usize,
}

struct CombineLatestOuter<Item, Out, Err> {
  downstream: Subscriber<Out, Err>,
  subscription: Subscription,
  state: RefCell<CombineState<Item>>,
  project: Rc<dyn Fn(Vec<Item>) -> Out>,
}

impl<Item, Out, Err> OuterSubscriber<(), Item, Err> for CombineLatestOuter<Item, Out, Err>
where
  Item: Clone + 'static,
  Out: 'static,
  Err: 'static,
{
  fn subscription(&self) -> &Subscription { &self.subscription }

  fn notify_next(
    self: Rc<Self>, _: (), value: Item, outer_index: usize, _: usize, _: &Subscription,
  ) {
    let snapshot = {
      let mut state = self.state.borrow_mut();
      if state.values[outer_index].replace(value).is_none() {
        state.to_respond -= 1;
        if state.to_respond == 0 {
          tracing::debug!(sources = state.values.len(), "combine_latest: every source responded");
        }
      }
      if state.to_respond > 0 {
        return;
      }
      state.values.iter().cloned().collect::<Option<Vec<_>>>()
    };
    if let Some(snapshot) = snapshot {
      self.downstream.next((self.project)(snapshot));
    }
  }

  fn notify_error(self: Rc<Self>, err: Err, _: usize, _: &Subscription) {
    self.subscription.dispose();
    self.downstream.error(err);
  }

  fn notify_complete(self: Rc<Self>, _: usize, _: &Subscription) {
    let done = {
      let mut state = self.state.borrow_mut();
      state.active -= 1;
      state.active == 0
    };
    if done {
      self.downstream.complete();
    }
  }
}

#[cfg(test)]
mod tests {
  use std::cell::Cell;

  use super::*;
  use crate::{
    observable,
    scheduler::{Duration, SchedulerRef, TestScheduler},
    subscribe_to::Input,
    subscription::Teardown,
  };

  type Log = Rc<RefCell<Vec<String>>>;

  fn record<T: std::fmt::Debug + 'static>(source: &Observable<T, String>) -> (Log, Subscription) {
    let log: Log = Rc::new(RefCell::new(vec![]));
    let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
    let subscription = source.subscribe_all(
      move |v| l1.borrow_mut().push(format!("{v:?}")),
      move |e| l2.borrow_mut().push(format!("error {e}")),
      move || l3.borrow_mut().push("complete".to_string()),
    );
    (log, subscription)
  }

  fn at(scheduler: &SchedulerRef, ticks: u64, value: &'static str) -> Observable<&'static str, String> {
    observable::timer(Duration::from_millis(ticks), value, scheduler.clone())
  }

  #[test]
  fn interleaved_sources() {
    let scheduler = TestScheduler::new();
    let shared: SchedulerRef = Rc::new(scheduler.clone());
    let b_then_c = crate::ops::concat(vec![at(&shared, 2, "b"), at(&shared, 2, "c")]).unwrap();
    let combined =
      combine_latest(vec![at(&shared, 1, "a"), b_then_c, at(&shared, 3, "d")]).unwrap();
    let (log, _) = record(&combined);

    scheduler.flush();
    assert_eq!(
      *log.borrow(),
      vec![r#"["a", "b", "d"]"#, r#"["a", "c", "d"]"#, "complete"]
    );
  }

  #[test]
  fn synchronous_sources_only_emit_last_snapshot_of_early_sources() {
    let sources: Vec<Input<&str, String>> =
      vec![Input::new(vec!["a"]), Input::new(vec!["b", "c"]), Input::new(vec!["d"])];
    let (log, _) = record(&combine_latest(sources).unwrap());
    assert_eq!(*log.borrow(), vec![r#"["a", "c", "d"]"#, "complete"]);
  }

  #[test]
  fn projection() {
    let combined = combine_latest_with(vec![vec![1, 2], vec![10]], |v: Vec<i32>| v.iter().sum::<i32>()).unwrap();
    let (log, _) = record(&combined);
    assert_eq!(*log.borrow(), vec!["12", "complete"]);
  }

  #[test]
  fn zero_sources_complete() {
    let (log, _) = record(&combine_latest(Vec::<Vec<i32>>::new()).unwrap());
    assert_eq!(*log.borrow(), vec!["complete"]);
  }

  #[test]
  fn error_disposes_siblings_first() {
    let torn_down = Rc::new(Cell::new(0));
    let c_torn_down = torn_down.clone();
    let open = Observable::<i32, String>::new(move |s| {
      s.next(1);
      let c_torn_down = c_torn_down.clone();
      Teardown::action(move || c_torn_down.set(c_torn_down.get() + 1))
    });
    let sources: Vec<Observable<i32, String>> = vec![open, observable::throw_err("bad".to_string())];
    let (log, subscription) = record(&combine_latest(sources).unwrap());
    assert_eq!(*log.borrow(), vec!["error bad"]);
    assert_eq!(torn_down.get(), 1);
    assert!(subscription.is_closed());
  }

  #[test]
  fn unsupported_input_is_reported_before_subscribing() {
    let sources: Vec<Input<i32, String>> = vec![Input::new(vec![1]), Input::new(())];
    assert!(combine_latest(sources).is_err());
  }

  #[test]
  fn unsubscribe_reaches_every_inner_once() {
    let torn_down = Rc::new(Cell::new(0));
    let c_torn_down = torn_down.clone();
    let open = Observable::<i32, String>::new(move |_| {
      let c_torn_down = c_torn_down.clone();
      Teardown::action(move || c_torn_down.set(c_torn_down.get() + 1))
    });
    let (_, subscription) = record(&combine_latest(vec![open.clone(), open.clone(), open]).unwrap());
    subscription.unsubscribe().unwrap();
    subscription.unsubscribe().unwrap();
    assert_eq!(torn_down.get(), 3);
  }
}
