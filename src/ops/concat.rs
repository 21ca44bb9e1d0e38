use std::{cell::Cell, rc::Rc};

use crate::{
  error::SubscribeToError,
  observable::{self, Observable},
  scheduler::{Duration, SchedulerRef},
  subscribe_to::{resolve_all, ObservableInput},
  subscriber::{subscribe_to_result, OuterSubscriber, Subscriber},
  subscription::Subscription,
};

/// Emits every value of the first source, then of the second, and so on.
///
/// A source is only subscribed once the previous one completed; an error of
/// any source ends the whole sequence. A single source is returned as it
/// is and zero sources complete immediately.
///
/// # Examples
///
/// ```
/// use rxcore::prelude::*;
///
/// let sources: Vec<Input<i32, ()>> = vec![Input::new(vec![1, 2]), Input::new(observable::of(3))];
/// ops::concat(sources).unwrap().subscribe(|v| println!("{v}"));
///
/// // print log:
/// // 1
/// // 2
/// // 3
/// ```
pub fn concat<Item, Err, I, S>(sources: I) -> Result<Observable<Item, Err>, SubscribeToError>
where
  Item: 'static,
  Err: 'static,
  I: IntoIterator<Item = S>,
  S: ObservableInput<Item, Err>,
{
  let mut sources = resolve_all(sources)?;
  if sources.len() == 1 {
    if let Some(source) = sources.pop() {
      return Ok(source);
    }
  }
  Ok(concat_observables(sources, None))
}

/// Like [`concat`], subscribing every source on a scheduled step of
/// `scheduler`.
pub fn concat_scheduled<Item, Err, I, S>(
  sources: I, scheduler: SchedulerRef,
) -> Result<Observable<Item, Err>, SubscribeToError>
where
  Item: 'static,
  Err: 'static,
  I: IntoIterator<Item = S>,
  S: ObservableInput<Item, Err>,
{
  Ok(concat_observables(resolve_all(sources)?, Some(scheduler)))
}

fn concat_observables<Item, Err>(
  sources: Vec<Observable<Item, Err>>, scheduler: Option<SchedulerRef>,
) -> Observable<Item, Err>
where
  Item: 'static,
  Err: 'static,
{
  if sources.is_empty() {
    return observable::empty();
  }
  let sources = Rc::new(sources);
  Observable::new(move |downstream: Subscriber<Item, Err>| {
    let outer = Rc::new(ConcatOuter {
      downstream: downstream.clone(),
      subscription: Subscription::empty(),
      sources: sources.clone(),
      next_index: Cell::new(0),
      subscribing: Cell::new(false),
      completed_sync: Cell::new(false),
      scheduler: scheduler.clone(),
    });
    downstream.add(outer.subscription.clone());
    outer.subscribe_next();
  })
}

struct ConcatOuter<Item, Err> {
  downstream: Subscriber<Item, Err>,
  subscription: Subscription,
  sources: Rc<Vec<Observable<Item, Err>>>,
  next_index: Cell<usize>,
  // Set while a source is being subscribed inline; a completion seen then is
  // recorded in `completed_sync` and picked up by the loop in
  // `subscribe_next`.
  subscribing: Cell<bool>,
  completed_sync: Cell<bool>,
  scheduler: Option<SchedulerRef>,
}

impl<Item: 'static, Err: 'static> ConcatOuter<Item, Err> {
  fn subscribe_next(self: &Rc<Self>) {
    loop {
      if self.subscription.is_closed() {
        return;
      }
      let index = self.next_index.get();
      let Some(source) = self.sources.get(index).cloned() else {
        self.downstream.complete();
        return;
      };
      self.next_index.set(index + 1);
      tracing::debug!(index, "concat: subscribing next source");

      match &self.scheduler {
        None => {
          self.subscribing.set(true);
          self.completed_sync.set(false);
          subscribe_to_result(self, &source, (), index);
          self.subscribing.set(false);
          if !self.completed_sync.get() {
            return;
          }
        }
        Some(scheduler) => {
          let outer = self.clone();
          let handle = scheduler.schedule(
            Box::new(move || {
              subscribe_to_result(&outer, &source, (), index);
            }),
            Duration::ZERO,
          );
          self.subscription.add(handle);
          return;
        }
      }
    }
  }
}

impl<Item: 'static, Err: 'static> OuterSubscriber<(), Item, Err> for ConcatOuter<Item, Err> {
  fn subscription(&self) -> &Subscription { &self.subscription }

  fn notify_next(self: Rc<Self>, _: (), value: Item, _: usize, _: usize, _: &Subscription) {
    self.downstream.next(value);
  }

  fn notify_error(self: Rc<Self>, err: Err, _: usize, _: &Subscription) {
    self.subscription.dispose();
    self.downstream.error(err);
  }

  fn notify_complete(self: Rc<Self>, _: usize, _: &Subscription) {
    if self.subscribing.get() {
      self.completed_sync.set(true);
    } else {
      self.subscribe_next();
    }
  }
}

#[cfg(test)]
mod tests {
  use std::cell::RefCell;

  use super::*;
  use crate::{observable::never, scheduler::TestScheduler, subscribe_to::Input, subscription::Teardown};

  type Log = Rc<RefCell<Vec<String>>>;

  fn record(source: &Observable<i32, String>) -> (Log, Subscription) {
    let log: Log = Rc::new(RefCell::new(vec![]));
    let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
    let subscription = source.subscribe_all(
      move |v| l1.borrow_mut().push(v.to_string()),
      move |e| l2.borrow_mut().push(format!("error {e}")),
      move || l3.borrow_mut().push("|".to_string()),
    );
    (log, subscription)
  }

  #[test]
  fn sequential() {
    let sources: Vec<Input<i32, String>> = vec![Input::new(vec![1, 2]), Input::new(vec![3])];
    let (log, _) = record(&concat(sources).unwrap());
    assert_eq!(*log.borrow(), vec!["1", "2", "3", "|"]);
  }

  #[test]
  fn next_source_waits_for_completion() {
    let subscribed = Rc::new(RefCell::new(false));
    let c_subscribed = subscribed.clone();
    let second = Observable::<i32, String>::new(move |s| {
      *c_subscribed.borrow_mut() = true;
      s.complete();
    });
    let (log, subscription) = record(&concat(vec![never(), second]).unwrap());
    assert!(!*subscribed.borrow());
    assert!(log.borrow().is_empty());
    subscription.unsubscribe().unwrap();
    assert!(!*subscribed.borrow());
  }

  #[test]
  fn error_stops_sequence() {
    let sources: Vec<Observable<i32, String>> = vec![
      observable::from_array(vec![1]),
      observable::throw_err("bad".to_string()),
      observable::from_array(vec![2]),
    ];
    let (log, _) = record(&concat(sources).unwrap());
    assert_eq!(*log.borrow(), vec!["1", "error bad"]);
  }

  #[test]
  fn single_source_is_reused() {
    let source = observable::of::<_, String>(1);
    assert!(concat(vec![source]).unwrap().is_scalar());
  }

  #[test]
  fn zero_sources_complete() {
    let (log, _) = record(&concat(Vec::<Vec<i32>>::new()).unwrap());
    assert_eq!(*log.borrow(), vec!["|"]);
  }

  #[test]
  fn scheduled_subscriptions() {
    let scheduler = TestScheduler::new();
    let (log, _) = record(
      &concat_scheduled(vec![vec![1], vec![2]], Rc::new(scheduler.clone())).unwrap(),
    );
    assert!(log.borrow().is_empty());
    assert_eq!(scheduler.pending_count(), 1);
    scheduler.flush();
    assert_eq!(*log.borrow(), vec!["1", "2", "|"]);
  }

  #[test]
  fn long_synchronous_chain() {
    let count = Rc::new(Cell::new(0));
    let done = Rc::new(Cell::new(false));
    let (c_count, c_done) = (count.clone(), done.clone());
    concat::<_, (), _, _>((0..10_000).map(|i| vec![i]))
      .unwrap()
      .subscribe_complete(move |_| c_count.set(c_count.get() + 1), move || c_done.set(true));
    assert_eq!(count.get(), 10_000);
    assert!(done.get());
  }

  #[test]
  fn later_source_completing_asynchronously_moves_on() {
    let scheduler = TestScheduler::new();
    let late = observable::timer(Duration::from_millis(5), 2, Rc::new(scheduler.clone()));
    let sources: Vec<Observable<i32, String>> =
      vec![observable::from_array(vec![1]), late, observable::from_array(vec![3])];
    let (log, _) = record(&concat(sources).unwrap());
    assert_eq!(*log.borrow(), vec!["1"]);
    scheduler.advance_by(Duration::from_millis(5));
    assert_eq!(*log.borrow(), vec!["1", "2", "3", "|"]);
  }

  #[test]
  fn unsubscribe_disposes_current_source_once() {
    let torn_down = Rc::new(Cell::new(0));
    let c_torn_down = torn_down.clone();
    let open = Observable::<i32, String>::new(move |_| {
      let c_torn_down = c_torn_down.clone();
      Teardown::action(move || c_torn_down.set(c_torn_down.get() + 1))
    });
    let (_, subscription) = record(&concat(vec![open.clone(), open]).unwrap());
    subscription.unsubscribe().unwrap();
    subscription.unsubscribe().unwrap();
    assert_eq!(torn_down.get(), 1);
  }
}
