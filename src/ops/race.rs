use std::{
  cell::{Cell, RefCell},
  rc::Rc,
};

use crate::{
  error::SubscribeToError,
  observable::{self, Observable},
  subscribe_to::{resolve_all, ObservableInput},
  subscriber::{subscribe_to_result, OuterSubscriber, Subscriber},
  subscription::Subscription,
};

/// Mirrors the first source to notify anything.
///
/// Sources are subscribed in input order. The first `next`, `error` or
/// `complete` of any source makes it the winner: every other source is
/// unsubscribed at once, sources not yet subscribed never are, and from then
/// on only the winner is relayed. When several sources notify synchronously
/// during subscription the earliest one wins. A single source is returned
/// as it is and zero sources complete immediately.
///
/// Racing a source against [`timer`](crate::observable::timer) composes a
/// timeout.
pub fn race<Item, Err, I, S>(sources: I) -> Result<Observable<Item, Err>, SubscribeToError>
where
  Item: 'static,
  Err: 'static,
  I: IntoIterator<Item = S>,
  S: ObservableInput<Item, Err>,
{
  let mut sources = resolve_all(sources)?;
  match sources.len() {
    0 => return Ok(observable::empty()),
    1 => {
      if let Some(source) = sources.pop() {
        return Ok(source);
      }
    }
    _ => {}
  }
  Ok(Observable::new(move |downstream: Subscriber<Item, Err>| {
    let outer = Rc::new(RaceOuter {
      downstream: downstream.clone(),
      subscription: Subscription::empty(),
      winner: Cell::new(None),
      contenders: RefCell::new(Vec::with_capacity(sources.len())),
    });
    downstream.add(outer.subscription.clone());
    for (index, source) in sources.iter().enumerate() {
      if outer.winner.get().is_some() {
        break;
      }
      if let Some(inner) = subscribe_to_result(&outer, source, (), index) {
        outer.contenders.borrow_mut().push((index, inner));
      }
    }
  }))
}

struct RaceOuter<Item, Err> {
  downstream: Subscriber<Item, Err>,
  subscription: Subscription,
  winner: Cell<Option<usize>>,
  contenders: RefCell<Vec<(usize, Subscription)>>,
}

impl<Item, Err> RaceOuter<Item, Err> {
  /// Whether `index` may be relayed. The first caller becomes the winner and
  /// every other contender is unsubscribed.
  fn claim(&self, index: usize) -> bool {
    if let Some(winner) = self.winner.get() {
      return winner == index;
    }
    self.winner.set(Some(index));
    tracing::debug!(winner = index, "race: winner chosen");
    let losers = std::mem::take(&mut *self.contenders.borrow_mut());
    for (_, loser) in losers.into_iter().filter(|(i, _)| *i != index) {
      loser.dispose();
    }
    true
  }
}

impl<Item: 'static, Err: 'static> OuterSubscriber<(), Item, Err> for RaceOuter<Item, Err> {
  fn subscription(&self) -> &Subscription { &self.subscription }

  fn notify_next(self: Rc<Self>, _: (), value: Item, outer_index: usize, _: usize, _: &Subscription) {
    if self.claim(outer_index) {
      self.downstream.next(value);
    }
  }

  fn notify_error(self: Rc<Self>, err: Err, outer_index: usize, _: &Subscription) {
    if self.claim(outer_index) {
      self.subscription.dispose();
      self.downstream.error(err);
    }
  }

  fn notify_complete(self: Rc<Self>, outer_index: usize, _: &Subscription) {
    if self.claim(outer_index) {
      self.downstream.complete();
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    scheduler::{Duration, SchedulerRef, TestScheduler},
    subscribe_to::Input,
    subscription::Teardown,
  };

  type Log = Rc<RefCell<Vec<String>>>;

  fn record(source: &Observable<&'static str, String>) -> (Log, Subscription) {
    let log: Log = Rc::new(RefCell::new(vec![]));
    let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
    let subscription = source.subscribe_all(
      move |v| l1.borrow_mut().push(v.to_string()),
      move |e| l2.borrow_mut().push(format!("error {e}")),
      move || l3.borrow_mut().push("complete".to_string()),
    );
    (log, subscription)
  }

  /// A source emitting `value` every tick after `delay`, logging when it is
  /// torn down.
  fn ticking(
    scheduler: &SchedulerRef, delay: u64, value: &'static str, disposed: &Log,
  ) -> Observable<&'static str, String> {
    let (scheduler, disposed) = (scheduler.clone(), disposed.clone());
    Observable::new(move |s: Subscriber<&'static str, String>| {
      let ticks = observable::interval::<String>(Duration::from_millis(delay), scheduler.clone())
        .subscribe(move |_| s.next(value));
      let disposed = disposed.clone();
      Teardown::action(move || {
        ticks.dispose();
        disposed.borrow_mut().push(value.to_string());
      })
    })
  }

  #[test]
  fn earliest_timed_source_wins() {
    let scheduler = TestScheduler::new();
    let shared: SchedulerRef = Rc::new(scheduler.clone());
    let disposed: Log = Rc::default();
    let sources = vec![
      ticking(&shared, 5, "five", &disposed),
      ticking(&shared, 1, "one", &disposed),
      ticking(&shared, 3, "three", &disposed),
    ];
    let (log, subscription) = record(&race(sources).unwrap());

    scheduler.advance_by(Duration::from_millis(1));
    assert_eq!(*log.borrow(), vec!["one"]);
    assert_eq!(*disposed.borrow(), vec!["five", "three"]);

    scheduler.advance_by(Duration::from_millis(4));
    assert_eq!(*log.borrow(), vec!["one"; 5]);

    subscription.unsubscribe().unwrap();
    assert_eq!(*disposed.borrow(), vec!["five", "three", "one"]);
  }

  #[test]
  fn synchronous_tie_goes_to_earliest_index() {
    let subscribed = Rc::new(Cell::new(0));
    let c_subscribed = subscribed.clone();
    let counted = Observable::<&'static str, String>::new(move |s| {
      c_subscribed.set(c_subscribed.get() + 1);
      s.next("late");
    });
    let sources: Vec<Input<&'static str, String>> = vec![
      Input::new(observable::never()),
      Input::new(vec!["first", "again"]),
      Input::new(counted),
    ];
    let (log, _) = record(&race(sources).unwrap());
    assert_eq!(*log.borrow(), vec!["first", "again", "complete"]);
    assert_eq!(subscribed.get(), 0);
  }

  #[test]
  fn completion_wins_too() {
    let sources: Vec<Observable<&'static str, String>> =
      vec![observable::empty(), observable::from_array(vec!["a"])];
    let (log, _) = record(&race(sources).unwrap());
    assert_eq!(*log.borrow(), vec!["complete"]);
  }

  #[test]
  fn error_wins() {
    let sources: Vec<Observable<&'static str, String>> =
      vec![observable::throw_err("bad".to_string()), observable::of("a")];
    let (log, _) = record(&race(sources).unwrap());
    assert_eq!(*log.borrow(), vec!["error bad"]);
  }

  #[test]
  fn single_and_zero_sources() {
    let single = observable::of::<_, String>("solo");
    assert!(race(vec![single]).unwrap().is_scalar());
    let (log, _) = record(&race(Vec::<Vec<&'static str>>::new()).unwrap());
    assert_eq!(*log.borrow(), vec!["complete"]);
  }
}
