use std::{cell::RefCell, rc::Rc};

use super::ObservableInput;
use crate::{
  observable::Observable,
  scheduler::{schedule_repeating, Duration, SchedulerRef},
  subscriber::Subscriber,
  subscription::Teardown,
};

/// A pull-based iterator, the protocol behind iterable inputs.
pub trait PullIterator<Item, Err> {
  /// The next value, a failure, or `None` once exhausted.
  fn pull(&mut self) -> Option<Result<Item, Err>>;

  /// Called when the consumer stops before the iterator is exhausted.
  fn close(&mut self) {}
}

/// Produces a fresh [`PullIterator`] for every subscription.
pub trait Iterable<Item, Err> {
  fn pull_iter(&self) -> Box<dyn PullIterator<Item, Err>>;
}

/// Lets any clonable [`IntoIterator`] take part as an iterable input.
///
/// ```rust
/// use rxcore::prelude::*;
///
/// let source: Observable<u32, ()> = observable::from(IterInput(1..4)).unwrap();
/// source.subscribe(|v| println!("{v}"));
/// ```
#[derive(Clone)]
pub struct IterInput<I>(pub I);

struct IterPull<I>(I);

impl<I: Iterator, Err> PullIterator<I::Item, Err> for IterPull<I> {
  #[inline]
  fn pull(&mut self) -> Option<Result<I::Item, Err>> { self.0.next().map(Ok) }
}

impl<I, Err> Iterable<I::Item, Err> for IterInput<I>
where
  I: IntoIterator + Clone,
  I::IntoIter: 'static,
{
  fn pull_iter(&self) -> Box<dyn PullIterator<I::Item, Err>> {
    Box::new(IterPull(self.0.clone().into_iter()))
  }
}

impl<I, Err> ObservableInput<I::Item, Err> for IterInput<I>
where
  I: IntoIterator + Clone + 'static,
  I::IntoIter: 'static,
{
  fn iterator(&self) -> Option<Rc<dyn Iterable<I::Item, Err>>> { Some(Rc::new(self.clone())) }

  fn describe(&self) -> String { "iterator".to_string() }
}

/// Characters of a string, pulled lazily.
pub(crate) struct Chars(pub(crate) Rc<str>);

struct CharsPull {
  text: Rc<str>,
  offset: usize,
}

impl<Err> PullIterator<char, Err> for CharsPull {
  fn pull(&mut self) -> Option<Result<char, Err>> {
    let c = self.text.get(self.offset..)?.chars().next()?;
    self.offset += c.len_utf8();
    Some(Ok(c))
  }
}

impl<Err> Iterable<char, Err> for Chars {
  fn pull_iter(&self) -> Box<dyn PullIterator<char, Err>> {
    Box::new(CharsPull { text: self.0.clone(), offset: 0 })
  }
}

type Cursor<Item, Err> = Rc<RefCell<Option<Box<dyn PullIterator<Item, Err>>>>>;

enum Pulled<Item, Err> {
  Value(Item),
  Done,
  Failed(Err),
}

/// Pull the next value; a finished iterator is dropped without `close()`.
fn pull_next<Item, Err>(cursor: &Cursor<Item, Err>) -> Pulled<Item, Err> {
  let mut slot = cursor.borrow_mut();
  match slot.as_mut().and_then(|iter| iter.pull()) {
    Some(Ok(value)) => Pulled::Value(value),
    Some(Err(err)) => {
      slot.take();
      Pulled::Failed(err)
    }
    None => {
      slot.take();
      Pulled::Done
    }
  }
}

/// Deliver one pulled item; returns whether pulling should go on.
fn deliver<Item, Err>(subscriber: &Subscriber<Item, Err>, pulled: Pulled<Item, Err>) -> bool {
  match pulled {
    Pulled::Value(value) => {
      subscriber.next(value);
      true
    }
    Pulled::Done => {
      subscriber.complete();
      false
    }
    Pulled::Failed(err) => {
      subscriber.error(err);
      false
    }
  }
}

/// Pull a fresh iterator of `iterable` for every subscription until it is
/// exhausted or the subscriber closes. An iterator abandoned before
/// exhaustion is closed.
pub(crate) fn observe_iterable<Item, Err>(
  iterable: Rc<dyn Iterable<Item, Err>>, scheduler: Option<SchedulerRef>,
) -> Observable<Item, Err>
where
  Item: 'static,
  Err: 'static,
{
  Observable::new(move |subscriber: Subscriber<Item, Err>| {
    let cursor: Cursor<Item, Err> = Rc::new(RefCell::new(Some(iterable.pull_iter())));
    let c_cursor = cursor.clone();
    let teardown = Teardown::action(move || {
      let abandoned = c_cursor.borrow_mut().take();
      if let Some(mut iter) = abandoned {
        iter.close();
      }
    });

    match scheduler.clone() {
      None => {
        while !subscriber.is_closed() && deliver(&subscriber, pull_next(&cursor)) {}
      }
      Some(scheduler) => {
        let owner = subscriber.subscription().clone();
        schedule_repeating(scheduler, Duration::ZERO, owner, move || {
          !subscriber.is_closed() && deliver(&subscriber, pull_next(&cursor))
        });
      }
    }
    teardown
  })
}

#[cfg(test)]
mod tests {
  use std::cell::Cell;

  use super::*;
  use crate::{observer::FnMutObserver, scheduler::TestScheduler, subscription::Subscription};

  struct Countdown {
    from: u32,
    closed: Rc<Cell<usize>>,
  }

  impl PullIterator<u32, String> for Countdown {
    fn pull(&mut self) -> Option<Result<u32, String>> {
      if self.from == 0 {
        return None;
      }
      self.from -= 1;
      Some(Ok(self.from))
    }

    fn close(&mut self) { self.closed.set(self.closed.get() + 1); }
  }

  struct Countdowns(Rc<Cell<usize>>);

  impl Iterable<u32, String> for Countdowns {
    fn pull_iter(&self) -> Box<dyn PullIterator<u32, String>> {
      Box::new(Countdown { from: 3, closed: self.0.clone() })
    }
  }

  #[test]
  fn fresh_iterator_per_subscription() {
    let closed = Rc::new(Cell::new(0));
    let source = observe_iterable(Rc::new(Countdowns(closed.clone())), None);
    let seen = Rc::new(RefCell::new(vec![]));
    let (s1, s2) = (seen.clone(), seen.clone());
    source.subscribe(move |v| s1.borrow_mut().push(v));
    source.subscribe(move |v| s2.borrow_mut().push(v));
    assert_eq!(*seen.borrow(), vec![2, 1, 0, 2, 1, 0]);
    // exhausted iterators are not closed
    assert_eq!(closed.get(), 0);
  }

  #[test]
  fn early_stop_closes_iterator() {
    let closed = Rc::new(Cell::new(0));
    let subscription = Subscription::empty();
    let c_subscription = subscription.clone();
    let observer = FnMutObserver(move |_: u32| {
      c_subscription.unsubscribe().unwrap();
    });
    observe_iterable(Rc::new(Countdowns(closed.clone())), None)
      .actual_subscribe(Subscriber::with_subscription(observer, subscription));
    assert_eq!(closed.get(), 1);
  }

  #[test]
  fn failure_is_forwarded() {
    struct Failing;
    impl Iterable<u32, String> for Failing {
      fn pull_iter(&self) -> Box<dyn PullIterator<u32, String>> {
        struct Once(bool);
        impl PullIterator<u32, String> for Once {
          fn pull(&mut self) -> Option<Result<u32, String>> {
            if std::mem::replace(&mut self.0, true) {
              Some(Err("broken".into()))
            } else {
              Some(Ok(1))
            }
          }
        }
        Box::new(Once(false))
      }
    }

    let log = Rc::new(RefCell::new(vec![]));
    let (l1, l2) = (log.clone(), log.clone());
    observe_iterable(Rc::new(Failing), None).subscribe_err(
      move |v| l1.borrow_mut().push(format!("next {v}")),
      move |e| l2.borrow_mut().push(format!("error {e}")),
    );
    assert_eq!(*log.borrow(), vec!["next 1", "error broken"]);
  }

  #[test]
  fn scheduled_unsubscribe_closes_iterator() {
    let scheduler = TestScheduler::new();
    let closed = Rc::new(Cell::new(0));
    let seen = Rc::new(RefCell::new(vec![]));
    let c_seen = seen.clone();
    let subscription = observe_iterable(
      Rc::new(Countdowns(closed.clone())),
      Some(Rc::new(scheduler.clone())),
    )
    .subscribe(move |v| c_seen.borrow_mut().push(v));
    assert!(seen.borrow().is_empty());

    subscription.unsubscribe().unwrap();
    scheduler.flush();
    assert!(seen.borrow().is_empty());
    assert_eq!(closed.get(), 1);
  }

  #[test]
  fn chars_handle_multibyte() {
    let mut iter = <Chars as Iterable<char, ()>>::pull_iter(&Chars(Rc::from("aß")));
    assert_eq!(iter.pull(), Some(Ok('a')));
    assert_eq!(iter.pull(), Some(Ok('ß')));
    assert_eq!(iter.pull(), None);
  }
}
