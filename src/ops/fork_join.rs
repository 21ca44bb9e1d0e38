use std::{cell::RefCell, rc::Rc};

use crate::{
  error::SubscribeToError,
  observable::Observable,
  subscribe_to::{resolve_all, ObservableInput},
  subscriber::{subscribe_to_result, OuterSubscriber, Subscriber},
  subscription::Subscription,
};

/// Waits for every source to complete, then emits the last value of each,
/// in input order, and completes.
///
/// If a source completes without producing any value, the result completes
/// at once without emitting and every other source is unsubscribed. An
/// error of any source is forwarded immediately. Zero sources complete
/// immediately.
///
/// # Examples
///
/// ```
/// use rxcore::prelude::*;
///
/// let sources: Vec<Input<i32, ()>> = vec![Input::new(vec![1, 2, 3]), Input::new(vec![7])];
/// ops::fork_join(sources).unwrap().subscribe(|v| println!("{v:?}"));
///
/// // print log:
/// // [3, 7]
/// ```
pub fn fork_join<Item, Err, I, S>(sources: I) -> Result<Observable<Vec<Item>, Err>, SubscribeToError>
where
  Item: 'static,
  Err: 'static,
  I: IntoIterator<Item = S>,
  S: ObservableInput<Item, Err>,
{
  fork_join_with(sources, |values| values)
}

/// Like [`fork_join`], emitting `project(values)` instead of the values.
pub fn fork_join_with<Item, Out, Err, I, S, F>(
  sources: I, project: F,
) -> Result<Observable<Out, Err>, SubscribeToError>
where
  Item: 'static,
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
    let outer = Rc::new(ForkJoinOuter {
      downstream: downstream.clone(),
      subscription: Subscription::empty(),
      state: RefCell::new(ForkJoinState {
        values: (0..len).map(|_| None).collect(),
        completed: 0,
        have_values: 0,
      }),
      project: project.clone(),
    });
    downstream.add(outer.subscription.clone());
    for (index, source) in sources.iter().enumerate() {
      subscribe_to_result(&outer, source, (), index);
    }
  }))
}

struct ForkJoinState<Item> {
  values: Vec<Option<Item>>,
  completed: usize,
  have_values: usize,
}

enum Settled<Item> {
  Pending,
  Empty,
  All(Vec<Item>),
}

struct ForkJoinOuter<Item, Out, Err> {
  downstream: Subscriber<Out, Err>,
  subscription: Subscription,
  state: RefCell<ForkJoinState<Item>>,
  project: Rc<dyn Fn(Vec<Item>) -> Out>,
}

impl<Item, Out, Err> OuterSubscriber<(), Item, Err> for ForkJoinOuter<Item, Out, Err>
where
  Item: 'static,
  Out: 'static,
  Err: 'static,
{
  fn subscription(&self) -> &Subscription { &self.subscription }

  fn notify_next(self: Rc<Self>, _: (), value: Item, outer_index: usize, _: usize, _: &Subscription) {
    let mut state = self.state.borrow_mut();
    if state.values[outer_index].replace(value).is_none() {
      state.have_values += 1;
    }
  }

  fn notify_error(self: Rc<Self>, err: Err, _: usize, _: &Subscription) {
    self.subscription.dispose();
    self.downstream.error(err);
  }

  fn notify_complete(self: Rc<Self>, outer_index: usize, _: &Subscription) {
    let settled = {
      let mut state = self.state.borrow_mut();
      state.completed += 1;
      let len = state.values.len();
      if state.values[outer_index].is_none() {
        Settled::Empty
      } else if state.completed == len && state.have_values == len {
        Settled::All(std::mem::take(&mut state.values).into_iter().flatten().collect())
      } else {
        Settled::Pending
      }
    };
    match settled {
      Settled::Pending => {}
      Settled::Empty => {
        tracing::debug!(source = outer_index, "fork_join: source completed without a value");
        self.subscription.dispose();
        self.downstream.complete();
      }
      Settled::All(values) => {
        self.downstream.next((self.project)(values));
        self.downstream.complete();
      }
    }
  }
}
