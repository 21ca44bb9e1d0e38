use std::rc::Rc;

use futures::{
  future::{abortable, FutureExt, LocalBoxFuture, Shared},
  task::{LocalSpawn, LocalSpawnExt},
};

use super::ObservableInput;
use crate::{
  observable::Observable,
  scheduler::{Duration, SchedulerRef},
  subscriber::Subscriber,
  subscription::Teardown,
};

/// A single value that becomes available later: a future whose outcome is
/// shared by every subscription.
///
/// Subscribing spawns a task on `spawner` that waits for the outcome, then
/// emits `Ok(value)` followed by completion, or `Err(err)` as an error.
/// Unsubscribing aborts the task, so nothing is delivered afterwards.
pub struct Deferred<Item, Err> {
  observe: Rc<dyn Fn(Option<SchedulerRef>) -> Observable<Item, Err>>,
}

impl<Item, Err> Clone for Deferred<Item, Err> {
  fn clone(&self) -> Self { Deferred { observe: self.observe.clone() } }
}

impl<Item, Err> Deferred<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  pub fn new(
    future: impl std::future::Future<Output = Result<Item, Err>> + 'static,
    spawner: Rc<dyn LocalSpawn>,
  ) -> Self {
    let future = future.boxed_local().shared();
    let observe = move |scheduler: Option<SchedulerRef>| {
      observe_shared(future.clone(), spawner.clone(), scheduler)
    };
    Deferred { observe: Rc::new(observe) }
  }
}

impl<Item, Err> Deferred<Item, Err> {
  pub(crate) fn into_observable(self, scheduler: Option<SchedulerRef>) -> Observable<Item, Err> {
    (self.observe)(scheduler)
  }
}

fn observe_shared<Item, Err>(
  future: Shared<LocalBoxFuture<'static, Result<Item, Err>>>, spawner: Rc<dyn LocalSpawn>,
  scheduler: Option<SchedulerRef>,
) -> Observable<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  Observable::new(move |subscriber: Subscriber<Item, Err>| {
    let scheduler = scheduler.clone();
    let (task, handle) = abortable(future.clone().map(move |outcome| {
      match scheduler {
        Some(scheduler) => {
          let owner = subscriber.subscription().clone();
          let c_subscriber = subscriber.clone();
          owner.add(scheduler.schedule(
            Box::new(move || settle(&c_subscriber, outcome)),
            Duration::ZERO,
          ));
        }
        None => settle(&subscriber, outcome),
      }
    }));
    if let Err(err) = spawner.spawn_local(task.map(|_| ())) {
      tracing::error!(error = %err, "failed to spawn the task awaiting a deferred value");
    }
    Teardown::action(move || handle.abort())
  })
}

fn settle<Item, Err>(subscriber: &Subscriber<Item, Err>, outcome: Result<Item, Err>) {
  match outcome {
    Ok(value) => {
      subscriber.next(value);
      subscriber.complete();
    }
    Err(err) => subscriber.error(err),
  }
}

impl<Item, Err> ObservableInput<Item, Err> for Deferred<Item, Err> {
  fn deferred(&self) -> Option<Deferred<Item, Err>> { Some(self.clone()) }

  fn describe(&self) -> String { "deferred value".to_string() }
}
