use std::{cell::Cell, collections::VecDeque, rc::Rc};

use crate::{
  error::UnsubscriptionError,
  observer::{BoxedObserver, Observer},
  rc::{MutRc, RcDerefMut},
  subscription::{Subscription, Teardown},
};

mod outer;

pub use outer::{subscribe_to_result, InnerSubscriber, OuterSubscriber};

enum Terminal<Err> {
  Error(Err),
  Complete,
}

/// Implements the Observer contract on top of a Subscription. While the
/// Observer is the public API for consuming the values of an Observable, all
/// Observers get converted to a Subscriber, in order to provide Subscription
/// capabilities.
///
/// A subscriber
/// - suppresses `next` once it is stopped or closed,
/// - delivers at most one terminal event,
/// - disposes its subscription (and the subtree under it) right after
///   delivering `error` or `complete`,
/// - queues values pushed from inside the destination's own callback and
///   delivers them, in order, once that callback returns,
/// - releases its destination as soon as it is closed.
///
/// Cloning yields another handle to the same subscriber.
pub struct Subscriber<Item, Err> {
  destination: MutRc<Option<BoxedObserver<Item, Err>>>,
  stopped: Rc<Cell<bool>>,
  pending: MutRc<VecDeque<Item>>,
  deferred: MutRc<Option<Terminal<Err>>>,
  subscription: Subscription,
}

impl<Item, Err> Clone for Subscriber<Item, Err> {
  fn clone(&self) -> Self {
    Subscriber {
      destination: self.destination.clone(),
      stopped: self.stopped.clone(),
      pending: self.pending.clone(),
      deferred: self.deferred.clone(),
      subscription: self.subscription.clone(),
    }
  }
}

impl<Item: 'static, Err: 'static> Subscriber<Item, Err> {
  pub fn new(observer: impl Observer<Item, Err> + 'static) -> Self {
    Self::with_subscription(observer, Subscription::empty())
  }

  /// Build a subscriber whose lifetime is bound to `subscription`.
  pub fn with_subscription(
    observer: impl Observer<Item, Err> + 'static, subscription: Subscription,
  ) -> Self {
    let destination: MutRc<Option<BoxedObserver<Item, Err>>> = MutRc::own(Some(Box::new(observer)));
    let weak = destination.downgrade();
    subscription.add(Teardown::action(move || {
      if let Some(destination) = weak.upgrade() {
        // Busy means we are inside the destination's own callback; the
        // running call releases it once it returns.
        if let Ok(mut slot) = destination.try_rc_deref_mut() {
          slot.take();
        }
      }
    }));
    Subscriber {
      destination,
      stopped: Rc::new(Cell::new(false)),
      pending: MutRc::own(VecDeque::new()),
      deferred: MutRc::own(None),
      subscription,
    }
  }
}

impl<Item, Err> Subscriber<Item, Err> {
  pub fn next(&self, value: Item) {
    if self.is_closed() {
      return;
    }
    match self.destination.try_rc_deref_mut() {
      Ok(mut slot) => {
        if let Some(destination) = slot.as_mut() {
          destination.next(value);
        }
      }
      Err(_) => {
        // Raised from inside the destination's own `next`; delivered by the
        // running call once it returns.
        tracing::trace!("re-entrant next queued");
        self.pending.rc_deref_mut().push_back(value);
        return;
      }
    }
    self.after_delivery();
  }

  pub fn error(&self, err: Err) { self.terminate(Terminal::Error(err)); }

  pub fn complete(&self) { self.terminate(Terminal::Complete); }

  /// Whether the subscriber has stopped accepting values, either because a
  /// terminal event was delivered or because it was unsubscribed.
  #[inline]
  pub fn is_closed(&self) -> bool { self.stopped.get() || self.subscription.is_closed() }

  #[inline]
  pub fn is_stopped(&self) -> bool { self.stopped.get() }

  #[inline]
  pub fn subscription(&self) -> &Subscription { &self.subscription }

  /// Attach a teardown to this subscriber's subscription.
  pub fn add(&self, teardown: impl Into<Teardown>) -> Subscription { self.subscription.add(teardown) }

  pub fn unsubscribe(&self) -> Result<(), UnsubscriptionError> { self.subscription.unsubscribe() }

  fn terminate(&self, terminal: Terminal<Err>) {
    if self.is_closed() {
      return;
    }
    self.stopped.set(true);
    let destination = match self.destination.try_rc_deref_mut() {
      Ok(mut slot) => slot.take(),
      Err(_) => {
        // Raised from inside the destination's own `next`; delivered as soon
        // as that call returns.
        *self.deferred.rc_deref_mut() = Some(terminal);
        return;
      }
    };
    if let Some(mut destination) = destination {
      match terminal {
        Terminal::Error(err) => destination.error(err),
        Terminal::Complete => destination.complete(),
      }
    }
    self.subscription.dispose();
  }

  fn after_delivery(&self) {
    loop {
      let value = self.pending.rc_deref_mut().pop_front();
      let Some(value) = value else { break };
      if self.subscription.is_closed() {
        self.pending.rc_deref_mut().clear();
        break;
      }
      if let Ok(mut slot) = self.destination.try_rc_deref_mut() {
        if let Some(destination) = slot.as_mut() {
          destination.next(value);
        }
      }
    }
    let deferred = self.deferred.rc_deref_mut().take();
    if let Some(terminal) = deferred {
      let destination = self.destination.rc_deref_mut().take();
      if let Some(mut destination) = destination {
        match terminal {
          Terminal::Error(err) => destination.error(err),
          Terminal::Complete => destination.complete(),
        }
      }
      self.subscription.dispose();
    } else if self.subscription.is_closed() {
      // Unsubscribed while the destination was running.
      self.destination.rc_deref_mut().take();
    }
  }
}

impl<Item, Err> Observer<Item, Err> for Subscriber<Item, Err> {
  #[inline]
  fn next(&mut self, value: Item) { Subscriber::next(self, value) }

  #[inline]
  fn error(&mut self, err: Err) { Subscriber::error(self, err) }

  #[inline]
  fn complete(&mut self) { Subscriber::complete(self) }
}
