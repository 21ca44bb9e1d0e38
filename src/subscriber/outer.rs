//! Outer/inner mediator pair used by every operator that manages several
//! child subscriptions from one parent.
//!
//! An [`OuterSubscriber`] owns a subscription node under which every inner
//! subscription is linked. Each [`InnerSubscriber`] is tagged with the
//! `(outer_value, outer_index)` it was created for and routes the events of
//! its source back to the outer's `notify_*` hooks.

use std::rc::Rc;

use super::Subscriber;
use crate::{observable::Observable, observer::Observer, subscription::Subscription};

/// The parent side of the mediator pair.
///
/// Hooks receive `self` as an `Rc` so an outer can hand itself to new inner
/// subscribers (e.g. when `concat` moves to its next source). Implementors
/// keep their mutable state behind short-lived borrows and never hold one
/// while calling downstream or subscribing, because inner sources may call
/// back synchronously.
pub trait OuterSubscriber<V, Item, Err>: 'static {
  /// The node every inner subscription is linked under.
  fn subscription(&self) -> &Subscription;

  /// An inner source emitted `inner_value`; it is the `inner_index`-th
  /// value of the source subscribed for `(outer_value, outer_index)`.
  fn notify_next(
    self: Rc<Self>, outer_value: V, inner_value: Item, outer_index: usize, inner_index: usize,
    inner: &Subscription,
  );

  /// The inner source subscribed for `outer_index` failed.
  fn notify_error(self: Rc<Self>, err: Err, outer_index: usize, inner: &Subscription);

  /// The inner source subscribed for `outer_index` completed.
  fn notify_complete(self: Rc<Self>, outer_index: usize, inner: &Subscription);
}

/// The child side of the mediator pair: an observer forwarding every event
/// of one inner source to its outer, tagged.
///
/// It is always wrapped in a [`Subscriber`] sharing `subscription`, so once a
/// terminal hook returns the inner disposes itself and detaches from the
/// outer.
pub struct InnerSubscriber<O, V> {
  outer: Rc<O>,
  outer_value: V,
  outer_index: usize,
  inner_index: usize,
  subscription: Subscription,
}

impl<O, V> InnerSubscriber<O, V> {
  pub fn new(outer: Rc<O>, outer_value: V, outer_index: usize, subscription: Subscription) -> Self {
    InnerSubscriber { outer, outer_value, outer_index, inner_index: 0, subscription }
  }

  pub fn outer_index(&self) -> usize { self.outer_index }
}

impl<O, V, Item, Err> Observer<Item, Err> for InnerSubscriber<O, V>
where
  O: OuterSubscriber<V, Item, Err>,
  V: Clone,
{
  fn next(&mut self, value: Item) {
    let inner_index = self.inner_index;
    self.inner_index += 1;
    self.outer.clone().notify_next(
      self.outer_value.clone(),
      value,
      self.outer_index,
      inner_index,
      &self.subscription,
    );
  }

  fn error(&mut self, err: Err) {
    self
      .outer
      .clone()
      .notify_error(err, self.outer_index, &self.subscription);
  }

  fn complete(&mut self) {
    self
      .outer
      .clone()
      .notify_complete(self.outer_index, &self.subscription);
  }
}

/// Subscribe `result` with a new inner subscriber wired to `outer`.
///
/// The inner subscription is linked under the outer's subscription before
/// the source runs, so a synchronous terminal event on any source tears it
/// down with the rest of the tree. Returns `None` without subscribing when
/// the outer is already closed.
pub fn subscribe_to_result<O, V, Item, Err>(
  outer: &Rc<O>, result: &Observable<Item, Err>, outer_value: V, outer_index: usize,
) -> Option<Subscription>
where
  O: OuterSubscriber<V, Item, Err>,
  V: Clone + 'static,
  Item: 'static,
  Err: 'static,
{
  if outer.subscription().is_closed() {
    return None;
  }
  let inner = outer.subscription().add(Subscription::empty());
  let observer = InnerSubscriber::new(outer.clone(), outer_value, outer_index, inner.clone());
  result.actual_subscribe(Subscriber::with_subscription(observer, inner.clone()));
  Some(inner)
}

#[cfg(test)]
mod tests {
  use std::cell::RefCell;

  use super::*;
  use crate::{observable, subscription::Teardown};

  #[derive(Default)]
  struct Recorder {
    subscription: Subscription,
    log: RefCell<Vec<String>>,
  }

  impl OuterSubscriber<&'static str, i32, String> for Recorder {
    fn subscription(&self) -> &Subscription { &self.subscription }

    fn notify_next(
      self: Rc<Self>, outer_value: &'static str, inner_value: i32, outer_index: usize,
      inner_index: usize, _inner: &Subscription,
    ) {
      self
        .log
        .borrow_mut()
        .push(format!("{outer_value}[{outer_index}]#{inner_index}={inner_value}"));
    }

    fn notify_error(self: Rc<Self>, err: String, outer_index: usize, _inner: &Subscription) {
      self
        .log
        .borrow_mut()
        .push(format!("error[{outer_index}] {err}"));
    }

    fn notify_complete(self: Rc<Self>, outer_index: usize, inner: &Subscription) {
      self
        .log
        .borrow_mut()
        .push(format!("complete[{outer_index}] closed={}", inner.is_closed()));
    }
  }

  #[test]
  fn inner_tags_every_event() {
    let outer = Rc::new(Recorder::default());
    let inner = subscribe_to_result(&outer, &observable::from_array(vec![7, 8]), "a", 3).unwrap();

    assert_eq!(
      *outer.log.borrow(),
      vec!["a[3]#0=7", "a[3]#1=8", "complete[3] closed=false"]
    );
    // the inner disposed itself and left the outer
    assert!(inner.is_closed());
    assert_eq!(outer.subscription.len(), 0);
  }

  #[test]
  fn inner_error_is_routed() {
    let outer = Rc::new(Recorder::default());
    subscribe_to_result(&outer, &observable::throw_err("bad".to_string()), "b", 0);
    assert_eq!(*outer.log.borrow(), vec!["error[0] bad"]);
  }

  #[test]
  fn closed_outer_skips_subscription() {
    let outer = Rc::new(Recorder::default());
    outer.subscription.unsubscribe().unwrap();
    let subscribed = Rc::new(RefCell::new(false));
    let c_subscribed = subscribed.clone();
    let source = Observable::<i32, String>::new(move |_| {
      *c_subscribed.borrow_mut() = true;
      Teardown::Empty
    });
    assert!(subscribe_to_result(&outer, &source, "c", 0).is_none());
    assert!(!*subscribed.borrow());
  }

  #[test]
  fn unsubscribing_outer_reaches_open_inners() {
    let outer = Rc::new(Recorder::default());
    let torn_down = Rc::new(RefCell::new(0));
    let c_torn_down = torn_down.clone();
    let source = Observable::<i32, String>::new(move |_| {
      let c_torn_down = c_torn_down.clone();
      Teardown::action(move || *c_torn_down.borrow_mut() += 1)
    });
    subscribe_to_result(&outer, &source, "d", 0);
    subscribe_to_result(&outer, &source, "d", 1);
    assert_eq!(outer.subscription.len(), 2);

    outer.subscription.unsubscribe().unwrap();
    outer.subscription.unsubscribe().unwrap();
    assert_eq!(*torn_down.borrow(), 2);
  }
}
