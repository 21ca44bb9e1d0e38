//! Subscription: the hierarchical cancellation primitive.
//!
//! A [`Subscription`] is a cheap handle to one node of a cancellation tree.
//! A node strongly owns its children and keeps only weak back-pointers to
//! its parents, so a child never extends the lifetime of its parent.
//! Unsubscribing a node runs its teardown and cascades to every child,
//! exactly once.

use std::fmt::{Debug, Formatter};

use smallvec::SmallVec;

use crate::{
  error::{BoxError, UnsubscriptionError},
  rc::{MutRc, RcDeref, RcDerefMut, WeakMutRc},
};

mod guard;
mod teardown;

pub use guard::SubscriptionGuard;
pub use teardown::{Teardown, TeardownAction};

#[derive(Default)]
struct SubscriptionState {
  closed: bool,
  teardown: Option<TeardownAction>,
  parent: Option<WeakMutRc<SubscriptionState>>,
  // Overflow list for the rare node linked under more than one parent.
  parents: SmallVec<[WeakMutRc<SubscriptionState>; 1]>,
  children: SmallVec<[Subscription; 2]>,
}

/// Handle to a node of the cancellation tree.
///
/// Cloning the handle does not create a new node: every clone observes and
/// controls the same state.
///
/// # Examples
///
/// ```rust
/// use rxcore::prelude::*;
///
/// let root = Subscription::empty();
/// let child = root.add(Teardown::action(|| println!("child disposed")));
/// assert_eq!(root.len(), 1);
///
/// root.unsubscribe().unwrap();
/// assert!(child.is_closed());
/// assert!(root.is_closed());
/// ```
#[derive(Clone, Default)]
pub struct Subscription(MutRc<SubscriptionState>);

impl Subscription {
  /// A subscription that runs `teardown` when unsubscribed.
  pub fn new(teardown: impl FnOnce() + 'static) -> Self {
    Self::from_action(Box::new(move || {
      teardown();
      Ok(())
    }))
  }

  /// A subscription whose teardown may fail; the failure is reported by
  /// [`Subscription::unsubscribe`] without aborting the rest of the walk.
  pub fn fallible<E>(teardown: impl FnOnce() -> Result<(), E> + 'static) -> Self
  where
    E: Into<BoxError>,
  {
    Self::from_action(Box::new(move || teardown().map_err(Into::into)))
  }

  /// An open subscription without a teardown action, used as a container.
  pub fn empty() -> Self { Self::default() }

  /// An already closed subscription.
  pub fn closed() -> Self {
    Self(MutRc::own(SubscriptionState { closed: true, ..Default::default() }))
  }

  pub(crate) fn from_action(action: TeardownAction) -> Self {
    Self(MutRc::own(SubscriptionState { teardown: Some(action), ..Default::default() }))
  }

  #[inline]
  pub fn is_closed(&self) -> bool { self.0.rc_deref().closed }

  /// Number of children currently linked under this node.
  pub fn len(&self) -> usize { self.0.rc_deref().children.len() }

  pub fn is_empty(&self) -> bool { self.len() == 0 }

  /// Whether both handles point to the same node.
  #[inline]
  pub fn ptr_eq(&self, other: &Subscription) -> bool { self.0.ptr_eq(&other.0) }

  /// Dispose this node and its whole subtree.
  ///
  /// All references to parents and children are released before any
  /// teardown runs, so a teardown that re-enters `unsubscribe` (on this
  /// node or an ancestor) finds a closed node and returns immediately.
  ///
  /// Every failure of every teardown in the subtree is collected; cleanup
  /// of the remaining nodes is never skipped. The failures are returned
  /// together, in walk order, once the whole subtree is disposed.
  pub fn unsubscribe(&self) -> Result<(), UnsubscriptionError> {
    let (teardown, parent, parents, children) = {
      let mut state = self.0.rc_deref_mut();
      if state.closed {
        return Ok(());
      }
      state.closed = true;
      (
        state.teardown.take(),
        state.parent.take(),
        std::mem::take(&mut state.parents),
        std::mem::take(&mut state.children),
      )
    };
    tracing::trace!(children = children.len(), "unsubscribing subscription");

    for parent in parent.into_iter().chain(parents) {
      if let Some(parent) = parent.upgrade() {
        Subscription(parent).detach_child(self);
      }
    }

    let mut errors: Vec<BoxError> = vec![];
    if let Some(teardown) = teardown {
      if let Err(err) = teardown() {
        UnsubscriptionError::flatten_into(err, &mut errors);
      }
    }
    for child in children {
      if let Err(err) = child.unsubscribe() {
        errors.extend(err.into_errors());
      }
    }

    if errors.is_empty() {
      Ok(())
    } else {
      tracing::debug!(failures = errors.len(), "teardown failures during unsubscription");
      Err(UnsubscriptionError::new(errors))
    }
  }

  /// Unsubscribe where no caller can receive the aggregate error; failures
  /// are reported through `tracing`.
  pub(crate) fn dispose(&self) {
    if let Err(err) = self.unsubscribe() {
      tracing::error!(error = %err, "teardown failed during disposal");
    }
  }

  /// Link `teardown` as a child of this node and return the linked node.
  ///
  /// - A bare action is wrapped in a new subscription.
  /// - An existing subscription is linked as is; adding this node to
  ///   itself, adding an already closed subscription or adding the same
  ///   child twice links nothing.
  /// - [`Teardown::Empty`] links nothing and yields a closed handle.
  ///
  /// If this node is already closed, the teardown runs immediately instead
  /// of being stored.
  pub fn add(&self, teardown: impl Into<Teardown>) -> Subscription {
    let child = match teardown.into() {
      Teardown::Empty => return Subscription::closed(),
      Teardown::Action(action) => Subscription::from_action(action),
      Teardown::Subscription(sub) => {
        if sub.ptr_eq(self) || sub.is_closed() {
          return sub;
        }
        sub
      }
    };

    if self.is_closed() {
      if let Err(err) = child.unsubscribe() {
        tracing::error!(error = %err, "teardown added to a closed subscription failed");
      }
      return child;
    }

    if child.link_parent(self) {
      self.0.rc_deref_mut().children.push(child.clone());
    }
    child
  }

  /// Unlink `child` from this node without disposing it.
  ///
  /// Safe to call with a subscription that was already removed or that was
  /// never a child of this node.
  pub fn remove(&self, child: &Subscription) {
    if child.ptr_eq(self) {
      return;
    }
    self.detach_child(child);
    child.unlink_parent(self);
  }

  /// Activates "RAII" behavior for this subscription. That means
  /// `unsubscribe()` will be called automatically as soon as the returned
  /// value goes out of scope.
  ///
  /// **Attention:** If you don't assign the return value to a variable,
  /// `unsubscribe()` is called immediately, which is probably not what you
  /// want!
  pub fn unsubscribe_when_dropped(self) -> SubscriptionGuard { SubscriptionGuard::new(self) }

  fn detach_child(&self, child: &Subscription) {
    self
      .0
      .rc_deref_mut()
      .children
      .retain(|c| !c.ptr_eq(child));
  }

  fn link_parent(&self, parent: &Subscription) -> bool {
    let mut state = self.0.rc_deref_mut();
    match &state.parent {
      None => state.parent = Some(parent.0.downgrade()),
      Some(p) if p.ptr_eq(&parent.0) => return false,
      Some(_) => {
        if state.parents.iter().any(|p| p.ptr_eq(&parent.0)) {
          return false;
        }
        state.parents.push(parent.0.downgrade());
      }
    }
    true
  }

  fn unlink_parent(&self, parent: &Subscription) {
    let mut state = self.0.rc_deref_mut();
    if state
      .parent
      .as_ref()
      .is_some_and(|p| p.ptr_eq(&parent.0))
    {
      state.parent = state.parents.pop();
    } else {
      state.parents.retain(|p| !p.ptr_eq(&parent.0));
    }
  }
}

impl Debug for Subscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let state = self.0.rc_deref();
    f.debug_struct("Subscription")
      .field("closed", &state.closed)
      .field("children", &state.children.len())
      .finish()
  }
}
