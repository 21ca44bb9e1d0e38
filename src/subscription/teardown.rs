use super::Subscription;
use crate::error::BoxError;

/// A boxed teardown action; its failure is reported through the aggregate
/// error of [`Subscription::unsubscribe`].
pub type TeardownAction = Box<dyn FnOnce() -> Result<(), BoxError>>;

/// Everything that can be attached to a [`Subscription`] with
/// [`Subscription::add`], and what a subscribe function hands back to
/// release its resources.
#[derive(Default)]
pub enum Teardown {
  /// Nothing to release.
  #[default]
  Empty,
  /// A cleanup action, run at most once.
  Action(TeardownAction),
  /// A nested subscription, disposed with its parent.
  Subscription(Subscription),
}

impl Teardown {
  pub fn action(f: impl FnOnce() + 'static) -> Self {
    Teardown::Action(Box::new(move || {
      f();
      Ok(())
    }))
  }

  pub fn fallible<E>(f: impl FnOnce() -> Result<(), E> + 'static) -> Self
  where
    E: Into<BoxError>,
  {
    Teardown::Action(Box::new(move || f().map_err(Into::into)))
  }

  pub fn is_empty(&self) -> bool { matches!(self, Teardown::Empty) }
}

impl From<()> for Teardown {
  fn from(_: ()) -> Self { Teardown::Empty }
}

impl From<Subscription> for Teardown {
  fn from(sub: Subscription) -> Self { Teardown::Subscription(sub) }
}

impl From<Option<Subscription>> for Teardown {
  fn from(sub: Option<Subscription>) -> Self { sub.map_or(Teardown::Empty, Teardown::Subscription) }
}

impl From<TeardownAction> for Teardown {
  fn from(action: TeardownAction) -> Self { Teardown::Action(action) }
}
