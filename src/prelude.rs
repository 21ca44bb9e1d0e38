//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

// Errors
pub use crate::error::{BoxError, SubscribeToError, TeardownError, UnsubscriptionError};
// Observable and its factories
pub use crate::observable::{self, Observable};
// Observer trait and closure observers
pub use crate::observer::{FnMutObserver, Observer, ObserverAll, ObserverComp, ObserverErr};
// Scheduler
pub use crate::scheduler::{Duration, Scheduler, SchedulerExt, SchedulerRef, TestScheduler};
// Subscriber and the outer/inner pair
pub use crate::subscriber::{subscribe_to_result, InnerSubscriber, OuterSubscriber, Subscriber};
// Subscription
pub use crate::subscription::*;
pub use crate::{
  notification::Notification,
  ops,
  subscribe_to::{
    register_adapter, subscribe_to, subscribe_to_scheduled, Adapter, AdapterRegistry, ArrayLike,
    Deferred, Input, IterInput, Iterable, ObservableInput, PullIterator,
  },
};
