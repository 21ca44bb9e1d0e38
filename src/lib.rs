//! # rxcore: a push-based reactive subscription engine
//!
//! Single-threaded building blocks of [Reactive Extensions](http://reactivex.io/):
//! a disposable-resource tree, observers and subscribers, a source adapter
//! dispatch and the multi-source combinators `combine_latest`, `concat`,
//! `fork_join` and `race`.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxcore::prelude::*;
//!
//! let sources: Vec<Input<i32, ()>> = vec![
//!   Input::new(vec![1, 2]),
//!   Input::new(observable::of(10)),
//! ];
//! ops::combine_latest(sources)
//!   .unwrap()
//!   .subscribe(|v| println!("Value: {v:?}"));
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | Cold producer, re-executed for every subscription |
//! | [`Observer`] | Consumes `next`, `error`, and `complete` events |
//! | [`Subscriber`] | Observer bound to a subscription, enforcing the event contract |
//! | [`Subscription`] | Handle to cancel an active subscription and its subtree |
//! | [`Input`] | Any value the adapter dispatch can turn into an observable |
//!
//! Nothing here is `Send`: every type is built on `Rc` and `RefCell`.
//! Diagnostics go through [`tracing`](https://docs.rs/tracing); the crate
//! never installs a subscriber.
//!
//! [`Observable`]: observable::Observable
//! [`Observer`]: observer::Observer
//! [`Subscriber`]: subscriber::Subscriber
//! [`Subscription`]: subscription::Subscription
//! [`Input`]: subscribe_to::Input

pub mod error;
pub mod notification;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod rc;
pub mod scheduler;
pub mod subscribe_to;
pub mod subscriber;
pub mod subscription;

pub use crate::scheduler::Duration;
