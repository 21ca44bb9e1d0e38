//! Source adapter dispatch.
//!
//! Every combinator accepts heterogeneous inputs: observables, arrays,
//! deferred single values, pull iterators, strings. A value takes part by
//! implementing [`ObservableInput`], exposing whichever capabilities it has.
//! [`subscribe_to`] walks an ordered chain of [`Adapter`]s, the first one
//! recognising a capability wins:
//!
//! 1. observable
//! 2. interop observable
//! 3. array-like
//! 4. deferred value
//! 5. pull iterator
//! 6. adapters added with [`register_adapter`] or
//!    [`AdapterRegistry::register`], in registration order
//!
//! A value no adapter recognises yields
//! [`SubscribeToError::UnsupportedInput`] before any subscription work.

use std::{
  any::{Any, TypeId},
  cell::RefCell,
  collections::HashMap,
  rc::Rc,
};

use crate::{
  error::SubscribeToError,
  observable::Observable,
  scheduler::{Duration, SchedulerRef},
  subscription::Teardown,
};

mod array;
mod deferred;
mod iterable;

pub use array::ArrayLike;
pub use deferred::Deferred;
pub use iterable::{IterInput, Iterable, PullIterator};

pub(crate) use array::observe_array;
pub(crate) use iterable::observe_iterable;

/// A value that can be turned into an [`Observable`].
///
/// Every capability defaults to absent; implementors override the ones they
/// have. When several are present the earliest in dispatch order is used.
pub trait ObservableInput<Item, Err> {
  /// This value is an observable of this crate.
  fn observable(&self) -> Option<Observable<Item, Err>> { None }

  /// This value is a foreign producer that can present itself as an
  /// observable.
  fn interop_observable(&self) -> Option<Observable<Item, Err>> { None }

  /// Indexed access with a known length.
  fn array_like(&self) -> Option<Rc<dyn ArrayLike<Item>>> { None }

  /// A single value that becomes available later.
  fn deferred(&self) -> Option<Deferred<Item, Err>> { None }

  /// A source of fresh pull iterators.
  fn iterator(&self) -> Option<Rc<dyn Iterable<Item, Err>>> { None }

  /// Short rendering used in error messages.
  fn describe(&self) -> String;
}

/// Type-erased, clonable handle to any [`ObservableInput`], used to pass
/// differently shaped sources to one combinator.
///
/// ```rust
/// use rxcore::prelude::*;
///
/// let sources: Vec<Input<i32, ()>> = vec![
///   Input::new(vec![1, 2]),
///   Input::new(observable::of(3)),
///   Input::new(IterInput(4..6)),
/// ];
/// ops::concat(sources).unwrap().subscribe(|v| println!("{v}"));
/// ```
pub struct Input<Item, Err>(Rc<dyn ObservableInput<Item, Err>>);

impl<Item, Err> Input<Item, Err> {
  pub fn new(input: impl ObservableInput<Item, Err> + 'static) -> Self { Input(Rc::new(input)) }
}

impl<Item, Err> Clone for Input<Item, Err> {
  fn clone(&self) -> Self { Input(self.0.clone()) }
}

impl<Item, Err> ObservableInput<Item, Err> for Input<Item, Err> {
  fn observable(&self) -> Option<Observable<Item, Err>> { self.0.observable() }

  fn interop_observable(&self) -> Option<Observable<Item, Err>> { self.0.interop_observable() }

  fn array_like(&self) -> Option<Rc<dyn ArrayLike<Item>>> { self.0.array_like() }

  fn deferred(&self) -> Option<Deferred<Item, Err>> { self.0.deferred() }

  fn iterator(&self) -> Option<Rc<dyn Iterable<Item, Err>>> { self.0.iterator() }

  fn describe(&self) -> String { self.0.describe() }
}

// ==================== Built-in shapes ====================

impl<Item, Err> ObservableInput<Item, Err> for Observable<Item, Err> {
  fn observable(&self) -> Option<Observable<Item, Err>> { Some(self.clone()) }

  fn describe(&self) -> String { "Observable".to_string() }
}

impl<Item: Clone + 'static, Err> ObservableInput<Item, Err> for Vec<Item> {
  fn array_like(&self) -> Option<Rc<dyn ArrayLike<Item>>> { Some(Rc::new(self.clone())) }

  fn describe(&self) -> String { format!("array of {}", self.len()) }
}

impl<Item: Clone + 'static, Err, const N: usize> ObservableInput<Item, Err> for [Item; N] {
  fn array_like(&self) -> Option<Rc<dyn ArrayLike<Item>>> { Some(Rc::new(self.clone())) }

  fn describe(&self) -> String { format!("array of {N}") }
}

impl<Item: Clone + 'static, Err> ObservableInput<Item, Err> for Rc<[Item]> {
  fn array_like(&self) -> Option<Rc<dyn ArrayLike<Item>>> { Some(Rc::new(self.clone())) }

  fn describe(&self) -> String { format!("array of {}", self.len()) }
}

impl<Err: 'static> ObservableInput<char, Err> for String {
  fn iterator(&self) -> Option<Rc<dyn Iterable<char, Err>>> {
    Some(Rc::new(iterable::Chars(Rc::from(self.as_str()))))
  }

  fn describe(&self) -> String { format!("{self:?}") }
}

impl<Err: 'static> ObservableInput<char, Err> for &'static str {
  fn iterator(&self) -> Option<Rc<dyn Iterable<char, Err>>> {
    Some(Rc::new(iterable::Chars(Rc::from(*self))))
  }

  fn describe(&self) -> String { format!("{self:?}") }
}

/// `Some` delegates to the wrapped value; `None` exposes no capability.
impl<T, Item, Err> ObservableInput<Item, Err> for Option<T>
where
  T: ObservableInput<Item, Err>,
{
  fn observable(&self) -> Option<Observable<Item, Err>> { self.as_ref()?.observable() }

  fn interop_observable(&self) -> Option<Observable<Item, Err>> {
    self.as_ref()?.interop_observable()
  }

  fn array_like(&self) -> Option<Rc<dyn ArrayLike<Item>>> { self.as_ref()?.array_like() }

  fn deferred(&self) -> Option<Deferred<Item, Err>> { self.as_ref()?.deferred() }

  fn iterator(&self) -> Option<Rc<dyn Iterable<Item, Err>>> { self.as_ref()?.iterator() }

  fn describe(&self) -> String {
    match self {
      Some(inner) => inner.describe(),
      None => "None".to_string(),
    }
  }
}

/// The unit value exposes no capability.
impl<Item, Err> ObservableInput<Item, Err> for () {
  fn describe(&self) -> String { "()".to_string() }
}

// ==================== Adapters ====================

/// One link of the dispatch chain: recognises a capability of the input and
/// builds the observable for it.
pub trait Adapter<Item, Err> {
  /// Name used in logs.
  fn name(&self) -> &'static str;

  fn adapt(
    &self, input: &dyn ObservableInput<Item, Err>, scheduler: Option<&SchedulerRef>,
  ) -> Option<Observable<Item, Err>>;
}

struct ObservableAdapter;

impl<Item: 'static, Err: 'static> Adapter<Item, Err> for ObservableAdapter {
  fn name(&self) -> &'static str { "observable" }

  fn adapt(
    &self, input: &dyn ObservableInput<Item, Err>, scheduler: Option<&SchedulerRef>,
  ) -> Option<Observable<Item, Err>> {
    let observable = input.observable()?;
    Some(match scheduler {
      Some(scheduler) => subscribe_on(observable, scheduler.clone()),
      None => observable,
    })
  }
}

struct InteropAdapter;

impl<Item: 'static, Err: 'static> Adapter<Item, Err> for InteropAdapter {
  fn name(&self) -> &'static str { "interop" }

  fn adapt(
    &self, input: &dyn ObservableInput<Item, Err>, scheduler: Option<&SchedulerRef>,
  ) -> Option<Observable<Item, Err>> {
    let foreign = input.interop_observable()?;
    let wrapped = Observable::new(move |subscriber| {
      foreign.actual_subscribe(subscriber);
    });
    Some(match scheduler {
      Some(scheduler) => subscribe_on(wrapped, scheduler.clone()),
      None => wrapped,
    })
  }
}

struct ArrayAdapter;

impl<Item: 'static, Err: 'static> Adapter<Item, Err> for ArrayAdapter {
  fn name(&self) -> &'static str { "array" }

  fn adapt(
    &self, input: &dyn ObservableInput<Item, Err>, scheduler: Option<&SchedulerRef>,
  ) -> Option<Observable<Item, Err>> {
    Some(observe_array(input.array_like()?, scheduler.cloned()))
  }
}

struct DeferredAdapter;

impl<Item: 'static, Err: 'static> Adapter<Item, Err> for DeferredAdapter {
  fn name(&self) -> &'static str { "deferred" }

  fn adapt(
    &self, input: &dyn ObservableInput<Item, Err>, scheduler: Option<&SchedulerRef>,
  ) -> Option<Observable<Item, Err>> {
    Some(input.deferred()?.into_observable(scheduler.cloned()))
  }
}

struct IterableAdapter;

impl<Item: 'static, Err: 'static> Adapter<Item, Err> for IterableAdapter {
  fn name(&self) -> &'static str { "iterable" }

  fn adapt(
    &self, input: &dyn ObservableInput<Item, Err>, scheduler: Option<&SchedulerRef>,
  ) -> Option<Observable<Item, Err>> {
    Some(observe_iterable(input.iterator()?, scheduler.cloned()))
  }
}

/// Subscribe `source` on a scheduled step instead of synchronously. Scalar
/// observables are returned as they are.
fn subscribe_on<Item: 'static, Err: 'static>(
  source: Observable<Item, Err>, scheduler: SchedulerRef,
) -> Observable<Item, Err> {
  if source.is_scalar() {
    return source;
  }
  Observable::new(move |subscriber| {
    let source = source.clone();
    let handle = scheduler.schedule(
      Box::new(move || {
        source.actual_subscribe(subscriber);
      }),
      Duration::ZERO,
    );
    Teardown::Subscription(handle)
  })
}

/// Ordered chain of adapters used to resolve inputs.
///
/// [`AdapterRegistry::new`] holds the built-in adapters; fallbacks added with
/// [`AdapterRegistry::register`] are consulted after them, in registration
/// order.
pub struct AdapterRegistry<Item, Err> {
  adapters: Vec<Rc<dyn Adapter<Item, Err>>>,
}

impl<Item: 'static, Err: 'static> AdapterRegistry<Item, Err> {
  pub fn new() -> Self {
    AdapterRegistry {
      adapters: vec![
        Rc::new(ObservableAdapter),
        Rc::new(InteropAdapter),
        Rc::new(ArrayAdapter),
        Rc::new(DeferredAdapter),
        Rc::new(IterableAdapter),
      ],
    }
  }

  /// Built-in adapters followed by every adapter registered on this thread
  /// with [`register_adapter`].
  pub fn with_registered() -> Self {
    let mut registry = Self::new();
    FALLBACKS.with(|fallbacks| {
      let fallbacks = fallbacks.borrow();
      if let Some(adapters) = fallbacks
        .get(&TypeId::of::<(Item, Err)>())
        .and_then(|any| any.downcast_ref::<Vec<Rc<dyn Adapter<Item, Err>>>>())
      {
        registry.adapters.extend(adapters.iter().cloned());
      }
    });
    registry
  }

  /// Append a fallback adapter.
  pub fn register(&mut self, adapter: impl Adapter<Item, Err> + 'static) -> &mut Self {
    self.adapters.push(Rc::new(adapter));
    self
  }

  pub fn resolve(
    &self, input: &dyn ObservableInput<Item, Err>, scheduler: Option<&SchedulerRef>,
  ) -> Result<Observable<Item, Err>, SubscribeToError> {
    for adapter in &self.adapters {
      if let Some(observable) = adapter.adapt(input, scheduler) {
        tracing::trace!(adapter = adapter.name(), "input adapted");
        return Ok(observable);
      }
    }
    let err = SubscribeToError::UnsupportedInput { description: input.describe() };
    tracing::debug!(error = err.as_label(), "no adapter recognised the input");
    Err(err)
  }
}

impl<Item: 'static, Err: 'static> Default for AdapterRegistry<Item, Err> {
  fn default() -> Self { Self::new() }
}

thread_local! {
  static FALLBACKS: RefCell<HashMap<TypeId, Box<dyn Any>>> = RefCell::new(HashMap::new());
}

/// Append a fallback adapter to this thread's default registry, used by
/// [`subscribe_to`] and every combinator.
pub fn register_adapter<Item: 'static, Err: 'static>(adapter: impl Adapter<Item, Err> + 'static) {
  FALLBACKS.with(|fallbacks| {
    let mut fallbacks = fallbacks.borrow_mut();
    let entry = fallbacks
      .entry(TypeId::of::<(Item, Err)>())
      .or_insert_with(|| Box::new(Vec::<Rc<dyn Adapter<Item, Err>>>::new()));
    if let Some(adapters) = entry.downcast_mut::<Vec<Rc<dyn Adapter<Item, Err>>>>() {
      adapters.push(Rc::new(adapter));
    }
  });
}

/// Resolve `input` into an observable through the default dispatch chain.
pub fn subscribe_to<Item, Err>(
  input: &dyn ObservableInput<Item, Err>,
) -> Result<Observable<Item, Err>, SubscribeToError>
where
  Item: 'static,
  Err: 'static,
{
  AdapterRegistry::with_registered().resolve(input, None)
}

/// Like [`subscribe_to`], with delivery driven by `scheduler`: arrays and
/// iterators emit one value per scheduled step, deferred values are
/// delivered on a scheduled step and observables are subscribed on one.
/// Scalar observables still deliver synchronously.
pub fn subscribe_to_scheduled<Item, Err>(
  input: &dyn ObservableInput<Item, Err>, scheduler: SchedulerRef,
) -> Result<Observable<Item, Err>, SubscribeToError>
where
  Item: 'static,
  Err: 'static,
{
  AdapterRegistry::with_registered().resolve(input, Some(&scheduler))
}

/// Resolve every input, failing on the first unsupported one.
pub(crate) fn resolve_all<Item, Err, S>(
  sources: impl IntoIterator<Item = S>,
) -> Result<Vec<Observable<Item, Err>>, SubscribeToError>
where
  Item: 'static,
  Err: 'static,
  S: ObservableInput<Item, Err>,
{
  let registry = AdapterRegistry::with_registered();
  sources
    .into_iter()
    .map(|source| registry.resolve(&source, None))
    .collect()
}
