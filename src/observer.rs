//! Observer trait and implementations
//!
//! The Observer trait defines the consumer of data in the reactive pattern.
//! It provides three methods: next (for values), error (for errors), and
//! complete (for stream completion).

// ============================================================================
// Observer Trait
// ============================================================================

/// Observer trait: The consumer of data in reactive programming
///
/// An Observer receives values, errors, and completion notifications from
/// an Observable. Every method takes `&mut self` so observers can be boxed
/// and stored behind a [`Subscriber`](crate::subscriber::Subscriber), which
/// is responsible for the contract that at most one terminal callback fires
/// and that no `next` follows it.
pub trait Observer<Item, Err> {
  /// Receive the next value from the observable
  fn next(&mut self, value: Item);

  /// Handle an error from the observable. Terminal.
  fn error(&mut self, err: Err);

  /// Handle completion of the observable. Terminal.
  fn complete(&mut self);
}

/// Boxed observer, the type-erased destination of every subscriber.
pub type BoxedObserver<Item, Err> = Box<dyn Observer<Item, Err>>;

impl<Item, Err, O> Observer<Item, Err> for Box<O>
where
  O: Observer<Item, Err> + ?Sized,
{
  #[inline]
  fn next(&mut self, value: Item) { (**self).next(value) }

  #[inline]
  fn error(&mut self, err: Err) { (**self).error(err) }

  #[inline]
  fn complete(&mut self) { (**self).complete() }
}

fn unhandled_error() {
  tracing::warn!("an error reached an observer without an error handler and was dropped");
}

// ============================================================================
// Closure adapters
// ============================================================================

/// A bare closure treated as the `next` handler.
///
/// Completion is ignored; an error is dropped and reported through
/// `tracing`.
#[derive(Clone)]
pub struct FnMutObserver<N>(pub N);

impl<N, Item, Err> Observer<Item, Err> for FnMutObserver<N>
where
  N: FnMut(Item),
{
  #[inline]
  fn next(&mut self, value: Item) { (self.0)(value); }

  fn error(&mut self, _err: Err) { unhandled_error(); }

  #[inline]
  fn complete(&mut self) {}
}

/// Observer built from a `next` and an `error` closure.
#[derive(Clone)]
pub struct ObserverErr<N, E> {
  next: N,
  error: E,
}

impl<N, E> ObserverErr<N, E> {
  pub fn new(next: N, error: E) -> Self { ObserverErr { next, error } }
}

impl<Item, Err, N, E> Observer<Item, Err> for ObserverErr<N, E>
where
  N: FnMut(Item),
  E: FnMut(Err),
{
  #[inline]
  fn next(&mut self, value: Item) { (self.next)(value); }

  #[inline]
  fn error(&mut self, err: Err) { (self.error)(err); }

  #[inline]
  fn complete(&mut self) {}
}

/// Observer built from a `next` and a `complete` closure.
#[derive(Clone)]
pub struct ObserverComp<N, C> {
  next: N,
  complete: C,
}

impl<N, C> ObserverComp<N, C> {
  pub fn new(next: N, complete: C) -> Self { ObserverComp { next, complete } }
}

impl<Item, Err, N, C> Observer<Item, Err> for ObserverComp<N, C>
where
  N: FnMut(Item),
  C: FnMut(),
{
  #[inline]
  fn next(&mut self, value: Item) { (self.next)(value); }

  fn error(&mut self, _err: Err) { unhandled_error(); }

  #[inline]
  fn complete(&mut self) { (self.complete)(); }
}

/// Observer built from all three closures.
#[derive(Clone)]
pub struct ObserverAll<N, E, C> {
  next: N,
  error: E,
  complete: C,
}

impl<N, E, C> ObserverAll<N, E, C> {
  pub fn new(next: N, error: E, complete: C) -> Self { ObserverAll { next, error, complete } }
}

impl<Item, Err, N, E, C> Observer<Item, Err> for ObserverAll<N, E, C>
where
  N: FnMut(Item),
  E: FnMut(Err),
  C: FnMut(),
{
  #[inline]
  fn next(&mut self, value: Item) { (self.next)(value); }

  #[inline]
  fn error(&mut self, err: Err) { (self.error)(err); }

  #[inline]
  fn complete(&mut self) { (self.complete)(); }
}

// ============================================================================
// Tests
// ============================================================================
