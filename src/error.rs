//! Error types shared across the crate.
//!
//! - [`UnsubscriptionError`]: one or more teardown actions failed while a
//!   subscription tree was being disposed.
//! - [`SubscribeToError`]: a value could not be adapted into an observable.
//! - [`TeardownError`]: a plain message error for fallible teardown actions.

use thiserror::Error;

/// Type-erased error raised by a teardown action.
///
/// Subscriptions are single-threaded, so no `Send` bound is required.
pub type BoxError = Box<dyn std::error::Error + 'static>;

/// Aggregate of every failure collected during one `unsubscribe()` walk.
///
/// Nested aggregates are flattened: a child subtree that failed contributes
/// its individual errors, never another `UnsubscriptionError`.
#[derive(Error, Debug)]
#[error("{} error(s) occurred during unsubscription: {}", .errors.len(), render(.errors))]
pub struct UnsubscriptionError {
  errors: Vec<BoxError>,
}

fn render(errors: &[BoxError]) -> String {
  errors
    .iter()
    .enumerate()
    .map(|(idx, e)| format!("{}) {}", idx + 1, e))
    .collect::<Vec<_>>()
    .join("; ")
}

impl UnsubscriptionError {
  pub(crate) fn new(errors: Vec<BoxError>) -> Self { Self { errors } }

  /// Push `err` into `errors`, unpacking it first if it is itself an
  /// aggregate.
  pub(crate) fn flatten_into(err: BoxError, errors: &mut Vec<BoxError>) {
    match err.downcast::<UnsubscriptionError>() {
      Ok(aggregate) => errors.extend(aggregate.errors),
      Err(err) => errors.push(err),
    }
  }

  /// The collected errors, in the order they were raised.
  pub fn errors(&self) -> &[BoxError] { &self.errors }

  pub fn into_errors(self) -> Vec<BoxError> { self.errors }

  pub fn len(&self) -> usize { self.errors.len() }

  pub fn is_empty(&self) -> bool { self.errors.is_empty() }
}

/// Errors raised by the source adapter dispatch.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubscribeToError {
  /// No adapter recognised the shape of the given value.
  #[error(
    "you provided '{description}' where a stream was expected; you can provide an \
     observable, a deferred value, an array or an iterable"
  )]
  UnsupportedInput { description: String },
}

impl SubscribeToError {
  /// Returns a short stable label for logs.
  pub fn as_label(&self) -> &'static str {
    match self {
      SubscribeToError::UnsupportedInput { .. } => "unsupported_input",
    }
  }
}

/// A message error, convenient as the failure of a fallible teardown.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TeardownError(pub String);

impl TeardownError {
  pub fn new(msg: impl Into<String>) -> Self { Self(msg.into()) }
}
