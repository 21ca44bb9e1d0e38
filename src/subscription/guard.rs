use super::Subscription;

/// An RAII implementation of a "scoped subscribed" of a subscription.
/// When this structure is dropped (falls out of scope), the subscription will
/// be unsubscribed.
///
/// Teardown failures raised on drop have no caller to return to and are
/// logged instead.
///
/// If you want to drop it immediately, wrap it in its own scope
#[derive(Debug)]
#[must_use]
pub struct SubscriptionGuard(Option<Subscription>);

impl SubscriptionGuard {
  /// Wraps an existing subscription with a guard to enable RAII behavior for
  /// it.
  pub fn new(subscription: Subscription) -> SubscriptionGuard {
    SubscriptionGuard(Some(subscription))
  }

  /// Releases the subscription without unsubscribing it.
  pub fn into_inner(mut self) -> Subscription {
    self.0.take().unwrap_or_else(Subscription::closed)
  }
}

impl Drop for SubscriptionGuard {
  fn drop(&mut self) {
    let Some(subscription) = self.0.take() else { return };
    if let Err(err) = subscription.unsubscribe() {
      tracing::error!(error = %err, "teardown failed while dropping a subscription guard");
    }
  }
}
