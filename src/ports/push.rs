use crate::error::PlatformError;
use crate::types::push::{PushSubscription, SubscribeOptions};

/// Server-side delivery of an encrypted payload to one subscription.
pub trait PushSender: Clone + Send + Sync + 'static {
    type Error: std::fmt::Display + Send + Sync + 'static;
    type Fut<'a>: Future<Output = Result<(), Self::Error>> + Send + 'a
    where
        Self: 'a;

    fn send<'a>(&'a self, subscription: &'a PushSubscription, payload: &'a [u8]) -> Self::Fut<'a>;

    /// Whether the push service reported the endpoint as permanently gone.
    fn is_gone(error: &Self::Error) -> bool;
}

/// The browser's push manager bound to one service worker registration.
///
/// A registration holds at most one live subscription at a time.
pub trait PushManager {
    fn get_subscription(
        &self,
    ) -> impl Future<Output = Result<Option<PushSubscription>, PlatformError>>;

    fn subscribe(
        &self,
        options: &SubscribeOptions,
    ) -> impl Future<Output = Result<PushSubscription, PlatformError>>;

    /// Drops the current subscription. Returns whether one was removed.
    fn unsubscribe(&self) -> impl Future<Output = Result<bool, PlatformError>>;
}

/// `navigator.serviceWorker`: registering an already registered script
/// yields the existing registration.
pub trait ServiceWorkerContainer {
    type Registration: PushManager;

    fn register(
        &self,
        script_url: &str,
        scope: &str,
    ) -> impl Future<Output = Result<Self::Registration, PlatformError>>;
}
