use crate::error::BackendError;
use crate::types::notification::NotificationItem;
use crate::types::push::{PushSubscription, VapidPublicKey};
use crate::types::session::Me;

/// The REST surface of the notification backend, as seen by the client.
pub trait NotificationBackend {
    fn me(&self) -> impl Future<Output = Result<Me, BackendError>>;

    /// Accepts the currently published policy version.
    fn accept_terms(&self) -> impl Future<Output = Result<(), BackendError>>;

    fn vapid_public_key(&self) -> impl Future<Output = Result<VapidPublicKey, BackendError>>;

    fn register_subscription(
        &self,
        subscription: &PushSubscription,
    ) -> impl Future<Output = Result<(), BackendError>>;

    fn revoke_subscription(&self, endpoint: &str)
    -> impl Future<Output = Result<(), BackendError>>;

    fn list_notifications(
        &self,
    ) -> impl Future<Output = Result<Vec<NotificationItem>, BackendError>>;

    fn mark_read(&self, id: &str) -> impl Future<Output = Result<(), BackendError>>;

    fn mark_all_read(&self) -> impl Future<Output = Result<(), BackendError>>;

    fn enable_notifications(&self) -> impl Future<Output = Result<(), BackendError>>;
}
