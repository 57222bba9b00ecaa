//! Pull-based view of delivered notifications. Read state lives on the
//! backend; nothing here is cached between calls.

use crate::error::BackendError;
use crate::ports::NotificationBackend;
use crate::types::notification::NotificationItem;

pub struct NotificationFeed<B> {
    backend: B,
}

impl<B: NotificationBackend> NotificationFeed<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Newest first, in the order the backend returns them.
    pub async fn list(&self) -> Result<Vec<NotificationItem>, BackendError> {
        self.backend.list_notifications().await
    }

    pub async fn mark_read(&self, id: &str) -> Result<(), BackendError> {
        self.backend.mark_read(id).await
    }

    pub async fn mark_all_read(&self) -> Result<(), BackendError> {
        self.backend.mark_all_read().await
    }

    pub async fn unread_count(&self) -> Result<usize, BackendError> {
        let items = self.list().await?;
        Ok(items.iter().filter(|item| !item.is_read()).count())
    }
}
