use crate::error::WorkerError;
use crate::worker::{NotificationOptions, WindowClient};

/// Capabilities available to the background worker context.
pub trait WorkerPlatform {
    fn show_notification(
        &self,
        title: &str,
        options: &NotificationOptions,
    ) -> impl Future<Output = Result<(), WorkerError>>;

    fn close_notification(&self);

    /// All window clients of the origin, including uncontrolled ones.
    fn match_windows(&self) -> impl Future<Output = Result<Vec<WindowClient>, WorkerError>>;

    fn focus(&self, client_id: &str) -> impl Future<Output = Result<(), WorkerError>>;

    fn open_window(&self, url: &str) -> impl Future<Output = Result<(), WorkerError>>;
}
