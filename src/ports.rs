pub mod backend;
pub mod permission;
pub mod push;
pub mod time;
pub mod worker;

pub use backend::NotificationBackend;
pub use permission::NotificationPlatform;
pub use push::{PushManager, PushSender, ServiceWorkerContainer};
pub use time::TimeProvider;
pub use worker::WorkerPlatform;
