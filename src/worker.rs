//! Background worker runtime: turns push payloads into visible notifications
//! and notification clicks into window focus or navigation.
//!
//! Both handlers are stateless. [`on_push`] and [`on_notification_click`]
//! describe the work as a list of [`WorkerAction`]s, and
//! [`ServiceWorkerRuntime`] carries those actions out, holding the triggering
//! event open until each one has resolved.

use crate::error::WorkerError;
use crate::ports::WorkerPlatform;

use serde::Serialize;
use serde_json::{Map, Value};

pub const DEFAULT_TITLE: &str = "REC Notification";
pub const DEFAULT_BODY: &str = "Open the app to see details.";
pub const NOTIFICATION_ICON: &str = "/icon-192.png";
pub const NOTIFICATION_BADGE: &str = "/badge-72.png";
pub const ROOT_URL: &str = "/";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationOptions {
    pub body: String,
    pub data: Value,
    pub icon: String,
    pub badge: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowClient {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkerAction {
    ShowNotification {
        title: String,
        options: NotificationOptions,
    },
    CloseNotification,
    FocusWindow {
        client_id: String,
    },
    OpenWindow {
        url: String,
    },
}

/// Builds the notification for a push payload. Unparseable or partial
/// payloads still produce a notification with default content.
pub fn on_push(payload: Option<&[u8]>) -> Vec<WorkerAction> {
    let fields = match payload.map(serde_json::from_slice::<Value>) {
        Some(Ok(Value::Object(fields))) => fields,
        Some(Ok(_)) | None => Map::new(),
        Some(Err(err)) => {
            tracing::warn!(error = %err, "push payload is not valid json");
            Map::new()
        }
    };

    let title = text_field(&fields, "title").unwrap_or(DEFAULT_TITLE);
    let body = text_field(&fields, "body").unwrap_or(DEFAULT_BODY);
    let data = match fields.get("data") {
        None | Some(Value::Null) => Value::Object(Map::new()),
        Some(data) => data.clone(),
    };

    vec![WorkerAction::ShowNotification {
        title: title.to_string(),
        options: NotificationOptions {
            body: body.to_string(),
            data,
            icon: NOTIFICATION_ICON.to_string(),
            badge: NOTIFICATION_BADGE.to_string(),
        },
    }]
}

fn text_field<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    fields
        .get(name)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}

/// Closes the clicked notification, then focuses an open window of the
/// origin or opens the root page when none exists.
pub fn on_notification_click(windows: &[WindowClient]) -> Vec<WorkerAction> {
    vec![WorkerAction::CloseNotification, window_action(windows)]
}

fn window_action(windows: &[WindowClient]) -> WorkerAction {
    match windows.first() {
        Some(window) => WorkerAction::FocusWindow {
            client_id: window.id.clone(),
        },
        None => WorkerAction::OpenWindow {
            url: ROOT_URL.to_string(),
        },
    }
}

pub struct ServiceWorkerRuntime<P> {
    platform: P,
}

impl<P: WorkerPlatform> ServiceWorkerRuntime<P> {
    pub fn new(platform: P) -> Self {
        Self { platform }
    }

    /// Resolves only after the notification is on screen.
    pub async fn handle_push(&self, payload: Option<&[u8]>) -> Result<(), WorkerError> {
        for action in on_push(payload) {
            self.perform(action).await?;
        }
        Ok(())
    }

    pub async fn handle_notification_click(&self) -> Result<(), WorkerError> {
        self.perform(WorkerAction::CloseNotification).await?;
        let windows = self.platform.match_windows().await?;
        self.perform(window_action(&windows)).await
    }

    async fn perform(&self, action: WorkerAction) -> Result<(), WorkerError> {
        match action {
            WorkerAction::ShowNotification { title, options } => {
                self.platform.show_notification(&title, &options).await
            }
            WorkerAction::CloseNotification => {
                self.platform.close_notification();
                Ok(())
            }
            WorkerAction::FocusWindow { client_id } => self.platform.focus(&client_id).await,
            WorkerAction::OpenWindow { url } => self.platform.open_window(&url).await,
        }
    }
}
