//! Notification permission gate.
//!
//! Browsers silently ignore repeated prompts once the user has answered, so
//! the gate prompts at most once per session unless the user explicitly asks
//! to retry.

use crate::ports::NotificationPlatform;
use crate::types::push::PermissionState;

use std::sync::Mutex;

pub struct PermissionGate<P> {
    platform: P,
    prompted: Mutex<bool>,
}

impl<P: NotificationPlatform> PermissionGate<P> {
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            prompted: Mutex::new(false),
        }
    }

    pub fn is_supported(&self) -> bool {
        self.platform.is_supported()
    }

    pub fn current_permission(&self) -> PermissionState {
        self.platform.current_permission()
    }

    /// Resolves the permission, prompting only while it is still `default`
    /// and no prompt has been shown in this session.
    pub async fn request_permission(&self) -> PermissionState {
        let current = self.platform.current_permission();
        if current != PermissionState::Default {
            return current;
        }

        {
            let mut prompted = self.prompted.lock().expect("permission prompt lock");
            if *prompted {
                tracing::debug!("notification permission already requested this session");
                return current;
            }
            *prompted = true;
        }

        let answer = self.platform.request_permission().await;
        tracing::info!(permission = answer.as_str(), "notification permission answered");
        answer
    }

    /// Re-arms the prompt after an explicit user action.
    pub fn allow_retry(&self) {
        *self.prompted.lock().expect("permission prompt lock") = false;
    }
}
