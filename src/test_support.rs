//! In-memory stand-ins for the browser and backend capabilities.

use crate::codec::encode_key;
use crate::error::{BackendError, PlatformError};
use crate::ports::{
    NotificationBackend, NotificationPlatform, PushManager, ServiceWorkerContainer, TimeProvider,
};
use crate::types::notification::{NotificationItem, Severity};
use crate::types::push::{
    PermissionState, PushSubscription, SubscribeOptions, SubscriptionKeys, VapidPublicKey,
};
use crate::types::session::Me;

use std::sync::{Arc, Mutex};
use time::OffsetDateTime;

pub(crate) const TEST_VAPID_PUBLIC_KEY: &str =
    "BCRweRf_U5iQM4pKNucGRzM6OuLp8Hisa8yX0N2ePIf1oxKitvFT6qvuGgYoTxlMatMDaytXbZR3rVClc2w_p6U";

pub(crate) type CallLog = Arc<Mutex<Vec<String>>>;

pub(crate) fn calls(log: &CallLog) -> Vec<String> {
    log.lock().expect("call log lock").clone()
}

fn record(log: &CallLog, call: impl Into<String>) {
    log.lock().expect("call log lock").push(call.into());
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct FixedTime {
    pub(crate) now: OffsetDateTime,
}

impl Default for FixedTime {
    fn default() -> Self {
        Self {
            now: OffsetDateTime::from_unix_timestamp(1_736_674_200).expect("fixed time"),
        }
    }
}

impl TimeProvider for FixedTime {
    fn now(&self) -> OffsetDateTime {
        self.now
    }
}

#[derive(Clone)]
pub(crate) struct TestPlatform {
    pub(crate) supported: bool,
    pub(crate) state: Arc<Mutex<PermissionState>>,
    pub(crate) answer: PermissionState,
    pub(crate) prompts: Arc<Mutex<usize>>,
}

impl TestPlatform {
    pub(crate) fn new(state: PermissionState, answer: PermissionState) -> Self {
        Self {
            supported: true,
            state: Arc::new(Mutex::new(state)),
            answer,
            prompts: Arc::new(Mutex::new(0)),
        }
    }

    pub(crate) fn granting() -> Self {
        Self::new(PermissionState::Default, PermissionState::Granted)
    }

    pub(crate) fn prompt_count(&self) -> usize {
        *self.prompts.lock().expect("prompts lock")
    }
}

impl NotificationPlatform for TestPlatform {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn current_permission(&self) -> PermissionState {
        *self.state.lock().expect("state lock")
    }

    async fn request_permission(&self) -> PermissionState {
        *self.prompts.lock().expect("prompts lock") += 1;
        *self.state.lock().expect("state lock") = self.answer;
        self.answer
    }
}

/// Service worker container and push manager sharing one registration.
#[derive(Clone, Default)]
pub(crate) struct TestPushService {
    pub(crate) current: Arc<Mutex<Option<PushSubscription>>>,
    pub(crate) report_stale: Arc<Mutex<bool>>,
    pub(crate) created: Arc<Mutex<Vec<SubscribeOptions>>>,
    pub(crate) log: CallLog,
}

impl TestPushService {
    pub(crate) fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Default::default()
        }
    }

    pub(crate) fn with_subscription(self, subscription: PushSubscription) -> Self {
        *self.current.lock().expect("current lock") = Some(subscription);
        self
    }

    pub(crate) fn current(&self) -> Option<PushSubscription> {
        self.current.lock().expect("current lock").clone()
    }

    pub(crate) fn created(&self) -> Vec<SubscribeOptions> {
        self.created.lock().expect("created lock").clone()
    }
}

pub(crate) fn test_subscription(endpoint: &str) -> PushSubscription {
    PushSubscription {
        endpoint: endpoint.to_string(),
        expiration_time: None,
        keys: SubscriptionKeys {
            p256dh: encode_key(&[4u8; 65]),
            auth: encode_key(&[7u8; 16]),
        },
    }
}

impl ServiceWorkerContainer for TestPushService {
    type Registration = TestPushService;

    async fn register(
        &self,
        script_url: &str,
        scope: &str,
    ) -> Result<Self::Registration, PlatformError> {
        record(&self.log, format!("register:{script_url}:{scope}"));
        Ok(self.clone())
    }
}

impl PushManager for TestPushService {
    async fn get_subscription(&self) -> Result<Option<PushSubscription>, PlatformError> {
        tokio::task::yield_now().await;
        let stale = std::mem::take(&mut *self.report_stale.lock().expect("stale lock"));
        if stale {
            *self.current.lock().expect("current lock") = None;
            return Err(PlatformError::StaleEndpoint);
        }
        Ok(self.current())
    }

    async fn subscribe(&self, options: &SubscribeOptions) -> Result<PushSubscription, PlatformError> {
        tokio::task::yield_now().await;
        let mut current = self.current.lock().expect("current lock");
        if let Some(existing) = current.as_ref() {
            return Ok(existing.clone());
        }
        let mut created = self.created.lock().expect("created lock");
        created.push(options.clone());
        let subscription = test_subscription(&format!("https://push.example/sub-{}", created.len()));
        *current = Some(subscription.clone());
        record(&self.log, format!("push-subscribe:{}", subscription.endpoint));
        Ok(subscription)
    }

    async fn unsubscribe(&self) -> Result<bool, PlatformError> {
        let removed = self.current.lock().expect("current lock").take();
        if let Some(removed) = removed.as_ref() {
            record(&self.log, format!("push-unsubscribe:{}", removed.endpoint));
        }
        Ok(removed.is_some())
    }
}

#[derive(Clone)]
pub(crate) struct TestBackend {
    pub(crate) public_key: String,
    pub(crate) me: Arc<Mutex<Option<Me>>>,
    pub(crate) registered: Arc<Mutex<Vec<PushSubscription>>>,
    pub(crate) notifications: Arc<Mutex<Vec<NotificationItem>>>,
    pub(crate) time: Arc<Mutex<FixedTime>>,
    pub(crate) log: CallLog,
}

impl TestBackend {
    pub(crate) fn new(log: CallLog) -> Self {
        Self {
            public_key: TEST_VAPID_PUBLIC_KEY.to_string(),
            me: Arc::new(Mutex::new(None)),
            registered: Arc::new(Mutex::new(Vec::new())),
            notifications: Arc::new(Mutex::new(Vec::new())),
            time: Arc::new(Mutex::new(FixedTime::default())),
            log,
        }
    }

    pub(crate) fn registered_endpoints(&self) -> Vec<String> {
        self.registered
            .lock()
            .expect("registered lock")
            .iter()
            .map(|subscription| subscription.endpoint.clone())
            .collect()
    }

    pub(crate) fn advance(&self, by: time::Duration) {
        let mut time = self.time.lock().expect("time lock");
        time.now += by;
    }

    /// Appends a notification created at the backend's current time.
    pub(crate) fn deliver(&self, id: &str, severity: Severity) {
        let created_at = self.time.lock().expect("time lock").now;
        self.notifications
            .lock()
            .expect("notifications lock")
            .insert(
                0,
                NotificationItem {
                    id: id.to_string(),
                    created_at,
                    title: format!("Alert {id}"),
                    body: "Check your consumption.".to_string(),
                    severity,
                    read_at: None,
                },
            );
    }
}

impl NotificationBackend for TestBackend {
    async fn me(&self) -> Result<Me, BackendError> {
        record(&self.log, "me");
        self.me
            .lock()
            .expect("me lock")
            .clone()
            .ok_or(BackendError::Transport("connection refused".to_string()))
    }

    async fn accept_terms(&self) -> Result<(), BackendError> {
        record(&self.log, "accept-terms");
        let mut me = self.me.lock().expect("me lock");
        let me = me
            .as_mut()
            .ok_or(BackendError::Transport("connection refused".to_string()))?;
        me.accepted_policy_version = Some(me.policy_version.clone());
        me.terms_required = false;
        Ok(())
    }

    async fn vapid_public_key(&self) -> Result<VapidPublicKey, BackendError> {
        record(&self.log, "vapid-public-key");
        Ok(VapidPublicKey {
            public_key: self.public_key.clone(),
        })
    }

    async fn register_subscription(
        &self,
        subscription: &PushSubscription,
    ) -> Result<(), BackendError> {
        record(&self.log, format!("backend-subscribe:{}", subscription.endpoint));
        self.registered
            .lock()
            .expect("registered lock")
            .push(subscription.clone());
        Ok(())
    }

    async fn revoke_subscription(&self, endpoint: &str) -> Result<(), BackendError> {
        record(&self.log, format!("backend-unsubscribe:{endpoint}"));
        Ok(())
    }

    async fn list_notifications(&self) -> Result<Vec<NotificationItem>, BackendError> {
        record(&self.log, "list");
        Ok(self.notifications.lock().expect("notifications lock").clone())
    }

    async fn mark_read(&self, id: &str) -> Result<(), BackendError> {
        record(&self.log, format!("read:{id}"));
        let now = self.time.lock().expect("time lock").now;
        let mut notifications = self.notifications.lock().expect("notifications lock");
        let item = notifications
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(BackendError::Status {
                status: 404,
                body: r#"{"error":"notification not found"}"#.to_string(),
            })?;
        item.mark_read(now);
        Ok(())
    }

    async fn mark_all_read(&self) -> Result<(), BackendError> {
        record(&self.log, "read-all");
        let now = self.time.lock().expect("time lock").now;
        for item in self
            .notifications
            .lock()
            .expect("notifications lock")
            .iter_mut()
        {
            item.mark_read(now);
        }
        Ok(())
    }

    async fn enable_notifications(&self) -> Result<(), BackendError> {
        record(&self.log, "enable");
        Ok(())
    }
}
