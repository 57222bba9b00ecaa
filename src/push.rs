use crate::ports::PushSender;
use crate::types::push::PushSubscription;

use serde::Serialize;
use serde_json::Value;

pub(crate) mod vapid;

pub use vapid::{VapidCredentials, generate_vapid_credentials};
pub(crate) use vapid::{VapidConfigStatus, load_vapid_config};

/// The JSON payload the service worker renders as a notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    pub data: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
    /// Endpoints the push service reported as permanently gone.
    pub gone: Vec<String>,
}

/// Sends `message` to every subscription. Failures never abort the fan-out.
pub async fn deliver<S: PushSender>(
    sender: &S,
    subscriptions: &[PushSubscription],
    message: &PushMessage,
) -> DeliveryReport {
    let mut report = DeliveryReport::default();
    let payload = match serde_json::to_vec(message) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::error!(%err, "failed to encode push payload");
            report.failed = subscriptions.len();
            return report;
        }
    };

    for subscription in subscriptions {
        match sender.send(subscription, &payload).await {
            Ok(()) => report.delivered += 1,
            Err(err) if S::is_gone(&err) => {
                tracing::info!(endpoint = %subscription.endpoint, "push endpoint gone");
                report.gone.push(subscription.endpoint.clone());
            }
            Err(err) => {
                tracing::warn!(endpoint = %subscription.endpoint, %err, "push delivery failed");
                report.failed += 1;
            }
        }
    }
    report
}
