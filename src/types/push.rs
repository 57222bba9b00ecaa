use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A browser push subscription in the shape produced by
/// `PushSubscription.toJSON()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscription {
    pub endpoint: String,
    /// Milliseconds since the unix epoch, as reported by the push service.
    #[serde(default)]
    pub expiration_time: Option<i64>,
    pub keys: SubscriptionKeys,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

impl PushSubscription {
    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        let millis = self.expiration_time?;
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000).ok()
    }

    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        matches!(self.expires_at(), Some(at) if at <= now)
    }
}

/// Options handed to the push service when creating a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeOptions {
    /// Every push must surface a visible notification.
    pub user_visible_only: bool,
    pub application_server_key: Vec<u8>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    #[default]
    Default,
    Granted,
    Denied,
}

impl PermissionState {
    pub fn as_str(self) -> &'static str {
        match self {
            PermissionState::Default => "default",
            PermissionState::Granted => "granted",
            PermissionState::Denied => "denied",
        }
    }

    /// Interprets a client-reported permission hint. Anything that is neither
    /// `default` nor `granted` counts as denied.
    pub fn from_hint(hint: Option<&str>) -> Self {
        match hint.map(str::trim) {
            None | Some("default") => PermissionState::Default,
            Some("granted") => PermissionState::Granted,
            Some(_) => PermissionState::Denied,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VapidConfig {
    pub private_key: String,
    pub public_key: String,
    pub subject: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VapidPublicKey {
    pub public_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsubscribeRequest {
    pub endpoint: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
}

impl Ack {
    pub const OK: Ack = Ack { ok: true };
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use time::format_description::well_known::Rfc3339;

    fn subscription(expiration_time: Option<i64>) -> PushSubscription {
        PushSubscription {
            endpoint: "https://push.example/abc".to_string(),
            expiration_time,
            keys: SubscriptionKeys {
                p256dh: "BEl6".to_string(),
                auth: "YXV0aA".to_string(),
            },
        }
    }

    #[test]
    fn push_subscription__should_parse_browser_json() {
        // Given
        let raw = r#"{"endpoint":"https://push.example/abc","expirationTime":null,"keys":{"p256dh":"BEl6","auth":"YXV0aA"}}"#;

        // When
        let parsed: PushSubscription = serde_json::from_str(raw).expect("parse subscription");

        // Then
        assert_eq!(parsed, subscription(None));
    }

    #[test]
    fn is_expired__should_compare_against_now() {
        let now = OffsetDateTime::parse("2025-01-12T09:30:00Z", &Rfc3339).expect("parse now");
        let now_millis = (now.unix_timestamp_nanos() / 1_000_000) as i64;

        assert!(!subscription(None).is_expired(now));
        assert!(subscription(Some(now_millis - 1)).is_expired(now));
        assert!(!subscription(Some(now_millis + 60_000)).is_expired(now));
    }

    #[test]
    fn from_hint__should_collapse_unknown_values_to_denied() {
        assert_eq!(PermissionState::from_hint(None), PermissionState::Default);
        assert_eq!(
            PermissionState::from_hint(Some("default")),
            PermissionState::Default
        );
        assert_eq!(
            PermissionState::from_hint(Some("granted")),
            PermissionState::Granted
        );
        assert_eq!(
            PermissionState::from_hint(Some("blocked")),
            PermissionState::Denied
        );
    }
}
