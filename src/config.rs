use std::path::PathBuf;
use time::Duration;

pub const DEFAULT_AUTH_COOKIE_NAME: &str = "wattpush_session";
pub const DEFAULT_POLICY_VERSION: &str = "2024-01-01";

pub fn default_auth_token_ttl() -> Duration {
    Duration::days(14)
}

#[derive(Clone)]
pub struct AppConfig {
    pub app_name: String,
    /// Policy version users must have accepted to pass the terms gate.
    pub policy_version: String,
    /// JSON snapshot of the store, reloaded at start when present.
    pub state_file: Option<PathBuf>,
    pub vapid_private_key: Option<String>,
    pub vapid_public_key: Option<String>,
    pub vapid_subject: Option<String>,
    pub auth: Option<AuthConfig>,
}

#[derive(Clone)]
pub struct AuthConfig {
    pub key: String,
    pub token_ttl: Duration,
    pub cookie_name: String,
    pub cookie_secure: bool,
}

#[cfg(test)]
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "Wattpush".to_string(),
            policy_version: DEFAULT_POLICY_VERSION.to_string(),
            state_file: None,
            vapid_private_key: None,
            vapid_public_key: None,
            vapid_subject: None,
            auth: None,
        }
    }
}
