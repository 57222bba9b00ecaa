use crate::types::push::PermissionState;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Identity probe result returned by `GET /api/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Me {
    pub user: UserInfo,
    pub terms_required: bool,
    pub policy_version: String,
    #[serde(default)]
    pub accepted_policy_version: Option<String>,
    #[serde(default)]
    pub notification_permission: PermissionState,
    #[serde(default)]
    pub webpush_configured: bool,
}

impl Me {
    pub fn terms_state(&self) -> TermsAcceptanceState {
        TermsAcceptanceState {
            policy_version: self.policy_version.clone(),
            accepted_policy_version: self.accepted_policy_version.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermsAcceptanceState {
    pub policy_version: String,
    pub accepted_policy_version: Option<String>,
}

impl TermsAcceptanceState {
    pub fn is_satisfied(&self) -> bool {
        self.accepted_policy_version.as_deref() == Some(self.policy_version.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptTermsRequest {
    #[serde(default = "default_true")]
    pub accept: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnableNotificationsRequest {
    #[serde(default = "default_true")]
    pub enable: bool,
}

fn default_true() -> bool {
    true
}
