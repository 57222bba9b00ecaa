//! Per-user notification state held by the backend: policy acceptances,
//! push subscriptions and the notification feed.

use crate::types::notification::{NotificationItem, Severity};
use crate::types::push::PushSubscription;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

use std::collections::HashMap;
use std::path::Path;

pub const WELCOME_TITLE: &str = "Welcome to your energy community";
pub const WELCOME_BODY: &str = "Learn more about the app from your energy community manager.";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("notification not found")]
    NotificationNotFound,
    #[error("state file i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid state file: {0}")]
    Format(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Store {
    #[serde(default)]
    accounts: HashMap<String, Account>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub policy_acceptances: Vec<PolicyAcceptance>,
    #[serde(default)]
    pub webpush_enabled: bool,
    #[serde(default)]
    pub subscriptions: Vec<PushSubscription>,
    #[serde(default)]
    pub notifications: Vec<NotificationItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyAcceptance {
    pub policy_version: String,
    #[serde(with = "time::serde::rfc3339")]
    pub accepted_at: OffsetDateTime,
    #[serde(default)]
    pub accepted_from_ip: Option<String>,
}

impl Store {
    /// Loads a snapshot; a missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let contents = match std::fs::read(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_slice(&contents)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let encoded = serde_json::to_vec_pretty(self)?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, encoded)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Returns the user's account, creating it with a welcome notification on
    /// first contact.
    pub fn account(&mut self, user: &str, now: OffsetDateTime) -> &mut Account {
        self.accounts.entry(user.to_string()).or_insert_with(|| {
            tracing::info!(user, "creating notification account");
            Account {
                notifications: vec![NotificationItem {
                    id: uuid::Uuid::new_v4().to_string(),
                    created_at: now,
                    title: WELCOME_TITLE.to_string(),
                    body: WELCOME_BODY.to_string(),
                    severity: Severity::Info,
                    read_at: None,
                }],
                ..Default::default()
            }
        })
    }

    pub fn accepted_policy_version(&self, user: &str) -> Option<&str> {
        self.accounts
            .get(user)?
            .policy_acceptances
            .iter()
            .max_by_key(|acceptance| acceptance.accepted_at)
            .map(|acceptance| acceptance.policy_version.as_str())
    }

    /// Records acceptance of `version`, making it the latest acceptance.
    /// Returns false when it already was the latest.
    pub fn accept_policy(
        &mut self,
        user: &str,
        version: &str,
        ip: Option<String>,
        now: OffsetDateTime,
    ) -> bool {
        if self.accepted_policy_version(user) == Some(version) {
            return false;
        }
        let account = self.account(user, now);
        account.policy_acceptances.push(PolicyAcceptance {
            policy_version: version.to_string(),
            accepted_at: now,
            accepted_from_ip: ip,
        });
        true
    }

    pub fn webpush_enabled(&self, user: &str) -> bool {
        self.accounts
            .get(user)
            .is_some_and(|account| account.webpush_enabled)
    }

    pub fn set_webpush_enabled(&mut self, user: &str, enabled: bool, now: OffsetDateTime) {
        self.account(user, now).webpush_enabled = enabled;
    }

    /// Stores the subscription under `user`. The endpoint is the identity:
    /// any record with the same endpoint, for any user, is replaced.
    pub fn register_subscription(
        &mut self,
        user: &str,
        subscription: PushSubscription,
        now: OffsetDateTime,
    ) {
        for (owner, account) in self.accounts.iter_mut() {
            if owner != user {
                account
                    .subscriptions
                    .retain(|existing| existing.endpoint != subscription.endpoint);
            }
        }

        let subscriptions = &mut self.account(user, now).subscriptions;
        match subscriptions
            .iter_mut()
            .find(|existing| existing.endpoint == subscription.endpoint)
        {
            Some(existing) => *existing = subscription,
            None => subscriptions.push(subscription),
        }
    }

    pub fn revoke_subscription(&mut self, user: &str, endpoint: &str) -> bool {
        let Some(account) = self.accounts.get_mut(user) else {
            return false;
        };
        let before = account.subscriptions.len();
        account
            .subscriptions
            .retain(|existing| existing.endpoint != endpoint);
        account.subscriptions.len() != before
    }

    /// Drops an endpoint the push service reported as gone.
    pub fn remove_endpoint(&mut self, endpoint: &str) -> bool {
        let mut removed = false;
        for account in self.accounts.values_mut() {
            let before = account.subscriptions.len();
            account
                .subscriptions
                .retain(|existing| existing.endpoint != endpoint);
            removed |= account.subscriptions.len() != before;
        }
        removed
    }

    pub fn subscriptions(&self, user: &str) -> Vec<PushSubscription> {
        self.accounts
            .get(user)
            .map(|account| account.subscriptions.clone())
            .unwrap_or_default()
    }

    pub fn has_account(&self, user: &str) -> bool {
        self.accounts.contains_key(user)
    }

    /// Newest first. Empty for a user without an account.
    pub fn notifications(&self, user: &str) -> Vec<NotificationItem> {
        let mut items = self
            .accounts
            .get(user)
            .map(|account| account.notifications.clone())
            .unwrap_or_default();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items
    }

    pub fn add_notification(&mut self, user: &str, item: NotificationItem, now: OffsetDateTime) {
        self.account(user, now).notifications.push(item);
    }

    /// Returns whether the item changed; marking a read item is a no-op.
    pub fn mark_read(
        &mut self,
        user: &str,
        id: &str,
        now: OffsetDateTime,
    ) -> Result<bool, StoreError> {
        let item = self
            .account(user, now)
            .notifications
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(StoreError::NotificationNotFound)?;
        Ok(item.mark_read(now))
    }

    /// Marks every currently unread item with the same timestamp.
    pub fn mark_all_read(&mut self, user: &str, now: OffsetDateTime) -> usize {
        self.account(user, now)
            .notifications
            .iter_mut()
            .map(|item| item.mark_read(now))
            .filter(|changed| *changed)
            .count()
    }
}
