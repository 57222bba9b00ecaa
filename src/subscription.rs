//! Establishes, reuses and tears down the browser's push subscription.
//!
//! Every call re-derives its decision from the push service's current
//! subscription rather than from local state, so repeated or overlapping
//! calls (app reloads, worker activation racing app start) converge on the
//! single subscription a registration may hold.

use crate::codec::decode_signing_key;
use crate::error::{PlatformError, SubscriptionError};
use crate::permission::PermissionGate;
use crate::ports::{
    NotificationBackend, NotificationPlatform, PushManager, ServiceWorkerContainer, TimeProvider,
};
use crate::types::push::{PermissionState, PushSubscription, SubscribeOptions};

use serde::Serialize;

pub const SERVICE_WORKER_URL: &str = "/sw.js";
pub const SERVICE_WORKER_SCOPE: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotSubscribedReason {
    /// The platform has no notification or push capability.
    Unsupported,
    /// The user has not granted notification permission.
    PermissionDenied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubscribeOutcome {
    pub subscribed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<NotSubscribedReason>,
}

impl SubscribeOutcome {
    pub fn subscribed() -> Self {
        Self {
            subscribed: true,
            reason: None,
        }
    }

    pub fn not_subscribed(reason: NotSubscribedReason) -> Self {
        Self {
            subscribed: false,
            reason: Some(reason),
        }
    }
}

pub struct SubscriptionManager<N, W, B, T> {
    gate: PermissionGate<N>,
    workers: W,
    backend: B,
    time: T,
}

impl<N, W, B, T> SubscriptionManager<N, W, B, T>
where
    N: NotificationPlatform,
    W: ServiceWorkerContainer,
    B: NotificationBackend,
    T: TimeProvider,
{
    pub fn new(platform: N, workers: W, backend: B, time: T) -> Self {
        Self {
            gate: PermissionGate::new(platform),
            workers,
            backend,
            time,
        }
    }

    pub fn permission_gate(&self) -> &PermissionGate<N> {
        &self.gate
    }

    pub async fn ensure_subscribed(&self) -> Result<SubscribeOutcome, SubscriptionError> {
        if !self.gate.is_supported() {
            tracing::info!("push notifications unsupported on this platform");
            return Ok(SubscribeOutcome::not_subscribed(
                NotSubscribedReason::Unsupported,
            ));
        }

        if self.gate.request_permission().await != PermissionState::Granted {
            return Ok(SubscribeOutcome::not_subscribed(
                NotSubscribedReason::PermissionDenied,
            ));
        }

        let registration = self
            .workers
            .register(SERVICE_WORKER_URL, SERVICE_WORKER_SCOPE)
            .await?;
        let signing_key = self.backend.vapid_public_key().await?;

        // The backend copy may have been lost, so a reused subscription is
        // uploaded again every time.
        if let Some(existing) = self.live_subscription(&registration).await? {
            tracing::debug!(endpoint = %existing.endpoint, "reusing push subscription");
            self.backend.register_subscription(&existing).await?;
            return Ok(SubscribeOutcome::subscribed());
        }

        let options = SubscribeOptions {
            user_visible_only: true,
            application_server_key: decode_signing_key(&signing_key.public_key)?,
        };
        let created = registration.subscribe(&options).await?;
        tracing::info!(endpoint = %created.endpoint, "created push subscription");
        self.backend.register_subscription(&created).await?;
        Ok(SubscribeOutcome::subscribed())
    }

    /// Revokes the endpoint on the backend before dropping it from the push
    /// service. An interruption in between leaves a dead endpoint on the
    /// backend, never a live endpoint the backend has forgotten.
    pub async fn ensure_unsubscribed(&self) -> Result<(), SubscriptionError> {
        if !self.gate.is_supported() {
            return Ok(());
        }

        let registration = self
            .workers
            .register(SERVICE_WORKER_URL, SERVICE_WORKER_SCOPE)
            .await?;
        let current = match registration.get_subscription().await {
            Ok(current) => current,
            Err(PlatformError::StaleEndpoint) => None,
            Err(err) => return Err(err.into()),
        };
        let Some(current) = current else {
            tracing::debug!("no push subscription to remove");
            return Ok(());
        };

        self.backend.revoke_subscription(&current.endpoint).await?;
        registration.unsubscribe().await?;
        tracing::info!(endpoint = %current.endpoint, "removed push subscription");
        Ok(())
    }

    async fn live_subscription(
        &self,
        registration: &W::Registration,
    ) -> Result<Option<PushSubscription>, PlatformError> {
        match registration.get_subscription().await {
            Ok(Some(existing)) if existing.is_expired(self.time.now()) => {
                tracing::warn!(endpoint = %existing.endpoint, "push subscription expired");
                if let Err(err) = registration.unsubscribe().await {
                    tracing::warn!(error = %err, "failed to drop expired push subscription");
                }
                Ok(None)
            }
            Ok(existing) => Ok(existing),
            Err(PlatformError::StaleEndpoint) => {
                tracing::warn!("push service reported a stale endpoint");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}
