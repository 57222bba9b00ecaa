use crate::app::{ApiError, api_error};
use crate::codec::decode_signing_key;
use crate::ports::PushSender;
use crate::push::{DeliveryReport, PushMessage, VapidConfigStatus, deliver, load_vapid_config};
use crate::state;
use crate::types::notification::{NotificationItem, Severity};
use crate::types::push::{Ack, PushSubscription, UnsubscribeRequest, VapidPublicKey};
use crate::types::session::UserInfo;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use reqwest::Url;
use serde::Serialize;

pub(crate) const TEST_TITLE: &str = "Test notification";
pub(crate) const TEST_BODY: &str = "Push notifications are working.";

pub(crate) async fn vapid_public_key(
    State(state): State<state::AppState>,
) -> Result<Json<VapidPublicKey>, ApiError> {
    match load_vapid_config(&state.config) {
        VapidConfigStatus::Ready(vapid) => Ok(Json(VapidPublicKey {
            public_key: vapid.public_key,
        })),
        VapidConfigStatus::Incomplete | VapidConfigStatus::Missing => Err(api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "push notifications are not configured",
        )),
    }
}

pub(crate) async fn subscribe(
    State(state): State<state::AppState>,
    Extension(user): Extension<UserInfo>,
    payload: Result<Json<PushSubscription>, JsonRejection>,
) -> Result<Json<Ack>, ApiError> {
    let Json(mut subscription) = payload
        .map_err(|_| api_error(StatusCode::BAD_REQUEST, "invalid subscription payload"))?;
    subscription.endpoint = subscription.endpoint.trim().to_string();
    validate_subscription(&subscription)?;

    tracing::info!(user = %user.sub, endpoint = %subscription.endpoint, "registering push subscription");
    state.mutate(|store, now| store.register_subscription(&user.sub, subscription, now));
    Ok(Json(Ack::OK))
}

fn validate_subscription(subscription: &PushSubscription) -> Result<(), ApiError> {
    let endpoint = subscription.endpoint.as_str();
    if endpoint.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "subscription endpoint missing",
        ));
    }
    if Url::parse(endpoint).is_err() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "subscription endpoint is not a url",
        ));
    }
    for key in [&subscription.keys.p256dh, &subscription.keys.auth] {
        match decode_signing_key(key) {
            Ok(bytes) if !bytes.is_empty() => {}
            _ => {
                return Err(api_error(
                    StatusCode::BAD_REQUEST,
                    "subscription keys must be base64url",
                ));
            }
        }
    }
    Ok(())
}

pub(crate) async fn unsubscribe(
    State(state): State<state::AppState>,
    Extension(user): Extension<UserInfo>,
    Json(request): Json<UnsubscribeRequest>,
) -> Json<Ack> {
    let endpoint = request.endpoint.trim();
    let removed = state.mutate_if(
        |store, _| store.revoke_subscription(&user.sub, endpoint),
        |removed| *removed,
    );
    tracing::info!(user = %user.sub, %endpoint, removed, "revoked push subscription");
    Json(Ack::OK)
}

#[derive(Debug, Serialize)]
pub(crate) struct TestPushResponse {
    pub(crate) ok: bool,
    pub(crate) delivered: usize,
    pub(crate) failed: usize,
    pub(crate) removed: usize,
}

pub(crate) async fn send_test(
    State(state): State<state::AppState>,
    Extension(user): Extension<UserInfo>,
) -> Result<Json<TestPushResponse>, ApiError> {
    let Some(sender) = state.push.clone() else {
        return Err(api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "push notifications are not configured",
        ));
    };

    let report = send_test_notification(&state, &user, &sender).await;
    Ok(Json(TestPushResponse {
        ok: true,
        delivered: report.delivered,
        failed: report.failed,
        removed: report.gone.len(),
    }))
}

/// Records an info notification for `user` and pushes it to each of their
/// endpoints, dropping the ones the push service reports as gone.
pub(crate) async fn send_test_notification<S: PushSender>(
    state: &state::AppState,
    user: &UserInfo,
    sender: &S,
) -> DeliveryReport {
    let item = NotificationItem {
        id: uuid::Uuid::new_v4().to_string(),
        created_at: state.now(),
        title: TEST_TITLE.to_string(),
        body: TEST_BODY.to_string(),
        severity: Severity::Info,
        read_at: None,
    };
    let message = PushMessage {
        title: item.title.clone(),
        body: item.body.clone(),
        data: serde_json::json!({ "id": item.id, "url": "/notifications" }),
    };
    let subscriptions = state.mutate(|store, now| {
        store.add_notification(&user.sub, item, now);
        store.subscriptions(&user.sub)
    });

    let report = deliver(sender, &subscriptions, &message).await;
    if !report.gone.is_empty() {
        state.mutate(|store, _| {
            for endpoint in &report.gone {
                store.remove_endpoint(endpoint);
            }
        });
    }
    report
}
