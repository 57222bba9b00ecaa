use crate::adapters::{SystemTimeProvider, WebPushSender};
use crate::auth as auth_service;
use crate::config;
use crate::push::{VapidConfigStatus, load_vapid_config};
use crate::state;
use crate::store::Store;

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use serde::Serialize;

use std::sync::{Arc, Mutex};

mod auth;
mod notifications;
mod push;
mod user;

#[derive(Serialize)]
pub(crate) struct ErrorResponse {
    pub(crate) error: &'static str,
}

pub(crate) type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, error: &'static str) -> ApiError {
    (status, Json(ErrorResponse { error }))
}

pub fn app(config: config::AppConfig) -> Router {
    router(build_state(config))
}

fn build_state(config: config::AppConfig) -> state::AppState {
    let auth = auth_service::AuthState::from_config(&config)
        .unwrap_or_else(|err| panic!("invalid auth configuration: {err}"));
    let store = match config.state_file.as_deref() {
        Some(path) => Store::load(path).unwrap_or_else(|err| {
            panic!("failed to load state file {}: {err}", path.display())
        }),
        None => Store::default(),
    };
    let push = push_sender(&config);
    state::AppState {
        config,
        auth,
        store: Arc::new(Mutex::new(store)),
        push,
        time: SystemTimeProvider,
    }
}

fn push_sender(config: &config::AppConfig) -> Option<WebPushSender> {
    let vapid = match load_vapid_config(config) {
        VapidConfigStatus::Ready(vapid) => vapid,
        VapidConfigStatus::Incomplete => {
            tracing::warn!("push notifications disabled: incomplete VAPID configuration");
            return None;
        }
        VapidConfigStatus::Missing => {
            tracing::info!("push notifications disabled: no VAPID configuration");
            return None;
        }
    };

    match WebPushSender::new(vapid) {
        Ok(sender) => Some(sender),
        Err(err) => {
            tracing::error!(%err, "push notifications disabled: failed to init web-push");
            None
        }
    }
}

fn router(state: state::AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/me", get(user::me))
        .route("/api/terms/accept", post(user::accept_terms))
        .route("/api/notifications", get(notifications::list))
        .route("/api/notifications/read-all", post(notifications::mark_all_read))
        .route("/api/notifications/enable", post(notifications::enable))
        .route("/api/notifications/{id}/read", post(notifications::mark_read))
        .route(
            "/api/notifications/webpush/vapid-public-key",
            get(push::vapid_public_key),
        )
        .route("/api/notifications/webpush/subscribe", post(push::subscribe))
        .route(
            "/api/notifications/webpush/unsubscribe",
            post(push::unsubscribe),
        )
        .route("/api/notifications/webpush/test", post(push::send_test))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}

pub(crate) async fn health() -> &'static str {
    "ok"
}
