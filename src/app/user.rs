use crate::app::{ApiError, api_error};
use crate::client::PERMISSION_HEADER;
use crate::state;
use crate::types::push::{Ack, PermissionState};
use crate::types::session::{AcceptTermsRequest, Me, UserInfo};

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, State};
use axum::http::{HeaderMap, StatusCode};

pub(crate) async fn me(
    State(state): State<state::AppState>,
    Extension(user): Extension<UserInfo>,
    headers: HeaderMap,
) -> Json<Me> {
    let permission = PermissionState::from_hint(
        headers
            .get(PERMISSION_HEADER)
            .and_then(|value| value.to_str().ok()),
    );
    let policy_version = state.config.policy_version.clone();
    state.ensure_account(&user.sub);
    let (accepted_policy_version, webpush_enabled) = state.read(|store| {
        (
            store.accepted_policy_version(&user.sub).map(str::to_string),
            store.webpush_enabled(&user.sub),
        )
    });

    Json(Me {
        terms_required: accepted_policy_version.as_deref() != Some(policy_version.as_str()),
        user,
        policy_version,
        accepted_policy_version,
        notification_permission: permission,
        webpush_configured: webpush_enabled,
    })
}

pub(crate) async fn accept_terms(
    State(state): State<state::AppState>,
    Extension(user): Extension<UserInfo>,
    headers: HeaderMap,
    payload: Result<Json<AcceptTermsRequest>, JsonRejection>,
) -> Result<Json<Ack>, ApiError> {
    let Json(request) =
        payload.map_err(|_| api_error(StatusCode::BAD_REQUEST, "invalid request body"))?;
    if !request.accept {
        return Err(api_error(StatusCode::BAD_REQUEST, "accept must be true"));
    }

    let version = state.config.policy_version.clone();
    let ip = client_ip(&headers);
    let recorded = state.mutate_if(
        |store, now| store.accept_policy(&user.sub, &version, ip, now),
        |recorded| *recorded,
    );
    if recorded {
        tracing::info!(user = %user.sub, %version, "policy accepted");
    }
    Ok(Json(Ack::OK))
}

/// First hop of `X-Forwarded-For`, then `X-Real-IP`.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };
    if let Some(forwarded) = header("x-forwarded-for") {
        return forwarded.split(',').next().map(|ip| ip.trim().to_string());
    }
    header("x-real-ip").map(str::to_string)
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn client_ip__should_prefer_first_forwarded_hop() {
        // Given
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));

        // Then
        assert_eq!(client_ip(&headers), Some("203.0.113.7".to_string()));
    }

    #[test]
    fn client_ip__should_fall_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));

        assert_eq!(client_ip(&headers), Some("10.0.0.2".to_string()));
        assert_eq!(client_ip(&HeaderMap::new()), None);
    }
}
