use crate::app::api_error;
use crate::state;

use axum::body::Body;
use axum::extract::State;
use axum::http::header::COOKIE;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

/// Resolves the session cookie into a `UserInfo` request extension.
pub(crate) async fn auth_middleware(
    State(state): State<state::AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if is_auth_bypass_path(req.uri().path()) {
        return next.run(req).await;
    }

    let user = session_cookie(req.headers(), state.auth.cookie_name())
        .and_then(|token| state.auth.verify_token(token).ok());
    match user {
        Some(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        None => api_error(StatusCode::UNAUTHORIZED, "unauthorized").into_response(),
    }
}

fn is_auth_bypass_path(path: &str) -> bool {
    path == "/health"
}

fn session_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    for header in headers.get_all(COOKIE).iter() {
        if let Ok(raw) = header.to_str()
            && let Some(value) = cookie_from_header(raw, name)
        {
            return Some(value);
        }
    }
    None
}

fn cookie_from_header<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|part| {
        let (cookie_name, cookie_value) = part.trim().split_once('=')?;
        (cookie_name == name).then_some(cookie_value)
    })
}
