//! Navigation guard that keeps users with unaccepted policy terms on the
//! terms screens. Evaluated on every navigation from a fresh identity probe.

use crate::error::BackendError;
use crate::ports::NotificationBackend;
use crate::types::session::Me;

use serde::Serialize;

pub const ACCEPT_TERMS_PATH: &str = "/accept-terms";
pub const PUBLIC_PATHS: [&str; 3] = ["/privacy", "/terms", ACCEPT_TERMS_PATH];
/// See Other: the redirected request is re-issued as a GET.
pub const REDIRECT_STATUS: u16 = 303;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutData {
    pub me: Option<Me>,
    pub needs_terms: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Proceed(LayoutData),
    Redirect { status: u16, location: &'static str },
}

pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

/// Decides a navigation from the probe result. A failed probe renders the
/// anonymous shell instead of blocking the user.
pub fn evaluate(probe: Result<Me, BackendError>, path: &str) -> Navigation {
    let me = match probe {
        Ok(me) => me,
        Err(err) => {
            tracing::warn!(error = %err, "identity probe failed, continuing anonymously");
            return Navigation::Proceed(LayoutData {
                me: None,
                needs_terms: false,
            });
        }
    };

    let needs_terms = me.terms_required && !me.terms_state().is_satisfied();
    if needs_terms && !is_public_path(path) {
        return Navigation::Redirect {
            status: REDIRECT_STATUS,
            location: ACCEPT_TERMS_PATH,
        };
    }

    Navigation::Proceed(LayoutData {
        me: Some(me),
        needs_terms,
    })
}

pub async fn guard<B: NotificationBackend>(backend: &B, path: &str) -> Navigation {
    evaluate(backend.me().await, path)
}
