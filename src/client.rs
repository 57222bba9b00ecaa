//! reqwest adapter for the notification backend's REST API.
//!
//! Every request carries the session cookie and a JSON content type; any
//! non-2xx answer becomes [`BackendError::Status`] with the response text.

use crate::error::BackendError;
use crate::ports::NotificationBackend;
use crate::types::notification::NotificationItem;
use crate::types::push::{
    Ack, PermissionState, PushSubscription, UnsubscribeRequest, VapidPublicKey,
};
use crate::types::session::{AcceptTermsRequest, EnableNotificationsRequest, Me};

use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

pub const PERMISSION_HEADER: &str = "x-notification-permission";

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base: Url,
}

#[derive(Debug, Default)]
pub struct HttpBackendOptions {
    /// Raw `Cookie` header value, e.g. `wattpush_session=<token>`.
    pub session_cookie: Option<String>,
    /// Browser permission reported to `/api/me`.
    pub permission: Option<PermissionState>,
}

impl HttpBackend {
    pub fn new(base: Url, options: HttpBackendOptions) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(cookie) = options.session_cookie.as_deref() {
            let value = HeaderValue::from_str(cookie)
                .map_err(|err| BackendError::Transport(format!("invalid session cookie: {err}")))?;
            headers.insert(COOKIE, value);
        }
        if let Some(permission) = options.permission {
            headers.insert(
                PERMISSION_HEADER,
                HeaderValue::from_static(permission.as_str()),
            );
        }
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(transport)?;
        Ok(Self { client, base })
    }

    fn url(&self, path: &str) -> Result<Url, BackendError> {
        self.base
            .join(path)
            .map_err(|err| BackendError::InvalidRequest(format!("invalid url '{path}': {err}")))
    }

    /// `/api/notifications/{id}/read` with `id` percent-encoded as a single
    /// path segment. Dot segments cannot survive URL normalisation.
    fn notification_read_url(&self, id: &str) -> Result<Url, BackendError> {
        if matches!(id, "" | "." | "..") {
            return Err(BackendError::InvalidRequest(format!(
                "invalid notification id '{id}'"
            )));
        }
        let mut url = self.url("/api/notifications/")?;
        url.path_segments_mut()
            .map_err(|_| {
                BackendError::InvalidRequest(format!("base url '{}' cannot carry a path", self.base))
            })?
            .pop_if_empty()
            .push(id)
            .push("read");
        Ok(url)
    }

    async fn request<T, R>(&self, method: Method, url: Url, body: Option<&T>) -> Result<R, BackendError>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            let encoded = serde_json::to_vec(body)
                .map_err(|err| BackendError::Transport(format!("failed to encode body: {err}")))?;
            request = request.body(encoded);
        }

        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(transport)?;
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        serde_json::from_slice(&bytes).map_err(|err| BackendError::Decode(err.to_string()))
    }

    async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, BackendError> {
        self.request::<(), R>(Method::GET, self.url(path)?, None).await
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: Option<&T>) -> Result<(), BackendError> {
        self.post_url(self.url(path)?, body).await
    }

    async fn post_url<T: Serialize + ?Sized>(&self, url: Url, body: Option<&T>) -> Result<(), BackendError> {
        let _: Ack = self.request(Method::POST, url, body).await?;
        Ok(())
    }
}

fn transport(err: reqwest::Error) -> BackendError {
    BackendError::Transport(err.to_string())
}

impl NotificationBackend for HttpBackend {
    async fn me(&self) -> Result<Me, BackendError> {
        self.get("/api/me").await
    }

    async fn accept_terms(&self) -> Result<(), BackendError> {
        self.post("/api/terms/accept", Some(&AcceptTermsRequest { accept: true }))
            .await
    }

    async fn vapid_public_key(&self) -> Result<VapidPublicKey, BackendError> {
        self.get("/api/notifications/webpush/vapid-public-key").await
    }

    async fn register_subscription(
        &self,
        subscription: &PushSubscription,
    ) -> Result<(), BackendError> {
        self.post("/api/notifications/webpush/subscribe", Some(subscription))
            .await
    }

    async fn revoke_subscription(&self, endpoint: &str) -> Result<(), BackendError> {
        let body = UnsubscribeRequest {
            endpoint: endpoint.to_string(),
        };
        self.post("/api/notifications/webpush/unsubscribe", Some(&body))
            .await
    }

    async fn list_notifications(&self) -> Result<Vec<NotificationItem>, BackendError> {
        self.get("/api/notifications").await
    }

    async fn mark_read(&self, id: &str) -> Result<(), BackendError> {
        let url = self.notification_read_url(id)?;
        self.post_url::<()>(url, None).await
    }

    async fn mark_all_read(&self) -> Result<(), BackendError> {
        self.post::<()>("/api/notifications/read-all", None).await
    }

    async fn enable_notifications(&self) -> Result<(), BackendError> {
        let body = EnableNotificationsRequest { enable: true };
        self.post("/api/notifications/enable", Some(&body)).await
    }
}
