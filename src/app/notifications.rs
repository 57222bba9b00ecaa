use crate::app::{ApiError, api_error};
use crate::state;
use crate::store::StoreError;
use crate::types::notification::NotificationItem;
use crate::types::push::Ack;
use crate::types::session::{EnableNotificationsRequest, UserInfo};

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;

pub(crate) async fn list(
    State(state): State<state::AppState>,
    Extension(user): Extension<UserInfo>,
) -> Json<Vec<NotificationItem>> {
    state.ensure_account(&user.sub);
    Json(state.read(|store| store.notifications(&user.sub)))
}

pub(crate) async fn mark_read(
    State(state): State<state::AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
) -> Result<Json<Ack>, ApiError> {
    let result = state.mutate_if(
        |store, now| store.mark_read(&user.sub, &id, now),
        |result| matches!(result, Ok(true)),
    );
    match result {
        Ok(_) => Ok(Json(Ack::OK)),
        Err(StoreError::NotificationNotFound) => Err(api_error(
            StatusCode::NOT_FOUND,
            "notification not found",
        )),
        Err(err) => {
            tracing::error!(%err, "failed to mark notification read");
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to update notification",
            ))
        }
    }
}

pub(crate) async fn mark_all_read(
    State(state): State<state::AppState>,
    Extension(user): Extension<UserInfo>,
) -> Json<Ack> {
    let changed = state.mutate_if(
        |store, now| store.mark_all_read(&user.sub, now),
        |changed| *changed > 0,
    );
    tracing::debug!(user = %user.sub, changed, "marked notifications read");
    Json(Ack::OK)
}

pub(crate) async fn enable(
    State(state): State<state::AppState>,
    Extension(user): Extension<UserInfo>,
    Json(request): Json<EnableNotificationsRequest>,
) -> Json<Ack> {
    state.mutate(|store, now| store.set_webpush_enabled(&user.sub, request.enable, now));
    tracing::info!(user = %user.sub, enabled = request.enable, "web push preference updated");
    Json(Ack::OK)
}
