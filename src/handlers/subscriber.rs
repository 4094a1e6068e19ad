use axum::{extract::Path, extract::State, http::StatusCode, Json};

use crate::models::subscriber::{
    ErrorResponse, RegisterSubscriberRequest, RegisterSubscriberResponse,
};
use crate::AppState;

fn db_error(e: sea_orm::DbErr) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: format!("Database error: {}", e),
        }),
    )
}

/// First contact: create the subscriber row with default settings if it
/// does not exist yet.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterSubscriberRequest>,
) -> Result<(StatusCode, Json<RegisterSubscriberResponse>), (StatusCode, Json<ErrorResponse>)> {
    let created = state
        .store
        .ensure_subscriber(payload.id, &payload.name)
        .await
        .map_err(db_error)?;

    let watch_count = state.store.watch_count(payload.id).await.map_err(db_error)?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(RegisterSubscriberResponse {
            id: payload.id,
            created,
            watch_count,
        }),
    ))
}

/// Account deletion (subscriber revoked access). Cascades to watches and
/// sweeps products nobody watches anymore.
pub async fn delete_subscriber(
    State(state): State<AppState>,
    Path(subscriber_id): Path<i64>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    state
        .store
        .delete_subscriber(subscriber_id)
        .await
        .map_err(db_error)?;

    state.settings.invalidate(subscriber_id).await;

    tracing::info!("Deleted subscriber {} and their watch data", subscriber_id);
    Ok(StatusCode::NO_CONTENT)
}
