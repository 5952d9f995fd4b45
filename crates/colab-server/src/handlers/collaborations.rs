use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use colab_core::types::{Collaboration, CollaborationId, NewCollaboration};
use colab_core::Error;

use crate::app_state::AppState;

fn error_status(err: &Error) -> StatusCode {
    match err {
        Error::CollaborationNotFound(_) => StatusCode::NOT_FOUND,
        Error::Invalid(_) => StatusCode::BAD_REQUEST,
        Error::Database(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn into_http(err: Error) -> (StatusCode, String) {
    let status = error_status(&err);
    if status.is_server_error() {
        tracing::error!(error = %err, "collaboration request failed");
    }
    (status, err.to_string())
}

/// List all collaborations.
#[allow(clippy::missing_errors_doc)]
pub async fn list_collaborations(
    State(state): State<AppState>,
) -> Result<Json<Vec<Collaboration>>, (StatusCode, String)> {
    let collaborations = state.store.list_all().await.map_err(into_http)?;
    Ok(Json(collaborations))
}

/// Fetch one collaboration by ID.
#[allow(clippy::missing_errors_doc)]
pub async fn get_collaboration(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Collaboration>, (StatusCode, String)> {
    let id: CollaborationId = id
        .parse()
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Invalid id: {e}")))?;

    state
        .store
        .get_by_id(id)
        .await
        .map_err(into_http)?
        .map(Json)
        .ok_or_else(|| into_http(Error::CollaborationNotFound(id)))
}

/// Create a collaboration.
#[allow(clippy::missing_errors_doc)]
pub async fn create_collaboration(
    State(state): State<AppState>,
    Json(params): Json<NewCollaboration>,
) -> Result<(StatusCode, Json<Collaboration>), (StatusCode, String)> {
    params.validate().map_err(into_http)?;

    let collaboration = state.store.create(params).await.map_err(into_http)?;
    tracing::info!(collaboration_id = %collaboration.id, "collaboration created");

    Ok((StatusCode::CREATED, Json(collaboration)))
}
