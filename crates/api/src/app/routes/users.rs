use axum::{
    Json,
    extract::{Path, State},
};

use crate::app::AppState;
use crate::app::dto::{ChangePasswordRequest, StatusResponse, parse_user_id};
use crate::app::errors::ApiError;

/// PATCH /users/:id/password
pub async fn change_password(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let user_id = parse_user_id(&id)?;
    let login = state.login.clone();

    tokio::task::spawn_blocking(move || login.change_password(user_id, &body.password))
        .await
        .map_err(|e| ApiError::Internal(format!("password task failed: {e}")))??;

    Ok(Json(StatusResponse {
        status: "password updated",
    }))
}
