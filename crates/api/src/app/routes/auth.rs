use axum::{Json, extract::State};

use invsys_auth::LoginOutcome;

use crate::app::AppState;
use crate::app::dto::LoginRequest;
use crate::app::errors::ApiError;

/// POST /login - exchange credentials for a bearer token
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginOutcome>, ApiError> {
    let login = state.login.clone();

    // bcrypt is deliberately slow; keep it off the async workers.
    let outcome = tokio::task::spawn_blocking(move || login.login(&body.username, &body.password))
        .await
        .map_err(|e| ApiError::Internal(format!("login task failed: {e}")))??;

    Ok(Json(outcome))
}
