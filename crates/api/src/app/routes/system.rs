use axum::{Extension, Json};

use crate::app::dto::{StatusResponse, WhoAmIResponse};
use crate::context::{PrincipalContext, RequestId};

pub async fn health() -> Json<StatusResponse> {
    Json(StatusResponse { status: "ok" })
}

pub async fn whoami(
    Extension(principal): Extension<PrincipalContext>,
    request_id: Option<Extension<RequestId>>,
) -> Json<WhoAmIResponse> {
    Json(WhoAmIResponse {
        user_id: principal.user_id(),
        role: principal.claimed_role().to_string(),
        request_id: request_id.map(|Extension(id)| id.to_string()),
    })
}
