use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::Instrument;

use invsys_auth::{TokenCodec, guard};

use crate::app::errors::ApiError;
use crate::context::{PrincipalContext, RequestId};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<TokenCodec>,
}

/// Authentication: verify the bearer token and attach the caller's identity.
pub async fn authentication_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // A non-UTF-8 header value is treated as malformed rather than missing.
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .map(|value| value.to_str().unwrap_or_default());

    let identity = guard::authenticate(header, &state.tokens, Utc::now())?;
    tracing::debug!(user_id = %identity.user_id(), "authenticated");

    req.extensions_mut().insert(PrincipalContext::new(identity));
    Ok(next.run(req).await)
}

/// Request logging: one span per request carrying a fresh request id.
pub async fn log_requests(mut req: Request, next: Next) -> Response {
    let request_id = RequestId::new();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    req.extensions_mut().insert(request_id);

    let span = tracing::info_span!("request", %request_id, %method, %path);
    let started = Instant::now();

    let mut response = next.run(req).instrument(span.clone()).await;

    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    span.in_scope(|| tracing::info!(status, elapsed_ms, "request completed"));

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
