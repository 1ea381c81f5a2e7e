use axum::{
    Router,
    routing::{get, patch, post, put},
};

use invsys_auth::catalog;

use crate::app::AppState;
use crate::authz::gated;

pub mod auth;
pub mod rbac;
pub mod system;
pub mod users;

/// Endpoints reachable without a token.
pub fn public() -> Router<AppState> {
    Router::new()
        .route("/health", get(system::health))
        .route("/login", post(auth::login))
}

/// Endpoints behind authentication; most also carry a permission gate.
pub fn protected(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route(
            "/permissions",
            gated(get(rbac::list_permissions), state.gate(catalog::ROLE_READ)),
        )
        .route(
            "/roles/policy",
            gated(get(rbac::current_policy), state.gate(catalog::ROLE_READ)),
        )
        .route(
            "/roles/:role/permissions/:permission",
            gated(
                put(rbac::grant_permission).delete(rbac::revoke_permission),
                state.gate(catalog::ROLE_UPDATE),
            ),
        )
        .route(
            "/users/:id/password",
            gated(patch(users::change_password), state.gate(catalog::USER_UPDATE)),
        )
}
