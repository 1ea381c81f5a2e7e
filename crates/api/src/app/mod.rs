//! HTTP API application wiring (Axum router + shared state).
//!
//! - `routes/`: HTTP handlers, one file per area
//! - `dto.rs`: request/response DTOs and path parsing
//! - `errors.rs`: consistent JSON error responses

use std::sync::Arc;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
};
use tower::ServiceBuilder;

use invsys_auth::{LoginService, PasswordHasher, Permission, PolicyResolver, TokenCodec, UserStore};
use invsys_infra::{RoleAdmin, RoleRepository};

use crate::authz::PermissionGate;
use crate::middleware::{self, AuthState};

pub mod dto;
pub mod errors;
pub mod routes;

/// Prefix every route is mounted under.
pub const API_PREFIX: &str = "/api/v1";

/// Everything handlers and middleware need, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenCodec>,
    pub users: Arc<dyn UserStore>,
    pub resolver: PolicyResolver,
    pub login: Arc<LoginService>,
    pub roles: Arc<RoleAdmin>,
}

impl AppState {
    pub fn new<U, R>(tokens: Arc<TokenCodec>, hasher: PasswordHasher, users: Arc<U>, roles: Arc<R>) -> Self
    where
        U: UserStore + 'static,
        R: RoleRepository + 'static,
    {
        let users: Arc<dyn UserStore> = users;
        let role_repo: Arc<dyn RoleRepository> = roles.clone();

        Self {
            login: Arc::new(LoginService::new(users.clone(), hasher, tokens.clone())),
            resolver: PolicyResolver::new(roles),
            roles: Arc::new(RoleAdmin::new(role_repo)),
            tokens,
            users,
        }
    }

    /// Authorization gate requiring `permission`, for use with [`crate::authz::gated`].
    pub fn gate(&self, permission: Permission) -> PermissionGate {
        PermissionGate::new(self.users.clone(), self.resolver.clone(), permission)
    }

    pub fn auth_state(&self) -> AuthState {
        AuthState {
            tokens: self.tokens.clone(),
        }
    }
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(state: AppState) -> Router {
    build_app_with(state, Router::new())
}

/// Like [`build_app`], additionally mounting `extra` behind authentication.
///
/// `extra` paths are relative to [`API_PREFIX`]; gate individual routes with
/// [`crate::authz::gated`] and [`AppState::gate`].
pub fn build_app_with(state: AppState, extra: Router) -> Router {
    // Protected routes: authentication runs only for matched routes, so
    // unknown paths stay 404 instead of 401.
    let protected = routes::protected(&state)
        .with_state(state.clone())
        .merge(extra)
        .route_layer(from_fn_with_state(
            state.auth_state(),
            middleware::authentication_middleware,
        ));

    let public = routes::public().with_state(state);

    Router::new()
        .nest(API_PREFIX, public.merge(protected))
        .layer(ServiceBuilder::new().layer(from_fn(middleware::log_requests)))
}

impl core::fmt::Debug for AppState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppState")
            .field("tokens", &self.tokens)
            .field("login", &self.login)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use tower::ServiceExt;

    use invsys_auth::{DEFAULT_TOKEN_TTL, Role};
    use invsys_infra::{InMemoryRoleStore, InMemoryUserStore, NewRole, NewUser};

    use super::*;

    fn state() -> (AppState, Arc<InMemoryUserStore>) {
        let users = Arc::new(InMemoryUserStore::new());
        let roles = Arc::new(InMemoryRoleStore::new());
        roles
            .insert(NewRole {
                slug: Role::new("viewer"),
                name: "Viewer".into(),
                permissions: vec![invsys_auth::catalog::PRODUCT_READ],
            })
            .unwrap();
        let hasher = PasswordHasher::new(4);
        users
            .insert(NewUser {
                username: "vera".into(),
                display_name: "Vera".into(),
                password_hash: hasher.hash("viewer1").unwrap(),
                role: Role::new("viewer"),
                active: true,
            })
            .unwrap();
        let tokens = Arc::new(TokenCodec::new("app-test-secret-0123456789abcdef", DEFAULT_TOKEN_TTL).unwrap());
        (AppState::new(tokens, hasher, users.clone(), roles), users)
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut req = Request::builder().uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        req.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let (state, _) = state();
        let res = build_app(state).oneshot(get("/api/v1/health", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key(middleware::REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn unknown_path_is_not_found_without_token() {
        let (state, _) = state();
        let res = build_app(state).oneshot(get("/api/v1/nope", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn gate_denies_missing_permission() {
        let (state, _) = state();
        let token = state.tokens.issue(invsys_core::UserId::new(1), Role::new("viewer")).unwrap();

        let res = build_app(state.clone())
            .oneshot(get("/api/v1/whoami", Some(&token)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = build_app(state)
            .oneshot(get("/api/v1/roles/policy", Some(&token)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn deactivated_user_loses_access_with_a_valid_token() {
        let (state, users) = state();
        let id = invsys_core::UserId::new(1);
        let token = state.tokens.issue(id, Role::new("viewer")).unwrap();
        users.set_active(id, false).unwrap();

        let res = build_app(state)
            .oneshot(get("/api/v1/permissions", Some(&token)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn demoted_user_is_judged_by_the_stored_role() {
        let (state, users) = state();
        let id = invsys_core::UserId::new(1);
        let token = state.tokens.issue(id, Role::new("viewer")).unwrap();
        let products = axum::Router::new().route(
            "/products",
            crate::authz::gated(
                axum::routing::get(|| async { "[]" }),
                state.gate(invsys_auth::catalog::PRODUCT_READ),
            ),
        );
        let app = build_app_with(state, products);

        let res = app.clone().oneshot(get("/api/v1/products", Some(&token))).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        users.set_role(id, Role::new("nobody")).unwrap();
        let res = app.oneshot(get("/api/v1/products", Some(&token))).await.unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}
