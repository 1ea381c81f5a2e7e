//! Per-route authorization.
//!
//! A [`PermissionGate`] names the permission a route requires; it is attached
//! with `route_layer` so it only runs for matched routes, after
//! authentication has attached a [`PrincipalContext`].

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::{Next, from_fn_with_state},
    response::Response,
    routing::MethodRouter,
};

use invsys_auth::{Permission, PolicyResolver, UserStore, guard};

use crate::app::errors::ApiError;
use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct PermissionGate {
    users: Arc<dyn UserStore>,
    resolver: PolicyResolver,
    required: Permission,
}

impl PermissionGate {
    pub fn new(users: Arc<dyn UserStore>, resolver: PolicyResolver, required: Permission) -> Self {
        Self {
            users,
            resolver,
            required,
        }
    }
}

impl core::fmt::Debug for PermissionGate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PermissionGate")
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

pub async fn authorization_middleware(
    State(gate): State<PermissionGate>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = req
        .extensions()
        .get::<PrincipalContext>()
        .map(PrincipalContext::identity);

    guard::authorize_identity(identity, gate.users.as_ref(), &gate.resolver, &gate.required)?;
    Ok(next.run(req).await)
}

/// Wrap `route` so it only runs when the caller holds the gate's permission.
pub fn gated<S>(route: MethodRouter<S>, gate: PermissionGate) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    route.route_layer(from_fn_with_state(gate, authorization_middleware))
}
