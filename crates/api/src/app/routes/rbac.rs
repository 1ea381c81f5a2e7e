//! Role and permission administration endpoints.
//!
//! Edits go straight to the role store; the next authorization decision
//! resolves the policy fresh and sees them.

use axum::{
    Json,
    extract::{Path, State},
};

use invsys_auth::{Permission, all_permissions, catalog};

use crate::app::AppState;
use crate::app::dto::{PermissionsResponse, PolicyResponse, RoleResponse, parse_role_lookup, strings};
use crate::app::errors::ApiError;

/// GET /permissions - the permission catalog
pub async fn list_permissions() -> Json<PermissionsResponse> {
    Json(PermissionsResponse {
        permissions: strings(all_permissions()),
        wildcards: strings(catalog::all_wildcards()),
    })
}

/// GET /roles/policy - role slug to granted permissions, as currently stored
pub async fn current_policy(State(state): State<AppState>) -> Result<Json<PolicyResponse>, ApiError> {
    let policy = state
        .resolver
        .resolve()
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(PolicyResponse {
        roles: policy.snapshot(),
    }))
}

/// PUT /roles/:role/permissions/:permission
pub async fn grant_permission(
    State(state): State<AppState>,
    Path((role, permission)): Path<(String, String)>,
) -> Result<Json<RoleResponse>, ApiError> {
    let lookup = parse_role_lookup(&role)?;
    let role = state.roles.add_permission(&lookup, Permission::new(permission))?;
    Ok(Json(role.into()))
}

/// DELETE /roles/:role/permissions/:permission
pub async fn revoke_permission(
    State(state): State<AppState>,
    Path((role, permission)): Path<(String, String)>,
) -> Result<Json<RoleResponse>, ApiError> {
    let lookup = parse_role_lookup(&role)?;
    let role = state
        .roles
        .remove_permission(&lookup, &Permission::new(permission))?;
    Ok(Json(role.into()))
}
