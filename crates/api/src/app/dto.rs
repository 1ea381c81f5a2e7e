use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use invsys_auth::{Permission, RoleRecord};
use invsys_core::{RoleLookup, UserId};

use crate::app::errors::ApiError;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub password: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub user_id: UserId,
    pub role: String,
    pub request_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PermissionsResponse {
    pub permissions: Vec<String>,
    pub wildcards: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PolicyResponse {
    pub roles: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub permissions: Vec<String>,
}

impl From<RoleRecord> for RoleResponse {
    fn from(role: RoleRecord) -> Self {
        Self {
            id: role.id.get(),
            slug: role.slug.to_string(),
            name: role.name,
            permissions: role.permissions.iter().map(|p| p.to_string()).collect(),
        }
    }
}

// -------------------------
// Path parsing
// -------------------------

pub fn parse_user_id(raw: &str) -> Result<UserId, ApiError> {
    raw.parse::<UserId>()
        .map_err(|_| ApiError::BadRequest("invalid user id".to_string()))
}

pub fn parse_role_lookup(raw: &str) -> Result<RoleLookup, ApiError> {
    raw.parse::<RoleLookup>()
        .map_err(|_| ApiError::BadRequest("invalid role".to_string()))
}

pub fn strings(permissions: impl IntoIterator<Item = Permission>) -> Vec<String> {
    permissions.into_iter().map(|p| p.to_string()).collect()
}
