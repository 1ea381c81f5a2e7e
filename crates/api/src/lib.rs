//! HTTP API: configuration, request pipeline (authentication, authorization)
//! and the login/role-administration routes.

pub mod app;
pub mod authz;
pub mod config;
pub mod context;
pub mod middleware;

pub use app::{AppState, build_app, build_app_with};
pub use config::{ApiConfig, ConfigError};
