use std::sync::Arc;

use anyhow::Context;

use invsys_api::{ApiConfig, AppState, build_app};
use invsys_auth::{PasswordHasher, TokenCodec};
use invsys_infra::{InMemoryRoleStore, InMemoryUserStore, seed_admin};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    invsys_observability::init();

    let config = ApiConfig::from_env().context("invalid configuration")?;
    tracing::info!(?config, "configuration loaded");

    let tokens = Arc::new(TokenCodec::new(&config.jwt_secret, config.token_ttl).context("invalid token settings")?);
    let hasher = PasswordHasher::new(config.password_hash_cost);

    let users = Arc::new(InMemoryUserStore::new());
    let roles = Arc::new(InMemoryRoleStore::new());

    if let Some(admin) = &config.admin {
        let id = seed_admin(&users, &roles, hasher, &admin.username, &admin.password)
            .context("failed to seed admin account")?;
        tracing::info!(user_id = %id, username = %admin.username, "admin account ready");
    } else {
        tracing::warn!("ADMIN_USERNAME not set; no accounts exist, every login will fail");
    }

    let app = build_app(AppState::new(tokens, hasher, users, roles));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
