mod admin;
mod app;
mod catalog;
mod config;
mod db;
mod entities;
mod error;
#[cfg(test)]
mod fixtures;
mod models;
mod routes;
mod slug;
mod templates;

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use crate::{admin::AdminRegistry, catalog::Catalog, config::Config};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Catalog,
    pub admin: Arc<AdminRegistry>,
    pub cookie_key: Key,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,movie_catalog=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    let db = db::connect_and_migrate(&config.database_url).await?;
    let registry = admin::registry()?;

    if !config.admin_gate_enabled() {
        tracing::warn!("ADMIN_PASSWORD is empty, the admin is open to anyone");
    }

    let state = AppState {
        config: config.clone(),
        catalog: Catalog::new(db),
        admin: Arc::new(registry),
        cookie_key: Key::generate(),
    };

    let app = app::build_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
