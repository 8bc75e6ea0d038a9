use std::net::SocketAddr;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub admin_password: String,
    pub admin_session_hours: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().context("PORT")?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://movies.db?mode=rwc".to_string());

        let admin_password = std::env::var("ADMIN_PASSWORD").unwrap_or_default();

        let admin_session_hours: i64 =
            std::env::var("ADMIN_SESSION_HOURS").ok().and_then(|s| s.parse().ok()).unwrap_or(12);

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            admin_password,
            admin_session_hours,
        })
    }

    pub fn admin_gate_enabled(&self) -> bool {
        !self.admin_password.is_empty()
    }
}
