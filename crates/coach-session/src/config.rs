//! Store configuration, read from the environment.

use std::env;

use tracing::info;

use crate::error::SessionError;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub database_url: String,
    pub max_connections: u32,
}

impl StoreConfig {
    pub fn load() -> Result<Self, SessionError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| SessionError::Config("DATABASE_URL not set"))?;

        let max_connections = env::var("STORE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);

        info!(max_connections, "Store configuration loaded");

        Ok(Self {
            database_url,
            max_connections,
        })
    }
}
