use std::net::SocketAddr;

use serde::Deserialize;

use crate::error::Error;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Connection string for the hosted readings store.
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

impl Config {
    /// Loads `.env`, then an optional `config.toml`, then `SUHU_*` environment
    /// variables (e.g. `SUHU_DATABASE_URL`, `SUHU_SERVER_PORT`).
    pub fn load() -> Result<Self, Error> {
        let _ = dotenvy::dotenv();

        let settings = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3030)?
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("SUHU").separator("_"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn server_address(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}
