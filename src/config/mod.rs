use std::time::Duration;

use anyhow::{Result, bail};
use dotenvy::dotenv;
use serde::Deserialize;

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_connect_timeout_secs() -> u64 {
    10
}

/// Configuration for the application
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Full database connection URL. Takes precedence over the `DB_*` parts.
    pub database_url: Option<String>,

    #[serde(default = "default_db_host")]
    pub db_host: String,

    #[serde(default = "default_db_port")]
    pub db_port: u16,

    pub db_name: Option<String>,
    pub db_user: Option<String>,
    pub db_password: Option<String>,

    /// Seconds to wait for the connection to be established
    #[serde(default = "default_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// This function will:
    /// 1. Load variables from .env file if it exists
    /// 2. Deserialize environment variables into Config struct
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let config = envy::from_env::<Config>()?;

        Ok(config)
    }

    /// Build the connection URL, either the explicit one or a postgres URL
    /// assembled from host, port, name and credentials.
    pub fn database_url(&self) -> Result<String> {
        if let Some(url) = &self.database_url {
            return Ok(url.clone());
        }

        let Some(name) = &self.db_name else {
            bail!("either DATABASE_URL or DB_NAME must be set");
        };

        let credentials = match (&self.db_user, &self.db_password) {
            (Some(user), Some(password)) => format!("{user}:{password}@"),
            (Some(user), None) => format!("{user}@"),
            _ => String::new(),
        };

        Ok(format!(
            "postgres://{}{}:{}/{}",
            credentials, self.db_host, self.db_port, name
        ))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.db_connect_timeout_secs)
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    let config = Config::load()?;

    Ok(config)
}
