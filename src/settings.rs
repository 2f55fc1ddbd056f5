use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    pub debug: bool,
    pub auth_token: String,
    pub enable_swagger: bool,
    pub port: u16,
    /// Upper bound on lessons plus bookings accepted in a single request.
    pub max_records: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            // APP_PORT, APP_AUTH_TOKEN, APP_MAX_RECORDS, ...
            .add_source(Environment::with_prefix("APP").try_parsing(true))
            .set_default("debug", false)?
            .set_default("auth_token", "default-token-change-me")?
            .set_default("enable_swagger", true)?
            .set_default("port", 8080)?
            .set_default("max_records", 10_000)?
            .build()?;

        config.try_deserialize()
    }
}
