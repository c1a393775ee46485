//! Application configuration module
//!
//! Configuration is read from environment variables (and a `.env` file in
//! development) with the `TIERPASS` prefix. Nested values use `__`.
//!
//! # Example
//!
//! ```no_run
//! use tierpass::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {:?}", config.server.socket_addr());
//! ```

mod database;
mod error;
mod payment;
mod server;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use server::{Environment, ServerConfig};

use serde::de::DeserializeOwned;
use serde::Deserialize;

const ENV_PREFIX: &str = "TIERPASS";

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Payment configuration (Stripe)
    pub payment: PaymentConfig,
}

/// Subset loaded by command-line tools that only touch the database.
#[derive(Debug, Clone, Deserialize)]
struct DatabaseOnly {
    database: DatabaseConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// - `TIERPASS__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `TIERPASS__DATABASE__URL=...` -> `database.url = ...`
    /// - `TIERPASS__PAYMENT__STRIPE_API_KEY=...` -> `payment.stripe_api_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or a value
    /// cannot be parsed into its field type.
    pub fn load() -> Result<Self, ConfigError> {
        load_from_env()
    }

    /// Load and validate only the database section.
    pub fn load_database() -> Result<DatabaseConfig, ConfigError> {
        let DatabaseOnly { database } = load_from_env()?;
        database.validate()?;
        Ok(database)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.payment.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

fn load_from_env<T: DeserializeOwned>() -> Result<T, ConfigError> {
    // Load .env file if present (development)
    dotenvy::dotenv().ok();

    let config = config::Config::builder()
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    Ok(config)
}
