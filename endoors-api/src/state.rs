//! App state: configuration and the naming service.

use std::time::Instant;

use endoors_core::config::{NamingConfig, RegistrarCredential};
use endoors_core::error::Result;
use endoors_ens::NamingService;

/// Server configuration.
#[derive(Debug)]
pub struct ApiConfig {
    /// Naming configuration shared with the CLI
    pub naming: NamingConfig,
    /// Registrar credential; `None` serves read-only
    pub credential: Option<RegistrarCredential>,
}

impl ApiConfig {
    /// Loads `.env`, then reads naming configuration and `PRIVATE_KEY`.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            naming: NamingConfig::from_env()?,
            credential: RegistrarCredential::from_env_optional()?,
        })
    }
}

/// Shared handler state.
#[derive(Debug)]
pub struct AppState {
    /// Naming operations
    pub service: NamingService,
    /// Process start, for uptime
    pub started_at: Instant,
}

impl AppState {
    /// Wraps an already-built service.
    pub fn new(service: NamingService) -> Self {
        Self {
            service,
            started_at: Instant::now(),
        }
    }

    /// Connects to the configured contracts.
    pub fn connect(config: ApiConfig) -> Result<Self> {
        let service = NamingService::connect(config.naming, config.credential.as_ref())?;
        Ok(Self::new(service))
    }
}
