//! # Endoors API Server
//!
//! REST API over the Endoors naming core, consumed by the web frontend.
//!
//! ## Endpoints
//!
//! - `GET /health` - Liveness and network
//! - `GET /api/v1/config` - Public configuration
//! - `GET /api/v1/names/:label/availability` - Registrar availability
//! - `GET /api/v1/names/:label/owner` - Registry owner of `label.parent`
//! - `GET /api/v1/resolve/:name` - Registry owner of a full name
//! - `GET /api/v1/namehash/:name` - Namehash of any name
//! - `GET /api/v1/addresses/:address/name` - Reverse lookup
//! - `POST /api/v1/names/register` - Register with the server credential
//!
//! ## Example
//!
//! ```rust,ignore
//! use endoors_api::{ApiConfig, ApiServer};
//!
//! let server = ApiServer::connect(ApiConfig::from_env()?)?;
//! server.run(([0, 0, 0, 0], 3001)).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod routes;
mod handlers;
mod state;
mod dto;
mod error;

pub use routes::create_router;
pub use state::{AppState, ApiConfig};
pub use error::ApiError;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use endoors_core::error::Result;

/// API server for Endoors.
pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    /// Creates a server over prepared state.
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Creates a server connected to the configured contracts.
    pub fn connect(config: ApiConfig) -> Result<Self> {
        Ok(Self::new(AppState::connect(config)?))
    }

    /// Creates the router with all routes configured.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        create_router(self.state.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Runs the server on the given address.
    pub async fn run(self, addr: impl Into<SocketAddr>) -> std::io::Result<()> {
        let addr = addr.into();
        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!(
            %addr,
            network = %self.state.service.config().network,
            parent = %self.state.service.parent(),
            registration_enabled = self.state.service.registration_enabled(),
            "Endoors API server listening"
        );

        axum::serve(listener, self.router()).await
    }
}

/// Starts the API server with configuration from the environment.
pub async fn start_server(port: u16) -> anyhow::Result<()> {
    let config = ApiConfig::from_env()?;
    let server = ApiServer::connect(config)?;
    server.run(([0, 0, 0, 0], port)).await?;
    Ok(())
}
