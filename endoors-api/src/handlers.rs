//! API route handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use tracing::{debug, info};

use endoors_core::types::EthAddress;
use endoors_crypto::{namehash, to_checksum_address};

use crate::dto::*;
use crate::error::ApiError;
use crate::state::AppState;

type Result<T> = std::result::Result<T, ApiError>;

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        network: state.service.config().network.to_string(),
        registration_enabled: state.service.registration_enabled(),
    })
}

/// GET /api/v1/config
pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    let service = &state.service;
    let config = service.config();

    Json(ConfigResponse {
        network: config.network.to_string(),
        chain_id: config.chain_id,
        parent_domain: config.parent_domain.to_string(),
        registry_address: to_checksum_address(&config.registry_address),
        registrar_address: to_checksum_address(&config.registrar_address),
        registration_enabled: service.registration_enabled(),
        verification_required: service.verification_required(),
        reverse_lookup_enabled: service.reverse_lookup_enabled(),
        lookup_failure_policy: service.policy_name().into(),
        confirmations: config.confirmations,
        finality_timeout_secs: config.finality_timeout_secs,
    })
}

/// GET /api/v1/names/:label/availability
pub async fn check_availability(
    State(state): State<Arc<AppState>>,
    Path(label): Path<String>,
) -> Result<Json<AvailabilityResponse>> {
    let availability = state.service.check_availability(&label).await?;
    Ok(Json(availability.into()))
}

/// GET /api/v1/names/:label/owner
pub async fn get_owner(
    State(state): State<Arc<AppState>>,
    Path(label): Path<String>,
) -> Result<Json<OwnerResponse>> {
    let owner = state.service.resolve(&label).await?;
    let name = state.service.format_subdomain(&label)?;
    let node = namehash(&name).to_hex();

    Ok(Json(OwnerResponse::new(name, node, owner)))
}

/// GET /api/v1/resolve/:name
pub async fn resolve_name(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<OwnerResponse>> {
    let owner = state.service.resolve_name(&name).await?;
    let label = state.service.registry().extract_label(&name)?;
    let name = state.service.registry().format_subdomain(&label);
    let node = namehash(&name).to_hex();

    debug!(%name, registered = owner.is_some(), "Resolved name");
    Ok(Json(OwnerResponse::new(name, node, owner)))
}

/// GET /api/v1/namehash/:name
pub async fn get_namehash(Path(name): Path<String>) -> Json<NamehashResponse> {
    let node = namehash(&name).to_hex();
    Json(NamehashResponse { name, node })
}

/// GET /api/v1/addresses/:address/name
pub async fn reverse_resolve(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> Result<Json<ReverseResponse>> {
    let address = EthAddress::from_hex(&address)?;
    let name = state.service.reverse_resolve(&address).await?;

    Ok(Json(ReverseResponse {
        address: to_checksum_address(&address),
        name,
    }))
}

/// POST /api/v1/names/register
///
/// Accepts a bare label or a full name under the parent domain, registers
/// it to `address` with the server's credential, and waits for finality.
pub async fn register_name(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let Json(req) = payload?;
    let owner = EthAddress::from_hex(&req.address)?;

    let requested = req.name.as_str();
    let label = if requested.contains('.') {
        state.service.registry().extract_label(requested)?.into_string()
    } else {
        requested.to_string()
    };

    let receipt = state.service.register(&label, &owner).await?;

    info!(name = %receipt.name, tx_hash = %receipt.tx_hash, "Registration served");
    Ok((StatusCode::CREATED, Json(receipt.into())))
}
