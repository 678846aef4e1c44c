//! DTOs for API requests and responses.

use serde::{Deserialize, Serialize};

use endoors_core::types::{Availability, AvailabilitySource, EthAddress, RegistrationReceipt};
use endoors_crypto::to_checksum_address;

/// Response for the health check.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status
    pub status: String,
    /// Version
    pub version: String,
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Network name
    pub network: String,
    /// Whether registrations can be submitted
    pub registration_enabled: bool,
}

/// Public view of the running configuration.
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    /// Network name
    pub network: String,
    /// Chain id
    pub chain_id: u64,
    /// Parent domain names are issued under
    pub parent_domain: String,
    /// Registry contract (checksummed)
    pub registry_address: String,
    /// Registrar contract (checksummed)
    pub registrar_address: String,
    /// Whether registrations can be submitted
    pub registration_enabled: bool,
    /// Whether owners must pass identity verification
    pub verification_required: bool,
    /// Whether address → name lookups are served
    pub reverse_lookup_enabled: bool,
    /// How failed availability lookups are handled
    pub lookup_failure_policy: String,
    /// Confirmations required for finality
    pub confirmations: u64,
    /// Bounded finality wait, in seconds
    pub finality_timeout_secs: u64,
}

/// Response for an availability check.
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    /// Label checked
    pub label: String,
    /// Full name checked
    pub name: String,
    /// Whether the label may be registered
    pub available: bool,
    /// True when the answer was assumed after a failed lookup
    pub assumed: bool,
    /// Provenance of `available`
    pub source: AvailabilitySource,
}

impl From<Availability> for AvailabilityResponse {
    fn from(a: Availability) -> Self {
        Self {
            assumed: a.is_assumed(),
            label: a.label.into_string(),
            name: a.name,
            available: a.available,
            source: a.source,
        }
    }
}

/// Response for an owner lookup.
#[derive(Debug, Serialize)]
pub struct OwnerResponse {
    /// Full name
    pub name: String,
    /// Namehash of `name`
    pub node: String,
    /// Whether the name has an owner
    pub registered: bool,
    /// Owner address (checksummed)
    pub owner: Option<String>,
}

impl OwnerResponse {
    /// Builds the response for `name`.
    pub fn new(name: String, node: String, owner: Option<EthAddress>) -> Self {
        Self {
            name,
            node,
            registered: owner.is_some(),
            owner: owner.as_ref().map(to_checksum_address),
        }
    }
}

/// Response for a namehash computation.
#[derive(Debug, Serialize)]
pub struct NamehashResponse {
    /// Name as given
    pub name: String,
    /// Namehash (hex)
    pub node: String,
}

/// Response for a reverse lookup.
#[derive(Debug, Serialize)]
pub struct ReverseResponse {
    /// Address looked up (checksummed)
    pub address: String,
    /// Name owned by the address, if any
    pub name: Option<String>,
}

/// Request to register a subdomain.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Label, or full name under the parent domain
    pub name: String,
    /// Owner address (hex)
    pub address: String,
}

/// Response for a completed registration.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// Registered label
    pub label: String,
    /// Full registered name
    pub name: String,
    /// Namehash of `name`
    pub node: String,
    /// New owner (checksummed)
    pub owner: String,
    /// Transaction hash
    pub tx_hash: String,
    /// Inclusion block
    pub block_number: Option<u64>,
    /// When finality was observed (RFC 3339)
    pub confirmed_at: String,
}

impl From<RegistrationReceipt> for RegisterResponse {
    fn from(r: RegistrationReceipt) -> Self {
        Self {
            owner: to_checksum_address(&r.owner),
            node: r.node.to_hex(),
            tx_hash: r.tx_hash.to_hex(),
            block_number: r.block_number,
            confirmed_at: r.confirmed_at.to_rfc3339(),
            label: r.label.into_string(),
            name: r.name,
        }
    }
}
