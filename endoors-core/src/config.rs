//! Naming configuration.
//!
//! A [`NamingConfig`] is built once at process start (from defaults or the
//! environment), validated, and then passed explicitly to every client. The
//! signing credential is kept apart in [`RegistrarCredential`] so the
//! configuration itself can be serialized and logged freely.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::constants::*;
use crate::error::{EndoorsError, Result};
use crate::types::{EthAddress, ParentDomain};

// ═══════════════════════════════════════════════════════════════════════════════
// NETWORK
// ═══════════════════════════════════════════════════════════════════════════════

/// Deployment network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Celo mainnet
    Mainnet,
    /// Celo Alfajores
    Testnet,
    /// Local development node
    Localhost,
}

impl Network {
    /// Default RPC endpoint.
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Network::Mainnet => CELO_MAINNET_RPC_URL,
            Network::Testnet => CELO_TESTNET_RPC_URL,
            Network::Localhost => LOCALHOST_RPC_URL,
        }
    }

    /// Chain id.
    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Mainnet => CELO_MAINNET_CHAIN_ID,
            Network::Testnet => CELO_TESTNET_CHAIN_ID,
            Network::Localhost => LOCALHOST_CHAIN_ID,
        }
    }

    /// Known (registry, registrar) deployment, if any.
    pub fn default_contracts(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Network::Testnet => Some((TESTNET_L2_REGISTRY_ADDRESS, TESTNET_L2_REGISTRAR_ADDRESS)),
            Network::Mainnet | Network::Localhost => None,
        }
    }

    /// Name used in configuration and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Localhost => "localhost",
        }
    }
}

impl FromStr for Network {
    type Err = EndoorsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" | "alfajores" => Ok(Network::Testnet),
            "localhost" | "local" => Ok(Network::Localhost),
            other => Err(EndoorsError::ConfigError(format!(
                "unknown network '{}' (expected mainnet, testnet or localhost)",
                other
            ))),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// NAMING CONFIG
// ═══════════════════════════════════════════════════════════════════════════════

/// Process-wide naming configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NamingConfig {
    /// Deployment network
    pub network: Network,
    /// Ledger JSON-RPC URL
    pub rpc_url: String,
    /// Chain the RPC endpoint must serve; checked before signing
    pub chain_id: u64,
    /// Domain all labels are registered under
    pub parent_domain: ParentDomain,
    /// L2Registry contract (node → owner)
    pub registry_address: EthAddress,
    /// L2Registrar contract (availability, registration)
    pub registrar_address: EthAddress,
    /// Bounded wait for finality, in seconds
    pub finality_timeout_secs: u64,
    /// Receipt polling interval, in milliseconds
    pub poll_interval_ms: u64,
    /// Confirmations required for finality
    pub confirmations: u64,
    /// Upper bound for a single read, in seconds
    pub request_timeout_secs: u64,
    /// Development mode: lookup failures may be treated as "available"
    pub dev_mode: bool,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self::for_network(Network::Testnet)
    }
}

impl NamingConfig {
    /// Creates the default configuration for a network.
    ///
    /// Networks without a known deployment get zero contract addresses,
    /// which [`NamingConfig::validate`] rejects until they are set.
    pub fn for_network(network: Network) -> Self {
        let (registry_address, registrar_address) = network
            .default_contracts()
            .and_then(|(registry, registrar)| {
                Some((
                    EthAddress::from_hex(registry).ok()?,
                    EthAddress::from_hex(registrar).ok()?,
                ))
            })
            .unwrap_or((EthAddress::zero(), EthAddress::zero()));

        Self {
            network,
            rpc_url: network.default_rpc_url().into(),
            chain_id: network.chain_id(),
            parent_domain: ParentDomain::default(),
            registry_address,
            registrar_address,
            finality_timeout_secs: DEFAULT_FINALITY_TIMEOUT_SECS,
            poll_interval_ms: DEFAULT_FINALITY_POLL_INTERVAL_MS,
            confirmations: DEFAULT_CONFIRMATIONS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            dev_mode: network != Network::Mainnet,
        }
    }

    /// Loads configuration from process environment variables.
    ///
    /// See [`NamingConfig::from_lookup`] for the variables read.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through a key lookup function.
    ///
    /// Reads `ENDOORS_NETWORK` first to pick defaults, then applies
    /// `ETH_RPC_URL`, `ENDOORS_CHAIN_ID`, `ENDOORS_PARENT_DOMAIN`,
    /// `L2_REGISTRY_CONTRACT`, `L2_REGISTRAR_CONTRACT`,
    /// `FINALITY_TIMEOUT_SECS`, `FINALITY_POLL_INTERVAL_MS`,
    /// `FINALITY_CONFIRMATIONS`, `REQUEST_TIMEOUT_SECS` and
    /// `ENDOORS_DEV_MODE`. The result is validated.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let network = match get("ENDOORS_NETWORK") {
            Some(v) => v.parse()?,
            None => Network::Testnet,
        };
        let mut config = Self::for_network(network);

        if let Some(v) = get("ETH_RPC_URL") {
            config.rpc_url = v;
        }
        if let Some(v) = get("ENDOORS_CHAIN_ID") {
            config.chain_id = parse_number("ENDOORS_CHAIN_ID", &v)?;
        }
        if let Some(v) = get("ENDOORS_PARENT_DOMAIN") {
            config.parent_domain = v.parse()?;
        }
        if let Some(v) = get("L2_REGISTRY_CONTRACT") {
            config.registry_address = parse_contract("L2_REGISTRY_CONTRACT", &v)?;
        }
        if let Some(v) = get("L2_REGISTRAR_CONTRACT") {
            config.registrar_address = parse_contract("L2_REGISTRAR_CONTRACT", &v)?;
        }
        if let Some(v) = get("FINALITY_TIMEOUT_SECS") {
            config.finality_timeout_secs = parse_number("FINALITY_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = get("FINALITY_POLL_INTERVAL_MS") {
            config.poll_interval_ms = parse_number("FINALITY_POLL_INTERVAL_MS", &v)?;
        }
        if let Some(v) = get("FINALITY_CONFIRMATIONS") {
            config.confirmations = parse_number("FINALITY_CONFIRMATIONS", &v)?;
        }
        if let Some(v) = get("REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = parse_number("REQUEST_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = get("ENDOORS_DEV_MODE") {
            config.dev_mode = parse_flag("ENDOORS_DEV_MODE", &v)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.rpc_url).map_err(|e| {
            EndoorsError::ConfigError(format!("invalid RPC URL '{}': {}", self.rpc_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(EndoorsError::ConfigError(format!(
                "RPC URL must be http(s), got '{}'",
                url.scheme()
            )));
        }

        if self.registry_address.is_zero() {
            return Err(EndoorsError::ConfigError(format!(
                "no L2Registry contract configured for {}",
                self.network
            )));
        }
        if self.registrar_address.is_zero() {
            return Err(EndoorsError::ConfigError(format!(
                "no L2Registrar contract configured for {}",
                self.network
            )));
        }

        if self.finality_timeout_secs == 0 {
            return Err(EndoorsError::ConfigError(
                "finality timeout must be positive".into(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(EndoorsError::ConfigError(
                "poll interval must be positive".into(),
            ));
        }
        if self.confirmations == 0 {
            return Err(EndoorsError::ConfigError(
                "at least one confirmation is required".into(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(EndoorsError::ConfigError(
                "request timeout must be positive".into(),
            ));
        }

        Ok(())
    }

    /// Finality wait as a `Duration`.
    pub fn finality_timeout(&self) -> Duration {
        Duration::from_secs(self.finality_timeout_secs)
    }

    /// Receipt polling interval as a `Duration`.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Read timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64> {
    value
        .parse()
        .map_err(|_| EndoorsError::ConfigError(format!("{} must be a number, got '{}'", key, value)))
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(EndoorsError::ConfigError(format!(
            "{} must be true, false, 1 or 0, got '{}'",
            key, value
        ))),
    }
}

fn parse_contract(key: &str, value: &str) -> Result<EthAddress> {
    EthAddress::from_hex(value)
        .map_err(|e| EndoorsError::ConfigError(format!("{} is not an address: {}", key, e)))
}

// ═══════════════════════════════════════════════════════════════════════════════
// CREDENTIAL
// ═══════════════════════════════════════════════════════════════════════════════

/// The private key that authorizes registrar submissions.
///
/// Zeroized on drop; `Debug` never prints it; not serializable.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct RegistrarCredential {
    secret_hex: String,
}

impl RegistrarCredential {
    /// Wraps a hex private key (with or without `0x`).
    pub fn from_hex(secret: &str) -> Result<Self> {
        let trimmed = secret.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);

        if digits.len() != PRIVATE_KEY_HEX_LEN || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(EndoorsError::ConfigError(format!(
                "registrar private key must be {} hex characters",
                PRIVATE_KEY_HEX_LEN
            )));
        }

        Ok(Self {
            secret_hex: digits.to_string(),
        })
    }

    /// Reads `PRIVATE_KEY` from the environment.
    pub fn from_env() -> Result<Self> {
        let value = std::env::var("PRIVATE_KEY").map_err(|_| {
            EndoorsError::ConfigError("missing registrar private key (PRIVATE_KEY)".into())
        })?;
        Self::from_hex(&value)
    }

    /// Reads `PRIVATE_KEY` if it is set.
    ///
    /// An unset or empty variable yields `None`; a malformed key is an error.
    pub fn from_env_optional() -> Result<Option<Self>> {
        match std::env::var("PRIVATE_KEY") {
            Ok(value) if !value.trim().is_empty() => Self::from_hex(&value).map(Some),
            _ => Ok(None),
        }
    }

    /// Returns the key as hex without a prefix. Do not log.
    pub fn expose_hex(&self) -> &str {
        &self.secret_hex
    }
}

impl fmt::Debug for RegistrarCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RegistrarCredential(<redacted>)")
    }
}
