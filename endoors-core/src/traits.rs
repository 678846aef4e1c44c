//! Common traits for Endoors.
//!
//! These traits are the seams between the naming core and the systems it
//! talks to, so that a real chain, an in-process simulation, or a test double
//! can stand behind the same clients.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{EthAddress, Label, LedgerReceipt, Node, TxHash};

// ═══════════════════════════════════════════════════════════════════════════════
// LEDGER TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Access to the two naming contracts on the underlying ledger.
///
/// The registry answers `owner(bytes32 node)`; the registrar answers
/// `available(string label)` and accepts `register(string label, address owner)`.
///
/// Implementations might use:
/// - JSON-RPC against deployed contracts (production)
/// - An in-process simulation (development and tests)
#[async_trait]
pub trait NamingLedger: Send + Sync {
    /// Reads the registry's owner for `node`. The zero address means unset.
    async fn owner(&self, node: &Node) -> Result<EthAddress>;

    /// Reads the registrar's availability view for `label`.
    async fn available(&self, label: &Label) -> Result<bool>;

    /// Submits `register(label, owner)` and returns the transaction hash.
    ///
    /// Returning does not imply inclusion; use [`NamingLedger::receipt`].
    async fn submit_register(&self, label: &Label, owner: &EthAddress) -> Result<TxHash>;

    /// Returns the receipt for `tx_hash`, or `None` while it is not included.
    async fn receipt(&self, tx_hash: &TxHash) -> Result<Option<LedgerReceipt>>;

    /// Returns the current head block number.
    async fn block_number(&self) -> Result<u64>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// IDENTITY VERIFICATION TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Interface to the third-party identity attestation service.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Returns true if `address` has completed identity verification.
    async fn is_verified(&self, address: &EthAddress) -> Result<bool>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// REVERSE RESOLUTION TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Interface for looking up the name an address owns.
///
/// The registry only maps node → owner, so answering this requires
/// enumerating registrations (events, an indexer, or local state).
#[async_trait]
pub trait ReverseResolver: Send + Sync {
    /// Returns the full name owned by `address`, if any.
    async fn resolve_owner_for_address(&self, address: &EthAddress) -> Result<Option<String>>;
}
