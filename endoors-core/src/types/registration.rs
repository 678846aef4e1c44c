//! Registration lifecycle types.
//!
//! A single registration attempt moves through
//! `Unsubmitted → Pending → {Confirmed | Rejected | TimedOut}`.
//! There are no automatic retries; a terminal state is final for the attempt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EthAddress, Label, Node, TxHash};

/// A registration that has been submitted but not yet observed final.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRegistration {
    /// Requested label
    pub label: Label,
    /// Full name (`label.parent`)
    pub name: String,
    /// Namehash of `name`
    pub node: Node,
    /// Requested owner
    pub owner: EthAddress,
    /// Transaction identifier returned on submission
    pub tx_hash: TxHash,
    /// When the transaction was handed to the ledger
    pub submitted_at: DateTime<Utc>,
}

/// A receipt as reported by the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerReceipt {
    /// Transaction identifier
    pub tx_hash: TxHash,
    /// Block the transaction was included in
    pub block_number: Option<u64>,
    /// Whether execution succeeded (false = reverted)
    pub succeeded: bool,
}

/// Confirmation that a registration finalized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationReceipt {
    /// Registered label
    pub label: Label,
    /// Full registered name
    pub name: String,
    /// Namehash of `name`
    pub node: Node,
    /// New owner
    pub owner: EthAddress,
    /// Finalized transaction identifier
    pub tx_hash: TxHash,
    /// Block the transaction was included in, when the ledger reports it
    pub block_number: Option<u64>,
    /// When finality was observed
    pub confirmed_at: DateTime<Utc>,
}

impl RegistrationReceipt {
    /// Builds the receipt for a pending registration from its ledger receipt.
    pub fn from_pending(pending: &PendingRegistration, receipt: &LedgerReceipt) -> Self {
        Self {
            label: pending.label.clone(),
            name: pending.name.clone(),
            node: pending.node,
            owner: pending.owner,
            tx_hash: receipt.tx_hash,
            block_number: receipt.block_number,
            confirmed_at: Utc::now(),
        }
    }
}

/// State of one registration attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RegistrationState {
    /// Nothing sent yet.
    Unsubmitted,
    /// Sent, awaiting finality.
    Pending {
        /// Transaction identifier
        tx_hash: TxHash,
    },
    /// Included with the required confirmations and succeeded.
    Confirmed(RegistrationReceipt),
    /// Included but reverted by the registrar.
    Rejected {
        /// Transaction identifier
        tx_hash: TxHash,
        /// Inclusion block
        block_number: Option<u64>,
    },
    /// Finality not observed within the bounded wait. The transaction
    /// was not retracted and may still finalize.
    TimedOut {
        /// Transaction identifier
        tx_hash: TxHash,
        /// How long we waited
        waited_secs: u64,
    },
}

impl RegistrationState {
    /// Returns true for `Confirmed`, `Rejected` and `TimedOut`.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RegistrationState::Confirmed(_)
                | RegistrationState::Rejected { .. }
                | RegistrationState::TimedOut { .. }
        )
    }

    /// Transaction identifier, once submitted.
    pub fn tx_hash(&self) -> Option<TxHash> {
        match self {
            RegistrationState::Unsubmitted => None,
            RegistrationState::Pending { tx_hash }
            | RegistrationState::Rejected { tx_hash, .. }
            | RegistrationState::TimedOut { tx_hash, .. } => Some(*tx_hash),
            RegistrationState::Confirmed(receipt) => Some(receipt.tx_hash),
        }
    }

    /// Short state name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationState::Unsubmitted => "unsubmitted",
            RegistrationState::Pending { .. } => "pending",
            RegistrationState::Confirmed(_) => "confirmed",
            RegistrationState::Rejected { .. } => "rejected",
            RegistrationState::TimedOut { .. } => "timed_out",
        }
    }
}

/// Where an availability answer came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AvailabilitySource {
    /// The registrar's `available` view answered.
    Registrar,
    /// The lookup failed and a policy chose to assume availability.
    AssumedAfterLookupFailure {
        /// Why the lookup failed
        reason: String,
    },
}

/// Availability of a label under the parent domain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Availability {
    /// Label checked
    pub label: Label,
    /// Full name checked
    pub name: String,
    /// Whether the label may be registered
    pub available: bool,
    /// Provenance of `available`
    pub source: AvailabilitySource,
}

impl Availability {
    /// Returns true when the answer did not come from the registrar.
    pub fn is_assumed(&self) -> bool {
        !matches!(self.source, AvailabilitySource::Registrar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending() -> PendingRegistration {
        PendingRegistration {
            label: Label::parse("alice").unwrap(),
            name: "alice.endoors.eth".into(),
            node: Node::from_array([7u8; 32]),
            owner: EthAddress::from_array([0xab; 20]),
            tx_hash: TxHash::from_array([1u8; 32]),
            submitted_at: Utc::now(),
        }
    }

    #[test]
    fn test_terminal_states() {
        let tx_hash = TxHash::from_array([1u8; 32]);
        assert!(!RegistrationState::Unsubmitted.is_terminal());
        assert!(!RegistrationState::Pending { tx_hash }.is_terminal());
        assert!(RegistrationState::Rejected {
            tx_hash,
            block_number: Some(3)
        }
        .is_terminal());
        assert!(RegistrationState::TimedOut {
            tx_hash,
            waited_secs: 5
        }
        .is_terminal());
    }

    #[test]
    fn test_receipt_from_pending() {
        let p = pending();
        let ledger = LedgerReceipt {
            tx_hash: p.tx_hash,
            block_number: Some(42),
            succeeded: true,
        };
        let receipt = RegistrationReceipt::from_pending(&p, &ledger);

        assert_eq!(receipt.name, "alice.endoors.eth");
        assert_eq!(receipt.owner, p.owner);
        assert_eq!(receipt.block_number, Some(42));

        let state = RegistrationState::Confirmed(receipt);
        assert_eq!(state.tx_hash(), Some(p.tx_hash));
        assert_eq!(state.as_str(), "confirmed");
    }

    #[test]
    fn test_assumed_availability_is_tagged() {
        let assumed = Availability {
            label: Label::parse("alice").unwrap(),
            name: "alice.endoors.eth".into(),
            available: true,
            source: AvailabilitySource::AssumedAfterLookupFailure {
                reason: "rpc down".into(),
            },
        };
        assert!(assumed.is_assumed());

        let json = serde_json::to_value(&assumed).unwrap();
        assert_eq!(json["source"]["kind"], "assumed_after_lookup_failure");
    }
}
