//! Error types for Endoors.
//!
//! Every failure the naming core can surface is an [`EndoorsError`]. Callers
//! that need to render or branch on failures use [`EndoorsError::kind`], which
//! never exposes provider-specific error shapes.

use serde::Serialize;
use thiserror::Error;

/// Result type alias using `EndoorsError`.
pub type Result<T> = std::result::Result<T, EndoorsError>;

/// Main error type for all Endoors operations.
#[derive(Debug, Error)]
pub enum EndoorsError {
    // ═══════════════════════════════════════════════════════════════════════════
    // VALIDATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Label failed the character-set rule.
    #[error("Invalid label '{label}': {reason}")]
    InvalidLabel {
        /// Label as given
        label: String,
        /// Rule it broke
        reason: String,
    },

    /// Full name is not `<label>.<parent domain>`.
    #[error("Invalid subdomain format: {0}")]
    InvalidName(String),

    /// Address could not be parsed or is not acceptable here.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid hex encoding.
    #[error("Invalid hex encoding: {0}")]
    HexError(#[from] hex::FromHexError),

    // ═══════════════════════════════════════════════════════════════════════════
    // LOOKUP ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// A read-only ledger call (ownership, availability, receipt) did not complete.
    #[error("Lookup failed during {operation}: {reason}")]
    LookupFailure {
        /// Ledger call that failed
        operation: String,
        /// Transport or node message
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════════════════════
    // REGISTRATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The name was claimed before this registration finalized.
    #[error("Subdomain already taken: {0}")]
    AlreadyTaken(String),

    /// The registration transaction could not be sent.
    #[error("Transaction submission failed: {0}")]
    SubmissionFailure(String),

    /// The ledger refused the call while simulating it before submission.
    #[error("Transaction would revert: {0}")]
    SubmissionReverted(String),

    /// Submitted, but finality was not observed within the bounded wait.
    /// The transaction may still finalize later.
    #[error("Transaction {tx_hash} not final after {waited_secs}s; outcome unknown")]
    FinalityTimeout {
        /// Submitted transaction
        tx_hash: String,
        /// Length of the wait
        waited_secs: u64,
    },

    /// The transaction was included but reverted for a reason other than a taken name.
    #[error("Transaction {tx_hash} reverted: {reason}")]
    TransactionReverted {
        /// Reverted transaction
        tx_hash: String,
        /// What is known about the revert
        reason: String,
    },

    /// The ledger transport is unreachable.
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    /// The owner has not passed identity verification.
    #[error("Address {0} has not completed identity verification")]
    NotVerified(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Required configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The configured backend cannot perform this operation.
    #[error("Not supported: {0}")]
    NotSupported(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Internal invariant violation (should never happen).
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Stable classification of an [`EndoorsError`], safe to hand to UI/CLI code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Input rejected locally, before any network call.
    Validation,
    /// A read could not complete; retrying the read may succeed.
    LookupFailure,
    /// Someone else owns the name.
    AlreadyTaken,
    /// The write could not be sent.
    SubmissionFailure,
    /// Submitted but not observed final; outcome unknown.
    FinalityTimeout,
    /// Included but reverted.
    TransactionReverted,
    /// Ledger transport unreachable.
    NetworkFailure,
    /// Owner not verified.
    NotVerified,
    /// Missing or invalid configuration.
    Configuration,
    /// Operation unavailable with the configured backend.
    NotSupported,
    /// Anything else.
    Internal,
}

impl ErrorKind {
    /// Returns the snake_case identifier used in API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::LookupFailure => "lookup_failure",
            ErrorKind::AlreadyTaken => "already_taken",
            ErrorKind::SubmissionFailure => "submission_failure",
            ErrorKind::FinalityTimeout => "finality_timeout",
            ErrorKind::TransactionReverted => "transaction_reverted",
            ErrorKind::NetworkFailure => "network_failure",
            ErrorKind::NotVerified => "not_verified",
            ErrorKind::Configuration => "configuration",
            ErrorKind::NotSupported => "not_supported",
            ErrorKind::Internal => "internal",
        }
    }

    /// Returns a short, user-facing hint for this kind of failure.
    ///
    /// A taken name asks the user to pick another one; transient failures
    /// ask them to try again.
    pub fn user_hint(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "Check the name and try a different spelling.",
            ErrorKind::AlreadyTaken => "This name is taken. Choose another name.",
            ErrorKind::LookupFailure
            | ErrorKind::SubmissionFailure
            | ErrorKind::NetworkFailure
            | ErrorKind::TransactionReverted => "Something went wrong. Please try again.",
            ErrorKind::FinalityTimeout => {
                "The registration is still pending. Check again before retrying."
            }
            ErrorKind::NotVerified => "Complete identity verification first.",
            ErrorKind::Configuration | ErrorKind::NotSupported | ErrorKind::Internal => {
                "Registration is currently unavailable."
            }
        }
    }

    /// Returns true if retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::LookupFailure
                | ErrorKind::SubmissionFailure
                | ErrorKind::NetworkFailure
                | ErrorKind::TransactionReverted
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EndoorsError {
    /// Builds a lookup failure for the named operation.
    pub fn lookup(operation: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        EndoorsError::LookupFailure {
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns the stable classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EndoorsError::InvalidLabel { .. }
            | EndoorsError::InvalidName(_)
            | EndoorsError::InvalidAddress(_)
            | EndoorsError::HexError(_) => ErrorKind::Validation,
            EndoorsError::LookupFailure { .. } => ErrorKind::LookupFailure,
            EndoorsError::AlreadyTaken(_) => ErrorKind::AlreadyTaken,
            EndoorsError::SubmissionFailure(_) | EndoorsError::SubmissionReverted(_) => {
                ErrorKind::SubmissionFailure
            }
            EndoorsError::FinalityTimeout { .. } => ErrorKind::FinalityTimeout,
            EndoorsError::TransactionReverted { .. } => ErrorKind::TransactionReverted,
            EndoorsError::NetworkFailure(_) => ErrorKind::NetworkFailure,
            EndoorsError::NotVerified(_) => ErrorKind::NotVerified,
            EndoorsError::ConfigError(_) => ErrorKind::Configuration,
            EndoorsError::NotSupported(_) => ErrorKind::NotSupported,
            EndoorsError::JsonError(_) | EndoorsError::InternalError(_) => ErrorKind::Internal,
        }
    }

    /// Returns true if this error is recoverable (can retry).
    pub fn is_recoverable(&self) -> bool {
        self.kind().is_retryable()
    }

    /// Returns true if this is a validation error.
    pub fn is_validation_error(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// Returns true if the operation's outcome is unknown rather than failed.
    pub fn is_outcome_unknown(&self) -> bool {
        matches!(self, EndoorsError::FinalityTimeout { .. })
    }
}
