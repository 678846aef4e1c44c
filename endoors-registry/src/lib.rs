//! # Endoors Registry
//!
//! In-process backends for the Endoors naming core.
//!
//! This crate provides:
//!
//! - **MemoryLedger**: a simulation of the registry and registrar contracts,
//!   with call counters and fault injection, for development and testing
//! - **AllowlistVerifier**: an identity verifier over a fixed address set
//!
//! ## Example
//!
//! ```rust,ignore
//! use endoors_core::{Label, NamingLedger};
//! use endoors_registry::MemoryLedger;
//!
//! let ledger = MemoryLedger::new();
//! let alice = Label::parse("alice")?;
//!
//! assert!(ledger.available(&alice).await?);
//! let tx = ledger.submit_register(&alice, &owner).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod memory;
mod verifier;

pub use memory::{CallCounts, MemoryLedger};
pub use verifier::AllowlistVerifier;

// Re-export the traits from core
pub use endoors_core::traits::{IdentityVerifier, NamingLedger, ReverseResolver};
