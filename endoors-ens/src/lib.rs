//! # Endoors ENS Integration
//!
//! Subdomain resolution and registration against the two naming contracts:
//! an ENS-style registry holding `node → owner`, and a registrar that issues
//! labels under a fixed parent domain.
//!
//! - **AlloyLedger**: JSON-RPC access to the deployed contracts
//! - **RegistryClient**: owner lookups and name parsing
//! - **RegistrarClient**: availability, submission, and the finality wait
//! - **NamingService**: the validated, policy-aware entry point
//!
//! ## Example
//!
//! ```rust,ignore
//! use endoors_core::{NamingConfig, RegistrarCredential};
//! use endoors_ens::NamingService;
//!
//! let config = NamingConfig::from_env()?;
//! let credential = RegistrarCredential::from_env().ok();
//! let service = NamingService::connect(config, credential.as_ref())?;
//!
//! if service.check_availability("alice").await?.available {
//!     let receipt = service.register("alice", &owner).await?;
//!     println!("registered {} in {}", receipt.name, receipt.tx_hash);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod ledger;
mod policy;
mod registrar;
mod registry;
mod service;

pub use ledger::AlloyLedger;
pub use policy::{policy_for, DevModePolicy, LookupFailureDecision, LookupFailurePolicy, StrictPolicy};
pub use registrar::{FinalityOptions, RegistrarClient};
pub use registry::RegistryClient;
pub use service::NamingService;
