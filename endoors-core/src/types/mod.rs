//! Domain types for Endoors.
//!
//! - [`Label`], [`ParentDomain`], [`Node`]: names and their hashed identifiers
//! - [`EthAddress`], [`TxHash`]: ledger identifiers
//! - [`PendingRegistration`], [`RegistrationReceipt`], [`RegistrationState`]:
//!   the lifecycle of a registration attempt
//! - [`Availability`]: an availability answer with its provenance

mod address;
mod name;
mod registration;

pub use address::*;
pub use name::*;
pub use registration::*;
