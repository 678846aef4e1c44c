//! # Endoors Core
//!
//! Core types, errors, and traits for the Endoors subdomain naming core.
//!
//! This crate provides the foundational building blocks used by all other Endoors crates:
//!
//! - **Types**: Labels, names, nodes, addresses, and registration state
//! - **Errors**: A single error taxonomy with stable, structured kinds
//! - **Constants**: Network defaults and sizes
//! - **Config**: Immutable process-wide naming configuration
//! - **Traits**: Seams to the ledger, identity verification, and reverse lookup
//!
//! ## Example
//!
//! ```rust
//! use endoors_core::{Label, ParentDomain};
//!
//! let label = Label::parse("alice").unwrap();
//! let parent = ParentDomain::default();
//! assert_eq!(parent.subdomain(&label), "alice.endoors.eth");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod config;
pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use config::{NamingConfig, Network, RegistrarCredential};
pub use constants::*;
pub use error::{EndoorsError, ErrorKind, Result};
pub use traits::*;
pub use types::*;
