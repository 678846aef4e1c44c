//! # Endoors Cryptography
//!
//! Keccak-256 name hashing for the Endoors naming core.
//!
//! This crate provides:
//!
//! - **Hash**: Keccak-256, label hashing, EIP-55 address checksums
//! - **Namehash**: the standard ENS namehash over dotted names
//!
//! Everything here is pure: no I/O, no configuration, no global state.
//!
//! ## Example
//!
//! ```rust
//! use endoors_crypto::namehash;
//!
//! let node = namehash("eth");
//! assert_eq!(
//!     node.to_hex(),
//!     "0x93cdeb708b7545dc668eb9280176169d1c33cfd8ed6f04690a0bcc88a93fc4ae"
//! );
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod hash;
pub mod namehash;

// Re-export main functions at crate root
pub use hash::{keccak256, keccak256_concat, labelhash, to_checksum_address};
pub use namehash::{child_node, namehash, subdomain_node};
