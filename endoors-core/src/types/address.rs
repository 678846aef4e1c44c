//! Ledger identifiers for Endoors.
//!
//! - [`EthAddress`]: a 20-byte account address; the zero address means "unset"
//! - [`TxHash`]: a 32-byte transaction identifier

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{ETH_ADDRESS_SIZE, TX_HASH_SIZE};
use crate::error::{EndoorsError, Result};

fn strip_hex_prefix(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

// ═══════════════════════════════════════════════════════════════════════════════
// ETHEREUM ADDRESS
// ═══════════════════════════════════════════════════════════════════════════════

/// A 20-byte Ethereum account address.
///
/// The registry reports an unregistered node's owner as the zero address,
/// see [`EthAddress::is_zero`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EthAddress {
    bytes: [u8; ETH_ADDRESS_SIZE],
}

impl EthAddress {
    /// Creates an address from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != ETH_ADDRESS_SIZE {
            return Err(EndoorsError::InvalidAddress(format!(
                "expected {} bytes, got {}",
                ETH_ADDRESS_SIZE,
                bytes.len()
            )));
        }

        let mut arr = [0u8; ETH_ADDRESS_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self { bytes: arr })
    }

    /// Creates from a fixed-size array.
    pub const fn from_array(bytes: [u8; ETH_ADDRESS_SIZE]) -> Self {
        Self { bytes }
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the fixed-size array.
    pub fn to_array(&self) -> [u8; ETH_ADDRESS_SIZE] {
        self.bytes
    }

    /// Returns the lowercase `0x`-prefixed hex form.
    ///
    /// Use `endoors_crypto::to_checksum_address` for the EIP-55 form.
    pub fn to_hex_string(&self) -> String {
        format!("0x{}", hex::encode(self.bytes))
    }

    /// Parses from hex string (with or without 0x prefix, any case).
    pub fn from_hex(s: &str) -> Result<Self> {
        let digits = strip_hex_prefix(s);
        if digits.len() != ETH_ADDRESS_SIZE * 2 {
            return Err(EndoorsError::InvalidAddress(format!(
                "'{}' is not a {}-character hex address",
                s.trim(),
                ETH_ADDRESS_SIZE * 2
            )));
        }
        let bytes = hex::decode(digits)?;
        Self::from_bytes(&bytes)
    }

    /// Returns the zero address.
    pub const fn zero() -> Self {
        Self {
            bytes: [0u8; ETH_ADDRESS_SIZE],
        }
    }

    /// Returns true for the zero ("unset") address.
    pub fn is_zero(&self) -> bool {
        self.bytes.iter().all(|&b| b == 0)
    }
}

impl FromStr for EthAddress {
    type Err = EndoorsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for EthAddress {
    type Error = EndoorsError;

    fn try_from(s: String) -> Result<Self> {
        Self::from_hex(&s)
    }
}

impl From<EthAddress> for String {
    fn from(addr: EthAddress) -> Self {
        addr.to_hex_string()
    }
}

impl fmt::Debug for EthAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EthAddress({})", self.to_hex_string())
    }
}

impl fmt::Display for EthAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex_string())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRANSACTION HASH
// ═══════════════════════════════════════════════════════════════════════════════

/// A 32-byte transaction hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TxHash([u8; TX_HASH_SIZE]);

impl TxHash {
    /// Creates from a fixed-size array.
    pub const fn from_array(bytes: [u8; TX_HASH_SIZE]) -> Self {
        Self(bytes)
    }

    /// Returns the fixed-size array.
    pub fn as_array(&self) -> &[u8; TX_HASH_SIZE] {
        &self.0
    }

    /// Returns `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parses from hex (with or without `0x`).
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(strip_hex_prefix(s))?;
        let arr: [u8; TX_HASH_SIZE] = bytes.as_slice().try_into().map_err(|_| {
            EndoorsError::InvalidAddress(format!(
                "transaction hash must be {} bytes, got {}",
                TX_HASH_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }
}

impl TryFrom<String> for TxHash {
    type Error = EndoorsError;

    fn try_from(s: String) -> Result<Self> {
        Self::from_hex(&s)
    }
}

impl From<TxHash> for String {
    fn from(hash: TxHash) -> Self {
        hash.to_hex()
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", self.to_hex())
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_parse_any_case() {
        let lower = EthAddress::from_hex("0x59221a5ebb314c358bcfcedaec406d2bf322f7a5").unwrap();
        let mixed = EthAddress::from_hex("0x59221A5Ebb314C358bCFCEDAEc406D2BF322F7A5").unwrap();
        let bare = EthAddress::from_hex("59221a5ebb314c358bcfcedaec406d2bf322f7a5").unwrap();
        assert_eq!(lower, mixed);
        assert_eq!(lower, bare);
        assert_eq!(
            lower.to_hex_string(),
            "0x59221a5ebb314c358bcfcedaec406d2bf322f7a5"
        );
    }

    #[test]
    fn test_address_rejects_bad_input() {
        assert!(EthAddress::from_hex("0xABC").is_err());
        assert!(EthAddress::from_hex("0xzz221a5ebb314c358bcfcedaec406d2bf322f7a5").is_err());
        assert!(EthAddress::from_bytes(&[1u8; 19]).is_err());
    }

    #[test]
    fn test_zero_address() {
        assert!(EthAddress::zero().is_zero());
        assert!(EthAddress::from_hex(&format!("0x{}", "00".repeat(20)))
            .unwrap()
            .is_zero());
        assert!(!EthAddress::from_array([1u8; 20]).is_zero());
    }

    #[test]
    fn test_address_serde_is_hex_string() {
        let addr = EthAddress::from_array([0xab; 20]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "ab".repeat(20)));
        let back: EthAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn test_tx_hash_hex() {
        let hash = TxHash::from_array([0x11; 32]);
        assert_eq!(TxHash::from_hex(&hash.to_hex()).unwrap(), hash);
        assert!(TxHash::from_hex("0x11").is_err());
    }
}
