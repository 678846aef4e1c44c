//! Keccak-256 helpers.
//!
//! Keccak-256 is the hash behind ENS label hashing, Ethereum addresses and
//! EIP-55 checksums.
//!
//! Note: Keccak-256 is NOT SHA3-256. They use different padding.

use sha3::{Digest, Keccak256};

use endoors_core::constants::KECCAK256_SIZE;
use endoors_core::types::EthAddress;

/// Computes Keccak256 hash.
pub fn keccak256(input: &[u8]) -> [u8; KECCAK256_SIZE] {
    let mut hasher = Keccak256::new();
    Digest::update(&mut hasher, input);
    hasher.finalize().into()
}

/// Computes Keccak256 over the concatenation of `parts`.
pub fn keccak256_concat(parts: &[&[u8]]) -> [u8; KECCAK256_SIZE] {
    let mut hasher = Keccak256::new();
    for part in parts {
        Digest::update(&mut hasher, part);
    }
    hasher.finalize().into()
}

/// Hashes a single label: `keccak256(utf8(label))`.
pub fn labelhash(label: &str) -> [u8; KECCAK256_SIZE] {
    keccak256(label.as_bytes())
}

/// Formats an address with its EIP-55 mixed-case checksum.
pub fn to_checksum_address(address: &EthAddress) -> String {
    let lower = hex::encode(address.as_bytes());
    let hash = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(2 + lower.len());
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = (hash[i / 2] >> (if i % 2 == 0 { 4 } else { 0 })) & 0x0f;
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_keccak256() {
        let hash = keccak256(b"hello");
        assert_eq!(
            hex::encode(hash),
            "1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36deac8"
        );
    }

    #[test]
    fn test_keccak256_concat_matches_single_buffer() {
        let joined = keccak256(b"helloworld");
        let parts = keccak256_concat(&[b"hello", b"world"]);
        assert_eq!(joined, parts);
    }

    #[test]
    fn test_labelhash_eth() {
        assert_eq!(
            hex::encode(labelhash("eth")),
            "4f5b812789fc606be1b3b16908db13fc7a9adf7ca72641f84d75b47069d3d7f0"
        );
    }

    #[test_case("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed" ; "eip55 vector one")]
    #[test_case("0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359" ; "eip55 vector two")]
    #[test_case("0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB" ; "eip55 vector three")]
    #[test_case("0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb" ; "eip55 vector four")]
    fn test_checksum_address(expected: &str) {
        let address = EthAddress::from_hex(&expected.to_lowercase()).unwrap();
        assert_eq!(to_checksum_address(&address), expected);
    }
}
