//! Allowlist identity verifier.

use async_trait::async_trait;
use dashmap::DashSet;
use tracing::debug;

use endoors_core::error::Result;
use endoors_core::traits::IdentityVerifier;
use endoors_core::types::EthAddress;

/// Identity verifier backed by a set of attested addresses.
///
/// Stands in for the attestation service wherever the set of verified
/// addresses is known up front (local deployments, tests).
#[derive(Debug, Default)]
pub struct AllowlistVerifier {
    verified: DashSet<EthAddress>,
}

impl AllowlistVerifier {
    /// Creates an empty verifier. Nobody is verified.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a verifier that trusts `addresses`.
    pub fn from_addresses(addresses: impl IntoIterator<Item = EthAddress>) -> Self {
        let verifier = Self::new();
        for address in addresses {
            verifier.verify(address);
        }
        verifier
    }

    /// Marks `address` as verified.
    pub fn verify(&self, address: EthAddress) {
        debug!(%address, "Address verified");
        self.verified.insert(address);
    }

    /// Removes `address` from the verified set.
    pub fn revoke(&self, address: &EthAddress) -> bool {
        self.verified.remove(address).is_some()
    }

    /// Returns the number of verified addresses.
    pub fn len(&self) -> usize {
        self.verified.len()
    }

    /// Returns true if nobody is verified.
    pub fn is_empty(&self) -> bool {
        self.verified.is_empty()
    }
}

#[async_trait]
impl IdentityVerifier for AllowlistVerifier {
    async fn is_verified(&self, address: &EthAddress) -> Result<bool> {
        Ok(self.verified.contains(address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_allowlist() {
        let alice = EthAddress::from_array([0xa1; 20]);
        let mallory = EthAddress::from_array([0x66; 20]);
        let verifier = AllowlistVerifier::from_addresses([alice]);

        assert!(verifier.is_verified(&alice).await.unwrap());
        assert!(!verifier.is_verified(&mallory).await.unwrap());

        assert!(verifier.revoke(&alice));
        assert!(!verifier.is_verified(&alice).await.unwrap());
        assert!(verifier.is_empty());
    }
}
