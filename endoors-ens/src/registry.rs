//! Read-only client for the naming registry.

use std::sync::Arc;

use tracing::{debug, instrument};

use endoors_core::error::Result;
use endoors_core::traits::NamingLedger;
use endoors_core::types::{EthAddress, Label, Node, ParentDomain};
use endoors_crypto::subdomain_node;

/// Resolves names under a parent domain to their registry owners.
///
/// Every call is one logical query against the ledger; nothing is cached.
#[derive(Clone)]
pub struct RegistryClient {
    ledger: Arc<dyn NamingLedger>,
    parent: ParentDomain,
}

impl RegistryClient {
    /// Creates a client for names under `parent`.
    pub fn new(ledger: Arc<dyn NamingLedger>, parent: ParentDomain) -> Self {
        Self { ledger, parent }
    }

    /// Returns the parent domain.
    pub fn parent(&self) -> &ParentDomain {
        &self.parent
    }

    /// Formats `label.parent`.
    pub fn format_subdomain(&self, label: &Label) -> String {
        self.parent.subdomain(label)
    }

    /// Returns the node of `label.parent`.
    pub fn node_for(&self, label: &Label) -> Node {
        subdomain_node(label, &self.parent)
    }

    /// Reads the owner of `node`. The zero address means unset.
    pub async fn owner(&self, node: &Node) -> Result<EthAddress> {
        self.ledger.owner(node).await
    }

    /// Returns the owner of `label.parent`, or `None` if unregistered.
    #[instrument(skip(self), fields(parent = %self.parent))]
    pub async fn resolve_address_for_subdomain(&self, label: &Label) -> Result<Option<EthAddress>> {
        let node = self.node_for(label);
        let owner = self.ledger.owner(&node).await?;

        if owner.is_zero() {
            debug!(%label, "Subdomain is unregistered");
            return Ok(None);
        }

        debug!(%label, %owner, "Resolved subdomain");
        Ok(Some(owner))
    }

    /// Extracts the label from `label.parent`.
    pub fn extract_label(&self, full_name: &str) -> Result<Label> {
        self.parent.extract_label(full_name)
    }

    /// Resolves a full name such as `alice.endoors.eth`.
    pub async fn resolve_name(&self, full_name: &str) -> Result<Option<EthAddress>> {
        let label = self.extract_label(full_name)?;
        self.resolve_address_for_subdomain(&label).await
    }
}

impl std::fmt::Debug for RegistryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryClient")
            .field("parent", &self.parent)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use endoors_core::error::EndoorsError;
    use endoors_registry::MemoryLedger;
    use test_case::test_case;

    fn client() -> (Arc<MemoryLedger>, RegistryClient) {
        let ledger = Arc::new(MemoryLedger::new());
        let client = RegistryClient::new(ledger.clone(), ParentDomain::default());
        (ledger, client)
    }

    #[tokio::test]
    async fn test_unregistered_resolves_to_none() {
        let (ledger, client) = client();
        let label = Label::parse("nobody").unwrap();

        assert_eq!(client.resolve_address_for_subdomain(&label).await.unwrap(), None);
        assert_eq!(ledger.call_counts().owner, 1);
    }

    #[tokio::test]
    async fn test_registered_resolves_to_owner() {
        let (ledger, client) = client();
        let label = Label::parse("alice").unwrap();
        let owner = EthAddress::from_array([0xa1; 20]);
        ledger.set_owner(&label, owner);

        assert_eq!(
            client.resolve_address_for_subdomain(&label).await.unwrap(),
            Some(owner)
        );
        assert_eq!(client.resolve_name("alice.endoors.eth").await.unwrap(), Some(owner));
    }

    #[tokio::test]
    async fn test_node_matches_fixture() {
        let (_, client) = client();
        let label = Label::parse("alice").unwrap();
        assert_eq!(
            client.node_for(&label).to_hex(),
            "0x1e5e16395416076656f4ee99daff877bfd4a86e2cbf544ca847c4899ac3f4381"
        );
        assert_eq!(client.format_subdomain(&label), "alice.endoors.eth");
    }

    #[test_case("alice.endoors.eth", Some("alice") ; "plain")]
    #[test_case("alice.Endoors.eth", None ; "parent case differs")]
    #[test_case(" alice.endoors.eth", None ; "surrounding whitespace")]
    #[test_case("under_score.endoors.eth", Some("under_score") ; "underscore")]
    #[test_case("endoors.eth", None ; "parent only")]
    #[test_case("alice.other.eth", None ; "wrong parent")]
    #[test_case("a.b.endoors.eth", None ; "too deep")]
    #[test_case("al!ce.endoors.eth", None ; "bad charset")]
    #[test_case(".endoors.eth", None ; "empty label")]
    #[test_case("", None ; "empty")]
    fn test_extract_label(input: &str, expected: Option<&str>) {
        let (_, client) = client();
        match expected {
            Some(label) => assert_eq!(client.extract_label(input).unwrap().as_str(), label),
            None => assert!(matches!(
                client.extract_label(input),
                Err(EndoorsError::InvalidName(_))
            )),
        }
    }

    #[tokio::test]
    async fn test_invalid_name_makes_no_call() {
        let (ledger, client) = client();
        assert!(client.resolve_name("not-a-subdomain").await.is_err());
        assert_eq!(ledger.call_counts().total(), 0);
    }

    #[tokio::test]
    async fn test_lookup_failure_propagates() {
        let (ledger, client) = client();
        ledger.set_fail_reads(true);

        let err = client
            .resolve_address_for_subdomain(&Label::parse("alice").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, EndoorsError::LookupFailure { .. }));
    }
}
