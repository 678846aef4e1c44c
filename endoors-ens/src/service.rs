//! Upward interface of the naming core.
//!
//! [`NamingService`] is what the API and CLI call. It validates input before
//! any network call, applies the lookup-failure policy, and hands back
//! structured errors only.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use endoors_core::config::{NamingConfig, RegistrarCredential};
use endoors_core::error::{EndoorsError, Result};
use endoors_core::traits::{IdentityVerifier, NamingLedger, ReverseResolver};
use endoors_core::types::{
    Availability, AvailabilitySource, EthAddress, Label, Node, ParentDomain, RegistrationReceipt,
};

use crate::ledger::AlloyLedger;
use crate::policy::{policy_for, LookupFailureDecision, LookupFailurePolicy};
use crate::registrar::{FinalityOptions, RegistrarClient};
use crate::registry::RegistryClient;

/// Naming operations under one parent domain.
pub struct NamingService {
    config: NamingConfig,
    registry: RegistryClient,
    registrar: RegistrarClient,
    policy: Arc<dyn LookupFailurePolicy>,
    verifier: Option<Arc<dyn IdentityVerifier>>,
    reverse: Option<Arc<dyn ReverseResolver>>,
    registration_enabled: bool,
}

impl NamingService {
    /// Creates a service over `ledger`, with the policy selected by `config`.
    ///
    /// Registration is enabled; use [`NamingService::read_only`] when the
    /// ledger cannot sign.
    pub fn new(config: NamingConfig, ledger: Arc<dyn NamingLedger>) -> Self {
        let parent = config.parent_domain.clone();
        let finality = FinalityOptions::from_config(&config);

        Self {
            registry: RegistryClient::new(ledger.clone(), parent.clone()),
            registrar: RegistrarClient::new(ledger, parent, finality),
            policy: policy_for(&config),
            verifier: None,
            reverse: None,
            registration_enabled: true,
            config,
        }
    }

    /// Connects to the configured contracts over JSON-RPC.
    ///
    /// Without a credential the service is read-only and
    /// [`NamingService::register`] fails with a configuration error.
    pub fn connect(config: NamingConfig, credential: Option<&RegistrarCredential>) -> Result<Self> {
        config.validate()?;

        let service = match credential {
            Some(credential) => {
                let ledger = AlloyLedger::with_credential(&config, credential)?;
                Self::new(config, Arc::new(ledger))
            }
            None => {
                warn!("No registrar credential configured; registration is disabled");
                let ledger = AlloyLedger::new(&config)?;
                Self::new(config, Arc::new(ledger)).read_only()
            }
        };

        Ok(service)
    }

    /// Disables registration.
    pub fn read_only(mut self) -> Self {
        self.registration_enabled = false;
        self
    }

    /// Replaces the lookup-failure policy.
    pub fn with_policy(mut self, policy: Arc<dyn LookupFailurePolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Requires owners to pass identity verification before registering.
    pub fn with_verifier(mut self, verifier: Arc<dyn IdentityVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Enables address → name lookups.
    pub fn with_reverse_resolver(mut self, reverse: Arc<dyn ReverseResolver>) -> Self {
        self.reverse = Some(reverse);
        self
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Returns the configuration.
    pub fn config(&self) -> &NamingConfig {
        &self.config
    }

    /// Returns the parent domain.
    pub fn parent(&self) -> &ParentDomain {
        &self.config.parent_domain
    }

    /// Returns true if `register` can submit transactions.
    pub fn registration_enabled(&self) -> bool {
        self.registration_enabled
    }

    /// Returns true if an identity verifier gates registration.
    pub fn verification_required(&self) -> bool {
        self.verifier.is_some()
    }

    /// Returns true if reverse lookups are available.
    pub fn reverse_lookup_enabled(&self) -> bool {
        self.reverse.is_some()
    }

    /// Returns the name of the lookup-failure policy.
    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Returns the registry client.
    pub fn registry(&self) -> &RegistryClient {
        &self.registry
    }

    /// Returns the registrar client.
    pub fn registrar(&self) -> &RegistrarClient {
        &self.registrar
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // OPERATIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Computes the namehash of a full name. Pure.
    pub fn namehash(&self, name: &str) -> Node {
        endoors_crypto::namehash(name)
    }

    /// Formats `label.parent` after validating `label`.
    pub fn format_subdomain(&self, label: &str) -> Result<String> {
        let label = Label::parse(label)?;
        Ok(self.registry.format_subdomain(&label))
    }

    /// Checks whether `label` can be registered.
    ///
    /// A failed lookup either propagates or, under a development policy,
    /// yields an answer tagged [`AvailabilitySource::AssumedAfterLookupFailure`].
    #[instrument(skip(self))]
    pub async fn check_availability(&self, label: &str) -> Result<Availability> {
        let label = Label::parse(label)?;
        let name = self.registry.format_subdomain(&label);

        match self.registrar.available(&label).await {
            Ok(available) => Ok(Availability {
                label,
                name,
                available,
                source: AvailabilitySource::Registrar,
            }),
            Err(e @ EndoorsError::LookupFailure { .. }) => {
                match self.policy.on_lookup_failure(&label, &e) {
                    LookupFailureDecision::AssumeAvailable => Ok(Availability {
                        label,
                        name,
                        available: true,
                        source: AvailabilitySource::AssumedAfterLookupFailure {
                            reason: e.to_string(),
                        },
                    }),
                    LookupFailureDecision::Propagate => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Registers `label` to `owner` and waits for finality.
    #[instrument(skip(self))]
    pub async fn register(&self, label: &str, owner: &EthAddress) -> Result<RegistrationReceipt> {
        let label = Label::parse(label)?;
        if owner.is_zero() {
            return Err(EndoorsError::InvalidAddress(
                "owner cannot be the zero address".into(),
            ));
        }

        if !self.registration_enabled {
            return Err(EndoorsError::ConfigError(
                "registration is disabled: no registrar credential configured".into(),
            ));
        }

        if let Some(verifier) = &self.verifier {
            if !verifier.is_verified(owner).await? {
                return Err(EndoorsError::NotVerified(owner.to_hex_string()));
            }
        }

        // An assumed answer never authorizes a submission.
        if !self.registrar.available(&label).await? {
            return Err(EndoorsError::AlreadyTaken(self.registry.format_subdomain(&label)));
        }

        let receipt = self.registrar.register(&label, owner).await?;
        info!(name = %receipt.name, owner = %receipt.owner, tx_hash = %receipt.tx_hash, "Registered");
        Ok(receipt)
    }

    /// Returns the owner of `label.parent`, or `None` if unregistered.
    pub async fn resolve(&self, label: &str) -> Result<Option<EthAddress>> {
        let label = Label::parse(label)?;
        self.registry.resolve_address_for_subdomain(&label).await
    }

    /// Returns the owner of a full name such as `alice.endoors.eth`.
    pub async fn resolve_name(&self, full_name: &str) -> Result<Option<EthAddress>> {
        self.registry.resolve_name(full_name).await
    }

    /// Returns the name `address` owns, if a reverse resolver is installed.
    pub async fn reverse_resolve(&self, address: &EthAddress) -> Result<Option<String>> {
        match &self.reverse {
            Some(reverse) => reverse.resolve_owner_for_address(address).await,
            None => Err(EndoorsError::NotSupported(
                "reverse lookup requires registry enumeration, which this deployment lacks".into(),
            )),
        }
    }
}

impl std::fmt::Debug for NamingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamingService")
            .field("network", &self.config.network)
            .field("parent", &self.config.parent_domain)
            .field("policy", &self.policy.name())
            .field("registration_enabled", &self.registration_enabled)
            .field("verification_required", &self.verification_required())
            .finish_non_exhaustive()
    }
}
