//! Registrar client: availability, submission, and the finality wait.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, instrument, warn};

use endoors_core::config::NamingConfig;
use endoors_core::error::{EndoorsError, Result};
use endoors_core::traits::NamingLedger;
use endoors_core::types::{
    EthAddress, Label, LedgerReceipt, ParentDomain, PendingRegistration, RegistrationReceipt,
    RegistrationState, TxHash,
};
use endoors_crypto::subdomain_node;

/// How long and how deep to wait for a registration to finalize.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FinalityOptions {
    /// Upper bound on the whole wait
    pub timeout: Duration,
    /// Delay between receipt polls
    pub poll_interval: Duration,
    /// Blocks, including the inclusion block, required before confirming
    pub confirmations: u64,
}

impl FinalityOptions {
    /// Takes the finality settings from configuration.
    pub fn from_config(config: &NamingConfig) -> Self {
        Self {
            timeout: config.finality_timeout(),
            poll_interval: config.poll_interval(),
            confirmations: config.confirmations.max(1),
        }
    }
}

impl Default for FinalityOptions {
    fn default() -> Self {
        Self::from_config(&NamingConfig::default())
    }
}

/// Client for the registrar contract.
///
/// One call to [`RegistrarClient::register`] is one attempt: it submits at
/// most one transaction and never retries.
#[derive(Clone)]
pub struct RegistrarClient {
    ledger: Arc<dyn NamingLedger>,
    parent: ParentDomain,
    finality: FinalityOptions,
}

impl RegistrarClient {
    /// Creates a client issuing names under `parent`.
    pub fn new(ledger: Arc<dyn NamingLedger>, parent: ParentDomain, finality: FinalityOptions) -> Self {
        Self {
            ledger,
            parent,
            finality,
        }
    }

    /// Returns the finality settings.
    pub fn finality(&self) -> FinalityOptions {
        self.finality
    }

    /// Asks the registrar whether `label` can be registered.
    ///
    /// The registrar's answer is returned verbatim. It is authoritative over
    /// the registry's owner record, which reserved labels do not appear in.
    #[instrument(skip(self))]
    pub async fn available(&self, label: &Label) -> Result<bool> {
        let available = self.ledger.available(label).await?;
        debug!(%label, available, "Registrar availability");
        Ok(available)
    }

    /// Submits a registration without waiting for it.
    #[instrument(skip(self))]
    pub async fn submit(&self, label: &Label, owner: &EthAddress) -> Result<PendingRegistration> {
        if owner.is_zero() {
            return Err(EndoorsError::InvalidAddress(
                "owner cannot be the zero address".into(),
            ));
        }

        let tx_hash = self.ledger.submit_register(label, owner).await?;
        let name = self.parent.subdomain(label);

        info!(%name, %owner, %tx_hash, "Registration submitted");

        Ok(PendingRegistration {
            label: label.clone(),
            node: subdomain_node(label, &self.parent),
            name,
            owner: *owner,
            tx_hash,
            submitted_at: Utc::now(),
        })
    }

    /// Polls until `pending` is final or the bounded wait elapses.
    ///
    /// Never returns `Unsubmitted` or `Pending`. A read failure while polling
    /// is logged and polling continues; only the deadline ends the wait
    /// without an answer.
    #[instrument(skip(self, pending), fields(tx_hash = %pending.tx_hash))]
    pub async fn await_finality(&self, pending: &PendingRegistration) -> RegistrationState {
        let started = Instant::now();
        let deadline = started + self.finality.timeout;

        loop {
            match self.ledger.receipt(&pending.tx_hash).await {
                Ok(Some(receipt)) if !receipt.succeeded => {
                    warn!(block = ?receipt.block_number, "Registration reverted");
                    return RegistrationState::Rejected {
                        tx_hash: pending.tx_hash,
                        block_number: receipt.block_number,
                    };
                }
                Ok(Some(receipt)) => {
                    if self.is_deep_enough(&receipt).await {
                        info!(name = %pending.name, block = ?receipt.block_number, "Registration confirmed");
                        return RegistrationState::Confirmed(RegistrationReceipt::from_pending(
                            pending, &receipt,
                        ));
                    }
                    debug!(block = ?receipt.block_number, "Included, awaiting confirmations");
                }
                Ok(None) => debug!("Not yet included"),
                Err(e) => warn!(error = %e, "Receipt poll failed"),
            }

            let now = Instant::now();
            if now >= deadline {
                let waited_secs = started.elapsed().as_secs();
                warn!(waited_secs, "Finality not observed; outcome unknown");
                return RegistrationState::TimedOut {
                    tx_hash: pending.tx_hash,
                    waited_secs,
                };
            }

            sleep(self.finality.poll_interval.min(deadline - now)).await;
        }
    }

    /// Registers `label` to `owner` and waits for finality.
    ///
    /// Maps the terminal state to a result: `Confirmed` is success; a
    /// rejection is `AlreadyTaken` if the registry now shows an owner and
    /// `TransactionReverted` otherwise; a timeout is `FinalityTimeout`,
    /// which means the outcome is unknown.
    pub async fn register(&self, label: &Label, owner: &EthAddress) -> Result<RegistrationReceipt> {
        let pending = match self.submit(label, owner).await {
            Ok(pending) => pending,
            Err(EndoorsError::SubmissionReverted(reason)) => {
                return Err(self
                    .explain_rejection(label, EndoorsError::SubmissionReverted(reason))
                    .await)
            }
            Err(e) => return Err(e),
        };

        match self.await_finality(&pending).await {
            RegistrationState::Confirmed(receipt) => Ok(receipt),
            RegistrationState::Rejected { tx_hash, .. } => {
                let reverted = EndoorsError::TransactionReverted {
                    tx_hash: tx_hash.to_hex(),
                    reason: "registrar rejected the registration".into(),
                };
                Err(self.explain_rejection(label, reverted).await)
            }
            RegistrationState::TimedOut {
                tx_hash,
                waited_secs,
            } => Err(EndoorsError::FinalityTimeout {
                tx_hash: tx_hash.to_hex(),
                waited_secs,
            }),
            other => Err(EndoorsError::InternalError(format!(
                "finality wait ended in state {}",
                other.as_str()
            ))),
        }
    }

    /// Looks up the transaction's receipt state once.
    pub async fn status(&self, tx_hash: &TxHash) -> Result<Option<LedgerReceipt>> {
        self.ledger.receipt(tx_hash).await
    }

    async fn is_deep_enough(&self, receipt: &LedgerReceipt) -> bool {
        if self.finality.confirmations <= 1 {
            return true;
        }

        let Some(included) = receipt.block_number else {
            return false;
        };

        match self.ledger.block_number().await {
            Ok(head) => head.saturating_sub(included) + 1 >= self.finality.confirmations,
            Err(e) => {
                warn!(error = %e, "Head block poll failed");
                false
            }
        }
    }

    /// Distinguishes a lost race from any other revert.
    async fn explain_rejection(&self, label: &Label, fallback: EndoorsError) -> EndoorsError {
        let node = subdomain_node(label, &self.parent);
        match self.ledger.owner(&node).await {
            Ok(owner) if !owner.is_zero() => {
                EndoorsError::AlreadyTaken(self.parent.subdomain(label))
            }
            Ok(_) => fallback,
            Err(e) => {
                warn!(error = %e, "Could not read owner after rejection");
                fallback
            }
        }
    }
}

impl std::fmt::Debug for RegistrarClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrarClient")
            .field("parent", &self.parent)
            .field("finality", &self.finality)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use endoors_core::error::ErrorKind;
    use endoors_registry::MemoryLedger;

    fn fast() -> FinalityOptions {
        FinalityOptions {
            timeout: Duration::from_millis(200),
            poll_interval: Duration::from_millis(10),
            confirmations: 1,
        }
    }

    fn client_with(options: FinalityOptions) -> (Arc<MemoryLedger>, RegistrarClient) {
        let ledger = Arc::new(MemoryLedger::new());
        let client = RegistrarClient::new(ledger.clone(), ParentDomain::default(), options);
        (ledger, client)
    }

    fn label(s: &str) -> Label {
        Label::parse(s).unwrap()
    }

    fn addr(byte: u8) -> EthAddress {
        EthAddress::from_array([byte; 20])
    }

    #[tokio::test]
    async fn test_available_is_idempotent() {
        let (ledger, client) = client_with(fast());
        let alice = label("alice");

        let first = client.available(&alice).await.unwrap();
        let second = client.available(&alice).await.unwrap();

        assert!(first);
        assert_eq!(first, second);
        assert_eq!(ledger.call_counts().submit, 0);
        assert!(ledger.is_empty());
    }

    #[tokio::test]
    async fn test_register_end_to_end() {
        let (ledger, client) = client_with(fast());
        let alice = label("alice");
        let owner = addr(0xa1);

        assert!(client.available(&alice).await.unwrap());

        let receipt = client.register(&alice, &owner).await.unwrap();
        assert_eq!(receipt.name, "alice.endoors.eth");
        assert_eq!(receipt.owner, owner);
        assert_eq!(
            receipt.node.to_hex(),
            "0x1e5e16395416076656f4ee99daff877bfd4a86e2cbf544ca847c4899ac3f4381"
        );

        assert_eq!(ledger.owner_of(&alice), owner);
        assert!(!client.available(&alice).await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_registration_single_winner() {
        let (ledger, client) = client_with(fast());
        let bob = label("bob");
        let (first, second) = (addr(1), addr(2));

        let (a, b) = tokio::join!(
            client.register(&bob, &first),
            client.register(&bob, &second)
        );

        let results = [a, b];
        let confirmed = results.iter().filter(|r| r.is_ok()).count();
        let taken = results
            .iter()
            .filter(|r| matches!(r, Err(EndoorsError::AlreadyTaken(_))))
            .count();

        assert_eq!(confirmed, 1);
        assert_eq!(taken, 1);

        let winner = results.iter().find_map(|r| r.as_ref().ok()).unwrap();
        assert_eq!(ledger.owner_of(&bob), winner.owner);
    }

    #[tokio::test]
    async fn test_reserved_label_reverts() {
        let (ledger, client) = client_with(fast());
        let admin = label("admin");
        ledger.reserve(&admin);

        let err = client.register(&admin, &addr(3)).await.unwrap_err();
        assert!(matches!(err, EndoorsError::TransactionReverted { .. }));
        assert_eq!(err.kind(), ErrorKind::TransactionReverted);
    }

    #[tokio::test]
    async fn test_zero_owner_rejected_before_submission() {
        let (ledger, client) = client_with(fast());

        let err = client
            .register(&label("carol"), &EthAddress::zero())
            .await
            .unwrap_err();

        assert!(err.is_validation_error());
        assert_eq!(ledger.call_counts().total(), 0);
    }

    #[tokio::test]
    async fn test_submission_failure_propagates() {
        let (ledger, client) = client_with(fast());
        ledger.set_fail_submissions(true);

        let err = client.register(&label("dave"), &addr(4)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SubmissionFailure);
        assert_eq!(ledger.call_counts().receipt, 0);
    }

    #[tokio::test]
    async fn test_timeout_then_late_finalization() {
        let (ledger, client) = client_with(fast());
        let erin = label("erin");
        ledger.pause_finality();

        let err = client.register(&erin, &addr(5)).await.unwrap_err();
        assert!(err.is_outcome_unknown());
        assert_eq!(err.kind(), ErrorKind::FinalityTimeout);

        // The transaction was not retracted.
        assert_eq!(ledger.pending_count(), 1);
        ledger.release_finality();
        assert_eq!(ledger.owner_of(&erin), addr(5));
    }

    #[tokio::test]
    async fn test_await_again_after_timeout() {
        let (ledger, client) = client_with(fast());
        ledger.pause_finality();

        let pending = client.submit(&label("frank"), &addr(6)).await.unwrap();
        let state = client.await_finality(&pending).await;
        assert!(matches!(state, RegistrationState::TimedOut { .. }));
        assert_eq!(state.tx_hash(), Some(pending.tx_hash));

        ledger.release_finality();
        let state = client.await_finality(&pending).await;
        assert!(matches!(state, RegistrationState::Confirmed(_)));
    }

    #[tokio::test]
    async fn test_confirmation_depth() {
        let (ledger, client) = client_with(FinalityOptions {
            confirmations: 3,
            ..fast()
        });

        let pending = client.submit(&label("grace"), &addr(7)).await.unwrap();
        let state = client.await_finality(&pending).await;
        assert!(matches!(state, RegistrationState::TimedOut { .. }));

        ledger.advance_blocks(2);
        let state = client.await_finality(&pending).await;
        match state {
            RegistrationState::Confirmed(receipt) => assert_eq!(receipt.block_number, Some(1)),
            other => panic!("expected confirmed, got {}", other.as_str()),
        }
    }

    #[tokio::test]
    async fn test_poll_failures_do_not_end_wait() {
        let (ledger, client) = client_with(fast());
        ledger.pause_finality();

        let pending = client.submit(&label("heidi"), &addr(8)).await.unwrap();
        ledger.set_fail_reads(true);

        let state = client.await_finality(&pending).await;
        assert!(matches!(state, RegistrationState::TimedOut { .. }));
        assert!(ledger.call_counts().receipt > 1);
    }
}
