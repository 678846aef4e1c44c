//! In-memory naming ledger.
//!
//! Simulates the registry and registrar contracts in-process so the naming
//! clients can be exercised without a chain. Suitable for development,
//! tests, and local demos.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, instrument};

use endoors_core::error::{EndoorsError, Result};
use endoors_core::traits::{NamingLedger, ReverseResolver};
use endoors_core::types::{EthAddress, Label, LedgerReceipt, Node, ParentDomain, TxHash};
use endoors_crypto::{keccak256_concat, subdomain_node};

/// Number of calls made against a [`MemoryLedger`], per operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallCounts {
    /// `owner(node)` reads
    pub owner: u64,
    /// `available(label)` reads
    pub available: u64,
    /// `register(label, owner)` submissions
    pub submit: u64,
    /// Receipt reads
    pub receipt: u64,
    /// Head block reads
    pub block_number: u64,
}

impl CallCounts {
    /// Total number of ledger calls.
    pub fn total(&self) -> u64 {
        self.owner + self.available + self.submit + self.receipt + self.block_number
    }
}

#[derive(Debug)]
struct QueuedRegistration {
    tx_hash: TxHash,
    label: Label,
    owner: EthAddress,
}

#[derive(Debug, Default)]
struct Counters {
    owner: AtomicU64,
    available: AtomicU64,
    submit: AtomicU64,
    receipt: AtomicU64,
    block_number: AtomicU64,
}

/// In-memory two-contract naming ledger.
///
/// # Model
///
/// - The registry is a `node → owner` map; absent means the zero address.
/// - The registrar answers `available(label)` as "not reserved and unowned",
///   and `register(label, owner)` reverts when the label is not available.
/// - Each mined transaction produces one block. Receipts carry the block
///   number, so confirmation depth can be observed with
///   [`MemoryLedger::advance_blocks`].
///
/// # Fault injection
///
/// Reads and submissions can be made to fail, and inclusion can be paused
/// so submitted transactions sit in a queue until
/// [`MemoryLedger::release_finality`] mines them in submission order.
///
/// # Thread Safety
///
/// All operations are thread-safe. Mining is serialized, so concurrent
/// registrations of the same label resolve to exactly one winner.
#[derive(Debug)]
pub struct MemoryLedger {
    /// Parent domain the registrar issues labels under
    parent: ParentDomain,
    /// Registry storage: node → owner
    owners: DashMap<Node, EthAddress>,
    /// Full names of registered nodes, in registration order
    history: RwLock<Vec<(Node, String)>>,
    /// Labels the registrar refuses regardless of registry state
    reserved: DashSet<String>,
    /// Mined receipts
    receipts: DashMap<TxHash, LedgerReceipt>,
    /// Submitted, not yet mined
    queue: Mutex<Vec<QueuedRegistration>>,
    /// Serializes block production
    mining: Mutex<()>,
    block_height: AtomicU64,
    nonce: AtomicU64,
    fail_reads: AtomicBool,
    fail_submissions: AtomicBool,
    finality_paused: AtomicBool,
    counters: Counters,
}

impl MemoryLedger {
    /// Creates an empty ledger issuing names under the default parent domain.
    pub fn new() -> Self {
        Self::with_parent(ParentDomain::default())
    }

    /// Creates an empty ledger issuing names under `parent`.
    pub fn with_parent(parent: ParentDomain) -> Self {
        Self {
            parent,
            owners: DashMap::new(),
            history: RwLock::new(Vec::new()),
            reserved: DashSet::new(),
            receipts: DashMap::new(),
            queue: Mutex::new(Vec::new()),
            mining: Mutex::new(()),
            block_height: AtomicU64::new(0),
            nonce: AtomicU64::new(0),
            fail_reads: AtomicBool::new(false),
            fail_submissions: AtomicBool::new(false),
            finality_paused: AtomicBool::new(false),
            counters: Counters::default(),
        }
    }

    /// Returns the parent domain.
    pub fn parent(&self) -> &ParentDomain {
        &self.parent
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SEEDING
    // ═══════════════════════════════════════════════════════════════════════════

    /// Writes `label → owner` into the registry directly, bypassing the registrar.
    pub fn set_owner(&self, label: &Label, owner: EthAddress) {
        let node = subdomain_node(label, &self.parent);
        self.owners.insert(node, owner);
        self.history.write().push((node, self.parent.subdomain(label)));
    }

    /// Makes the registrar refuse `label` even though the registry has no owner.
    pub fn reserve(&self, label: &Label) {
        self.reserved.insert(label.as_str().to_string());
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // FAULT INJECTION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Makes every read fail with a lookup failure.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes every submission fail before reaching the mempool.
    pub fn set_fail_submissions(&self, fail: bool) {
        self.fail_submissions.store(fail, Ordering::SeqCst);
    }

    /// Stops mining. Submissions queue until [`MemoryLedger::release_finality`].
    pub fn pause_finality(&self) {
        self.finality_paused.store(true, Ordering::SeqCst);
    }

    /// Resumes mining and mines every queued submission in order.
    ///
    /// Returns the number of transactions mined.
    pub fn release_finality(&self) -> usize {
        // The queue stays locked until the flag is cleared, so new
        // submissions cannot be mined ahead of queued ones.
        let mut queue = self.queue.lock();
        let queued: Vec<QueuedRegistration> = std::mem::take(&mut *queue);
        let count = queued.len();
        for tx in queued {
            self.mine(tx);
        }
        self.finality_paused.store(false, Ordering::SeqCst);
        count
    }

    /// Produces `n` empty blocks.
    pub fn advance_blocks(&self, n: u64) {
        let _guard = self.mining.lock();
        self.block_height.fetch_add(n, Ordering::SeqCst);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INSPECTION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Returns how many calls each operation has received.
    pub fn call_counts(&self) -> CallCounts {
        CallCounts {
            owner: self.counters.owner.load(Ordering::SeqCst),
            available: self.counters.available.load(Ordering::SeqCst),
            submit: self.counters.submit.load(Ordering::SeqCst),
            receipt: self.counters.receipt.load(Ordering::SeqCst),
            block_number: self.counters.block_number.load(Ordering::SeqCst),
        }
    }

    /// Returns the number of submitted transactions not yet mined.
    pub fn pending_count(&self) -> usize {
        self.queue.lock().len()
    }

    /// Returns the number of registered names.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Returns true if no name is registered.
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Current registry owner of `label`, without counting a call.
    pub fn owner_of(&self, label: &Label) -> EthAddress {
        let node = subdomain_node(label, &self.parent);
        self.stored_owner(&node)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNALS
    // ═══════════════════════════════════════════════════════════════════════════

    fn stored_owner(&self, node: &Node) -> EthAddress {
        self.owners
            .get(node)
            .map(|entry| *entry.value())
            .unwrap_or_else(EthAddress::zero)
    }

    fn registrar_allows(&self, label: &Label) -> bool {
        !self.reserved.contains(label.as_str()) && self.owner_of(label).is_zero()
    }

    fn check_reads(&self, operation: &str) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(EndoorsError::lookup(operation, "injected read failure"));
        }
        Ok(())
    }

    /// Includes one transaction in a new block.
    fn mine(&self, tx: QueuedRegistration) {
        let _guard = self.mining.lock();
        let block = self.block_height.fetch_add(1, Ordering::SeqCst) + 1;

        let succeeded = self.registrar_allows(&tx.label);
        if succeeded {
            let node = subdomain_node(&tx.label, &self.parent);
            self.owners.insert(node, tx.owner);
            self.history
                .write()
                .push((node, self.parent.subdomain(&tx.label)));
        }

        debug!(
            tx_hash = %tx.tx_hash,
            label = %tx.label,
            block,
            succeeded,
            "Mined registration"
        );

        self.receipts.insert(
            tx.tx_hash,
            LedgerReceipt {
                tx_hash: tx.tx_hash,
                block_number: Some(block),
                succeeded,
            },
        );
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NamingLedger for MemoryLedger {
    #[instrument(skip(self))]
    async fn owner(&self, node: &Node) -> Result<EthAddress> {
        self.counters.owner.fetch_add(1, Ordering::SeqCst);
        self.check_reads("owner")?;
        Ok(self.stored_owner(node))
    }

    #[instrument(skip(self))]
    async fn available(&self, label: &Label) -> Result<bool> {
        self.counters.available.fetch_add(1, Ordering::SeqCst);
        self.check_reads("available")?;
        Ok(self.registrar_allows(label))
    }

    #[instrument(skip(self))]
    async fn submit_register(&self, label: &Label, owner: &EthAddress) -> Result<TxHash> {
        self.counters.submit.fetch_add(1, Ordering::SeqCst);

        if self.fail_submissions.load(Ordering::SeqCst) {
            return Err(EndoorsError::SubmissionFailure(
                "injected submission failure".into(),
            ));
        }

        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst);
        let tx_hash = TxHash::from_array(keccak256_concat(&[
            &nonce.to_be_bytes(),
            label.as_str().as_bytes(),
            owner.as_bytes(),
        ]));

        debug!(%tx_hash, nonce, "Accepted registration");

        let tx = QueuedRegistration {
            tx_hash,
            label: label.clone(),
            owner: *owner,
        };

        {
            let mut queue = self.queue.lock();
            if self.finality_paused.load(Ordering::SeqCst) {
                queue.push(tx);
                return Ok(tx_hash);
            }
        }
        self.mine(tx);

        Ok(tx_hash)
    }

    async fn receipt(&self, tx_hash: &TxHash) -> Result<Option<LedgerReceipt>> {
        self.counters.receipt.fetch_add(1, Ordering::SeqCst);
        self.check_reads("receipt")?;
        Ok(self.receipts.get(tx_hash).map(|entry| entry.value().clone()))
    }

    async fn block_number(&self) -> Result<u64> {
        self.counters.block_number.fetch_add(1, Ordering::SeqCst);
        self.check_reads("block_number")?;
        Ok(self.block_height.load(Ordering::SeqCst))
    }
}

#[async_trait]
impl ReverseResolver for MemoryLedger {
    /// Returns the most recently registered name currently owned by `address`.
    #[instrument(skip(self))]
    async fn resolve_owner_for_address(&self, address: &EthAddress) -> Result<Option<String>> {
        self.check_reads("reverse_resolve")?;

        if address.is_zero() {
            return Ok(None);
        }

        let history = self.history.read();
        let found = history
            .iter()
            .rev()
            .find(|(node, _)| self.stored_owner(node) == *address)
            .map(|(_, name)| name.clone());

        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn label(s: &str) -> Label {
        Label::parse(s).unwrap()
    }

    fn addr(byte: u8) -> EthAddress {
        EthAddress::from_array([byte; 20])
    }

    #[tokio::test]
    async fn test_fresh_label_available_and_unowned() {
        let ledger = MemoryLedger::new();
        let alice = label("alice");

        assert!(ledger.available(&alice).await.unwrap());
        let node = subdomain_node(&alice, ledger.parent());
        assert!(ledger.owner(&node).await.unwrap().is_zero());
    }

    #[tokio::test]
    async fn test_register_sets_owner() {
        let ledger = MemoryLedger::new();
        let alice = label("alice");

        let tx = ledger.submit_register(&alice, &addr(0xa1)).await.unwrap();
        let receipt = ledger.receipt(&tx).await.unwrap().unwrap();

        assert!(receipt.succeeded);
        assert_eq!(receipt.block_number, Some(1));
        assert_eq!(ledger.owner_of(&alice), addr(0xa1));
        assert!(!ledger.available(&alice).await.unwrap());
    }

    #[tokio::test]
    async fn test_second_registration_reverts() {
        let ledger = MemoryLedger::new();
        let bob = label("bob");

        let first = ledger.submit_register(&bob, &addr(1)).await.unwrap();
        let second = ledger.submit_register(&bob, &addr(2)).await.unwrap();

        assert_ne!(first, second);
        assert!(ledger.receipt(&first).await.unwrap().unwrap().succeeded);
        assert!(!ledger.receipt(&second).await.unwrap().unwrap().succeeded);
        assert_eq!(ledger.owner_of(&bob), addr(1));
    }

    #[tokio::test]
    async fn test_reserved_label_diverges_from_registry() {
        let ledger = MemoryLedger::new();
        let admin = label("admin");
        ledger.reserve(&admin);

        assert!(!ledger.available(&admin).await.unwrap());
        assert!(ledger.owner_of(&admin).is_zero());

        let tx = ledger.submit_register(&admin, &addr(3)).await.unwrap();
        assert!(!ledger.receipt(&tx).await.unwrap().unwrap().succeeded);
        assert!(ledger.owner_of(&admin).is_zero());
    }

    #[tokio::test]
    async fn test_paused_finality_queues_submissions() {
        let ledger = MemoryLedger::new();
        ledger.pause_finality();

        let tx = ledger.submit_register(&label("carol"), &addr(4)).await.unwrap();
        assert!(ledger.receipt(&tx).await.unwrap().is_none());
        assert_eq!(ledger.pending_count(), 1);
        assert!(ledger.owner_of(&label("carol")).is_zero());

        assert_eq!(ledger.release_finality(), 1);
        assert_eq!(ledger.pending_count(), 0);
        assert!(ledger.receipt(&tx).await.unwrap().unwrap().succeeded);
        assert_eq!(ledger.owner_of(&label("carol")), addr(4));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_release_mines_queued_before_new_submissions() {
        for _ in 0..50 {
            let ledger = Arc::new(MemoryLedger::new());
            ledger.pause_finality();
            ledger.submit_register(&label("bob"), &addr(1)).await.unwrap();

            let releaser = {
                let ledger = ledger.clone();
                tokio::task::spawn_blocking(move || ledger.release_finality())
            };
            let late = ledger.submit_register(&label("bob"), &addr(2)).await.unwrap();

            assert_eq!(releaser.await.unwrap(), 1);
            assert_eq!(ledger.owner_of(&label("bob")), addr(1));
            assert!(!ledger.receipt(&late).await.unwrap().unwrap().succeeded);
        }
    }

    #[tokio::test]
    async fn test_advance_blocks() {
        let ledger = MemoryLedger::new();
        ledger.submit_register(&label("dave"), &addr(5)).await.unwrap();
        assert_eq!(ledger.block_number().await.unwrap(), 1);

        ledger.advance_blocks(4);
        assert_eq!(ledger.block_number().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let ledger = MemoryLedger::new();

        ledger.set_fail_reads(true);
        let err = ledger.available(&label("erin")).await.unwrap_err();
        assert!(matches!(err, EndoorsError::LookupFailure { .. }));
        assert!(ledger.block_number().await.is_err());
        ledger.set_fail_reads(false);

        ledger.set_fail_submissions(true);
        let err = ledger
            .submit_register(&label("erin"), &addr(6))
            .await
            .unwrap_err();
        assert!(matches!(err, EndoorsError::SubmissionFailure(_)));
        assert!(ledger.owner_of(&label("erin")).is_zero());
    }

    #[tokio::test]
    async fn test_call_counts() {
        let ledger = MemoryLedger::new();
        assert_eq!(ledger.call_counts().total(), 0);

        let frank = label("frank");
        ledger.available(&frank).await.unwrap();
        ledger.available(&frank).await.unwrap();
        ledger.owner(&Node::ROOT).await.unwrap();
        ledger.submit_register(&frank, &addr(7)).await.unwrap();

        let counts = ledger.call_counts();
        assert_eq!(counts.available, 2);
        assert_eq!(counts.owner, 1);
        assert_eq!(counts.submit, 1);
        assert_eq!(counts.total(), 4);

        // owner_of is inspection only
        ledger.owner_of(&frank);
        assert_eq!(ledger.call_counts().total(), 4);
    }

    #[tokio::test]
    async fn test_reverse_resolution() {
        let ledger = MemoryLedger::new();
        let owner = addr(8);

        assert_eq!(ledger.resolve_owner_for_address(&owner).await.unwrap(), None);

        ledger.submit_register(&label("grace"), &owner).await.unwrap();
        assert_eq!(
            ledger.resolve_owner_for_address(&owner).await.unwrap(),
            Some("grace.endoors.eth".to_string())
        );

        // Ownership moved away in the registry
        ledger.set_owner(&label("grace"), addr(9));
        assert_eq!(ledger.resolve_owner_for_address(&owner).await.unwrap(), None);
        assert_eq!(
            ledger.resolve_owner_for_address(&addr(9)).await.unwrap(),
            Some("grace.endoors.eth".to_string())
        );

        assert_eq!(
            ledger
                .resolve_owner_for_address(&EthAddress::zero())
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_concurrent_registrations_single_winner() {
        use tokio::task::JoinSet;

        let ledger = Arc::new(MemoryLedger::new());
        let mut tasks = JoinSet::new();

        for i in 1..=16u8 {
            let ledger = ledger.clone();
            tasks.spawn(async move {
                let tx = ledger.submit_register(&label("bob"), &addr(i)).await.unwrap();
                ledger.receipt(&tx).await.unwrap().unwrap().succeeded
            });
        }

        let mut winners = 0;
        while let Some(result) = tasks.join_next().await {
            if result.unwrap() {
                winners += 1;
            }
        }

        assert_eq!(winners, 1);
        assert!(!ledger.owner_of(&label("bob")).is_zero());
        assert_eq!(ledger.len(), 1);
    }
}
