//! JSON-RPC naming ledger backed by alloy.
//!
//! Talks to the deployed `L2Registry` and `L2Registrar` contracts. Reads go
//! through a plain HTTP provider; writes are signed with the registrar
//! credential and sent through a wallet-filled provider built per call.

use std::fmt;
use std::future::IntoFuture;
use std::time::Duration;

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, B256};
use alloy::providers::{Provider, ProviderBuilder, ReqwestProvider};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use alloy::transports::RpcError;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};
use url::Url;

use endoors_core::config::{NamingConfig, RegistrarCredential};
use endoors_core::error::{EndoorsError, Result};
use endoors_core::traits::NamingLedger;
use endoors_core::types::{EthAddress, Label, LedgerReceipt, Node, TxHash};

sol! {
    #[sol(rpc)]
    interface IL2Registry {
        function owner(bytes32 node) external view returns (address);
    }

    #[sol(rpc)]
    interface IL2Registrar {
        function available(string calldata label) external view returns (bool);
        function register(string calldata label, address owner) external;
    }
}

/// Naming ledger over JSON-RPC.
///
/// Without a credential the ledger is read-only and
/// [`NamingLedger::submit_register`] fails with a configuration error
/// before anything is sent.
pub struct AlloyLedger {
    provider: ReqwestProvider,
    rpc_url: Url,
    chain_id: u64,
    registry: Address,
    registrar: Address,
    request_timeout: Duration,
    signer: Option<PrivateKeySigner>,
    /// Next account nonce; `None` until seeded from the node.
    nonce: Mutex<Option<u64>>,
}

impl AlloyLedger {
    /// Creates a read-only ledger from configuration.
    pub fn new(config: &NamingConfig) -> Result<Self> {
        let rpc_url = Url::parse(&config.rpc_url)
            .map_err(|e| EndoorsError::ConfigError(format!("invalid RPC URL: {}", e)))?;

        Ok(Self {
            provider: ReqwestProvider::new_http(rpc_url.clone()),
            rpc_url,
            chain_id: config.chain_id,
            registry: to_alloy_address(&config.registry_address),
            registrar: to_alloy_address(&config.registrar_address),
            request_timeout: config.request_timeout(),
            signer: None,
            nonce: Mutex::new(None),
        })
    }

    /// Creates a ledger that can submit registrations.
    pub fn with_credential(config: &NamingConfig, credential: &RegistrarCredential) -> Result<Self> {
        let signer: PrivateKeySigner = credential
            .expose_hex()
            .parse()
            .map_err(|_| EndoorsError::ConfigError("registrar private key is not a valid key".into()))?;

        debug!(signer = %signer.address(), "Registrar signer loaded");

        let mut ledger = Self::new(config)?;
        ledger.signer = Some(signer);
        Ok(ledger)
    }

    /// Returns true if this ledger holds a signing credential.
    pub fn can_submit(&self) -> bool {
        self.signer.is_some()
    }

    /// Address registrations are sent from, if a credential is loaded.
    pub fn signer_address(&self) -> Option<EthAddress> {
        self.signer
            .as_ref()
            .and_then(|s| EthAddress::from_bytes(s.address().as_slice()).ok())
    }

    /// Checks that the endpoint serves the configured chain.
    #[instrument(skip(self))]
    pub async fn verify_chain_id(&self) -> Result<()> {
        let remote = self
            .bounded("chain_id", self.provider.get_chain_id())
            .await?;

        if remote != self.chain_id {
            return Err(EndoorsError::ConfigError(format!(
                "RPC endpoint serves chain {} but chain {} is configured",
                remote, self.chain_id
            )));
        }
        Ok(())
    }

    /// Runs a read with the request timeout, mapping failures to lookup errors.
    async fn bounded<T, E, F>(&self, operation: &'static str, call: F) -> Result<T>
    where
        F: IntoFuture<Output = std::result::Result<T, E>>,
        E: fmt::Display,
    {
        match tokio::time::timeout(self.request_timeout, call.into_future()).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!(operation, error = %e, "Ledger read failed");
                Err(EndoorsError::lookup(operation, e))
            }
            Err(_) => {
                warn!(operation, "Ledger read timed out");
                Err(EndoorsError::lookup(
                    operation,
                    format!("no response within {}s", self.request_timeout.as_secs()),
                ))
            }
        }
    }

    /// Reads the account's pending transaction count.
    async fn seed_nonce(&self, from: Address) -> Result<u64> {
        let count = with_timeout(
            self.request_timeout,
            self.provider.get_transaction_count(from).pending(),
        )
        .await;

        match count {
            Ok(Ok(n)) => Ok(n),
            Ok(Err(e)) => Err(EndoorsError::NetworkFailure(e.to_string())),
            Err(elapsed) => Err(EndoorsError::NetworkFailure(elapsed)),
        }
    }

    async fn send_register(&self, label: &Label, owner: &EthAddress) -> Result<TxHash> {
        let signer = self.signer.as_ref().ok_or_else(|| {
            EndoorsError::ConfigError("no registrar credential configured; registration is disabled".into())
        })?;
        let from = signer.address();

        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(EthereumWallet::from(signer.clone()))
            .on_http(self.rpc_url.clone());
        let registrar = IL2Registrar::new(self.registrar, &provider);

        // Held across the send so nonces are handed out in order.
        let mut next_nonce = self.nonce.lock().await;

        let nonce = match *next_nonce {
            Some(n) => n,
            None => {
                // The fillers take the chain id from the node, so refuse to
                // sign for any chain other than the configured one.
                self.verify_chain_id().await?;
                self.seed_nonce(from).await?
            }
        };

        debug!(nonce, "Sending registration");

        let call = registrar
            .register(label.as_str().to_string(), to_alloy_address(owner))
            .nonce(nonce);
        let sent = with_timeout(self.request_timeout, call.send()).await;

        match sent {
            Ok(Ok(pending)) => {
                *next_nonce = Some(nonce + 1);
                Ok(TxHash::from_array(pending.tx_hash().0))
            }
            Ok(Err(e)) => {
                *next_nonce = None;
                Err(classify_submit_error(e))
            }
            Err(elapsed) => {
                *next_nonce = None;
                Err(EndoorsError::NetworkFailure(elapsed))
            }
        }
    }
}

impl fmt::Debug for AlloyLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlloyLedger")
            .field("rpc_url", &self.rpc_url.as_str())
            .field("chain_id", &self.chain_id)
            .field("registry", &self.registry)
            .field("registrar", &self.registrar)
            .field("can_submit", &self.can_submit())
            .finish()
    }
}

#[async_trait]
impl NamingLedger for AlloyLedger {
    #[instrument(skip(self))]
    async fn owner(&self, node: &Node) -> Result<EthAddress> {
        let registry = IL2Registry::new(self.registry, &self.provider);
        let result = self
            .bounded("owner", registry.owner(B256::from(*node.as_array())).call())
            .await?;

        from_alloy_address(result._0)
    }

    #[instrument(skip(self))]
    async fn available(&self, label: &Label) -> Result<bool> {
        let registrar = IL2Registrar::new(self.registrar, &self.provider);
        let result = self
            .bounded(
                "available",
                registrar.available(label.as_str().to_string()).call(),
            )
            .await?;

        Ok(result._0)
    }

    #[instrument(skip(self))]
    async fn submit_register(&self, label: &Label, owner: &EthAddress) -> Result<TxHash> {
        let tx_hash = self.send_register(label, owner).await?;
        debug!(%tx_hash, "Registration submitted");
        Ok(tx_hash)
    }

    async fn receipt(&self, tx_hash: &TxHash) -> Result<Option<LedgerReceipt>> {
        let receipt = self
            .bounded(
                "receipt",
                self.provider
                    .get_transaction_receipt(B256::from(*tx_hash.as_array())),
            )
            .await?;

        Ok(receipt.map(|r| LedgerReceipt {
            tx_hash: *tx_hash,
            block_number: r.block_number,
            succeeded: r.status(),
        }))
    }

    async fn block_number(&self) -> Result<u64> {
        self.bounded("block_number", self.provider.get_block_number())
            .await
    }
}

/// Maps a failed contract send to the error taxonomy.
///
/// Node-side rejections that mention a revert come from gas estimation
/// simulating the call; everything else the node refused is a plain
/// submission failure. Transport errors mean the node was not reached.
fn classify_submit_error(err: alloy::contract::Error) -> EndoorsError {
    match err {
        alloy::contract::Error::TransportError(RpcError::ErrorResp(payload)) => {
            let message = payload.message.to_string();
            if message.to_lowercase().contains("revert") {
                EndoorsError::SubmissionReverted(message)
            } else {
                EndoorsError::SubmissionFailure(message)
            }
        }
        alloy::contract::Error::TransportError(RpcError::Transport(kind)) => {
            EndoorsError::NetworkFailure(kind.to_string())
        }
        other => EndoorsError::SubmissionFailure(other.to_string()),
    }
}

async fn with_timeout<T, F>(limit: Duration, call: F) -> std::result::Result<T, String>
where
    F: IntoFuture<Output = T>,
{
    tokio::time::timeout(limit, call.into_future())
        .await
        .map_err(|_| format!("no response within {}s", limit.as_secs()))
}

fn to_alloy_address(address: &EthAddress) -> Address {
    Address::from(address.to_array())
}

fn from_alloy_address(address: Address) -> Result<EthAddress> {
    EthAddress::from_bytes(address.as_slice())
}
