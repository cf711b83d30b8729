//! Chain client abstraction and the Alloy implementation
//!
//! `ChainClient` is the whole surface the dashboard needs from a node plus
//! wallet; `Connector` opens one. Tests substitute both with in-memory fakes.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use tokio::time::interval;

/// How often a pending transaction is polled for its receipt
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(1500);

/// Node endpoint configuration
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    /// HTTP JSON-RPC endpoint
    Http(String),
    /// WebSocket endpoint
    WebSocket(String),
    /// IPC socket path (Unix only)
    #[cfg(unix)]
    Ipc(PathBuf),
}

impl ProviderConfig {
    /// Get display name for this endpoint
    pub fn display(&self) -> String {
        match self {
            ProviderConfig::Http(url) => url.clone(),
            ProviderConfig::WebSocket(url) => url.clone(),
            #[cfg(unix)]
            ProviderConfig::Ipc(path) => path.display().to_string(),
        }
    }
}

/// Where the signing identity comes from
#[derive(Clone)]
pub enum WalletSource {
    /// Sign locally with a private key
    LocalKey(PrivateKeySigner),
    /// Let the node sign for an unlocked account; `None` picks the node's first account
    Unlocked(Option<Address>),
}

impl std::fmt::Debug for WalletSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalletSource::LocalKey(signer) => write!(f, "LocalKey({})", signer.address()),
            WalletSource::Unlocked(account) => write!(f, "Unlocked({account:?})"),
        }
    }
}

/// Everything the dashboard asks of the node and the wallet
#[async_trait::async_trait]
pub trait ChainClient: Send + Sync + 'static {
    /// Numeric chain identifier of the connected network
    async fn chain_id(&self) -> Result<u64>;

    /// Address of the signing identity, if one is available
    async fn signer_address(&self) -> Result<Option<Address>>;

    /// Native balance of an address, in wei
    async fn get_balance(&self, address: Address) -> Result<U256>;

    /// Execute a read-only call (eth_call)
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes>;

    /// Submit a state-changing transaction and return its hash
    async fn send_transaction(&self, from: Address, to: Address, data: Bytes) -> Result<B256>;

    /// Wait until the transaction is included. Returns the receipt status.
    async fn wait_for_receipt(&self, hash: B256) -> Result<bool>;

    /// Get endpoint display name
    fn endpoint_name(&self) -> String;
}

/// Opens a `ChainClient`; stands in for the wallet provider's connect prompt
#[async_trait::async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn open(&self) -> Result<Arc<dyn ChainClient>>;
}

/// Connector backed by an Alloy provider
#[derive(Debug, Clone)]
pub struct AlloyConnector {
    pub endpoint: ProviderConfig,
    pub wallet: WalletSource,
}

impl AlloyConnector {
    pub fn new(endpoint: ProviderConfig, wallet: WalletSource) -> Self {
        Self { endpoint, wallet }
    }
}

// Connect a builder over the configured transport and erase the filler stack
macro_rules! connect_erased {
    ($builder:expr, $endpoint:expr) => {
        match $endpoint {
            ProviderConfig::Http(url) => {
                let rpc_url = url.parse().context("Invalid HTTP URL")?;
                $builder.connect_http(rpc_url).erased()
            }
            ProviderConfig::WebSocket(url) => $builder
                .connect(url.as_str())
                .await
                .context("Failed to create WebSocket provider")?
                .erased(),
            #[cfg(unix)]
            ProviderConfig::Ipc(path) => {
                use alloy::providers::IpcConnect;
                let ipc = IpcConnect::new(path.to_string_lossy().to_string());
                $builder
                    .connect_ipc(ipc)
                    .await
                    .context("Failed to create IPC provider")?
                    .erased()
            }
        }
    };
}

#[async_trait::async_trait]
impl Connector for AlloyConnector {
    async fn open(&self) -> Result<Arc<dyn ChainClient>> {
        let endpoint = self.endpoint.display();
        let client = match &self.wallet {
            WalletSource::LocalKey(signer) => {
                let address = signer.address();
                let builder = ProviderBuilder::new().wallet(EthereumWallet::from(signer.clone()));
                let provider = connect_erased!(builder, &self.endpoint);
                AlloyClient {
                    provider,
                    signer: Some(address),
                    endpoint,
                }
            }
            WalletSource::Unlocked(account) => {
                let builder = ProviderBuilder::new();
                let provider = connect_erased!(builder, &self.endpoint);
                let signer = match account {
                    Some(address) => Some(*address),
                    None => first_account(provider.get_accounts().await),
                };
                AlloyClient {
                    provider,
                    signer,
                    endpoint,
                }
            }
        };

        tracing::debug!(endpoint = %client.endpoint, signer = ?client.signer, "provider opened");
        Ok(Arc::new(client))
    }
}

/// First account the node reports. A failed lookup leaves the session read-only.
fn first_account<E: std::fmt::Display>(
    accounts: std::result::Result<Vec<Address>, E>,
) -> Option<Address> {
    match accounts {
        Ok(accounts) => accounts.first().copied(),
        Err(err) => {
            tracing::warn!("eth_accounts failed, continuing without a signer: {err}");
            None
        }
    }
}

/// Alloy provider plus the account it signs for
pub struct AlloyClient {
    provider: DynProvider,
    signer: Option<Address>,
    endpoint: String,
}

#[async_trait::async_trait]
impl ChainClient for AlloyClient {
    async fn chain_id(&self) -> Result<u64> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn signer_address(&self) -> Result<Option<Address>> {
        Ok(self.signer)
    }

    async fn get_balance(&self, address: Address) -> Result<U256> {
        Ok(self.provider.get_balance(address).await?)
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let request = TransactionRequest::default().to(to).input(data.into());
        Ok(self.provider.call(request).await?)
    }

    async fn send_transaction(&self, from: Address, to: Address, data: Bytes) -> Result<B256> {
        let request = TransactionRequest::default()
            .from(from)
            .to(to)
            .input(data.into());
        let pending = self.provider.send_transaction(request).await?;
        Ok(*pending.tx_hash())
    }

    async fn wait_for_receipt(&self, hash: B256) -> Result<bool> {
        let mut ticker = interval(RECEIPT_POLL_INTERVAL);
        loop {
            ticker.tick().await;
            match self.provider.get_transaction_receipt(hash).await {
                Ok(Some(receipt)) => return Ok(receipt.status()),
                Ok(None) => {
                    tracing::trace!(%hash, "receipt not available yet");
                }
                Err(err) => {
                    return Err(anyhow::Error::new(err)
                        .context(format!("Receipt lookup for {hash} failed")));
                }
            }
        }
    }

    fn endpoint_name(&self) -> String {
        self.endpoint.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_account() {
        let a = Address::repeat_byte(1);
        let b = Address::repeat_byte(2);
        assert_eq!(first_account::<String>(Ok(vec![a, b])), Some(a));
        assert_eq!(first_account::<String>(Ok(Vec::new())), None);
        assert_eq!(first_account(Err("method not found")), None);
    }
}
