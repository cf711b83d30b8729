//! Connection manager: one wallet-backed connection per session, pinned to a chain

use std::sync::Arc;

use alloy::primitives::Address;
use tokio::sync::RwLock;

use crate::error::{DaoError, DaoResult};
use crate::infrastructure::ethereum::client::{ChainClient, Connector};

/// Access to the chain, with or without a signing identity
#[derive(Clone)]
pub enum Handle {
    ReadOnly(Arc<dyn ChainClient>),
    Signer {
        client: Arc<dyn ChainClient>,
        address: Address,
    },
}

impl Handle {
    pub fn client(&self) -> &Arc<dyn ChainClient> {
        match self {
            Handle::ReadOnly(client) => client,
            Handle::Signer { client, .. } => client,
        }
    }

    pub fn signer(&self) -> Option<Address> {
        match self {
            Handle::ReadOnly(_) => None,
            Handle::Signer { address, .. } => Some(*address),
        }
    }
}

/// Result of a successful connect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub endpoint: String,
    pub chain_id: u64,
    pub account: Option<Address>,
}

/// Owns the session's connection. Constructed once and shared by reference.
pub struct ConnectionManager {
    connector: Box<dyn Connector>,
    required_chain_id: u64,
    client: RwLock<Option<Arc<dyn ChainClient>>>,
}

impl ConnectionManager {
    pub fn new(connector: Box<dyn Connector>, required_chain_id: u64) -> Self {
        Self {
            connector,
            required_chain_id,
            client: RwLock::new(None),
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.client.read().await.is_some()
    }

    /// Open the connection if needed and verify the network.
    /// An existing connection is reused; a wrong network caches nothing.
    /// This is the only place the connector is opened.
    pub async fn connect(&self) -> DaoResult<ConnectionInfo> {
        let client = self.open().await?;
        let chain_id = self.verify_network(client.as_ref()).await?;
        let account = client.signer_address().await.map_err(DaoError::Call)?;
        Ok(ConnectionInfo {
            endpoint: client.endpoint_name(),
            chain_id,
            account,
        })
    }

    /// Drop the cached connection. Requests fail until the next `connect`.
    pub async fn disconnect(&self) {
        if self.client.write().await.take().is_some() {
            tracing::info!("wallet disconnected");
        }
    }

    /// Read-only or signing access. The network is checked on every request.
    /// Fails with `NotConnected` until `connect` succeeds and after `disconnect`.
    pub async fn handle(&self, needs_signer: bool) -> DaoResult<Handle> {
        let client = self
            .client
            .read()
            .await
            .as_ref()
            .map(Arc::clone)
            .ok_or(DaoError::NotConnected)?;
        self.verify_network(client.as_ref()).await?;

        if !needs_signer {
            return Ok(Handle::ReadOnly(client));
        }
        match client.signer_address().await.map_err(DaoError::Call)? {
            Some(address) => Ok(Handle::Signer { client, address }),
            None => Err(DaoError::NoSigner),
        }
    }

    async fn open(&self) -> DaoResult<Arc<dyn ChainClient>> {
        if let Some(client) = self.client.read().await.as_ref() {
            return Ok(Arc::clone(client));
        }

        let mut slot = self.client.write().await;
        if let Some(client) = slot.as_ref() {
            return Ok(Arc::clone(client));
        }
        let client = self.connector.open().await.map_err(DaoError::Call)?;
        self.verify_network(client.as_ref()).await?;
        tracing::info!(endpoint = %client.endpoint_name(), "wallet connected");
        *slot = Some(Arc::clone(&client));
        Ok(client)
    }

    async fn verify_network(&self, client: &dyn ChainClient) -> DaoResult<u64> {
        let actual = client.chain_id().await.map_err(DaoError::Call)?;
        if actual != self.required_chain_id {
            tracing::warn!(actual, expected = self.required_chain_id, "wrong network");
            return Err(DaoError::WrongNetwork {
                expected: self.required_chain_id,
                actual,
            });
        }
        Ok(actual)
    }
}
