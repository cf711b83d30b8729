//! Ethereum infrastructure - Alloy client, connection manager and contract bindings

mod client;
mod connection;
mod contracts;

pub use client::{AlloyConnector, ChainClient, Connector, ProviderConfig, WalletSource};
pub use connection::{ConnectionInfo, ConnectionManager, Handle};
pub use contracts::{DaoContract, NftContract, PendingTx};
