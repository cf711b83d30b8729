//! DAO service - data fetchers and mutators over the contract gateway
//!
//! Fetchers return plain results; the `publish_*` wrappers and the mutators
//! report through `RuntimeEvent`s so the UI can reduce them into its state.

mod fetch;
mod mutate;

use std::sync::Arc;

use alloy::primitives::Address;
use tokio::sync::Mutex;

use crate::infrastructure::ethereum::ConnectionManager;

/// Deployed contract addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractAddresses {
    pub dao: Address,
    pub nft: Address,
}

pub struct DaoService {
    conn: Arc<ConnectionManager>,
    contracts: ContractAddresses,
    /// Single slot: at most one mutation waits for confirmation at a time
    in_flight: Mutex<()>,
}

impl DaoService {
    pub fn new(conn: Arc<ConnectionManager>, contracts: ContractAddresses) -> Self {
        Self {
            conn,
            contracts,
            in_flight: Mutex::new(()),
        }
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.conn
    }
}
