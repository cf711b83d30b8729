//! Error taxonomy for chain reads and writes

use alloy::primitives::B256;
use thiserror::Error;

use crate::domain::network_name;

#[derive(Debug, Error)]
pub enum DaoError {
    /// Wallet is on a different chain than the deployed contracts
    #[error("wrong network: connected to {}, change network to {}", network_name(*.actual), network_name(*.expected))]
    WrongNetwork { expected: u64, actual: u64 },
    #[error("wallet is not connected")]
    NotConnected,
    #[error("no signing account available")]
    NoSigner,
    /// Another mutation holds the single in-flight slot
    #[error("another transaction is still waiting for confirmation")]
    Busy,
    /// A read or a submission was rejected (node error, revert on estimation, user rejection)
    #[error("call failed: {0:#}")]
    Call(anyhow::Error),
    #[error("transaction {0} reverted")]
    Reverted(B256),
    #[error("confirmation failed: {0:#}")]
    Confirmation(anyhow::Error),
}

impl DaoError {
    pub fn is_wrong_network(&self) -> bool {
        matches!(self, DaoError::WrongNetwork { .. })
    }
}

pub type DaoResult<T> = std::result::Result<T, DaoError>;
