//! Typed call surface over the DAO and membership NFT contracts

use std::sync::Arc;

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

use crate::domain::{to_u64, RawProposal, VoteChoice};
use crate::error::{DaoError, DaoResult};
use crate::infrastructure::ethereum::client::ChainClient;
use crate::infrastructure::ethereum::connection::Handle;

sol! {
    /// Governance contract holding the treasury and the proposal records
    interface IDaoGovernor {
        function numProposals() external view returns (uint256);
        function proposals(uint256 index) external view returns (
            uint256 nftTokenId,
            uint256 deadline,
            uint256 yayVotes,
            uint256 nayVotes,
            bool executed
        );
        function createProposal(uint256 nftTokenId) external returns (uint256);
        function voteOnProposal(uint256 proposalIndex, uint8 vote) external;
        function executeProposal(uint256 proposalIndex) external;
    }

    /// Membership token; any balance grants governance rights
    interface IMembershipNft {
        function balanceOf(address owner) external view returns (uint256);
    }
}

/// A submitted transaction awaiting inclusion
pub struct PendingTx {
    hash: B256,
    client: Arc<dyn ChainClient>,
}

impl PendingTx {
    pub fn hash(&self) -> B256 {
        self.hash
    }

    /// Block until the network includes the transaction. No timeout.
    pub async fn confirm(self) -> DaoResult<B256> {
        let ok = self
            .client
            .wait_for_receipt(self.hash)
            .await
            .map_err(DaoError::Confirmation)?;
        if ok {
            Ok(self.hash)
        } else {
            Err(DaoError::Reverted(self.hash))
        }
    }
}

/// DAO governance contract bound to a connection handle
pub struct DaoContract<'a> {
    address: Address,
    handle: &'a Handle,
}

impl<'a> DaoContract<'a> {
    pub fn new(address: Address, handle: &'a Handle) -> Self {
        Self { address, handle }
    }

    /// Network-level balance of the contract (not a contract call)
    pub async fn treasury_balance(&self) -> DaoResult<U256> {
        self.handle
            .client()
            .get_balance(self.address)
            .await
            .map_err(DaoError::Call)
    }

    pub async fn num_proposals(&self) -> DaoResult<u64> {
        let count = self.read(IDaoGovernor::numProposalsCall {}).await?;
        to_u64(count, "proposal count").map_err(DaoError::Call)
    }

    pub async fn proposal(&self, id: u64) -> DaoResult<RawProposal> {
        let ret = self
            .read(IDaoGovernor::proposalsCall {
                index: U256::from(id),
            })
            .await?;
        Ok(RawProposal {
            nft_token_id: ret.nftTokenId,
            deadline_secs: ret.deadline,
            yay: ret.yayVotes,
            nay: ret.nayVotes,
            executed: ret.executed,
        })
    }

    pub async fn create_proposal(&self, token_id: U256) -> DaoResult<PendingTx> {
        self.submit(IDaoGovernor::createProposalCall {
            nftTokenId: token_id,
        })
        .await
    }

    pub async fn vote(&self, proposal_id: u64, choice: VoteChoice) -> DaoResult<PendingTx> {
        self.submit(IDaoGovernor::voteOnProposalCall {
            proposalIndex: U256::from(proposal_id),
            vote: choice.code(),
        })
        .await
    }

    pub async fn execute(&self, proposal_id: u64) -> DaoResult<PendingTx> {
        self.submit(IDaoGovernor::executeProposalCall {
            proposalIndex: U256::from(proposal_id),
        })
        .await
    }

    async fn read<C: SolCall>(&self, call: C) -> DaoResult<C::Return> {
        read_call(self.handle, self.address, call).await
    }

    async fn submit<C: SolCall>(&self, call: C) -> DaoResult<PendingTx> {
        let from = self.handle.signer().ok_or(DaoError::NoSigner)?;
        let client = Arc::clone(self.handle.client());
        let hash = client
            .send_transaction(from, self.address, Bytes::from(call.abi_encode()))
            .await
            .map_err(DaoError::Call)?;
        tracing::info!(%hash, signature = C::SIGNATURE, "transaction submitted");
        Ok(PendingTx { hash, client })
    }
}

/// Membership NFT contract bound to a connection handle
pub struct NftContract<'a> {
    address: Address,
    handle: &'a Handle,
}

impl<'a> NftContract<'a> {
    pub fn new(address: Address, handle: &'a Handle) -> Self {
        Self { address, handle }
    }

    pub async fn balance_of(&self, owner: Address) -> DaoResult<u64> {
        let balance = read_call(
            self.handle,
            self.address,
            IMembershipNft::balanceOfCall { owner },
        )
        .await?;
        to_u64(balance, "token balance").map_err(DaoError::Call)
    }
}

async fn read_call<C: SolCall>(handle: &Handle, to: Address, call: C) -> DaoResult<C::Return> {
    let output = handle
        .client()
        .call(to, Bytes::from(call.abi_encode()))
        .await
        .map_err(DaoError::Call)?;
    C::abi_decode_returns(&output).map_err(|err| DaoError::Call(err.into()))
}
