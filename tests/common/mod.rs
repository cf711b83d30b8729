#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{address, Address, Bytes, B256, U256};
use alloy::sol;
use alloy::sol_types::{SolCall, SolValue};
use anyhow::{anyhow, Result};
use tokio::sync::Notify;

use daodash::infrastructure::ethereum::{ChainClient, ConnectionManager, Connector};
use daodash::infrastructure::runtime::RuntimeEvent;
use daodash::modules::dao::{ContractAddresses, DaoService};

sol! {
    interface IDaoGovernor {
        function numProposals() external view returns (uint256);
        function proposals(uint256 index) external view returns (uint256, uint256, uint256, uint256, bool);
        function createProposal(uint256 nftTokenId) external returns (uint256);
        function voteOnProposal(uint256 proposalIndex, uint8 vote) external;
        function executeProposal(uint256 proposalIndex) external;
    }

    interface IMembershipNft {
        function balanceOf(address owner) external view returns (uint256);
    }
}

pub const DAO: Address = address!("dadadadadadadadadadadadadadadadadadadada");
pub const NFT: Address = address!("4f4f4f4f4f4f4f4f4f4f4f4f4f4f4f4f4f4f4f4f");
pub const MEMBER: Address = address!("1111111111111111111111111111111111111111");
pub const RINKEBY: u64 = 4;

/// Proposal record as the contract stores it
#[derive(Debug, Clone, Copy)]
pub struct StoredProposal {
    pub nft_token_id: u64,
    pub deadline_secs: u64,
    pub yay: u64,
    pub nay: u64,
    pub executed: bool,
}

/// In-memory node plus DAO contract, answering ABI-encoded calls
pub struct FakeChain {
    pub chain_id: u64,
    pub signer: Option<Address>,
    pub treasury: U256,
    pub nft_balance: U256,
    pub proposals: Mutex<Vec<StoredProposal>>,
    /// Confirmations wait for a permit when set
    pub gate: Option<Arc<Notify>>,
    pub revert: AtomicBool,
    /// Reported by `numProposals` instead of the stored length
    pub count_override: Option<U256>,
    calls: Mutex<HashMap<[u8; 4], usize>>,
    pending: Mutex<HashMap<B256, Bytes>>,
    sent: Mutex<Vec<Bytes>>,
    nonce: AtomicUsize,
}

impl FakeChain {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            signer: Some(MEMBER),
            treasury: U256::ZERO,
            nft_balance: U256::from(1),
            proposals: Mutex::new(Vec::new()),
            gate: None,
            revert: AtomicBool::new(false),
            count_override: None,
            calls: Mutex::new(HashMap::new()),
            pending: Mutex::new(HashMap::new()),
            sent: Mutex::new(Vec::new()),
            nonce: AtomicUsize::new(0),
        }
    }

    pub fn with_proposals(self, proposals: Vec<StoredProposal>) -> Self {
        *self.proposals.lock().unwrap() = proposals;
        self
    }

    pub fn calls_to(&self, selector: [u8; 4]) -> usize {
        self.calls.lock().unwrap().get(&selector).copied().unwrap_or(0)
    }

    pub fn sent(&self) -> Vec<Bytes> {
        self.sent.lock().unwrap().clone()
    }

    fn record(&self, selector: [u8; 4]) {
        *self.calls.lock().unwrap().entry(selector).or_insert(0) += 1;
    }

    // State change applied when a transaction is included
    fn apply(&self, data: &[u8]) {
        let mut proposals = self.proposals.lock().unwrap();
        if let Ok(call) = IDaoGovernor::createProposalCall::abi_decode(data) {
            proposals.push(StoredProposal {
                nft_token_id: call.nftTokenId.to::<u64>(),
                deadline_secs: chrono::Utc::now().timestamp() as u64 + 300,
                yay: 0,
                nay: 0,
                executed: false,
            });
        } else if let Ok(call) = IDaoGovernor::voteOnProposalCall::abi_decode(data) {
            if let Some(p) = proposals.get_mut(call.proposalIndex.to::<usize>()) {
                if call.vote == 0 {
                    p.yay += 1;
                } else {
                    p.nay += 1;
                }
            }
        } else if let Ok(call) = IDaoGovernor::executeProposalCall::abi_decode(data) {
            if let Some(p) = proposals.get_mut(call.proposalIndex.to::<usize>()) {
                p.executed = true;
            }
        }
    }
}

fn selector_of(data: &[u8]) -> Result<[u8; 4]> {
    data.get(..4)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| anyhow!("calldata too short"))
}

#[async_trait::async_trait]
impl ChainClient for FakeChain {
    async fn chain_id(&self) -> Result<u64> {
        Ok(self.chain_id)
    }

    async fn signer_address(&self) -> Result<Option<Address>> {
        Ok(self.signer)
    }

    async fn get_balance(&self, address: Address) -> Result<U256> {
        if address == DAO {
            Ok(self.treasury)
        } else {
            Ok(U256::ZERO)
        }
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let selector = selector_of(&data)?;
        self.record(selector);

        if to == NFT && selector == IMembershipNft::balanceOfCall::SELECTOR {
            return Ok(self.nft_balance.abi_encode().into());
        }
        if to != DAO {
            return Err(anyhow!("no contract at {to}"));
        }
        if selector == IDaoGovernor::numProposalsCall::SELECTOR {
            let count = match self.count_override {
                Some(count) => count,
                None => U256::from(self.proposals.lock().unwrap().len()),
            };
            return Ok(count.abi_encode().into());
        }
        if selector == IDaoGovernor::proposalsCall::SELECTOR {
            let call = IDaoGovernor::proposalsCall::abi_decode(&data)?;
            let index = call.index.to::<usize>();
            let p = self
                .proposals
                .lock()
                .unwrap()
                .get(index)
                .copied()
                .ok_or_else(|| anyhow!("execution reverted: no proposal {index}"))?;
            let ret = (
                U256::from(p.nft_token_id),
                U256::from(p.deadline_secs),
                U256::from(p.yay),
                U256::from(p.nay),
                p.executed,
            );
            return Ok(ret.abi_encode_params().into());
        }
        Err(anyhow!("unknown selector"))
    }

    async fn send_transaction(&self, from: Address, to: Address, data: Bytes) -> Result<B256> {
        if Some(from) != self.signer {
            return Err(anyhow!("unknown account {from}"));
        }
        if to != DAO {
            return Err(anyhow!("unexpected target {to}"));
        }
        self.record(selector_of(&data)?);
        let n = self.nonce.fetch_add(1, Ordering::SeqCst) + 1;
        let hash = B256::with_last_byte(n as u8);
        self.sent.lock().unwrap().push(data.clone());
        self.pending.lock().unwrap().insert(hash, data);
        Ok(hash)
    }

    async fn wait_for_receipt(&self, hash: B256) -> Result<bool> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let data = self
            .pending
            .lock()
            .unwrap()
            .remove(&hash)
            .ok_or_else(|| anyhow!("unknown transaction {hash}"))?;
        if self.revert.load(Ordering::SeqCst) {
            return Ok(false);
        }
        self.apply(&data);
        Ok(true)
    }

    fn endpoint_name(&self) -> String {
        "fake://node".to_string()
    }
}

/// Hands out the same fake chain on every open and counts the opens
pub struct FakeConnector {
    pub chain: Arc<FakeChain>,
    pub opens: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl Connector for FakeConnector {
    async fn open(&self) -> Result<Arc<dyn ChainClient>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let client: Arc<dyn ChainClient> = self.chain.clone();
        Ok(client)
    }
}

pub fn manager(chain: Arc<FakeChain>, required_chain_id: u64) -> (ConnectionManager, Arc<AtomicUsize>) {
    let opens = Arc::new(AtomicUsize::new(0));
    let connector = FakeConnector {
        chain,
        opens: opens.clone(),
    };
    (
        ConnectionManager::new(Box::new(connector), required_chain_id),
        opens,
    )
}

pub fn disconnected_service(chain: Arc<FakeChain>) -> Arc<DaoService> {
    let (conn, _) = manager(chain, RINKEBY);
    Arc::new(DaoService::new(
        Arc::new(conn),
        ContractAddresses { dao: DAO, nft: NFT },
    ))
}

/// Service with the session connection already open
pub async fn service(chain: Arc<FakeChain>) -> Arc<DaoService> {
    let svc = disconnected_service(chain);
    svc.connect().await.unwrap();
    svc
}

/// Wait for the next event from the worker side, failing after two seconds
pub async fn next_event(rx: &Receiver<RuntimeEvent>) -> RuntimeEvent {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        if let Ok(event) = rx.try_recv() {
            return event;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for a runtime event"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

pub fn drain(rx: &Receiver<RuntimeEvent>) -> Vec<RuntimeEvent> {
    rx.try_iter().collect()
}
