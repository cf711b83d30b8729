//! Runtime bridge - connects sync TUI thread with async Tokio runtime
//!
//! The TUI thread sends `RuntimeCommand`s; a worker thread owning a Tokio
//! runtime answers with `RuntimeEvent`s that the UI reduces into its state.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use alloy::primitives::{Address, B256, U256};
use tokio::runtime::Runtime;

use crate::domain::{Mutation, Proposal};
use crate::error::DaoError;
use crate::modules::dao::DaoService;
use crate::infrastructure::runtime::worker::run_async_worker;

/// Commands sent from the TUI to the async worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCommand {
    /// Open the wallet connection and verify the network
    Connect,
    /// Drop the wallet connection
    Disconnect,
    /// Fetch treasury balance, membership balance and proposal count
    RefreshOverview,
    /// Fetch the proposal count only
    FetchProposalCount,
    /// Rebuild the full proposal list
    FetchProposals,
    /// Submit a transaction and wait for it
    Submit(Mutation),
    /// Shutdown the worker
    Shutdown,
}

/// What a failed request reports back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub message: String,
    pub wrong_network: bool,
}

impl From<&DaoError> for Failure {
    fn from(err: &DaoError) -> Self {
        Self {
            message: err.to_string(),
            wrong_network: err.is_wrong_network(),
        }
    }
}

/// Which read failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    Treasury,
    ProposalCount,
    Membership,
    Proposals,
}

impl FetchKind {
    pub fn label(&self) -> &'static str {
        match self {
            FetchKind::Treasury => "treasury balance",
            FetchKind::ProposalCount => "proposal count",
            FetchKind::Membership => "membership balance",
            FetchKind::Proposals => "proposals",
        }
    }
}

/// Events sent from the async worker to the TUI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEvent {
    /// Wallet connected on the required network
    Connected {
        endpoint: String,
        chain_id: u64,
        account: Option<Address>,
    },
    /// Connect attempt failed
    ConnectFailed(Failure),
    /// Connection dropped on request
    Disconnected,
    /// DAO contract balance in wei
    TreasuryBalance(U256),
    ProposalCount(u64),
    MembershipBalance(u64),
    /// Full list, ordered by id
    Proposals(Vec<Proposal>),
    /// A read failed; previous values stay in place
    FetchFailed { what: FetchKind, failure: Failure },
    /// Transaction accepted by the node, waiting for inclusion
    TxSubmitted { mutation: Mutation, hash: B256 },
    /// Transaction included successfully
    TxConfirmed { mutation: Mutation, hash: B256 },
    /// Submission or confirmation failed
    TxFailed { mutation: Mutation, failure: Failure },
    /// Worker-level error
    Error { message: String },
}

/// Bridge between sync TUI thread and async Tokio runtime
pub struct RuntimeBridge {
    cmd_tx: Sender<RuntimeCommand>,
    evt_rx: Receiver<RuntimeEvent>,
}

impl RuntimeBridge {
    /// Spawn the worker thread around a shared service
    pub fn new(service: Arc<DaoService>) -> anyhow::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<RuntimeCommand>();
        let (evt_tx, evt_rx) = mpsc::channel::<RuntimeEvent>();
        let rt = Runtime::new()?;

        thread::Builder::new()
            .name("daodash-worker".to_string())
            .spawn(move || {
                rt.block_on(async {
                    if let Err(err) = run_async_worker(service, cmd_rx, evt_tx.clone()).await {
                        tracing::error!("worker exited: {err:#}");
                        let _ = evt_tx.send(RuntimeEvent::Error {
                            message: format!("Worker exited: {:#}", err),
                        });
                    }
                });
            })?;

        Ok(Self { cmd_tx, evt_rx })
    }

    /// Send a command to the async worker
    pub fn send(&self, cmd: RuntimeCommand) -> anyhow::Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| anyhow::anyhow!("Worker channel closed"))
    }

    /// Poll for events (non-blocking)
    pub fn poll_events(&self) -> Vec<RuntimeEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.evt_rx.try_recv() {
            events.push(evt);
        }
        events
    }
}

impl Drop for RuntimeBridge {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(RuntimeCommand::Shutdown);
    }
}
