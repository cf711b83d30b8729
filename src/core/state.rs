//! View state and its reducer
//!
//! `reduce` is a pure function of (state, action). It returns the next state
//! and the commands the runtime worker should execute; rendering only reads
//! the state.

use alloy::primitives::{Address, U256};
use chrono::{DateTime, Utc};

use super::action::{Action, NotifyLevel, Tab};
use crate::domain::{format_ether, Mutation, Proposal, RowMode, VoteChoice};
use crate::infrastructure::runtime::{RuntimeCommand, RuntimeEvent};

/// Line shown on the status bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub level: NotifyLevel,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub wallet_connected: bool,
    /// A submitted transaction is waiting for confirmation
    pub loading: bool,
    pub tab: Tab,
    /// Wei
    pub treasury_balance: U256,
    pub proposal_count: u64,
    pub membership_balance: u64,
    /// Token id typed into the create form
    pub candidate_token_id: String,
    pub proposals: Vec<Proposal>,
    /// Highlighted row in the proposal list
    pub selected: usize,
    /// Mutation holding the in-flight slot
    pub pending: Option<Mutation>,
    pub account: Option<Address>,
    pub endpoint: Option<String>,
    pub chain_id: Option<u64>,
    pub notice: Option<Notice>,
    /// Blocking message, e.g. wrong network
    pub alert: Option<String>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_member(&self) -> bool {
        self.membership_balance > 0
    }

    pub fn treasury_ether(&self) -> String {
        format_ether(self.treasury_balance)
    }

    pub fn selected_proposal(&self) -> Option<&Proposal> {
        self.proposals.get(self.selected)
    }

    pub fn proposal(&self, id: u64) -> Option<&Proposal> {
        self.proposals.iter().find(|p| p.id == id)
    }

    fn notify(&mut self, text: impl Into<String>, level: NotifyLevel) {
        self.notice = Some(Notice {
            text: text.into(),
            level,
        });
    }

    /// Claim the in-flight slot for a mutation, or explain why not
    fn request(&mut self, mutation: Mutation) -> Vec<RuntimeCommand> {
        if let Some(pending) = self.pending {
            self.notify(
                format!("Still waiting for \"{pending}\" to confirm"),
                NotifyLevel::Warn,
            );
            return Vec::new();
        }
        if !self.wallet_connected {
            self.notify("Connect a wallet first (c)", NotifyLevel::Warn);
            return Vec::new();
        }
        if !self.is_member() {
            self.notify(
                "You do not own any membership NFTs and cannot create or vote on proposals",
                NotifyLevel::Warn,
            );
            return Vec::new();
        }
        self.pending = Some(mutation);
        self.notify(format!("Sending: {mutation}"), NotifyLevel::Info);
        vec![RuntimeCommand::Submit(mutation)]
    }

    fn request_on_row(
        &mut self,
        proposal_id: u64,
        now: DateTime<Utc>,
        vote: Option<VoteChoice>,
    ) -> Vec<RuntimeCommand> {
        let Some(mode) = self.proposal(proposal_id).map(|p| p.row_mode(now)) else {
            self.notify(
                format!("Proposal {proposal_id} is not loaded, open View Proposals first"),
                NotifyLevel::Warn,
            );
            return Vec::new();
        };
        match (vote, mode) {
            (Some(choice), RowMode::Voting) => self.request(Mutation::Vote {
                proposal_id,
                choice,
            }),
            (None, RowMode::Executable { .. }) => self.request(Mutation::Execute { proposal_id }),
            (_, RowMode::Executed) => {
                self.notify(
                    format!("Proposal {proposal_id} was already executed"),
                    NotifyLevel::Warn,
                );
                Vec::new()
            }
            (Some(_), _) => {
                self.notify(
                    format!("Voting on proposal {proposal_id} has ended"),
                    NotifyLevel::Warn,
                );
                Vec::new()
            }
            (None, _) => {
                self.notify(
                    format!("Proposal {proposal_id} is still open for voting"),
                    NotifyLevel::Warn,
                );
                Vec::new()
            }
        }
    }

    fn apply_runtime(&mut self, event: RuntimeEvent) -> Vec<RuntimeCommand> {
        match event {
            RuntimeEvent::Connected {
                endpoint,
                chain_id,
                account,
            } => {
                self.wallet_connected = true;
                self.alert = None;
                self.endpoint = Some(endpoint);
                self.chain_id = Some(chain_id);
                self.account = account;
                self.notify("Wallet connected", NotifyLevel::Info);
                vec![RuntimeCommand::RefreshOverview]
            }
            RuntimeEvent::ConnectFailed(failure) => {
                self.wallet_connected = false;
                if failure.wrong_network {
                    self.alert = Some(failure.message.clone());
                }
                self.notify(failure.message, NotifyLevel::Error);
                Vec::new()
            }
            RuntimeEvent::Disconnected => {
                // Nothing from the closed session stays on screen
                self.wallet_connected = false;
                self.account = None;
                self.endpoint = None;
                self.chain_id = None;
                self.treasury_balance = U256::ZERO;
                self.proposal_count = 0;
                self.membership_balance = 0;
                self.proposals.clear();
                self.selected = 0;
                self.notify("Wallet disconnected", NotifyLevel::Info);
                Vec::new()
            }
            RuntimeEvent::TreasuryBalance(balance) => {
                self.treasury_balance = balance;
                Vec::new()
            }
            RuntimeEvent::ProposalCount(count) => {
                self.proposal_count = count;
                Vec::new()
            }
            RuntimeEvent::MembershipBalance(balance) => {
                self.membership_balance = balance;
                Vec::new()
            }
            RuntimeEvent::Proposals(proposals) => {
                self.proposals = proposals;
                self.selected = self.selected.min(self.proposals.len().saturating_sub(1));
                Vec::new()
            }
            RuntimeEvent::FetchFailed { what, failure } => {
                if failure.wrong_network {
                    self.alert = Some(failure.message.clone());
                }
                self.notify(
                    format!("Could not load {}: {}", what.label(), failure.message),
                    NotifyLevel::Warn,
                );
                Vec::new()
            }
            RuntimeEvent::TxSubmitted { mutation, hash } => {
                if self.pending == Some(mutation) {
                    self.loading = true;
                }
                self.notify(
                    format!("Waiting for transaction {hash}"),
                    NotifyLevel::Info,
                );
                Vec::new()
            }
            RuntimeEvent::TxConfirmed { mutation, .. } => {
                self.settle(mutation);
                self.notify(format!("Confirmed: {mutation}"), NotifyLevel::Info);
                Vec::new()
            }
            RuntimeEvent::TxFailed { mutation, failure } => {
                self.settle(mutation);
                if failure.wrong_network {
                    self.alert = Some(failure.message.clone());
                }
                self.notify(
                    format!("Failed to {mutation}: {}", failure.message),
                    NotifyLevel::Error,
                );
                Vec::new()
            }
            RuntimeEvent::Error { message } => {
                self.notify(message, NotifyLevel::Error);
                Vec::new()
            }
        }
    }

    /// Release the in-flight slot; events for other mutations leave it alone
    fn settle(&mut self, mutation: Mutation) {
        if self.pending == Some(mutation) {
            self.pending = None;
            self.loading = false;
        }
    }
}

/// Apply one action to a state, returning the next state and the commands to run
pub fn reduce(state: &ViewState, action: Action) -> (ViewState, Vec<RuntimeCommand>) {
    let mut next = state.clone();
    let commands = match action {
        Action::Connect => {
            next.notify("Connecting…", NotifyLevel::Info);
            vec![RuntimeCommand::Connect]
        }
        Action::Disconnect => vec![RuntimeCommand::Disconnect],
        Action::Refresh => {
            let mut commands = vec![RuntimeCommand::RefreshOverview];
            if next.tab == Tab::ViewProposals {
                commands.push(RuntimeCommand::FetchProposals);
            }
            commands
        }
        Action::SelectTab(tab) => {
            if tab == next.tab {
                Vec::new()
            } else {
                next.tab = tab;
                if tab == Tab::ViewProposals {
                    vec![RuntimeCommand::FetchProposals]
                } else {
                    Vec::new()
                }
            }
        }
        Action::SelectNext => {
            if next.selected + 1 < next.proposals.len() {
                next.selected += 1;
            }
            Vec::new()
        }
        Action::SelectPrev => {
            next.selected = next.selected.saturating_sub(1);
            Vec::new()
        }
        Action::TokenInput(c) => {
            if c.is_ascii_digit() {
                next.candidate_token_id.push(c);
            }
            Vec::new()
        }
        Action::TokenBackspace => {
            next.candidate_token_id.pop();
            Vec::new()
        }
        Action::SetTokenId(value) => {
            next.candidate_token_id = value.trim().to_string();
            Vec::new()
        }
        Action::SubmitProposal => match U256::from_str_radix(&next.candidate_token_id, 10) {
            Ok(token_id) if !next.candidate_token_id.is_empty() => {
                next.request(Mutation::CreateProposal { token_id })
            }
            _ => {
                next.notify("Enter a numeric token id", NotifyLevel::Warn);
                Vec::new()
            }
        },
        Action::Vote {
            proposal_id,
            choice,
            now,
        } => next.request_on_row(proposal_id, now, Some(choice)),
        Action::Execute { proposal_id, now } => next.request_on_row(proposal_id, now, None),
        Action::DismissAlert => {
            next.alert = None;
            Vec::new()
        }
        Action::Notify(text, level) => {
            next.notify(text, level);
            Vec::new()
        }
        Action::Runtime(event) => next.apply_runtime(event),
    };
    (next, commands)
}
