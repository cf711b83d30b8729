//! Proposal snapshots and the per-row display rules derived from them

use std::fmt;

use alloy::primitives::U256;
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};

/// A proposal as read from the DAO contract at fetch time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    /// Index in the contract's proposal mapping
    pub id: u64,
    /// Token the proposal wants the treasury to buy
    pub nft_token_id: String,
    /// Voting deadline
    pub deadline: DateTime<Utc>,
    pub yay_votes: u64,
    pub nay_votes: u64,
    pub executed: bool,
}

/// Raw tuple returned by `proposals(uint256)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawProposal {
    pub nft_token_id: U256,
    pub deadline_secs: U256,
    pub yay: U256,
    pub nay: U256,
    pub executed: bool,
}

impl Proposal {
    /// Map the contract tuple into a snapshot. The deadline is stored on-chain
    /// in seconds and kept here with millisecond precision.
    pub fn from_raw(id: u64, raw: RawProposal) -> Result<Self> {
        let secs = to_u64(raw.deadline_secs, "deadline")?;
        let millis = i64::try_from(secs)
            .ok()
            .and_then(|s| s.checked_mul(1000))
            .ok_or_else(|| anyhow!("deadline {secs} out of range"))?;
        let deadline = DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| anyhow!("deadline {secs} out of range"))?;

        Ok(Self {
            id,
            nft_token_id: raw.nft_token_id.to_string(),
            deadline,
            yay_votes: to_u64(raw.yay, "yay votes")?,
            nay_votes: to_u64(raw.nay, "nay votes")?,
            executed: raw.executed,
        })
    }

    /// Side that would win if the proposal were executed now. Ties go to NAY.
    pub fn leading_side(&self) -> VoteChoice {
        if self.yay_votes > self.nay_votes {
            VoteChoice::Yay
        } else {
            VoteChoice::Nay
        }
    }

    /// Which actions a proposal row offers at `now`
    pub fn row_mode(&self, now: DateTime<Utc>) -> RowMode {
        if self.executed {
            RowMode::Executed
        } else if self.deadline > now {
            RowMode::Voting
        } else {
            RowMode::Executable {
                outcome: self.leading_side(),
            }
        }
    }
}

/// Display mode of a proposal row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowMode {
    /// Deadline in the future: YAY/NAY actions
    Voting,
    /// Deadline passed, not executed: execute action labelled with the leading side
    Executable { outcome: VoteChoice },
    /// Terminal
    Executed,
}

/// A vote on a proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteChoice {
    Yay,
    Nay,
}

impl VoteChoice {
    /// "YAY" is a yes vote, anything else is a no vote.
    pub fn from_label(label: &str) -> Self {
        if label == "YAY" {
            VoteChoice::Yay
        } else {
            VoteChoice::Nay
        }
    }

    /// Value of the contract's `Vote` enum
    pub fn code(self) -> u8 {
        match self {
            VoteChoice::Yay => 0,
            VoteChoice::Nay => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VoteChoice::Yay => "YAY",
            VoteChoice::Nay => "NAY",
        }
    }
}

impl fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A state-changing request against the DAO contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    CreateProposal { token_id: U256 },
    Vote { proposal_id: u64, choice: VoteChoice },
    Execute { proposal_id: u64 },
}

impl Mutation {
    /// Whether a confirmed mutation invalidates the full proposal list
    /// (as opposed to just the proposal count)
    pub fn refreshes_proposals(&self) -> bool {
        !matches!(self, Mutation::CreateProposal { .. })
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::CreateProposal { token_id } => write!(f, "create proposal for token {token_id}"),
            Mutation::Vote { proposal_id, choice } => {
                write!(f, "vote {choice} on proposal {proposal_id}")
            }
            Mutation::Execute { proposal_id } => write!(f, "execute proposal {proposal_id}"),
        }
    }
}

/// Convert a contract integer that is expected to fit in 64 bits
pub fn to_u64(value: U256, what: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| anyhow!("{what} does not fit in 64 bits: {value}"))
}
