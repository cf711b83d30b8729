//! Actions dispatched into the view-state reducer

use chrono::{DateTime, Utc};

use crate::domain::VoteChoice;
use crate::infrastructure::runtime::RuntimeEvent;

/// Tabs below the shared header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    /// Nothing selected yet
    #[default]
    None,
    CreateProposal,
    ViewProposals,
}

impl Tab {
    pub const SELECTABLE: [Tab; 2] = [Tab::CreateProposal, Tab::ViewProposals];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::None => "",
            Tab::CreateProposal => "Create Proposal",
            Tab::ViewProposals => "View Proposals",
        }
    }

    pub fn shortcut(&self) -> char {
        match self {
            Tab::None => ' ',
            Tab::CreateProposal => '1',
            Tab::ViewProposals => '2',
        }
    }
}

/// Everything that can change the view state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Connect,
    Disconnect,
    /// Re-read header values, and the list when it is on screen
    Refresh,
    SelectTab(Tab),
    SelectNext,
    SelectPrev,
    /// Append to the token id input; non-digits are ignored
    TokenInput(char),
    TokenBackspace,
    SetTokenId(String),
    /// Create a proposal for the token id in the input
    SubmitProposal,
    Vote {
        proposal_id: u64,
        choice: VoteChoice,
        now: DateTime<Utc>,
    },
    Execute {
        proposal_id: u64,
        now: DateTime<Utc>,
    },
    DismissAlert,
    /// Show a message on the status line
    Notify(String, NotifyLevel),
    /// Outcome reported by the runtime worker
    Runtime(RuntimeEvent),
}

/// Notification levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Warn,
    Error,
}
