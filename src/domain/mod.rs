//! Domain models for the DAO dashboard
//!
//! Plain data and pure rules, independent of the chain transport and the UI.

mod proposal;
mod units;

pub use proposal::{to_u64, Mutation, Proposal, RawProposal, RowMode, VoteChoice};
pub use units::{format_ether, network_name, short_hex};
