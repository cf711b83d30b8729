//! DAO governance dashboard for the terminal
//!
//! Connects to a node, reads the DAO treasury, membership NFT balance and
//! proposals, and submits create/vote/execute transactions.

pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod modules;
pub mod ui;
