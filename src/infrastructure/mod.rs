//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - Alloy-based chain client and contract bindings
//! - Tokio runtime bridge for async operations

pub mod ethereum;
pub mod runtime;
