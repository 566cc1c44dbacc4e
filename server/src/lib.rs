//! HTTP façade turning bounty, donation and airdrop requests into signed
//! Sui move-call transactions.

pub mod chain;
pub mod chain_service;
pub mod config;
pub mod error;
pub mod http;
pub mod idempotency;
pub mod metrics;
pub mod state;
pub mod validate;
