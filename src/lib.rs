//! hashledger - a minimal append-only proof-of-work ledger
//!
//! # Architecture
//!
//! ## Core Ledger
//! - [`blockchain`] - Blocks, the chain, balance replay and chain validation
//! - [`transaction`] - Signed transfers and reward entries
//! - [`mempool`] - Pending transaction pool
//!
//! ## Consensus
//! - [`miner`] - Proof-of-work limits, cancellation and statistics
//!
//! ## Cryptography
//! - [`crypto`] - Signatures and verification (secp256k1), addresses, digests
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Core Ledger
// ============================================================================
pub mod blockchain;
pub mod mempool;
pub mod transaction;

// ============================================================================
// Consensus & Mining
// ============================================================================
pub mod miner;

// ============================================================================
// Cryptography
// ============================================================================
pub mod crypto;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;

pub use blockchain::{Block, Blockchain, ChainViolation, ViolationKind};
pub use crypto::{Address, KeyPair, Signer};
pub use error::ChainError;
pub use transaction::{RewardTx, Transaction, TransferTx};
