// Thin re-export module: the block, chain, ledger replay and validation
// pieces live under `blockchain/core/`.

pub mod core;
pub use core::*;
