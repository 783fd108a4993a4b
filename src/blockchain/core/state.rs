use crate::crypto::Address;
use crate::transaction::Transaction;
use std::collections::BTreeMap;

use super::chain::Block;

/// Account balances derived by replaying the transaction log.
///
/// Transfers are zero-sum; only rewards add value. Balances are signed since
/// transfers are not checked against the sender's funds.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LedgerState {
    pub balances: BTreeMap<Address, i128>,
}

impl LedgerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replay(blocks: &[Block]) -> Self {
        let mut state = Self::new();
        for tx in blocks.iter().flat_map(|block| &block.transactions) {
            state.apply_transaction(tx);
        }
        state
    }

    pub fn apply_transaction(&mut self, tx: &Transaction) {
        let amount = i128::from(tx.amount());
        if let Some(sender) = tx.sender() {
            *self.balances.entry(sender.clone()).or_insert(0) -= amount;
        }
        *self.balances.entry(tx.recipient().clone()).or_insert(0) += amount;
    }

    pub fn get_balance(&self, address: &Address) -> i128 {
        self.balances.get(address).copied().unwrap_or(0)
    }
}
