//! Pending transaction pool.
//!
//! Transactions accumulate in the current *generation*. A mining round takes
//! the whole generation and installs a fresh one in a single locked step, so a
//! submission either lands in the taken batch or in the next one.

use crate::transaction::Transaction;
use parking_lot::Mutex;
use tracing::debug;

/// A batch of pending transactions taken out of the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub id: u64,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Default)]
struct PoolInner {
    generation: u64,
    transactions: Vec<Transaction>,
}

#[derive(Debug, Default)]
pub struct Mempool {
    inner: Mutex<PoolInner>,
}

impl Mempool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_transaction(&self, tx: Transaction) {
        let mut inner = self.inner.lock();
        debug!(tx = %tx.hash_str(), generation = inner.generation, "queued transaction");
        inner.transactions.push(tx);
    }

    /// Takes every pending transaction and starts the next generation.
    pub fn take_generation(&self) -> Generation {
        let mut inner = self.inner.lock();
        let id = inner.generation;
        inner.generation += 1;
        Generation {
            id,
            transactions: std::mem::take(&mut inner.transactions),
        }
    }

    /// Puts a taken generation back in front of anything queued since.
    pub fn restore(&self, generation: Generation) {
        let mut inner = self.inner.lock();
        debug!(
            generation = generation.id,
            restored = generation.transactions.len(),
            "restoring pending generation"
        );
        let newer = std::mem::replace(&mut inner.transactions, generation.transactions);
        inner.transactions.extend(newer);
    }

    /// Queues `tx` ahead of everything currently pending.
    pub fn push_front(&self, tx: Transaction) {
        self.inner.lock().transactions.insert(0, tx);
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.inner.lock().transactions.clone()
    }

    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    pub fn len(&self) -> usize {
        self.inner.lock().transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().transactions.is_empty()
    }
}

impl Clone for Mempool {
    fn clone(&self) -> Self {
        let inner = self.inner.lock();
        Mempool {
            inner: Mutex::new(PoolInner {
                generation: inner.generation,
                transactions: inner.transactions.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Address;
    use crate::transaction::RewardTx;
    use std::sync::Arc;
    use std::thread;

    fn reward(amount: u64) -> Transaction {
        RewardTx::new(Address::new("miner"), amount).into()
    }

    #[test]
    fn test_take_generation_empties_pool() {
        let pool = Mempool::new();
        pool.add_transaction(reward(1));
        pool.add_transaction(reward(2));

        let taken = pool.take_generation();
        assert_eq!(taken.id, 0);
        assert_eq!(taken.transactions, vec![reward(1), reward(2)]);
        assert!(pool.is_empty());
        assert_eq!(pool.generation(), 1);
    }

    #[test]
    fn test_restore_keeps_original_order() {
        let pool = Mempool::new();
        pool.add_transaction(reward(1));
        let taken = pool.take_generation();
        pool.add_transaction(reward(2));

        pool.restore(taken);
        assert_eq!(pool.transactions(), vec![reward(1), reward(2)]);
    }

    #[test]
    fn test_push_front() {
        let pool = Mempool::new();
        pool.add_transaction(reward(2));
        pool.push_front(reward(1));
        assert_eq!(pool.transactions(), vec![reward(1), reward(2)]);
    }

    #[test]
    fn test_concurrent_submissions_are_never_lost() {
        let pool = Arc::new(Mempool::new());
        let writers: Vec<_> = (0..4)
            .map(|w| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || {
                    for i in 0..250 {
                        pool.add_transaction(reward(w * 1_000 + i));
                    }
                })
            })
            .collect();

        let mut taken = 0;
        for _ in 0..50 {
            taken += pool.take_generation().transactions.len();
        }
        for writer in writers {
            writer.join().unwrap();
        }
        taken += pool.take_generation().transactions.len();

        assert_eq!(taken, 1_000);
    }
}
