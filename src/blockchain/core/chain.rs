use crate::blockchain::core::state::LedgerState;
use crate::blockchain::core::validation::{validate_chain, ChainViolation};
use crate::config::ChainConfig;
use crate::crypto::{hash_to_hex, Address, Sha256Hash};
use crate::error::ChainError;
use crate::mempool::{Generation, Mempool};
use crate::miner::{leading_zero_nibbles, MiningLimits, MiningStats, MAX_DIFFICULTY};
use crate::transaction::{RewardTx, Transaction};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, warn};

/// `previous_hash` of the genesis block.
pub const GENESIS_PREVIOUS_HASH: Sha256Hash = [0u8; 32];

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Block {
    #[serde(with = "hex")]
    pub previous_hash: Sha256Hash,
    pub transactions: Vec<Transaction>,
    /// Unix milliseconds, fixed at construction.
    pub timestamp: i64,
    pub nonce: u64,
    /// Cached result of [`Block::calculate_hash`].
    #[serde(with = "hex")]
    pub hash: Sha256Hash,
}

impl Block {
    pub fn new(previous_hash: Sha256Hash, transactions: Vec<Transaction>) -> Self {
        let timestamp = chrono::Utc::now().timestamp_millis();
        let mut block = Block {
            previous_hash,
            transactions,
            timestamp,
            nonce: 0,
            hash: [0u8; 32],
        };
        block.hash = block.calculate_hash();
        block
    }

    pub fn genesis() -> Self {
        Block::new(GENESIS_PREVIOUS_HASH, Vec::new())
    }

    /// SHA-256 over the previous hash, the canonical transaction encoding,
    /// the timestamp and the nonce.
    pub fn calculate_hash(&self) -> Sha256Hash {
        let mut hasher = Sha256::new();
        hasher.update(self.previous_hash);
        hasher.update((self.transactions.len() as u64).to_le_bytes());
        for tx in &self.transactions {
            let bytes = tx.canonical_bytes();
            hasher.update((bytes.len() as u64).to_le_bytes());
            hasher.update(&bytes);
        }
        hasher.update(self.timestamp.to_le_bytes());
        hasher.update(self.nonce.to_le_bytes());
        hasher.finalize().into()
    }

    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.hash)
    }

    /// Searches nonces until the hash has `difficulty` leading zero hex
    /// characters, within `limits`.
    pub fn mine(&mut self, difficulty: u32, limits: &MiningLimits) -> Result<MiningStats, ChainError> {
        if difficulty > MAX_DIFFICULTY {
            return Err(ChainError::MiningExhausted { attempts: 0 });
        }

        let started = Instant::now();
        let mut attempts: u64 = 0;
        self.hash = self.calculate_hash();

        while leading_zero_nibbles(&self.hash) < difficulty {
            if limits.is_cancelled() {
                return Err(ChainError::MiningCancelled { attempts });
            }
            if limits.exhausted(attempts) {
                return Err(ChainError::MiningExhausted { attempts });
            }
            self.nonce = self
                .nonce
                .checked_add(1)
                .ok_or(ChainError::MiningExhausted { attempts })?;
            self.hash = self.calculate_hash();
            attempts += 1;
        }

        Ok(MiningStats {
            difficulty,
            attempts,
            nonce: self.nonce,
            elapsed: started.elapsed(),
        })
    }

    /// True when the cached hash is current and meets `difficulty`.
    pub fn is_mined(&self, difficulty: u32) -> bool {
        self.hash == self.calculate_hash() && leading_zero_nibbles(&self.hash) >= difficulty
    }

    /// Index and reason of the first transaction that fails validation.
    pub fn first_invalid_transaction(&self) -> Option<(usize, String)> {
        self.transactions
            .iter()
            .enumerate()
            .find_map(|(i, tx)| match tx.is_valid() {
                Ok(true) => None,
                Ok(false) => Some((i, "signature verification failed".to_string())),
                Err(e) => Some((i, e.to_string())),
            })
    }

    pub fn has_valid_transactions(&self) -> bool {
        self.first_invalid_transaction().is_none()
    }
}

pub const DEFAULT_DIFFICULTY: u32 = 2;
pub const DEFAULT_MINING_REWARD: u64 = 100;

#[derive(Debug, Clone)]
pub struct Blockchain {
    pub blocks: Vec<Block>,
    pub difficulty: u32,
    pub mining_reward: u64,
    pub pending: Mempool,
    pub limits: MiningLimits,
}

#[derive(serde::Serialize)]
struct ChainExport<'a> {
    difficulty: u32,
    mining_reward: u64,
    blocks: &'a [Block],
    pending: Vec<Transaction>,
}

impl Blockchain {
    pub fn new(difficulty: u32, mining_reward: u64) -> Self {
        let genesis = Block::genesis();
        debug!(hash = %genesis.hash_hex(), "created genesis block");

        Blockchain {
            blocks: vec![genesis],
            difficulty,
            mining_reward,
            pending: Mempool::new(),
            limits: MiningLimits::unbounded(),
        }
    }

    pub fn from_config(config: &ChainConfig) -> Self {
        Self::new(config.difficulty, config.mining_reward)
    }

    pub fn with_limits(mut self, limits: MiningLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn last_block(&self) -> &Block {
        // Genesis is installed at construction and blocks are never removed.
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Queues a transaction for the next mining round.
    pub fn add_transaction(&self, tx: Transaction) -> Result<(), ChainError> {
        match tx.is_valid() {
            Ok(true) => {}
            Ok(false) => {
                return Err(ChainError::InvalidTransaction(
                    "signature verification failed".to_string(),
                ))
            }
            Err(e) => return Err(ChainError::InvalidTransaction(e.to_string())),
        }
        tx.validate_size()?;

        self.pending.add_transaction(tx);
        Ok(())
    }

    pub fn pending_transactions(&self) -> Vec<Transaction> {
        self.pending.transactions()
    }

    /// Mines the pending generation into a new block and queues the reward
    /// for `reward_address` into the next one.
    ///
    /// If the search fails the chain is left unchanged and the taken
    /// transactions go back to the pool.
    pub fn mine_pending_transactions(
        &mut self,
        reward_address: &Address,
    ) -> Result<MiningStats, ChainError> {
        let Generation { id, transactions } = self.pending.take_generation();
        let mut block = Block::new(self.last_block().hash, transactions);

        info!(
            height = self.blocks.len(),
            generation = id,
            transactions = block.transactions.len(),
            difficulty = self.difficulty,
            "start mining"
        );

        let stats = match block.mine(self.difficulty, &self.limits) {
            Ok(stats) => stats,
            Err(e) => {
                warn!(height = self.blocks.len(), "mining failed: {}", e);
                self.pending.restore(Generation {
                    id,
                    transactions: block.transactions,
                });
                return Err(e);
            }
        };

        info!(
            height = self.blocks.len(),
            hash = %block.hash_hex(),
            nonce = stats.nonce,
            attempts = stats.attempts,
            elapsed = ?stats.elapsed,
            "end mining"
        );

        self.blocks.push(block);
        self.pending
            .push_front(RewardTx::new(reward_address.clone(), self.mining_reward).into());

        Ok(stats)
    }

    /// Replays every transaction in chain order; never cached.
    pub fn balance_of(&self, address: &Address) -> i128 {
        LedgerState::replay(&self.blocks).get_balance(address)
    }

    /// Balances of every address that appears in the chain.
    pub fn balances(&self) -> BTreeMap<Address, i128> {
        LedgerState::replay(&self.blocks).balances
    }

    /// First rule violation found walking the chain, if any.
    pub fn validate(&self) -> Result<(), ChainViolation> {
        validate_chain(&self.blocks)
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn ensure_valid(&self) -> Result<(), ChainError> {
        self.validate().map_err(ChainError::from)
    }

    /// Pretty JSON view of the chain and its pending pool.
    pub fn to_json(&self) -> Result<String, ChainError> {
        let export = ChainExport {
            difficulty: self.difficulty,
            mining_reward: self.mining_reward,
            blocks: &self.blocks,
            pending: self.pending_transactions(),
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new(DEFAULT_DIFFICULTY, DEFAULT_MINING_REWARD)
    }
}
