//! Proof-of-work search controls.
//!
//! Difficulty is the number of leading `'0'` characters required in the hex
//! form of a block hash, so each extra unit multiplies the expected work by 16.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Highest difficulty a SHA-256 hex digest can satisfy.
pub const MAX_DIFFICULTY: u32 = 64;

/// Returns true when `hash_hex` starts with `difficulty` zero characters.
pub fn meets_difficulty(hash_hex: &str, difficulty: u32) -> bool {
    let needed = difficulty as usize;
    hash_hex.len() >= needed && hash_hex.bytes().take(needed).all(|b| b == b'0')
}

/// Number of leading zero hex characters in a raw digest.
pub fn leading_zero_nibbles(hash: &[u8]) -> u32 {
    let mut count = 0;
    for byte in hash {
        if *byte == 0 {
            count += 2;
            continue;
        }
        if *byte < 0x10 {
            count += 1;
        }
        break;
    }
    count
}

/// Shared flag a caller can flip to abort a running search.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Bounds on a single mining search.
#[derive(Debug, Clone, Default)]
pub struct MiningLimits {
    /// Maximum number of nonce increments; `None` searches until found.
    pub max_attempts: Option<u64>,
    pub cancel: Option<CancelToken>,
}

impl MiningLimits {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_max_attempts(max_attempts: u64) -> Self {
        MiningLimits {
            max_attempts: Some(max_attempts),
            cancel: None,
        }
    }

    pub fn cancellable(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    pub(crate) fn exhausted(&self, attempts: u64) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }
}

/// Outcome of a successful search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiningStats {
    pub difficulty: u32,
    pub attempts: u64,
    pub nonce: u64,
    pub elapsed: Duration,
}

impl MiningStats {
    pub fn hash_rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.attempts as f64 / secs
        } else {
            0.0
        }
    }
}
