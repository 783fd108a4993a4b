//! Configuration management for hashledger

use crate::blockchain::{DEFAULT_DIFFICULTY, DEFAULT_MINING_REWARD};
use crate::error::ChainError;
use crate::miner::{MiningLimits, MAX_DIFFICULTY};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "hashledger.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub miner: MinerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChainConfig {
    #[serde(default = "default_difficulty")]
    pub difficulty: u32,
    #[serde(default = "default_mining_reward")]
    pub mining_reward: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            difficulty: default_difficulty(),
            mining_reward: default_mining_reward(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MinerConfig {
    /// Nonce attempts per block before giving up; unset searches until found.
    #[serde(default)]
    pub max_attempts: Option<u64>,
    /// Label credited with mining rewards when no wallet is given.
    #[serde(default)]
    pub beneficiary: Option<String>,
}

impl MinerConfig {
    pub fn limits(&self) -> MiningLimits {
        MiningLimits {
            max_attempts: self.max_attempts,
            cancel: None,
        }
    }
}

fn default_difficulty() -> u32 {
    DEFAULT_DIFFICULTY
}

fn default_mining_reward() -> u64 {
    DEFAULT_MINING_REWARD
}

/// `hashledger.toml` in the working directory if present, otherwise under the
/// user's config directory.
pub fn default_config_path() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    dirs::config_dir()
        .map(|dir| dir.join("hashledger").join(CONFIG_FILE_NAME))
        .unwrap_or(local)
}

/// Loads the configuration at `path`. A missing or empty file yields the
/// defaults.
pub fn load_config(path: &Path) -> Result<Config, ChainError> {
    let config_str = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };

    let config: Config = if config_str.trim().is_empty() {
        Config::default()
    } else {
        toml::from_str(&config_str)?
    };

    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &Config) -> Result<(), ChainError> {
    if config.chain.difficulty > MAX_DIFFICULTY {
        return Err(ChainError::ConfigError(format!(
            "chain.difficulty must be at most {}, got {}",
            MAX_DIFFICULTY, config.chain.difficulty
        )));
    }

    if config.miner.max_attempts == Some(0) {
        return Err(ChainError::ConfigError(
            "miner.max_attempts must be greater than zero when set".to_string(),
        ));
    }

    if let Some(beneficiary) = &config.miner.beneficiary {
        if beneficiary.is_empty() {
            return Err(ChainError::ConfigError(
                "miner.beneficiary cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}
