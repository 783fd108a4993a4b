//! Error types for hashledger

use crate::blockchain::ChainViolation;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),
    #[error("Transfer is missing its signature")]
    MissingSignature,
    #[error("Transfer is missing its sender")]
    MissingSender,
    #[error("Cryptographic error: {0}")]
    CryptoError(String),
    #[error("Mining cancelled after {attempts} attempts")]
    MiningCancelled { attempts: u64 },
    #[error("Mining gave up after {attempts} attempts without meeting the difficulty")]
    MiningExhausted { attempts: u64 },
    #[error("Invalid chain: {0}")]
    InvalidChain(ChainViolation),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::IoError(err.to_string())
    }
}

impl From<Box<bincode::ErrorKind>> for ChainError {
    fn from(err: Box<bincode::ErrorKind>) -> Self {
        ChainError::SerializationError(err.to_string())
    }
}

impl From<serde_json::Error> for ChainError {
    fn from(err: serde_json::Error) -> Self {
        ChainError::SerializationError(err.to_string())
    }
}

impl From<toml::de::Error> for ChainError {
    fn from(err: toml::de::Error) -> Self {
        ChainError::ConfigError(err.to_string())
    }
}

impl From<ChainViolation> for ChainError {
    fn from(violation: ChainViolation) -> Self {
        ChainError::InvalidChain(violation)
    }
}
