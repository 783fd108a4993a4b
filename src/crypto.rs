//! Cryptographic primitives for hashledger

use crate::error::ChainError;
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use secp256k1::{
    constants::{COMPACT_SIGNATURE_SIZE, PUBLIC_KEY_SIZE},
    ecdsa::Signature,
    All, Message, PublicKey, Secp256k1, SecretKey,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A thread-safe, lazily initialized Secp256k1 context.
static SECP256K1_CONTEXT: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

/// A SHA-256 digest.
pub type Sha256Hash = [u8; 32];

/// SHA-256 of arbitrary bytes.
pub fn sha256(data: &[u8]) -> Sha256Hash {
    Sha256::digest(data).into()
}

/// Lowercase hex form of a digest, the textual form difficulty is measured on.
pub fn hash_to_hex(hash: &Sha256Hash) -> String {
    hex::encode(hash)
}

/// A ledger identity.
///
/// Addresses produced by [`KeyPair::address`] are the hex encoding of the
/// compressed public key, so a transfer's signature can be checked against its
/// sender alone. Any other string is accepted as a receive-only label.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(label: impl Into<String>) -> Self {
        Address(label.into())
    }

    /// Parses a hex-encoded compressed public key.
    pub fn from_hex(hex_str: &str) -> Result<Self, ChainError> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| ChainError::CryptoError(format!("Invalid hex address: {}", e)))?;
        if bytes.len() != PUBLIC_KEY_SIZE {
            return Err(ChainError::CryptoError(format!(
                "Address must be {} bytes, got {}",
                PUBLIC_KEY_SIZE,
                bytes.len()
            )));
        }
        PublicKey::from_slice(&bytes)
            .map_err(|e| ChainError::CryptoError(format!("Invalid public key: {}", e)))?;
        Ok(Address(hex_str.to_ascii_lowercase()))
    }

    pub fn from_public_key(public_key: &PublicKey) -> Self {
        Address(hex::encode(public_key.serialize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw public key bytes behind this address.
    pub fn public_key_bytes(&self) -> Result<Vec<u8>, ChainError> {
        hex::decode(&self.0).map_err(|e| {
            ChainError::CryptoError(format!("Address {} is not a public key: {}", self.0, e))
        })
    }

    /// Shortened form for logs and tables.
    pub fn short(&self) -> &str {
        let end = self.0.len().min(12);
        self.0.get(..end).unwrap_or(&self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Address::new(s)
    }
}

/// Anything that can authorize a transfer on behalf of an address.
pub trait Signer {
    fn address(&self) -> Address;
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, ChainError>;
}

#[derive(Debug, Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generates a new random KeyPair using the OS random number generator.
    pub fn generate() -> Self {
        let secret_key = SecretKey::new(&mut OsRng);
        Self::from_secret_key(secret_key)
    }

    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let public_key = PublicKey::from_secret_key(&SECP256K1_CONTEXT, &secret_key);
        KeyPair {
            secret_key,
            public_key,
        }
    }

    pub fn address(&self) -> Address {
        Address::from_public_key(&self.public_key)
    }

    pub fn public_key_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.public_key.serialize()
    }

    /// Signs a message (hashed with SHA-256 first) and returns the compact signature bytes.
    pub fn sign(&self, message: &[u8]) -> Result<[u8; COMPACT_SIGNATURE_SIZE], ChainError> {
        let digest = sha256(message);
        let message = Message::from_digest_slice(&digest)
            .map_err(|e| ChainError::CryptoError(format!("Failed to create message: {}", e)))?;

        let signature = SECP256K1_CONTEXT.sign_ecdsa(&message, &self.secret_key);
        Ok(signature.serialize_compact())
    }
}

impl Signer for KeyPair {
    fn address(&self) -> Address {
        KeyPair::address(self)
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, ChainError> {
        KeyPair::sign(self, message).map(|sig| sig.to_vec())
    }
}

/// Verifies an ECDSA signature given the raw public key bytes, message, and signature bytes.
pub fn verify_signature(
    public_key_bytes: &[u8],
    message: &[u8],
    signature_bytes: &[u8],
) -> Result<(), ChainError> {
    if public_key_bytes.len() != PUBLIC_KEY_SIZE {
        return Err(ChainError::CryptoError(format!(
            "Public key must be exactly {} bytes (compressed), got {}",
            PUBLIC_KEY_SIZE,
            public_key_bytes.len()
        )));
    }
    if signature_bytes.len() != COMPACT_SIGNATURE_SIZE {
        return Err(ChainError::CryptoError(format!(
            "Signature must be exactly {} bytes (compact), got {}",
            COMPACT_SIGNATURE_SIZE,
            signature_bytes.len()
        )));
    }

    let public_key = PublicKey::from_slice(public_key_bytes)
        .map_err(|e| ChainError::CryptoError(format!("Invalid public key: {}", e)))?;

    let digest = sha256(message);
    let message = Message::from_digest_slice(&digest)
        .map_err(|e| ChainError::CryptoError(format!("Failed to create message: {}", e)))?;

    let signature = Signature::from_compact(signature_bytes)
        .map_err(|e| ChainError::CryptoError(format!("Invalid signature: {}", e)))?;

    SECP256K1_CONTEXT
        .verify_ecdsa(&message, &signature, &public_key)
        .map_err(|_| ChainError::CryptoError("Signature verification failed".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secp256k1::constants::SECRET_KEY_SIZE;

    #[test]
    fn test_key_generation() {
        let keypair = KeyPair::generate();
        assert_eq!(keypair.public_key_bytes().len(), PUBLIC_KEY_SIZE);
        assert_eq!(keypair.secret_key.secret_bytes().len(), SECRET_KEY_SIZE);
    }

    #[test]
    fn test_address_is_compressed_public_key() {
        let keypair = KeyPair::generate();
        let address = keypair.address();
        assert_eq!(address.as_str().len(), PUBLIC_KEY_SIZE * 2);
        assert_eq!(
            address.public_key_bytes().unwrap(),
            keypair.public_key_bytes().to_vec()
        );
        assert_eq!(Address::from_hex(address.as_str()).unwrap(), address);
    }

    #[test]
    fn test_address_from_hex_rejects_garbage() {
        assert!(Address::from_hex("zz").is_err());
        assert!(Address::from_hex("abcd").is_err());
        assert!(Address::from_hex(&"00".repeat(PUBLIC_KEY_SIZE)).is_err());
    }

    #[test]
    fn test_signing_and_verification() {
        let keypair = KeyPair::generate();
        let message = b"Hello, hashledger!";

        let signature = keypair.sign(message).unwrap();
        let pubkey_bytes = keypair.public_key_bytes();

        assert!(verify_signature(&pubkey_bytes, message, &signature).is_ok());
        assert_eq!(signature.len(), COMPACT_SIGNATURE_SIZE);
    }

    #[test]
    fn test_signatures_are_deterministic() {
        let keypair = KeyPair::generate();
        assert_eq!(keypair.sign(b"same").unwrap(), keypair.sign(b"same").unwrap());
    }

    #[test]
    fn test_invalid_signature() {
        let keypair1 = KeyPair::generate();
        let keypair2 = KeyPair::generate();

        let message = b"Test message";
        let signature = keypair1.sign(message).unwrap();

        let result = verify_signature(&keypair2.public_key_bytes(), message, &signature);
        assert_eq!(
            result.unwrap_err().to_string(),
            "Cryptographic error: Signature verification failed"
        );
    }

    #[test]
    fn test_tampered_message() {
        let keypair = KeyPair::generate();
        let signature = keypair.sign(b"Original message").unwrap();

        let result = verify_signature(&keypair.public_key_bytes(), b"Tampered message", &signature);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_key_or_sig_length_check() {
        let keypair = KeyPair::generate();
        let message = b"Test";
        let signature = keypair.sign(message).unwrap();
        let pubkey_bytes = keypair.public_key_bytes();

        let result = verify_signature(&pubkey_bytes[1..], message, &signature);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Public key must be exactly"));

        let result = verify_signature(&pubkey_bytes, message, &signature[1..]);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Signature must be exactly"));
    }

    #[test]
    fn test_hash_hex_form() {
        let hash = sha256(b"abc");
        assert_eq!(
            hash_to_hex(&hash),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
