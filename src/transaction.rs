//! Transaction module split into types and validation for better modularity

pub mod types;
pub mod validation;

pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{Address, KeyPair};
    use crate::error::ChainError;

    #[test]
    fn test_signed_transfer_is_valid() {
        let alice = KeyPair::generate();
        let bob = KeyPair::generate();

        let tx = TransferTx::create(&alice, bob.address(), 50).unwrap();
        assert_eq!(tx.sender, alice.address());
        assert!(tx.signature.is_some());
        assert_eq!(Transaction::from(tx).is_valid(), Ok(true));
    }

    #[test]
    fn test_reward_is_always_valid() {
        let tx = Transaction::from(RewardTx::new(Address::new("miner"), 100));
        assert_eq!(tx.is_valid(), Ok(true));
        assert_eq!(tx.sender(), None);
    }

    #[test]
    fn test_unsigned_transfer_reports_missing_signature() {
        let alice = KeyPair::generate();
        let tx = TransferTx::new(alice.address(), Address::new("bob"), 10);
        assert_eq!(tx.is_valid(), Err(ChainError::MissingSignature));
    }

    #[test]
    fn test_transfer_without_sender_reports_missing_sender() {
        let alice = KeyPair::generate();
        let mut tx = TransferTx::new(Address::default(), Address::new("bob"), 10);
        tx.sign(alice.sign(&tx.signable_message()).unwrap().to_vec());
        assert_eq!(tx.is_valid(), Err(ChainError::MissingSender));
    }

    #[test]
    fn test_tampered_amount_fails_verification() {
        let alice = KeyPair::generate();
        let mut tx = TransferTx::create(&alice, Address::new("bob"), 50).unwrap();
        tx.amount = 5_000;
        assert_eq!(tx.is_valid(), Ok(false));
    }

    #[test]
    fn test_signature_from_other_key_fails() {
        let alice = KeyPair::generate();
        let mallory = KeyPair::generate();

        let mut tx = TransferTx::new(alice.address(), mallory.address(), 50);
        tx.sign(mallory.sign(&tx.signable_message()).unwrap().to_vec());
        assert_eq!(tx.is_valid(), Ok(false));
    }

    #[test]
    fn test_label_sender_never_verifies() {
        let alice = KeyPair::generate();
        let mut tx = TransferTx::new(Address::new("alice"), Address::new("bob"), 1);
        tx.sign(alice.sign(&tx.signable_message()).unwrap().to_vec());
        assert_eq!(tx.is_valid(), Ok(false));
    }

    #[test]
    fn test_uppercase_sender_alias_never_verifies() {
        let alice = KeyPair::generate();
        let alias = Address::new(alice.address().as_str().to_ascii_uppercase());
        assert_ne!(alias, alice.address());

        let mut tx = TransferTx::new(alias, Address::new("bob"), 70);
        tx.sign(alice.sign(&tx.signable_message()).unwrap().to_vec());
        assert_eq!(tx.is_valid(), Ok(false));
    }

    #[test]
    fn test_canonical_bytes_are_stable() {
        let alice = KeyPair::generate();
        let tx: Transaction = TransferTx::create(&alice, Address::new("bob"), 7).unwrap().into();
        let copy = tx.clone();
        assert_eq!(tx.canonical_bytes(), copy.canonical_bytes());
        assert_eq!(tx.hash(), copy.hash());
    }

    #[test]
    fn test_hash_depends_on_amount_and_variant() {
        let reward = Transaction::from(RewardTx::new(Address::new("bob"), 7));
        let bigger = Transaction::from(RewardTx::new(Address::new("bob"), 8));
        let unsigned = Transaction::from(TransferTx::new(Address::new(""), Address::new("bob"), 7));
        assert_ne!(reward.hash(), bigger.hash());
        assert_ne!(reward.hash(), unsigned.hash());
    }

    #[test]
    fn test_validate_size_rejects_huge_signature() {
        let mut tx = TransferTx::new(Address::new("a"), Address::new("b"), 1);
        tx.sign(vec![0u8; MAX_TRANSACTION_SIZE + 1]);
        let err = Transaction::from(tx).validate_size().unwrap_err();
        assert!(err.to_string().contains("Transaction too large"));
    }
}
