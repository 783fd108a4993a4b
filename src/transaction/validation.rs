/// Validation logic for transactions separated from type definitions
use crate::crypto::Address;
use crate::error::ChainError;
use crate::transaction::types::{Transaction, TransferTx};

impl Transaction {
    /// Checks the transaction's authorization.
    ///
    /// Rewards are always valid. A transfer must carry a signature and a
    /// sender; the result is whether the signature verifies.
    pub fn is_valid(&self) -> Result<bool, ChainError> {
        match self {
            Transaction::Reward(_) => Ok(true),
            Transaction::Transfer(tx) => tx.is_valid(),
        }
    }
}

impl TransferTx {
    pub fn is_valid(&self) -> Result<bool, ChainError> {
        let signature = self.signature.as_ref().ok_or(ChainError::MissingSignature)?;
        if self.sender.is_empty() {
            return Err(ChainError::MissingSender);
        }

        // Only the canonical lowercase key form may send. Labels carry no key,
        // and a case variant of a key names a different account in the replay.
        let sender = match Address::from_hex(self.sender.as_str()) {
            Ok(canonical) if canonical == self.sender => canonical,
            _ => return Ok(false),
        };
        let public_key = sender.public_key_bytes()?;

        let message = self.signable_message();
        Ok(crate::crypto::verify_signature(&public_key, &message, signature).is_ok())
    }
}
