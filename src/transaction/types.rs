/// Transaction types for hashledger
use crate::crypto::{sha256, Address, Sha256Hash, Signer};
use crate::error::ChainError;

/// Maximum transaction size in bytes (100KB) to prevent DoS
pub const MAX_TRANSACTION_SIZE: usize = 100_000;

/// A ledger entry that can occur in a block
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Transaction {
    Transfer(TransferTx),
    Reward(RewardTx),
}

impl Transaction {
    pub fn hash_str(&self) -> String {
        hex::encode(self.hash())
    }

    /// Validate transaction size to prevent DoS attacks
    pub fn validate_size(&self) -> Result<(), ChainError> {
        let serialized = bincode::serialize(self)?;

        if serialized.len() > MAX_TRANSACTION_SIZE {
            return Err(ChainError::InvalidTransaction(format!(
                "Transaction too large: {} bytes (max: {})",
                serialized.len(),
                MAX_TRANSACTION_SIZE
            )));
        }
        Ok(())
    }

    pub fn recipient(&self) -> &Address {
        match self {
            Transaction::Transfer(tx) => &tx.recipient,
            Transaction::Reward(tx) => &tx.recipient,
        }
    }

    /// `None` for rewards, which are issued by the system.
    pub fn sender(&self) -> Option<&Address> {
        match self {
            Transaction::Transfer(tx) => Some(&tx.sender),
            Transaction::Reward(_) => None,
        }
    }

    pub fn amount(&self) -> u64 {
        match self {
            Transaction::Transfer(tx) => tx.amount,
            Transaction::Reward(tx) => tx.amount,
        }
    }

    /// Canonical byte encoding used as block hashing input.
    ///
    /// Fields are written in a fixed order behind a variant tag, strings are
    /// length-prefixed. Transfer signatures are included.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match self {
            Transaction::Transfer(tx) => {
                out.extend_from_slice(&tx.signable_message());
                match &tx.signature {
                    Some(sig) => {
                        out.push(1);
                        put_bytes(&mut out, sig);
                    }
                    None => out.push(0),
                }
            }
            Transaction::Reward(tx) => {
                put_bytes(&mut out, b"reward");
                put_bytes(&mut out, tx.recipient.as_str().as_bytes());
                out.extend_from_slice(&tx.amount.to_le_bytes());
            }
        }
        out
    }

    /// Calculate the hash of this transaction
    pub fn hash(&self) -> Sha256Hash {
        sha256(&self.canonical_bytes())
    }
}

fn put_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u64).to_le_bytes());
    out.extend_from_slice(bytes);
}

/// Reward transaction: credits whoever triggered a mining round
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RewardTx {
    pub recipient: Address,
    pub amount: u64,
}

impl RewardTx {
    pub fn new(recipient: Address, amount: u64) -> Self {
        RewardTx { recipient, amount }
    }
}

/// Transfer transaction: moves `amount` from `sender` to `recipient`
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TransferTx {
    pub sender: Address,
    pub recipient: Address,
    pub amount: u64,
    #[serde(default)]
    pub signature: Option<Vec<u8>>,
}

impl TransferTx {
    pub fn new(sender: Address, recipient: Address, amount: u64) -> Self {
        TransferTx {
            sender,
            recipient,
            amount,
            signature: None,
        }
    }

    /// Builds a transfer from the signer's address and signs it immediately.
    pub fn create<S: Signer + ?Sized>(
        signer: &S,
        recipient: Address,
        amount: u64,
    ) -> Result<Self, ChainError> {
        let mut tx = TransferTx::new(signer.address(), recipient, amount);
        let signature = signer.sign(&tx.signable_message())?;
        tx.sign(signature);
        Ok(tx)
    }

    /// The bytes covered by the signature: `(sender, recipient, amount)`.
    pub fn signable_message(&self) -> Vec<u8> {
        let mut message = Vec::new();
        put_bytes(&mut message, b"transfer");
        put_bytes(&mut message, self.sender.as_str().as_bytes());
        put_bytes(&mut message, self.recipient.as_str().as_bytes());
        message.extend_from_slice(&self.amount.to_le_bytes());
        message
    }

    pub fn sign(&mut self, signature: Vec<u8>) {
        self.signature = Some(signature);
    }
}

impl From<TransferTx> for Transaction {
    fn from(tx: TransferTx) -> Self {
        Transaction::Transfer(tx)
    }
}

impl From<RewardTx> for Transaction {
    fn from(tx: RewardTx) -> Self {
        Transaction::Reward(tx)
    }
}
