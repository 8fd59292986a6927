use chainbook_crypto::ChainError;

/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid transaction: {reason}")]
    InvalidTransaction { reason: String },

    #[error("block {sequence_id} cannot accept transactions (capacity {capacity})")]
    BlockFull { sequence_id: u64, capacity: usize },

    #[error("block {sequence_id} is already committed")]
    AlreadyCommitted { sequence_id: u64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("chain integrity violation: {0}")]
    Integrity(#[from] ChainError),

    #[error("ledger lock poisoned")]
    LockPoisoned,
}
