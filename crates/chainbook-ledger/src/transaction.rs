use serde::Serialize;

use chainbook_crypto::ContentHasher;
use chainbook_types::{Amount, Clock, Digest, RandomSource, Timestamp};

use crate::error::LedgerError;

/// An immutable record of one value transfer.
///
/// The hash covers `timestamp || sender || receiver || value || salt` and is
/// computed once, at construction. The timestamp and random salt keep two
/// transfers with identical parties and value from colliding.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Transaction {
    sender: String,
    receiver: String,
    value: Amount,
    timestamp: Timestamp,
    salt: u64,
    hash: Digest,
}

impl Transaction {
    /// Validate the inputs, stamp the transfer with the clock and a fresh
    /// salt, and compute its hash.
    pub fn new(
        sender: &str,
        receiver: &str,
        value: f64,
        clock: &dyn Clock,
        random: &mut dyn RandomSource,
    ) -> Result<Self, LedgerError> {
        let value = Self::validate(sender, receiver, value)?;
        Ok(Self::assemble(sender, receiver, value, clock.now(), random.next_u64()))
    }

    /// Check the identifiers and value without constructing anything.
    pub fn validate(sender: &str, receiver: &str, value: f64) -> Result<Amount, LedgerError> {
        if sender.trim().is_empty() {
            return Err(LedgerError::InvalidTransaction {
                reason: "sender must not be empty".into(),
            });
        }
        if receiver.trim().is_empty() {
            return Err(LedgerError::InvalidTransaction {
                reason: "receiver must not be empty".into(),
            });
        }
        Amount::new(value).map_err(|e| LedgerError::InvalidTransaction {
            reason: e.to_string(),
        })
    }

    pub(crate) fn assemble(
        sender: &str,
        receiver: &str,
        value: Amount,
        timestamp: Timestamp,
        salt: u64,
    ) -> Self {
        let hash = compute_hash(timestamp, sender, receiver, value, salt);
        Self {
            sender: sender.to_owned(),
            receiver: receiver.to_owned(),
            value,
            timestamp,
            salt,
            hash,
        }
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn receiver(&self) -> &str {
        &self.receiver
    }

    pub fn value(&self) -> Amount {
        self.value
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn salt(&self) -> u64 {
        self.salt
    }

    pub fn hash(&self) -> Digest {
        self.hash
    }

    /// Recompute the hash from the stored fields and compare.
    pub fn verify_hash(&self) -> bool {
        compute_hash(
            self.timestamp,
            &self.sender,
            &self.receiver,
            self.value,
            self.salt,
        ) == self.hash
    }
}

fn compute_hash(
    timestamp: Timestamp,
    sender: &str,
    receiver: &str,
    value: Amount,
    salt: u64,
) -> Digest {
    ContentHasher::TRANSACTION
        .builder()
        .timestamp(timestamp)
        .str(sender)
        .str(receiver)
        .raw(&value.to_le_bytes())
        .u64(salt)
        .finish()
}
