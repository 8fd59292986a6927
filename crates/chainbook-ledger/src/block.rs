use std::fmt;

use serde::Serialize;

use chainbook_crypto::{ContentHasher, HashLinked};
use chainbook_types::{Amount, Clock, Digest, RandomSource, Timestamp};

use crate::error::LedgerError;
use crate::transaction::Transaction;

/// Lifecycle state of a block. `Committed` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum BlockStatus {
    Open,
    Committed,
}

impl fmt::Display for BlockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockStatus::Open => write!(f, "OPEN"),
            BlockStatus::Committed => write!(f, "COMMITTED"),
        }
    }
}

/// The non-reproducible inputs hashed into a block at commit time.
///
/// Kept on the block so its hash can be recomputed later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CommitSeal {
    pub chain_id: Digest,
    pub committed_at: Timestamp,
    pub nonce: u64,
}

/// An ordered, capacity-bounded batch of transactions.
///
/// Created `Open` and empty; committed exactly once, at which point the merkle
/// root, block hash, and seal are set together and the block stops accepting
/// transactions.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Block {
    pub(crate) sequence_id: u64,
    pub(crate) capacity: usize,
    pub(crate) transactions: Vec<Transaction>,
    pub(crate) status: BlockStatus,
    pub(crate) merkle_root: Option<Digest>,
    pub(crate) block_hash: Option<Digest>,
    pub(crate) previous_hash: Option<Digest>,
    pub(crate) seal: Option<CommitSeal>,
}

impl Block {
    pub(crate) fn new(sequence_id: u64, previous_hash: Option<Digest>, capacity: usize) -> Self {
        Self {
            sequence_id,
            capacity,
            transactions: Vec::with_capacity(capacity),
            status: BlockStatus::Open,
            merkle_root: None,
            block_hash: None,
            previous_hash,
            seal: None,
        }
    }

    /// Append a transaction, preserving insertion order.
    pub(crate) fn add(&mut self, tx: Transaction) -> Result<(), LedgerError> {
        if self.status != BlockStatus::Open || self.transactions.len() >= self.capacity {
            return Err(LedgerError::BlockFull {
                sequence_id: self.sequence_id,
                capacity: self.capacity,
            });
        }
        self.transactions.push(tx);
        Ok(())
    }

    /// Seal the block. Returns `(merkle_root, block_hash)`.
    ///
    /// `previous_hash` must equal the link the block was opened with.
    pub(crate) fn commit(
        &mut self,
        previous_hash: Option<Digest>,
        chain_id: &Digest,
        clock: &dyn Clock,
        random: &mut dyn RandomSource,
    ) -> Result<(Digest, Digest), LedgerError> {
        if self.status == BlockStatus::Committed {
            return Err(LedgerError::AlreadyCommitted {
                sequence_id: self.sequence_id,
            });
        }
        debug_assert_eq!(previous_hash, self.previous_hash);

        let merkle_root = self.recompute_merkle_root();
        let seal = CommitSeal {
            chain_id: *chain_id,
            committed_at: clock.now(),
            nonce: random.next_u64(),
        };
        let block_hash = compute_block_hash(
            previous_hash.as_ref(),
            &seal,
            self.sequence_id,
            &merkle_root,
        );

        self.merkle_root = Some(merkle_root);
        self.block_hash = Some(block_hash);
        self.seal = Some(seal);
        self.status = BlockStatus::Committed;

        Ok((merkle_root, block_hash))
    }

    /// Current transaction count.
    pub fn size(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_full(&self) -> bool {
        self.transactions.len() >= self.capacity
    }

    pub fn is_committed(&self) -> bool {
        self.status == BlockStatus::Committed
    }

    pub fn sequence_id(&self) -> u64 {
        self.sequence_id
    }

    pub fn status(&self) -> BlockStatus {
        self.status
    }

    pub fn merkle_root(&self) -> Option<Digest> {
        self.merkle_root
    }

    pub fn block_hash(&self) -> Option<Digest> {
        self.block_hash
    }

    pub fn previous_hash(&self) -> Option<Digest> {
        self.previous_hash
    }

    pub fn seal(&self) -> Option<CommitSeal> {
        self.seal
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Transfer values in insertion order.
    pub fn values(&self) -> Vec<Amount> {
        self.transactions.iter().map(Transaction::value).collect()
    }

    /// `(timestamp, value)` pairs in insertion order.
    pub fn values_with_timestamp(&self) -> Vec<(Timestamp, Amount)> {
        self.transactions
            .iter()
            .map(|tx| (tx.timestamp(), tx.value()))
            .collect()
    }

    /// Flat digest over the concatenated transaction hashes, in insertion
    /// order. Reordering the transactions changes the result.
    pub fn recompute_merkle_root(&self) -> Digest {
        let mut builder = ContentHasher::MERKLE.builder();
        for tx in &self.transactions {
            builder = builder.digest(&tx.hash());
        }
        builder.finish()
    }

    pub fn header(&self) -> BlockHeader {
        BlockHeader {
            sequence_id: self.sequence_id,
            status: self.status,
            block_hash: self.block_hash,
            previous_hash: self.previous_hash,
            merkle_root: self.merkle_root,
            transaction_count: self.transactions.len(),
        }
    }
}

impl HashLinked for Block {
    fn link_hash(&self) -> Option<Digest> {
        self.block_hash
    }

    fn prev_hash(&self) -> Option<Digest> {
        self.previous_hash
    }

    fn recompute_hash(&self) -> Option<Digest> {
        let seal = self.seal.as_ref()?;
        Some(compute_block_hash(
            self.previous_hash.as_ref(),
            seal,
            self.sequence_id,
            &self.recompute_merkle_root(),
        ))
    }
}

fn compute_block_hash(
    previous_hash: Option<&Digest>,
    seal: &CommitSeal,
    sequence_id: u64,
    merkle_root: &Digest,
) -> Digest {
    ContentHasher::BLOCK
        .builder()
        .opt_digest(previous_hash)
        .digest(&seal.chain_id)
        .timestamp(seal.committed_at)
        .u64(sequence_id)
        .u64(seal.nonce)
        .digest(merkle_root)
        .finish()
}

/// Block metadata without the transactions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BlockHeader {
    pub sequence_id: u64,
    pub status: BlockStatus,
    pub block_hash: Option<Digest>,
    pub previous_hash: Option<Digest>,
    pub merkle_root: Option<Digest>,
    pub transaction_count: usize,
}

impl fmt::Display for BlockHeader {
    /// `sequence_id status block_hash previous_hash merkle_root transaction_count`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn or_none(d: &Option<Digest>) -> String {
            d.map(|d| d.to_hex()).unwrap_or_else(|| "None".into())
        }
        write!(
            f,
            "{} {} {} {} {} {}",
            self.sequence_id,
            self.status,
            or_none(&self.block_hash),
            or_none(&self.previous_hash),
            or_none(&self.merkle_root),
            self.transaction_count
        )
    }
}
