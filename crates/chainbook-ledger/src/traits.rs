use chainbook_types::{Amount, Timestamp};

use crate::block::{Block, BlockHeader};
use crate::error::LedgerError;

/// Consistent copy of the whole chain taken under a single read.
#[derive(Clone, Debug, PartialEq)]
pub struct ChainSnapshot {
    pub committed: Vec<Block>,
    pub current: Block,
}

impl ChainSnapshot {
    /// Committed blocks in order, then the current block.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.committed.iter().chain(std::iter::once(&self.current))
    }
}

/// Write boundary: the single admission entry point.
pub trait LedgerWriter: Send + Sync {
    fn add_transaction(
        &self,
        sender: &str,
        receiver: &str,
        value: f64,
    ) -> Result<(), LedgerError>;
}

/// Read boundary for chain queries.
///
/// Only [`snapshot`](LedgerReader::snapshot) is required; implementations
/// backed by shared state should override the rest to avoid cloning blocks.
pub trait LedgerReader: Send + Sync {
    fn snapshot(&self) -> Result<ChainSnapshot, LedgerError>;

    /// Committed blocks plus the current block.
    fn number_of_blocks(&self) -> Result<usize, LedgerError> {
        Ok(self.snapshot()?.committed.len() + 1)
    }

    fn values(&self) -> Result<Vec<Amount>, LedgerError> {
        Ok(self.snapshot()?.blocks().flat_map(Block::values).collect())
    }

    fn values_with_timestamp(&self) -> Result<Vec<(Timestamp, Amount)>, LedgerError> {
        Ok(self
            .snapshot()?
            .blocks()
            .flat_map(Block::values_with_timestamp)
            .collect())
    }

    fn headers(&self) -> Result<Vec<BlockHeader>, LedgerError> {
        Ok(self.snapshot()?.blocks().map(Block::header).collect())
    }
}
