use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};
use uuid::Uuid;

use chainbook_crypto::{ContentHasher, HashChainVerifier};
use chainbook_types::{
    Amount, Clock, Digest, RandomSource, SystemClock, SystemRandom, Timestamp,
};

use crate::block::{Block, BlockHeader};
use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::projection::{self, LedgerSummary};
use crate::traits::{ChainSnapshot, LedgerReader, LedgerWriter};
use crate::transaction::Transaction;
use crate::validation::{ChainValidator, ValidationReport};

/// In-memory hash-chained ledger.
///
/// Owns every block; blocks own their transactions. Nothing inside is
/// reachable except through the ledger's operations, which hand out copies.
/// One `RwLock` guards all mutable state: admission (including any rollover
/// commit) runs under the write lock, queries under the read lock.
pub struct Ledger {
    name: String,
    chain_id: Digest,
    instance_id: Uuid,
    config: LedgerConfig,
    clock: Arc<dyn Clock>,
    inner: RwLock<ChainState>,
}

struct ChainState {
    committed_blocks: Vec<Block>,
    current_block: Block,
    next_sequence_id: u64,
    last_committed_hash: Option<Digest>,
    random: Box<dyn RandomSource>,
}

impl Ledger {
    /// Create a ledger with the default configuration, the system clock, and
    /// OS-seeded randomness.
    pub fn new(name: &str) -> Self {
        Self::build(
            name,
            LedgerConfig::default(),
            Arc::new(SystemClock),
            Box::new(SystemRandom::new()),
        )
    }

    pub fn with_config(name: &str, config: LedgerConfig) -> Result<Self, LedgerError> {
        Self::with_capabilities(
            name,
            config,
            Arc::new(SystemClock),
            Box::new(SystemRandom::new()),
        )
    }

    /// Create a ledger with injected time and randomness. With a
    /// `ManualClock` and a `SeededRandom` every digest is reproducible.
    pub fn with_capabilities(
        name: &str,
        config: LedgerConfig,
        clock: Arc<dyn Clock>,
        random: Box<dyn RandomSource>,
    ) -> Result<Self, LedgerError> {
        config.validate()?;
        Ok(Self::build(name, config, clock, random))
    }

    fn build(
        name: &str,
        config: LedgerConfig,
        clock: Arc<dyn Clock>,
        mut random: Box<dyn RandomSource>,
    ) -> Self {
        let name = if config.uppercase_name {
            name.to_uppercase()
        } else {
            name.to_owned()
        };

        let mut bytes = [0u8; 16];
        random.fill_bytes(&mut bytes);
        let instance_id = uuid::Builder::from_random_bytes(bytes).into_uuid();
        let created_at = clock.now();
        let chain_id = ContentHasher::CHAIN
            .builder()
            .raw(instance_id.as_bytes())
            .str(&name)
            .timestamp(created_at)
            .finish();

        info!(name = %name, chain_id = %chain_id, "ledger created");

        let current_block = Block::new(0, None, config.block_capacity);
        Self {
            name,
            chain_id,
            instance_id,
            config,
            clock,
            inner: RwLock::new(ChainState {
                committed_blocks: Vec::new(),
                current_block,
                next_sequence_id: 0,
                last_committed_hash: None,
                random,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn chain_id(&self) -> Digest {
        self.chain_id
    }

    /// The random identifier hashed into the chain id.
    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Owned copies of the committed blocks.
    pub fn committed_blocks(&self) -> Result<Vec<Block>, LedgerError> {
        Ok(self.read()?.committed_blocks.clone())
    }

    /// Owned copy of the open block.
    pub fn current_block(&self) -> Result<Block, LedgerError> {
        Ok(self.read()?.current_block.clone())
    }

    /// Committed blocks followed by the current block.
    pub fn blocks(&self) -> Result<Vec<Block>, LedgerError> {
        let state = self.read()?;
        let mut blocks = state.committed_blocks.clone();
        blocks.push(state.current_block.clone());
        Ok(blocks)
    }

    pub fn transaction_count(&self) -> Result<usize, LedgerError> {
        let state = self.read()?;
        Ok(state.blocks().map(Block::size).sum())
    }

    pub fn total_value(&self) -> Result<f64, LedgerError> {
        let state = self.read()?;
        Ok(state
            .blocks()
            .flat_map(|b| b.transactions().iter())
            .map(|tx| tx.value().value())
            .sum())
    }

    pub fn summary(&self) -> Result<LedgerSummary, LedgerError> {
        let snapshot = self.snapshot()?;
        Ok(LedgerSummary::from_snapshot(
            &self.name,
            self.chain_id,
            &snapshot,
        ))
    }

    /// One line per block: `sequence_id status block_hash previous_hash
    /// merkle_root transaction_count`.
    pub fn display_headers(&self) -> Result<String, LedgerError> {
        Ok(projection::render_headers(&self.headers()?))
    }

    /// Every transaction of every block, committed and open.
    pub fn display_transactions(&self) -> Result<String, LedgerError> {
        let snapshot = self.snapshot()?;
        Ok(projection::render_transactions(snapshot.blocks()))
    }

    /// Every transaction of the committed blocks only.
    pub fn display_chain(&self) -> Result<String, LedgerError> {
        let state = self.read()?;
        Ok(projection::render_transactions(state.committed_blocks.iter()))
    }

    /// Full integrity report over the chain.
    pub fn validate(&self) -> Result<ValidationReport, LedgerError> {
        let report =
            ChainValidator::validate(self, &self.chain_id, self.config.block_capacity)?;
        for violation in &report.violations {
            warn!(
                sequence_id = violation.sequence_id,
                kind = ?violation.kind,
                "{}",
                violation.description
            );
        }
        Ok(report)
    }

    /// Hash-chain check over the committed blocks; stops at the first fault.
    pub fn verify(&self) -> Result<(), LedgerError> {
        let state = self.read()?;
        HashChainVerifier::verify_chain(&state.committed_blocks)?;
        Ok(())
    }

    /// Close the full current block and open its successor.
    fn commit_current(&self, state: &mut ChainState) {
        let previous_hash = state.last_committed_hash;
        let (_, block_hash) = match state.current_block.commit(
            previous_hash,
            &self.chain_id,
            self.clock.as_ref(),
            state.random.as_mut(),
        ) {
            Ok(digests) => digests,
            Err(e) => unreachable!("rollover reached a sealed block: {e}"),
        };

        state.next_sequence_id += 1;
        state.last_committed_hash = Some(block_hash);
        let fresh = Block::new(
            state.next_sequence_id,
            state.last_committed_hash,
            self.config.block_capacity,
        );
        let committed = std::mem::replace(&mut state.current_block, fresh);

        info!(
            sequence_id = committed.sequence_id(),
            block_hash = %block_hash,
            "block committed"
        );
        state.committed_blocks.push(committed);
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, ChainState>, LedgerError> {
        self.inner.read().map_err(|_| LedgerError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, ChainState>, LedgerError> {
        self.inner.write().map_err(|_| LedgerError::LockPoisoned)
    }
}

impl ChainState {
    fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.committed_blocks
            .iter()
            .chain(std::iter::once(&self.current_block))
    }
}

impl LedgerWriter for Ledger {
    /// Admit one transfer. Rolls the current block over first when it is
    /// already full, so committed blocks are always at capacity.
    fn add_transaction(
        &self,
        sender: &str,
        receiver: &str,
        value: f64,
    ) -> Result<(), LedgerError> {
        let value = Transaction::validate(sender, receiver, value).inspect_err(|e| {
            warn!(sender, receiver, error = %e, "transaction rejected");
        })?;

        let mut state = self.write()?;
        let salt = state.random.next_u64();
        let tx = Transaction::assemble(sender, receiver, value, self.clock.now(), salt);

        if state.current_block.is_full() {
            self.commit_current(&mut state);
        }

        let sequence_id = state.current_block.sequence_id();
        state.current_block.add(tx)?;
        debug!(
            sequence_id,
            size = state.current_block.size(),
            "transaction admitted"
        );
        Ok(())
    }
}

impl LedgerReader for Ledger {
    fn snapshot(&self) -> Result<ChainSnapshot, LedgerError> {
        let state = self.read()?;
        Ok(ChainSnapshot {
            committed: state.committed_blocks.clone(),
            current: state.current_block.clone(),
        })
    }

    fn number_of_blocks(&self) -> Result<usize, LedgerError> {
        Ok(self.read()?.committed_blocks.len() + 1)
    }

    fn values(&self) -> Result<Vec<Amount>, LedgerError> {
        let state = self.read()?;
        Ok(state.blocks().flat_map(Block::values).collect())
    }

    fn values_with_timestamp(&self) -> Result<Vec<(Timestamp, Amount)>, LedgerError> {
        let state = self.read()?;
        Ok(state.blocks().flat_map(Block::values_with_timestamp).collect())
    }

    fn headers(&self) -> Result<Vec<BlockHeader>, LedgerError> {
        let state = self.read()?;
        Ok(state.blocks().map(Block::header).collect())
    }
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("name", &self.name)
            .field("chain_id", &self.chain_id)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
