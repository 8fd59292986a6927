use serde::Serialize;

use chainbook_crypto::HashLinked;
use chainbook_types::Digest;

use crate::block::{Block, BlockStatus};
use crate::error::LedgerError;
use crate::traits::LedgerReader;

/// Result of chain validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub chain_id: Digest,
    pub block_count: usize,
    pub transaction_count: usize,
    pub sequence_dense: bool,
    pub hash_chain_valid: bool,
    pub blocks_full: bool,
    pub digests_valid: bool,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A specific integrity violation detected during validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub sequence_id: u64,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ViolationKind {
    SequenceGap,
    HashChainBreak,
    BlockHashMismatch,
    MerkleMismatch,
    TransactionHashMismatch,
    UnderfilledBlock,
    CapacityExceeded,
    StatusMismatch,
    ForeignChain,
}

/// Chain integrity validator.
pub struct ChainValidator;

impl ChainValidator {
    /// Check every invariant of the chain behind `reader`:
    ///
    /// - committed blocks are numbered densely from zero and the open block
    ///   follows them
    /// - the first block has no previous hash; every other block links to its
    ///   predecessor's hash, and the open block links to the last committed one
    /// - committed blocks are exactly at `capacity` and carry their digests;
    ///   the open block carries none
    /// - transaction hashes, merkle roots, and block hashes recompute
    pub fn validate<R: LedgerReader>(
        reader: &R,
        chain_id: &Digest,
        capacity: usize,
    ) -> Result<ValidationReport, LedgerError> {
        let snapshot = reader.snapshot()?;
        let mut checker = Checker::default();

        let mut previous: Option<Digest> = None;
        for (index, block) in snapshot.committed.iter().enumerate() {
            checker.check_sequence(block, index as u64);
            checker.check_link(block, previous);
            checker.check_transactions(block);

            if block.status() != BlockStatus::Committed {
                checker.push(
                    block,
                    ViolationKind::StatusMismatch,
                    "block in committed sequence is not committed".into(),
                );
            }
            if block.size() != capacity {
                checker.blocks_full = false;
                let kind = if block.size() > capacity {
                    ViolationKind::CapacityExceeded
                } else {
                    ViolationKind::UnderfilledBlock
                };
                checker.push(
                    block,
                    kind,
                    format!("committed block holds {} of {capacity}", block.size()),
                );
            }
            if block.merkle_root() != Some(block.recompute_merkle_root()) {
                checker.digests_valid = false;
                checker.push(
                    block,
                    ViolationKind::MerkleMismatch,
                    "merkle root does not match transactions".into(),
                );
            }
            match block.seal() {
                Some(seal) if seal.chain_id != *chain_id => checker.push(
                    block,
                    ViolationKind::ForeignChain,
                    format!("sealed for chain {}", seal.chain_id.short_hex()),
                ),
                Some(_) => {}
                None => checker.push(
                    block,
                    ViolationKind::StatusMismatch,
                    "committed block has no commit seal".into(),
                ),
            }
            if block.block_hash().is_none() || block.recompute_hash() != block.block_hash() {
                checker.digests_valid = false;
                checker.push(
                    block,
                    ViolationKind::BlockHashMismatch,
                    "block hash does not match its inputs".into(),
                );
            }

            previous = block.block_hash();
        }

        let current = &snapshot.current;
        checker.check_sequence(current, snapshot.committed.len() as u64);
        checker.check_link(current, previous);
        checker.check_transactions(current);
        if current.status() != BlockStatus::Open
            || current.merkle_root().is_some()
            || current.block_hash().is_some()
            || current.seal().is_some()
        {
            checker.push(
                current,
                ViolationKind::StatusMismatch,
                "current block is not open or carries commit digests".into(),
            );
        }
        if current.size() > capacity {
            checker.push(
                current,
                ViolationKind::CapacityExceeded,
                format!("open block holds {} of {capacity}", current.size()),
            );
        }

        Ok(ValidationReport {
            chain_id: *chain_id,
            block_count: snapshot.committed.len() + 1,
            transaction_count: snapshot.blocks().map(Block::size).sum(),
            sequence_dense: checker.sequence_dense,
            hash_chain_valid: checker.hash_chain_valid,
            blocks_full: checker.blocks_full,
            digests_valid: checker.digests_valid,
            violations: checker.violations,
        })
    }
}

struct Checker {
    sequence_dense: bool,
    hash_chain_valid: bool,
    blocks_full: bool,
    digests_valid: bool,
    violations: Vec<Violation>,
}

impl Default for Checker {
    fn default() -> Self {
        Self {
            sequence_dense: true,
            hash_chain_valid: true,
            blocks_full: true,
            digests_valid: true,
            violations: Vec::new(),
        }
    }
}

impl Checker {
    fn push(&mut self, block: &Block, kind: ViolationKind, description: String) {
        self.violations.push(Violation {
            sequence_id: block.sequence_id(),
            kind,
            description,
        });
    }

    fn check_sequence(&mut self, block: &Block, expected: u64) {
        if block.sequence_id() != expected {
            self.sequence_dense = false;
            self.push(
                block,
                ViolationKind::SequenceGap,
                format!("expected sequence id {expected}, found {}", block.sequence_id()),
            );
        }
    }

    fn check_link(&mut self, block: &Block, expected: Option<Digest>) {
        if block.previous_hash() != expected {
            self.hash_chain_valid = false;
            self.push(
                block,
                ViolationKind::HashChainBreak,
                "previous hash link mismatch".into(),
            );
        }
    }

    fn check_transactions(&mut self, block: &Block) {
        for (index, tx) in block.transactions().iter().enumerate() {
            if !tx.verify_hash() {
                self.digests_valid = false;
                self.push(
                    block,
                    ViolationKind::TransactionHashMismatch,
                    format!("transaction {index} hash does not match its fields"),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chainbook_types::{ManualClock, SeededRandom, Timestamp};

    use super::*;
    use crate::traits::ChainSnapshot;
    use crate::transaction::Transaction;

    struct FixedChain(ChainSnapshot);

    impl LedgerReader for FixedChain {
        fn snapshot(&self) -> Result<ChainSnapshot, LedgerError> {
            Ok(self.0.clone())
        }
    }

    const CHAIN: Digest = Digest::from_hash([5; 32]);

    /// `committed` full blocks of 3, then an open block with `open` transactions.
    fn build(committed: usize, open: usize) -> ChainSnapshot {
        let clock = ManualClock::new(Timestamp::from_micros(1_000), 1);
        let mut random = SeededRandom::new(11);
        let mut blocks = Vec::new();
        let mut prev = None;

        for seq in 0..committed as u64 {
            let mut block = Block::new(seq, prev, 3);
            for _ in 0..3 {
                block
                    .add(Transaction::new("Bob", "Alice", 1.0, &clock, &mut random).unwrap())
                    .unwrap();
            }
            let (_, hash) = block.commit(prev, &CHAIN, &clock, &mut random).unwrap();
            prev = Some(hash);
            blocks.push(block);
        }

        let mut current = Block::new(committed as u64, prev, 3);
        for _ in 0..open {
            current
                .add(Transaction::new("Carol", "Dave", 2.0, &clock, &mut random).unwrap())
                .unwrap();
        }
        ChainSnapshot {
            committed: blocks,
            current,
        }
    }

    fn report(snapshot: ChainSnapshot) -> ValidationReport {
        ChainValidator::validate(&FixedChain(snapshot), &CHAIN, 3).unwrap()
    }

    fn kinds(report: &ValidationReport) -> Vec<ViolationKind> {
        report.violations.iter().map(|v| v.kind).collect()
    }

    #[test]
    fn valid_chain_passes() {
        let r = report(build(4, 2));
        assert!(r.is_valid(), "{:?}", r.violations);
        assert_eq!(r.block_count, 5);
        assert_eq!(r.transaction_count, 14);
    }

    #[test]
    fn fresh_chain_is_valid() {
        let r = report(build(0, 0));
        assert!(r.is_valid());
        assert_eq!(r.block_count, 1);
    }

    #[test]
    fn broken_link_detected() {
        let mut snapshot = build(3, 0);
        snapshot.committed[2].previous_hash = Some(Digest::from_hash([1; 32]));
        let r = report(snapshot);
        assert!(!r.hash_chain_valid);
        assert!(kinds(&r).contains(&ViolationKind::HashChainBreak));
        // The block hash covered the old link.
        assert!(kinds(&r).contains(&ViolationKind::BlockHashMismatch));
    }

    #[test]
    fn genesis_with_previous_hash_detected() {
        let mut snapshot = build(1, 0);
        snapshot.committed[0].previous_hash = Some(Digest::from_hash([1; 32]));
        let r = report(snapshot);
        assert!(!r.hash_chain_valid);
        assert_eq!(r.violations[0].sequence_id, 0);
        assert_eq!(r.violations[0].kind, ViolationKind::HashChainBreak);
    }

    #[test]
    fn sequence_gap_detected() {
        let mut snapshot = build(2, 0);
        snapshot.committed[1].sequence_id = 5;
        let r = report(snapshot);
        assert!(!r.sequence_dense);
        assert!(kinds(&r).contains(&ViolationKind::SequenceGap));
    }

    #[test]
    fn tampered_transaction_detected() {
        let mut snapshot = build(2, 0);
        let tx = &snapshot.committed[0].transactions[1];
        let forged = Transaction::assemble(
            tx.sender(),
            "Mallory",
            tx.value(),
            tx.timestamp(),
            tx.salt(),
        );
        snapshot.committed[0].transactions[1] = forged;
        let r = report(snapshot);
        assert!(!r.digests_valid);
        assert!(kinds(&r).contains(&ViolationKind::MerkleMismatch));
        assert!(kinds(&r).contains(&ViolationKind::BlockHashMismatch));
    }

    #[test]
    fn underfilled_committed_block_detected() {
        let mut snapshot = build(1, 0);
        snapshot.committed[0].transactions.pop();
        let r = report(snapshot);
        assert!(!r.blocks_full);
        assert!(kinds(&r).contains(&ViolationKind::UnderfilledBlock));
    }

    #[test]
    fn overfilled_committed_block_detected() {
        let mut snapshot = build(2, 0);
        let extra = snapshot.committed[1].transactions[0].clone();
        snapshot.committed[1].transactions.push(extra);
        let r = report(snapshot);
        assert!(!r.blocks_full);
        let over: Vec<&Violation> = r
            .violations
            .iter()
            .filter(|v| v.kind == ViolationKind::CapacityExceeded)
            .collect();
        assert_eq!(over.len(), 1);
        assert_eq!(over[0].sequence_id, 1);
        assert_eq!(over[0].description, "committed block holds 4 of 3");
        assert!(!kinds(&r).contains(&ViolationKind::UnderfilledBlock));
    }

    #[test]
    fn foreign_chain_seal_detected() {
        let snapshot = build(1, 0);
        let r = ChainValidator::validate(
            &FixedChain(snapshot),
            &Digest::from_hash([6; 32]),
            3,
        )
        .unwrap();
        assert_eq!(kinds(&r), vec![ViolationKind::ForeignChain]);
    }

    #[test]
    fn open_block_with_digests_detected() {
        let mut snapshot = build(1, 1);
        snapshot.current.merkle_root = Some(Digest::from_hash([3; 32]));
        let r = report(snapshot);
        assert_eq!(kinds(&r), vec![ViolationKind::StatusMismatch]);
    }

    #[test]
    fn open_block_must_link_to_head() {
        let mut snapshot = build(2, 1);
        snapshot.current.previous_hash = None;
        let r = report(snapshot);
        assert_eq!(r.violations.len(), 1);
        assert_eq!(r.violations[0].sequence_id, 2);
        assert_eq!(r.violations[0].kind, ViolationKind::HashChainBreak);
    }
}
