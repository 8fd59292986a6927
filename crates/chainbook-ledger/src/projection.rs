use std::fmt::{self, Write as _};

use serde::Serialize;

use chainbook_types::Digest;

use crate::block::{Block, BlockHeader};
use crate::traits::ChainSnapshot;

/// Aggregate view of a ledger at one instant.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LedgerSummary {
    pub name: String,
    pub chain_id: Digest,
    /// Committed blocks plus the open block.
    pub blocks: usize,
    pub committed_blocks: usize,
    pub open_block_size: usize,
    pub transactions: usize,
    pub total_value: f64,
    pub head: Option<Digest>,
}

impl LedgerSummary {
    pub fn from_snapshot(name: &str, chain_id: Digest, snapshot: &ChainSnapshot) -> Self {
        let transactions = snapshot.blocks().map(Block::size).sum();
        let total_value = snapshot
            .blocks()
            .flat_map(|b| b.transactions().iter())
            .map(|tx| tx.value().value())
            .sum();
        Self {
            name: name.to_owned(),
            chain_id,
            blocks: snapshot.committed.len() + 1,
            committed_blocks: snapshot.committed.len(),
            open_block_size: snapshot.current.size(),
            transactions,
            total_value,
            head: snapshot.committed.last().and_then(Block::block_hash),
        }
    }
}

impl fmt::Display for LedgerSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ledger:       {}", self.name)?;
        writeln!(f, "Chain ID:     {}", self.chain_id)?;
        writeln!(
            f,
            "Blocks:       {} ({} committed, open block holds {})",
            self.blocks, self.committed_blocks, self.open_block_size
        )?;
        writeln!(f, "Transactions: {}", self.transactions)?;
        writeln!(f, "Total value:  {}", self.total_value)?;
        match &self.head {
            Some(head) => write!(f, "Head:         {head}"),
            None => write!(f, "Head:         None"),
        }
    }
}

/// One header line per block.
pub fn render_headers(headers: &[BlockHeader]) -> String {
    let mut out = String::new();
    for header in headers {
        let _ = writeln!(out, "{header}");
    }
    out
}

/// A section per block listing its transactions in insertion order.
pub fn render_transactions<'a>(blocks: impl Iterator<Item = &'a Block>) -> String {
    let mut out = String::new();
    for block in blocks {
        let _ = writeln!(
            out,
            "Block {} [{}] {} transaction(s)",
            block.sequence_id(),
            block.status(),
            block.size()
        );
        for (index, tx) in block.transactions().iter().enumerate() {
            let _ = writeln!(
                out,
                "  {index:>2}  {}  {} -> {}  {}  {}",
                tx.timestamp(),
                tx.sender(),
                tx.receiver(),
                tx.value(),
                tx.hash()
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use chainbook_types::{Amount, Timestamp};

    use super::*;
    use crate::transaction::Transaction;

    fn open_block_with(values: &[f64]) -> Block {
        let mut block = Block::new(0, None, 10);
        for (i, v) in values.iter().enumerate() {
            let tx = Transaction::assemble(
                "Bob",
                "Alice",
                Amount::new(*v).unwrap(),
                Timestamp::from_micros(1_577_836_800_000_000),
                i as u64,
            );
            block.add(tx).unwrap();
        }
        block
    }

    #[test]
    fn render_headers_one_line_each() {
        let headers = vec![open_block_with(&[]).header(), open_block_with(&[1.0]).header()];
        let text = render_headers(&headers);
        assert_eq!(text, "0 OPEN None None None 0\n0 OPEN None None None 1\n");
    }

    #[test]
    fn render_transactions_lists_in_order() {
        let block = open_block_with(&[5.0, 7.5]);
        let text = render_transactions(std::iter::once(&block));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Block 0 [OPEN] 2 transaction(s)");
        assert!(lines[1].contains("2020-01-01 00:00:00.000000  Bob -> Alice  5  "));
        assert!(lines[2].contains("Bob -> Alice  7.5  "));
    }

    #[test]
    fn summary_from_snapshot() {
        let snapshot = ChainSnapshot {
            committed: vec![],
            current: open_block_with(&[1.0, 2.0]),
        };
        let summary = LedgerSummary::from_snapshot("NET", Digest::from_hash([2; 32]), &snapshot);
        assert_eq!(summary.blocks, 1);
        assert_eq!(summary.committed_blocks, 0);
        assert_eq!(summary.transactions, 2);
        assert_eq!(summary.total_value, 3.0);
        assert!(summary.head.is_none());
        assert!(summary.to_string().contains("Head:         None"));
    }
}
