//! In-memory hash-chained ledger.
//!
//! This crate batches value transfers into fixed-capacity blocks, seals each
//! full block with a flat merkle root and a block hash linked to its
//! predecessor, and answers read/aggregate queries over the chain. It provides:
//! - [`Transaction`]: immutable transfer record carrying its own hash
//! - [`Block`]: capacity-bounded batch, `Open` until committed exactly once
//! - [`Ledger`]: owner of the chain and the single admission entry point
//! - `LedgerWriter` / `LedgerReader` trait boundaries
//! - Chain validation (linkage, density, fill level, digest recomputation)
//! - Text and aggregate projections for callers that render the chain
//!
//! The ledger is single-process and memory-resident. The "merkle root" is a
//! digest over concatenated transaction hashes, not a binary tree.

pub mod block;
pub mod config;
pub mod error;
pub mod ledger;
pub mod projection;
pub mod traits;
pub mod transaction;
pub mod validation;

pub use block::{Block, BlockHeader, BlockStatus, CommitSeal};
pub use config::LedgerConfig;
pub use error::LedgerError;
pub use ledger::Ledger;
pub use projection::LedgerSummary;
pub use traits::{ChainSnapshot, LedgerReader, LedgerWriter};
pub use transaction::Transaction;
pub use validation::{ChainValidator, ValidationReport, Violation, ViolationKind};
