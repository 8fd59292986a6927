//! Hashing primitives for chainbook.
//!
//! Provides domain-separated BLAKE3 hashing with field framing, and hash
//! chain verification over anything that links to a predecessor by digest.
//!
//! The merkle root used by blocks is a flat digest over concatenated leaf
//! hashes, not a binary tree; it offers no inclusion proofs.

pub mod chain;
pub mod hasher;

pub use chain::{ChainError, HashChainVerifier, HashLinked};
pub use hasher::{ContentHasher, DigestBuilder};
