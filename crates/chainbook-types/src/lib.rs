//! Foundation types for chainbook.
//!
//! Every other chainbook crate depends on `chainbook-types`. The crate holds
//! the value types that flow through the ledger and the two capabilities the
//! ledger consumes from its environment: a clock and a source of randomness.
//!
//! # Key Types
//!
//! - [`Digest`]: 32-byte BLAKE3 digest, rendered as lowercase hex
//! - [`Timestamp`]: microsecond-resolution instant since the UNIX epoch
//! - [`Amount`]: validated, finite, non-negative transfer value
//! - [`Clock`] / [`RandomSource`]: injectable time and entropy

pub mod amount;
pub mod digest;
pub mod entropy;
pub mod error;
pub mod temporal;

pub use amount::Amount;
pub use digest::Digest;
pub use entropy::{RandomSource, SeededRandom, SystemRandom};
pub use error::TypeError;
pub use temporal::{Clock, ManualClock, SystemClock, Timestamp};
