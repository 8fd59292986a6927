use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Wall-clock instant with microsecond resolution.
///
/// Stored as microseconds since the UNIX epoch. Transactions are stamped with
/// one at construction; blocks are stamped with one at commit.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Create a timestamp from microseconds since the UNIX epoch.
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    /// Read the system wall clock.
    pub fn now() -> Self {
        let micros = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_micros() as u64;
        Self(micros)
    }

    /// Microseconds since the UNIX epoch.
    pub const fn as_micros(&self) -> u64 {
        self.0
    }

    /// Little-endian encoding used as hash input.
    pub fn to_le_bytes(&self) -> [u8; 8] {
        self.0.to_le_bytes()
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({}us)", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = (self.0 / 1_000_000) as i64;
        let nanos = ((self.0 % 1_000_000) * 1_000) as u32;
        match chrono::DateTime::from_timestamp(secs, nanos) {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.6f")),
            None => write!(f, "{}us", self.0),
        }
    }
}

/// Source of the current time.
///
/// The ledger reads the clock when it stamps transactions, when it commits a
/// block, and once when it derives its chain id.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// The system wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Deterministic clock for tests and reproducible runs.
///
/// Returns `start` on the first read and advances by `step_micros` on every
/// subsequent read, so successive readings are strictly increasing when the
/// step is non-zero.
#[derive(Debug)]
pub struct ManualClock {
    next: AtomicU64,
    step_micros: u64,
}

impl ManualClock {
    pub fn new(start: Timestamp, step_micros: u64) -> Self {
        Self {
            next: AtomicU64::new(start.as_micros()),
            step_micros,
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.next.fetch_add(self.step_micros, Ordering::SeqCst))
    }
}
