use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Number of transactions a block holds before it is rolled over.
pub const DEFAULT_BLOCK_CAPACITY: usize = 10;

/// Configuration for a [`Ledger`](crate::Ledger).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Transactions per block. A block is committed only once it holds this
    /// many and another transaction arrives.
    pub block_capacity: usize,
    /// Store (and hash) the ledger name in upper case.
    pub uppercase_name: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            block_capacity: DEFAULT_BLOCK_CAPACITY,
            uppercase_name: true,
        }
    }
}

impl LedgerConfig {
    /// Parse a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml(source: &str) -> Result<Self, LedgerError> {
        let config: Self =
            toml::from_str(source).map_err(|e| LedgerError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.block_capacity == 0 {
            return Err(LedgerError::InvalidConfig(
                "block_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
