use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Value moved by one transfer.
///
/// Always finite and non-negative. Negative zero is normalised to zero so that
/// equal amounts always hash identically.
#[derive(Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Amount(f64);

impl Amount {
    pub const ZERO: Self = Self(0.0);

    /// Validate and wrap a raw value.
    pub fn new(value: f64) -> Result<Self, TypeError> {
        if !value.is_finite() {
            return Err(TypeError::InvalidAmount(format!(
                "value must be finite, got {value}"
            )));
        }
        if value < 0.0 {
            return Err(TypeError::InvalidAmount(format!(
                "value must be non-negative, got {value}"
            )));
        }
        // -0.0 + 0.0 == +0.0
        Ok(Self(value + 0.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Little-endian IEEE-754 bit pattern used as hash input.
    pub fn to_le_bytes(&self) -> [u8; 8] {
        self.0.to_bits().to_le_bytes()
    }
}

impl TryFrom<f64> for Amount {
    type Error = TypeError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for f64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({})", self.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
