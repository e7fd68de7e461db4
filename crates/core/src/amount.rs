//! Non-negative integer amounts in the smallest currency unit.

use serde::{Deserialize, Serialize};

use crate::value_object::ValueObject;

/// Amount in the smallest currency unit (e.g. wei).
///
/// Unsigned by construction, so a negative price or payment cannot be expressed.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u128 {
        self.0
    }

    /// `floor(self * percent / 100)` without intermediate overflow.
    ///
    /// Splitting into whole hundreds and a remainder keeps every intermediate
    /// product within `u128` for any amount and any `percent <= 100`. Rounding is
    /// always toward zero: a fractional unit is never paid out.
    pub fn percent_floor(self, percent: u8) -> Amount {
        let pct = u128::from(percent.min(100));
        let whole = self.0 / 100 * pct;
        let rest = self.0 % 100 * pct / 100;
        Amount(whole + rest)
    }

    pub fn saturating_sub(self, other: Amount) -> Amount {
        Amount(self.0.saturating_sub(other.0))
    }

    pub fn saturating_add(self, other: Amount) -> Amount {
        Amount(self.0.saturating_add(other.0))
    }
}

impl ValueObject for Amount {}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl From<Amount> for u128 {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl core::fmt::Display for Amount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}
