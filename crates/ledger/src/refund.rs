//! Cancellation refund policy.
//!
//! The refund is a step function of whole seconds elapsed since the booking was
//! accepted. Percentages never increase as time passes, and the amount is always
//! `floor(amount_paid * percent / 100)`: a fractional unit is never refunded.

use serde::{Deserialize, Serialize};

use hotel_core::{Amount, DomainError, DomainResult};

/// Refund applies while `elapsed < below_secs` (and no earlier tier matched).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundTier {
    pub below_secs: u64,
    pub percent: u8,
}

/// Ordered refund tiers plus the percentage paid once every tier has lapsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRefundSchedule")]
pub struct RefundSchedule {
    tiers: Vec<RefundTier>,
    after_percent: u8,
}

#[derive(Deserialize)]
struct RawRefundSchedule {
    tiers: Vec<RefundTier>,
    #[serde(default)]
    after_percent: u8,
}

impl TryFrom<RawRefundSchedule> for RefundSchedule {
    type Error = DomainError;

    fn try_from(raw: RawRefundSchedule) -> Result<Self, Self::Error> {
        Self::new(raw.tiers, raw.after_percent)
    }
}

impl RefundSchedule {
    /// 100% under a minute, then 10 points less per started minute down to 60%,
    /// nothing from five minutes on.
    pub fn standard() -> Self {
        let tier = |below_secs, percent| RefundTier { below_secs, percent };
        Self {
            tiers: vec![
                tier(60, 100),
                tier(120, 90),
                tier(180, 80),
                tier(240, 70),
                tier(300, 60),
            ],
            after_percent: 0,
        }
    }

    /// Build a custom schedule.
    ///
    /// Thresholds must strictly increase, percentages must stay within 0..=100
    /// and never increase, and `after_percent` may not exceed the last tier.
    pub fn new(tiers: Vec<RefundTier>, after_percent: u8) -> DomainResult<Self> {
        if after_percent > 100 {
            return Err(DomainError::validation("after_percent must be <= 100"));
        }

        let mut prev: Option<RefundTier> = None;
        for tier in &tiers {
            if tier.percent > 100 {
                return Err(DomainError::validation(format!(
                    "refund tier below {}s has percent {} > 100",
                    tier.below_secs, tier.percent
                )));
            }
            if let Some(p) = prev {
                if tier.below_secs <= p.below_secs {
                    return Err(DomainError::validation(
                        "refund tier thresholds must strictly increase",
                    ));
                }
                if tier.percent > p.percent {
                    return Err(DomainError::validation(
                        "refund percentages must not increase over time",
                    ));
                }
            }
            prev = Some(*tier);
        }

        if let Some(last) = prev {
            if after_percent > last.percent {
                return Err(DomainError::validation(
                    "after_percent must not exceed the last tier",
                ));
            }
        }

        Ok(Self {
            tiers,
            after_percent,
        })
    }

    pub fn tiers(&self) -> &[RefundTier] {
        &self.tiers
    }

    pub fn after_percent(&self) -> u8 {
        self.after_percent
    }

    /// Refund percentage for a cancellation `elapsed_secs` after booking.
    pub fn percentage(&self, elapsed_secs: u64) -> u8 {
        self.tiers
            .iter()
            .find(|t| elapsed_secs < t.below_secs)
            .map_or(self.after_percent, |t| t.percent)
    }

    /// Percentage and refunded amount for `amount_paid`.
    pub fn refund(&self, amount_paid: Amount, elapsed_secs: u64) -> (u8, Amount) {
        let percent = self.percentage(elapsed_secs);
        (percent, amount_paid.percent_floor(percent))
    }
}

impl Default for RefundSchedule {
    fn default() -> Self {
        Self::standard()
    }
}
