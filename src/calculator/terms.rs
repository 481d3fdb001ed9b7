//! Commercial terms applied by the return calculator

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Flat profit over the 12-month term, as a fraction of principal
pub const DEFAULT_PROFIT_RATE: Decimal = dec!(0.25);

/// Currency minor units
pub const CURRENCY_DP: u32 = 2;

/// Round to cents, half away from zero
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// What to do with the cents lost to per-period rounding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemainderPolicy {
    /// Every period pays the same rounded amount; the schedule may miss the
    /// exact total by a few cents
    #[default]
    Preserve,
    /// The final period absorbs the drift so the schedule sums to the total
    FinalPeriod,
}

/// Terms shared by every plan the calculator prices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnTerms {
    /// Profit over the term as a fraction of principal
    pub profit_rate: Decimal,

    /// Rounding drift handling
    pub remainder: RemainderPolicy,
}

impl ReturnTerms {
    /// 25% flat yield, drift preserved
    pub fn standard() -> Self {
        Self {
            profit_rate: DEFAULT_PROFIT_RATE,
            remainder: RemainderPolicy::Preserve,
        }
    }

    pub fn with_remainder(mut self, remainder: RemainderPolicy) -> Self {
        self.remainder = remainder;
        self
    }
}

impl Default for ReturnTerms {
    fn default() -> Self {
        Self::standard()
    }
}
