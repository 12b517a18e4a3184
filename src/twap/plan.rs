use std::time::Duration;

use bon::Builder;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::Result;
use crate::error::Error;
use crate::order::{PositionSide, Side};
use crate::twap::FailurePolicy;

/// Decimal places kept in a per-slice quantity unless the plan says otherwise.
pub const DEFAULT_QUANTITY_SCALE: u32 = 8;

const MAX_SCALE: u32 = 28;

/// A TWAP execution: `total_quantity` split into `slice_count` market orders
/// placed `interval_seconds` apart.
#[non_exhaustive]
#[derive(Builder, Clone, Debug)]
pub struct TwapPlan {
    #[builder(into)]
    pub symbol: String,
    pub side: Side,
    pub total_quantity: Decimal,
    pub slice_count: u32,
    #[builder(default)]
    pub interval_seconds: u64,
    pub position_side: Option<PositionSide>,
    /// Per-slice quantities are truncated toward zero at this many decimal places.
    #[builder(default = DEFAULT_QUANTITY_SCALE)]
    pub quantity_scale: u32,
    #[builder(default)]
    pub failure_policy: FailurePolicy,
}

impl TwapPlan {
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    /// Validates the plan and returns the quantity each slice will carry.
    ///
    /// The remainder lost to truncation (at most `slice_count` units of the
    /// last kept decimal place) is never sent.
    pub fn slice_quantity(&self) -> Result<Decimal> {
        if self.slice_count == 0 {
            return Err(Error::validation("slice_count must be at least 1"));
        }
        if self.symbol.trim().is_empty() {
            return Err(Error::validation("symbol must not be empty"));
        }
        if self.total_quantity <= Decimal::ZERO {
            return Err(Error::validation(format!(
                "total quantity must be positive, got {}",
                self.total_quantity
            )));
        }
        if self.quantity_scale > MAX_SCALE {
            return Err(Error::validation(format!(
                "quantity scale must be at most {}, got {}",
                MAX_SCALE,
                self.quantity_scale
            )));
        }
        self.failure_policy.validate()?;

        let per_slice = (self.total_quantity / Decimal::from(self.slice_count))
            .round_dp_with_strategy(self.quantity_scale, RoundingStrategy::ToZero)
            .normalize();
        if per_slice.is_zero() {
            return Err(Error::validation(format!(
                "{} split into {} slices is zero at {} decimal places",
                self.total_quantity, self.slice_count, self.quantity_scale
            )));
        }

        Ok(per_slice)
    }
}
