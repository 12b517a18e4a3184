use rust_decimal::Decimal;
use serde::Serialize;

use crate::Result;
use crate::error::Kind;
use crate::order::{ExchangeClient, OrderRequest};
use crate::transport::{ExchangeResponse, Transport};
use crate::twap::TwapPlan;

/// Result of one slice. `slice` is 1-based.
#[non_exhaustive]
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SliceOutcome {
    Placed {
        slice: u32,
        quantity: Decimal,
        response: ExchangeResponse,
    },
    Failed {
        slice: u32,
        quantity: Decimal,
        kind: Kind,
        error: String,
    },
    Skipped {
        slice: u32,
        quantity: Decimal,
        reason: String,
    },
}

impl SliceOutcome {
    #[must_use]
    pub fn slice(&self) -> u32 {
        match self {
            SliceOutcome::Placed { slice, .. }
            | SliceOutcome::Failed { slice, .. }
            | SliceOutcome::Skipped { slice, .. } => *slice,
        }
    }

    #[must_use]
    pub fn is_placed(&self) -> bool {
        matches!(self, SliceOutcome::Placed { .. })
    }

    #[must_use]
    pub fn response(&self) -> Option<&ExchangeResponse> {
        match self {
            SliceOutcome::Placed { response, .. } => Some(response),
            SliceOutcome::Failed { .. } | SliceOutcome::Skipped { .. } => None,
        }
    }
}

/// Ordered outcomes of a TWAP run, one per slice of the plan.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct TwapResult {
    outcomes: Vec<SliceOutcome>,
}

impl TwapResult {
    #[must_use]
    pub fn outcomes(&self) -> &[SliceOutcome] {
        &self.outcomes
    }

    #[must_use]
    pub fn into_outcomes(self) -> Vec<SliceOutcome> {
        self.outcomes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    #[must_use]
    pub fn placed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_placed()).count()
    }

    /// Quantity sent in slices the exchange accepted.
    #[must_use]
    pub fn placed_quantity(&self) -> Decimal {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                SliceOutcome::Placed { quantity, .. } => Some(*quantity),
                SliceOutcome::Failed { .. } | SliceOutcome::Skipped { .. } => None,
            })
            .sum()
    }
}

/// Places a [`TwapPlan`] slice by slice through an [`ExchangeClient`].
#[derive(Debug)]
pub struct TwapExecutor<'client, T> {
    client: &'client ExchangeClient<T>,
}

impl<'client, T: Transport> TwapExecutor<'client, T> {
    #[must_use]
    pub fn new(client: &'client ExchangeClient<T>) -> Self {
        Self { client }
    }

    /// Runs every slice in order, sleeping `plan.interval()` between them.
    ///
    /// Only an invalid plan is an error. Slice failures are recorded in the
    /// result and never retried. Dropping the future between slices stops
    /// the run at that boundary.
    pub async fn run(&self, plan: &TwapPlan) -> Result<TwapResult> {
        let quantity = plan.slice_quantity().inspect_err(|_err| {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_err, symbol = %plan.symbol, "invalid TWAP plan");
        })?;
        let interval = plan.interval();
        let total = plan.slice_count;

        #[cfg(feature = "tracing")]
        tracing::info!(
            symbol = %plan.symbol,
            side = %plan.side,
            total_quantity = %plan.total_quantity,
            slices = total,
            slice_quantity = %quantity,
            interval_seconds = plan.interval_seconds,
            "starting TWAP"
        );

        let mut outcomes = Vec::with_capacity(total as usize);
        let mut consecutive_failures = 0_u32;

        for slice in 1..=total {
            if plan.failure_policy.trips(consecutive_failures) {
                #[cfg(feature = "tracing")]
                tracing::warn!(slice, of = total, consecutive_failures, "skipping TWAP slice");

                outcomes.push(SliceOutcome::Skipped {
                    slice,
                    quantity,
                    reason: format!("skipped after {consecutive_failures} consecutive failures"),
                });
                continue;
            }

            let mut order = OrderRequest::market(plan.symbol.clone(), plan.side, quantity);
            order.position_side = plan.position_side;

            #[cfg(feature = "tracing")]
            tracing::info!(slice, of = total, quantity = %quantity, "placing TWAP slice");

            match self.client.place_order(&order).await {
                Ok(response) => {
                    consecutive_failures = 0;
                    outcomes.push(SliceOutcome::Placed {
                        slice,
                        quantity,
                        response,
                    });
                }
                Err(err) => {
                    consecutive_failures += 1;

                    #[cfg(feature = "tracing")]
                    tracing::warn!(slice, of = total, error = %err, "TWAP slice failed");

                    outcomes.push(SliceOutcome::Failed {
                        slice,
                        quantity,
                        kind: err.kind(),
                        error: err.message(),
                    });
                }
            }

            let tripped = plan.failure_policy.trips(consecutive_failures);
            if slice < total && !interval.is_zero() && !tripped {
                tokio::time::sleep(interval).await;
            }
        }

        let result = TwapResult { outcomes };

        #[cfg(feature = "tracing")]
        tracing::info!(
            placed = result.placed_count(),
            slices = total,
            placed_quantity = %result.placed_quantity(),
            "TWAP finished"
        );

        Ok(result)
    }
}
