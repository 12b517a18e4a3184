use serde::Serialize;

use crate::Result;
use crate::error::Error;

/// What to do with the remaining slices after repeated failures.
///
/// `BestEffort` attempts every slice no matter how many fail.
/// `SkipAfterConsecutive(n)` stops placing once `n` slices in a row have
/// failed; the rest are recorded as skipped so the outcome list stays complete.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    #[default]
    BestEffort,
    SkipAfterConsecutive(u32),
}

impl FailurePolicy {
    pub(crate) fn validate(self) -> Result<()> {
        match self {
            FailurePolicy::SkipAfterConsecutive(0) => Err(Error::validation(
                "consecutive failure limit must be at least 1",
            )),
            FailurePolicy::BestEffort | FailurePolicy::SkipAfterConsecutive(_) => Ok(()),
        }
    }

    pub(crate) fn trips(self, consecutive_failures: u32) -> bool {
        match self {
            FailurePolicy::BestEffort => false,
            FailurePolicy::SkipAfterConsecutive(limit) => consecutive_failures >= limit,
        }
    }
}
