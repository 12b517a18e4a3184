//! Time-weighted average price execution.
//!
//! A [`TwapPlan`] is split into equal market orders placed one after another
//! with a fixed pause in between. A failed slice is recorded and the run moves
//! on, so the result always holds one [`SliceOutcome`] per slice.

mod executor;
mod plan;
mod policy;

pub use executor::{SliceOutcome, TwapExecutor, TwapResult};
pub use plan::{DEFAULT_QUANTITY_SCALE, TwapPlan};
pub use policy::FailurePolicy;
