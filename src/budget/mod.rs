//! Budget domain: event records, the period that resolves their frequencies,
//! and the daily breakdown derived from both.

#[allow(clippy::module_inception)]
pub mod budget;
pub mod breakdown;
pub mod event;
pub mod period;

pub use budget::{Budget, SAMPLE_BUDGET_YAML};
pub use breakdown::{Breakdown, BreakdownRow};
pub use event::{normalize_text, parse_amount, AmountInput, EventRecord};
pub use period::Period;
