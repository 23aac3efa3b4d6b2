#![doc(test(attr(deny(warnings))))]

//! Budget Plot turns recurring budget events, each with a literal date or a
//! plain-language frequency, into a per-day breakdown with daily and
//! cumulative totals, plus CSV, formula sheet, SVG and console reports.

pub mod budget;
pub mod cli;
pub mod config;
pub mod dates;
pub mod errors;
pub mod recurrence;
pub mod report;
pub mod utils;

pub use budget::{Breakdown, Budget, EventRecord, Period};
pub use config::ReportConfig;
pub use errors::{BudgetError, Result};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup debug log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::debug!(
            version = utils::build_info::BUILD_INFO.version,
            "Budget Plot tracing initialized."
        );
    });
}
