use std::fmt;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::{
    dates::{date_range, format_date_stamp, parse_date_stamp, DateStamp},
    errors::{BudgetError, Result},
    recurrence::parse_sentence,
};

/// One way of turning a frequency expression into dates; `None` means the
/// expression is not in this attempt's grammar.
type ResolveAttempt = fn(&Period, &str) -> Option<Vec<NaiveDate>>;

const RESOLVE_ATTEMPTS: &[(&str, ResolveAttempt)] = &[
    ("literal date", resolve_literal_date),
    ("recurrence sentence", resolve_sentence),
];

/// Closed interval of calendar dates `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    start: NaiveDate,
    end: NaiveDate,
}

impl Period {
    pub fn new(start: impl DateStamp, end: impl DateStamp) -> Result<Self> {
        let start = start.to_date_stamp()?;
        let end = end.to_date_stamp()?;
        if start > end {
            warn!(%start, %end, "rejected reversed period");
            return Err(BudgetError::validation(
                "period",
                format!("{} - {}", format_date_stamp(start), format_date_stamp(end)),
                "start must not be after end",
            ));
        }
        let period = Self { start, end };
        debug!(period = %period, "created period");
        Ok(period)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of calendar days in the period, both ends included.
    pub fn len_days(&self) -> usize {
        ((self.end - self.start).num_days() + 1) as usize
    }

    pub fn days(&self) -> Vec<NaiveDate> {
        date_range(self.start, self.end)
    }

    /// Resolves a frequency expression to its occurrence dates.
    ///
    /// A literal date resolves to itself even when it lies outside the
    /// period; recurrence sentences only yield dates inside it.
    pub fn resolve(&self, frequency: &str) -> Result<Vec<NaiveDate>> {
        for (name, attempt) in RESOLVE_ATTEMPTS {
            if let Some(dates) = attempt(self, frequency) {
                debug!(frequency, attempt = name, count = dates.len(), "resolved frequency");
                return Ok(dates);
            }
        }
        warn!(frequency, "frequency could not be resolved");
        Err(BudgetError::RecurrenceResolution {
            expression: frequency.to_string(),
        })
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "['{}' - '{}']",
            format_date_stamp(self.start),
            format_date_stamp(self.end)
        )
    }
}

fn resolve_literal_date(_period: &Period, frequency: &str) -> Option<Vec<NaiveDate>> {
    parse_date_stamp(frequency).map(|date| vec![date])
}

fn resolve_sentence(period: &Period, frequency: &str) -> Option<Vec<NaiveDate>> {
    let parsed = match parse_sentence(frequency) {
        Ok(parsed) => parsed,
        Err(err) => {
            debug!(frequency, error = %err, "not a recurrence sentence");
            return None;
        }
    };
    for note in &parsed.advisories {
        debug!(frequency, note = note.as_str(), "recurrence advisory");
    }
    if let Some(start) = parsed.rule.start.filter(|start| *start > period.end) {
        debug!(frequency, %start, period = %period, "recurrence starts after the period");
    }
    debug!(frequency, rule = %parsed.rule.to_rrule(), "parsed recurrence rule");
    Some(parsed.rule.occurrences_between(period.start, period.end))
}
