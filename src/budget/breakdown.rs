use chrono::NaiveDate;
use tracing::{debug, info};

use super::{event::EventRecord, period::Period};
use crate::errors::{BudgetError, Result};

pub const DATE_COLUMN: &str = "date";
pub const DAILY_TOTAL_COLUMN: &str = "daily_total";
pub const CUMULATIVE_TOTAL_COLUMN: &str = "cumulative_total";

/// Dense per-day table of event amounts with daily and running totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakdown {
    dates: Vec<NaiveDate>,
    columns: Vec<String>,
    /// Row-major cells, `dates.len() * columns.len()`.
    cells: Vec<i64>,
    daily_totals: Vec<i64>,
    cumulative_totals: Vec<i64>,
}

/// Borrowed view over one day of a [`Breakdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakdownRow<'a> {
    pub date: NaiveDate,
    pub values: &'a [i64],
    pub daily_total: i64,
    pub cumulative_total: i64,
}

impl Breakdown {
    pub fn calculate(period: &Period, events: &[EventRecord]) -> Result<Self> {
        let dates = period.days();
        let width_hint = events.len();
        let mut columns: Vec<String> = Vec::with_capacity(width_hint);
        let mut column_cells: Vec<Vec<i64>> = Vec::with_capacity(width_hint);

        for event in events {
            let occurrences = period.resolve(event.frequency())?;
            let index = match columns.iter().position(|name| name == event.description()) {
                Some(existing) => {
                    debug!(description = event.description(), "merging events into one column");
                    existing
                }
                None => {
                    columns.push(event.description().to_string());
                    column_cells.push(vec![0; dates.len()]);
                    columns.len() - 1
                }
            };
            let cells = &mut column_cells[index];
            for date in occurrences {
                if !period.contains(date) {
                    debug!(
                        description = event.description(),
                        %date,
                        "skipping occurrence outside period"
                    );
                    continue;
                }
                let row = (date - period.start()).num_days() as usize;
                cells[row] = checked_add(cells[row], event.amount(), event.description())?;
            }
        }

        let mut cells = Vec::with_capacity(dates.len() * columns.len());
        let mut daily_totals = Vec::with_capacity(dates.len());
        let mut cumulative_totals = Vec::with_capacity(dates.len());
        let mut running = 0i64;
        for row in 0..dates.len() {
            let mut daily = 0i64;
            for column in &column_cells {
                cells.push(column[row]);
                daily = checked_add(daily, column[row], DAILY_TOTAL_COLUMN)?;
            }
            running = checked_add(running, daily, CUMULATIVE_TOTAL_COLUMN)?;
            daily_totals.push(daily);
            cumulative_totals.push(running);
        }

        info!(
            period = %period,
            rows = dates.len(),
            columns = columns.len(),
            final_total = running,
            "calculated breakdown"
        );
        Ok(Self {
            dates,
            columns,
            cells,
            daily_totals,
            cumulative_totals,
        })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Event columns in first-appearance order, totals excluded.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn value(&self, row: usize, column: usize) -> Option<i64> {
        if row >= self.dates.len() || column >= self.columns.len() {
            return None;
        }
        self.cells.get(row * self.columns.len() + column).copied()
    }

    pub fn column(&self, name: &str) -> Option<Vec<i64>> {
        let index = self.columns.iter().position(|column| column == name)?;
        Some(
            (0..self.dates.len())
                .filter_map(|row| self.value(row, index))
                .collect(),
        )
    }

    pub fn daily_totals(&self) -> &[i64] {
        &self.daily_totals
    }

    pub fn cumulative_totals(&self) -> &[i64] {
        &self.cumulative_totals
    }

    pub fn row(&self, row: usize) -> Option<BreakdownRow<'_>> {
        let date = *self.dates.get(row)?;
        let width = self.columns.len();
        Some(BreakdownRow {
            date,
            values: &self.cells[row * width..(row + 1) * width],
            daily_total: self.daily_totals[row],
            cumulative_total: self.cumulative_totals[row],
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = BreakdownRow<'_>> + '_ {
        (0..self.dates.len()).filter_map(move |row| self.row(row))
    }

    pub fn header(&self) -> Vec<&str> {
        std::iter::once(DATE_COLUMN)
            .chain(self.columns.iter().map(String::as_str))
            .chain([DAILY_TOTAL_COLUMN, CUMULATIVE_TOTAL_COLUMN])
            .collect()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Cumulative total on the last day.
    pub fn final_total(&self) -> i64 {
        self.cumulative_totals.last().copied().unwrap_or(0)
    }
}

fn checked_add(left: i64, right: i64, column: &str) -> Result<i64> {
    left.checked_add(right).ok_or_else(|| {
        BudgetError::validation("amount", column, "sum overflows a 64-bit integer")
    })
}
