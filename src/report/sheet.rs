//! Spreadsheet-style rendering of a breakdown.
//!
//! Totals are written as formulas over the event cells so a spreadsheet
//! application recomputes them when values are edited. [`FormulaSheet::evaluate`]
//! runs the same formulas locally.

use std::io;

use chrono::NaiveDate;
use tracing::debug;

use crate::{
    budget::Breakdown,
    config::ReportConfig,
    errors::{BudgetError, Result},
};

pub const DATE_HEADER: &str = "DATE";
pub const DAILY_TOTAL_HEADER: &str = "DAILY_TOTAL";
pub const CUMULATIVE_TOTAL_HEADER: &str = "CUMULATIVE_TOTAL";
pub const TOTALS_LABEL: &str = "TOTALS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Text(String),
    Date(NaiveDate),
    Number(i64),
    /// Formula text including the leading `=`.
    Formula(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaSheet {
    name: String,
    date_format: String,
    rows: Vec<Vec<Cell>>,
}

impl FormulaSheet {
    pub fn from_breakdown(breakdown: &Breakdown, config: &ReportConfig) -> Self {
        let events = breakdown.columns().len();
        let daily_col = events + 1;
        let cumulative_col = events + 2;
        let first_data_row = 2;
        let last_data_row = breakdown.len() + 1;

        let mut rows = Vec::with_capacity(breakdown.len() + 2);
        let mut header = vec![Cell::Text(DATE_HEADER.into())];
        header.extend(breakdown.columns().iter().cloned().map(Cell::Text));
        header.push(Cell::Text(DAILY_TOTAL_HEADER.into()));
        header.push(Cell::Text(CUMULATIVE_TOTAL_HEADER.into()));
        rows.push(header);

        for (offset, row) in breakdown.rows().enumerate() {
            let number = first_data_row + offset;
            let mut cells = vec![Cell::Date(row.date)];
            cells.extend(row.values.iter().copied().map(Cell::Number));
            let daily = if events == 0 {
                "=0".to_string()
            } else {
                format!(
                    "=SUM({}:{})",
                    cell_ref(1, number),
                    cell_ref(events, number)
                )
            };
            cells.push(Cell::Formula(daily));
            let cumulative = if number == first_data_row {
                format!("={}", cell_ref(daily_col, number))
            } else {
                format!(
                    "={}+{}",
                    cell_ref(daily_col, number),
                    cell_ref(cumulative_col, number - 1)
                )
            };
            cells.push(Cell::Formula(cumulative));
            rows.push(cells);
        }

        let mut totals = vec![Cell::Text(TOTALS_LABEL.into())];
        totals.extend((1..=events).map(|col| {
            Cell::Formula(format!(
                "=SUM({}:{})",
                cell_ref(col, first_data_row),
                cell_ref(col, last_data_row)
            ))
        }));
        totals.push(Cell::Empty);
        totals.push(Cell::Empty);
        rows.push(totals);

        Self {
            name: config.sheet_name.clone(),
            date_format: config.date_format.clone(),
            rows,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Looks up a cell by its A1 address.
    pub fn cell(&self, address: &str) -> Option<&Cell> {
        let (col, row) = parse_cell_ref(address)?;
        self.rows.get(row)?.get(col)
    }

    /// Computes every numeric and formula cell; non-numeric cells are `None`.
    pub fn evaluate(&self) -> Result<Vec<Vec<Option<i64>>>> {
        let mut values: Vec<Vec<Option<i64>>> = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let mut evaluated = Vec::with_capacity(row.len());
            for cell in row {
                let value = match cell {
                    Cell::Number(number) => Some(*number),
                    Cell::Formula(formula) => {
                        Some(evaluate_formula(formula, &values, &evaluated)?)
                    }
                    Cell::Empty | Cell::Text(_) | Cell::Date(_) => None,
                };
                evaluated.push(value);
            }
            values.push(evaluated);
        }
        Ok(values)
    }

    /// Evaluated data-row values of the column titled `header`.
    pub fn evaluated_column(&self, header: &str) -> Result<Vec<i64>> {
        let col = self
            .rows
            .first()
            .and_then(|titles| {
                titles
                    .iter()
                    .position(|cell| matches!(cell, Cell::Text(text) if text == header))
            })
            .ok_or_else(|| BudgetError::validation("column", header, "not in sheet"))?;
        let values = self.evaluate()?;
        let data_rows = self.rows.len().saturating_sub(2);
        values
            .iter()
            .skip(1)
            .take(data_rows)
            .map(|row| {
                row.get(col).copied().flatten().ok_or_else(|| {
                    BudgetError::validation("column", header, "holds a non-numeric cell")
                })
            })
            .collect()
    }

    /// Writes cells as delimited text, formulas verbatim.
    pub fn write_csv<W: io::Write>(&self, config: &ReportConfig, writer: W) -> Result<()> {
        config.validate()?;
        let mut out = csv::WriterBuilder::new()
            .delimiter(config.delimiter_byte())
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(writer);
        let date_config = ReportConfig {
            date_format: self.date_format.clone(),
            ..config.clone()
        };
        for row in &self.rows {
            out.write_record(row.iter().map(|cell| match cell {
                Cell::Empty => String::new(),
                Cell::Text(text) => text.clone(),
                Cell::Date(date) => date_config.format_date(*date),
                Cell::Number(number) => number.to_string(),
                Cell::Formula(formula) => formula.clone(),
            }))?;
        }
        out.flush()?;
        debug!(sheet = self.name.as_str(), rows = self.rows.len(), "wrote formula sheet");
        Ok(())
    }
}

/// Zero-based column and one-based row to an A1 address.
pub fn cell_ref(col: usize, row: usize) -> String {
    format!("{}{}", column_letters(col), row)
}

/// Bijective base-26 column name: 0 is `A`, 25 is `Z`, 26 is `AA`.
pub fn column_letters(col: usize) -> String {
    let mut letters = Vec::new();
    let mut remaining = col + 1;
    while remaining > 0 {
        let digit = (remaining - 1) % 26;
        letters.push(b'A' + digit as u8);
        remaining = (remaining - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// A1 address to zero-based `(col, row)`.
fn parse_cell_ref(address: &str) -> Option<(usize, usize)> {
    let split = address.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = address.split_at(split);
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_uppercase()) {
        return None;
    }
    let col = letters
        .bytes()
        .try_fold(0usize, |acc, b| Some(acc * 26 + (b - b'A') as usize + 1))?;
    let row: usize = digits.parse().ok()?;
    if row == 0 {
        return None;
    }
    Some((col - 1, row - 1))
}

fn evaluate_formula(
    formula: &str,
    done: &[Vec<Option<i64>>],
    current: &[Option<i64>],
) -> Result<i64> {
    let invalid = |reason: &str| BudgetError::validation("formula", formula, reason);
    let body = formula
        .strip_prefix('=')
        .ok_or_else(|| invalid("missing `=`"))?;

    let lookup = |address: &str| -> Result<i64> {
        let (col, row) = parse_cell_ref(address).ok_or_else(|| invalid("bad cell reference"))?;
        let value = if row == done.len() {
            current.get(col).copied().flatten()
        } else {
            done.get(row).and_then(|cells| cells.get(col)).copied().flatten()
        };
        value.ok_or_else(|| invalid("references a non-numeric cell"))
    };

    if let Some(range) = body.strip_prefix("SUM(").and_then(|r| r.strip_suffix(')')) {
        let (from, to) = range
            .split_once(':')
            .ok_or_else(|| invalid("SUM expects a range"))?;
        let (from_col, from_row) = parse_cell_ref(from).ok_or_else(|| invalid("bad range"))?;
        let (to_col, to_row) = parse_cell_ref(to).ok_or_else(|| invalid("bad range"))?;
        let mut total = 0i64;
        for row in from_row..=to_row {
            for col in from_col..=to_col {
                let value = lookup(&cell_ref(col, row + 1))?;
                total = total
                    .checked_add(value)
                    .ok_or_else(|| invalid("sum overflows a 64-bit integer"))?;
            }
        }
        return Ok(total);
    }

    body.split('+').try_fold(0i64, |total, term| {
        let term = term.trim();
        let value = match term.parse::<i64>() {
            Ok(number) => number,
            Err(_) => lookup(term)?,
        };
        total
            .checked_add(value)
            .ok_or_else(|| invalid("sum overflows a 64-bit integer"))
    })
}
