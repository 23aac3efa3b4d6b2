use colored::Colorize;

use crate::{budget::Breakdown, config::ReportConfig};

const ELLIPSIS: &str = "...";

/// Describes how a column should align its contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableColumn {
    pub header: String,
    pub alignment: Alignment,
}

/// Plain text table; cells may carry ANSI color codes.
pub struct Table {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Vec<String>>,
    pub padding: usize,
}

impl Table {
    /// Widest visible cell per column, header included.
    pub fn compute_widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(idx))
                    .map(|cell| visible_width(cell))
                    .fold(visible_width(&column.header), usize::max)
            })
            .collect()
    }

    pub fn render_row(&self, row: &[String], widths: &[usize]) -> String {
        let cells: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let text = row.get(idx).map(String::as_str).unwrap_or("");
                render_cell(text, widths[idx], column.alignment, self.padding)
            })
            .collect();
        cells.join(" ").trim_end().to_string()
    }

    pub fn render(&self) -> String {
        let widths = self.compute_widths();
        let headers: Vec<String> = self.columns.iter().map(|c| c.header.clone()).collect();
        let mut lines = vec![
            self.render_row(&headers, &widths),
            horizontal_rule(&widths, self.padding),
        ];
        lines.extend(self.rows.iter().map(|row| self.render_row(row, &widths)));
        lines.join("\n")
    }
}

/// Renders the breakdown as an aligned table, optionally colored and
/// truncated to `max_rows` data rows.
pub fn render_table(breakdown: &Breakdown, config: &ReportConfig) -> String {
    let columns = breakdown
        .header()
        .into_iter()
        .enumerate()
        .map(|(idx, header)| TableColumn {
            header: header.to_string(),
            alignment: if idx == 0 {
                Alignment::Left
            } else {
                Alignment::Right
            },
        })
        .collect::<Vec<_>>();

    let format_row = |index: usize| -> Option<Vec<String>> {
        let row = breakdown.row(index)?;
        let mut cells = vec![config.format_date(row.date)];
        cells.extend(
            row.values
                .iter()
                .chain([&row.daily_total, &row.cumulative_total])
                .map(|value| paint(*value, config.color)),
        );
        Some(cells)
    };

    let total = breakdown.len();
    let mut rows = Vec::new();
    match config.max_rows {
        Some(limit) if total > limit => {
            let head = (limit + 1) / 2;
            let tail = limit / 2;
            rows.extend((0..head).filter_map(format_row));
            rows.push(vec![ELLIPSIS.to_string(); columns.len()]);
            rows.extend((total - tail..total).filter_map(format_row));
        }
        _ => rows.extend((0..total).filter_map(format_row)),
    }

    Table {
        columns,
        rows,
        padding: 1,
    }
    .render()
}

fn paint(value: i64, color: bool) -> String {
    let text = value.to_string();
    if !color {
        return text;
    }
    match value {
        v if v > 0 => text.blue().to_string(),
        v if v < 0 => text.red().to_string(),
        _ => text,
    }
}

fn visible_width(text: &str) -> usize {
    let mut width = 0;
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            // skip CSI sequence through its final byte
            for next in chars.by_ref() {
                if ('\u{40}'..='\u{7e}').contains(&next) && next != '[' {
                    break;
                }
            }
            continue;
        }
        width += 1;
    }
    width
}

fn render_cell(text: &str, width: usize, alignment: Alignment, padding: usize) -> String {
    let remaining = width.saturating_sub(visible_width(text));
    let (left, right) = match alignment {
        Alignment::Left => (0, remaining),
        Alignment::Right => (remaining, 0),
    };
    format!(
        "{pad}{}{text}{}{pad}",
        " ".repeat(left),
        " ".repeat(right),
        pad = " ".repeat(padding)
    )
}

fn horizontal_rule(widths: &[usize], padding: usize) -> String {
    let total: usize =
        widths.iter().map(|w| w + padding * 2).sum::<usize>() + widths.len().saturating_sub(1);
    "-".repeat(total)
}
