use std::fmt::Write;

use chrono::NaiveDate;
use tracing::debug;

use crate::{budget::Breakdown, config::ReportConfig};

pub const DAILY_LABEL: &str = "Daily Total";
pub const CUMULATIVE_LABEL: &str = "Cumulative Total";

const DAILY_COLOR: &str = "#1f77b4";
const CUMULATIVE_COLOR: &str = "#ff7f0e";
const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 40.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 70.0;

/// One plotted day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub daily_total: i64,
    pub cumulative_total: i64,
}

pub fn series(breakdown: &Breakdown) -> Vec<ChartPoint> {
    breakdown
        .rows()
        .map(|row| ChartPoint {
            date: row.date,
            daily_total: row.daily_total,
            cumulative_total: row.cumulative_total,
        })
        .collect()
}

struct Frame {
    width: f64,
    height: f64,
    min: f64,
    max: f64,
    count: usize,
}

impl Frame {
    fn new(config: &ReportConfig, points: &[ChartPoint]) -> Self {
        let values = points
            .iter()
            .flat_map(|p| [p.daily_total, p.cumulative_total]);
        let (mut min, mut max) = values.fold((0i64, 0i64), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if min == max {
            min -= 1;
            max += 1;
        }
        Self {
            width: f64::from(config.plot_width),
            height: f64::from(config.plot_height),
            min: min as f64,
            max: max as f64,
            count: points.len(),
        }
    }

    fn x(&self, index: usize) -> f64 {
        let span = self.width - MARGIN_LEFT - MARGIN_RIGHT;
        if self.count <= 1 {
            return MARGIN_LEFT + span / 2.0;
        }
        MARGIN_LEFT + span * index as f64 / (self.count - 1) as f64
    }

    fn y(&self, value: i64) -> f64 {
        let span = self.height - MARGIN_TOP - MARGIN_BOTTOM;
        MARGIN_TOP + span * (self.max - value as f64) / (self.max - self.min)
    }

    fn bottom(&self) -> f64 {
        self.height - MARGIN_BOTTOM
    }

    fn right(&self) -> f64 {
        self.width - MARGIN_RIGHT
    }
}

/// Line plot of daily and cumulative totals against the date axis.
pub fn render_svg(breakdown: &Breakdown, config: &ReportConfig) -> String {
    let points = series(breakdown);
    let frame = Frame::new(config, &points);
    let mut svg = String::new();

    // writing to a String cannot fail
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif" font-size="14">"#,
        w = config.plot_width,
        h = config.plot_height
    );
    let _ = writeln!(svg, r#"  <rect width="100%" height="100%" fill="white"/>"#);
    let _ = writeln!(
        svg,
        r#"  <rect x="{x}" y="{y}" width="{w:.1}" height="{h:.1}" fill="none" stroke="black"/>"#,
        x = MARGIN_LEFT,
        y = MARGIN_TOP,
        w = frame.right() - MARGIN_LEFT,
        h = frame.bottom() - MARGIN_TOP
    );

    let zero = frame.y(0);
    let _ = writeln!(
        svg,
        r##"  <line class="zero" x1="{x1}" y1="{y:.1}" x2="{x2:.1}" y2="{y:.1}" stroke="#888" stroke-dasharray="4 4"/>"##,
        x1 = MARGIN_LEFT,
        x2 = frame.right(),
        y = zero
    );

    for (label, value) in [("max", frame.max), ("min", frame.min)] {
        let _ = writeln!(
            svg,
            r#"  <text class="y-{label}" x="{x}" y="{y:.1}" text-anchor="end">{value}</text>"#,
            x = MARGIN_LEFT - 8.0,
            y = frame.y(value as i64) + 5.0,
        );
    }

    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        let label_y = frame.bottom() + 24.0;
        let _ = writeln!(
            svg,
            r#"  <text class="x-first" x="{x:.1}" y="{label_y:.1}" text-anchor="start">{date}</text>"#,
            x = frame.x(0),
            date = config.format_date(first.date)
        );
        let _ = writeln!(
            svg,
            r#"  <text class="x-last" x="{x:.1}" y="{label_y:.1}" text-anchor="end">{date}</text>"#,
            x = frame.x(points.len() - 1),
            date = config.format_date(last.date)
        );
    }

    for (label, color, pick) in [
        (DAILY_LABEL, DAILY_COLOR, daily as fn(&ChartPoint) -> i64),
        (CUMULATIVE_LABEL, CUMULATIVE_COLOR, cumulative),
    ] {
        let coords: Vec<String> = points
            .iter()
            .enumerate()
            .map(|(index, point)| format!("{:.1},{:.1}", frame.x(index), frame.y(pick(point))))
            .collect();
        let _ = writeln!(
            svg,
            r#"  <polyline data-label="{label}" fill="none" stroke="{color}" stroke-width="2" points="{points}"/>"#,
            points = coords.join(" ")
        );
    }

    let legend_x = MARGIN_LEFT + 16.0;
    for (offset, (label, color)) in [(DAILY_LABEL, DAILY_COLOR), (CUMULATIVE_LABEL, CUMULATIVE_COLOR)]
        .into_iter()
        .enumerate()
    {
        let y = MARGIN_TOP + 20.0 + 22.0 * offset as f64;
        let _ = writeln!(
            svg,
            r#"  <line x1="{legend_x}" y1="{y}" x2="{x2}" y2="{y}" stroke="{color}" stroke-width="3"/>"#,
            x2 = legend_x + 28.0
        );
        let _ = writeln!(
            svg,
            r#"  <text x="{x}" y="{ty}">{label}</text>"#,
            x = legend_x + 36.0,
            ty = y + 5.0
        );
    }

    svg.push_str("</svg>\n");
    debug!(points = points.len(), "rendered svg plot");
    svg
}

fn daily(point: &ChartPoint) -> i64 {
    point.daily_total
}

fn cumulative(point: &ChartPoint) -> i64 {
    point.cumulative_total
}
