mod common;

use budget_plot::{
    report::{to_csv_string, FormulaSheet},
    Breakdown, Budget, EventRecord, Period, ReportConfig,
};
use chrono::Datelike;
use common::{sample_breakdown, ymd};
use insta::assert_snapshot;

#[test]
fn sample_budget_totals() {
    let breakdown = sample_breakdown();
    assert_eq!(breakdown.dates().first(), Some(&ymd(2021, 12, 31)));
    assert_eq!(breakdown.daily_totals(), [200, -5, -6, -6, -6, -5]);
    assert_eq!(breakdown.cumulative_totals(), [200, 195, 189, 183, 177, 172]);
}

#[test]
fn sample_budget_csv() {
    let csv = to_csv_string(&sample_breakdown(), &ReportConfig::default()).unwrap();
    assert_snapshot!(csv.trim_end(), @r"
    date,cash,food,commute,daily_total,cumulative_total
    2021-12-31,200,0,0,200,200
    2022-01-01,0,-5,0,-5,195
    2022-01-02,0,-5,-1,-6,189
    2022-01-03,0,-5,-1,-6,183
    2022-01-04,0,-5,-1,-6,177
    2022-01-05,0,-5,0,-5,172
    ");
}

#[test]
fn row_count_matches_period_length() {
    let events = vec![
        EventRecord::new("rent", -900, "every month on the 1st").unwrap(),
        EventRecord::new("salary", "2500.5", "every month on the 25th").unwrap(),
        EventRecord::new("coffee", -3, "every weekday").unwrap(),
    ];
    for (start, end) in [
        ("2022-01-01", "2022-01-01"),
        ("2022-02-01", "2022-02-28"),
        ("2020-01-01", "2020-12-31"),
        ("2021-11-15 08:00", "2022-03-02"),
    ] {
        let period = Period::new(start, end).unwrap();
        let breakdown = Breakdown::calculate(&period, &events).unwrap();
        let expected = (period.end() - period.start()).num_days() as usize + 1;
        assert_eq!(breakdown.len(), expected, "{start}..{end}");
        let last = breakdown.cumulative_totals().last().copied().unwrap();
        assert_eq!(last, breakdown.daily_totals().iter().sum::<i64>());
        assert_eq!(breakdown, Breakdown::calculate(&period, &events).unwrap());
    }
}

#[test]
fn salary_and_rent_over_a_quarter() {
    let mut budget = Budget::new("2022-01-01", "2022-03-31").unwrap();
    budget.add_event("rent", -900, "every month on the 1st").unwrap();
    budget.add_event("salary", 2500.5, "every month on the 25th").unwrap();
    let breakdown = budget.breakdown().unwrap();
    assert_eq!(breakdown.column("salary").unwrap().iter().sum::<i64>(), 3 * 2501);
    assert_eq!(breakdown.final_total(), 3 * (2501 - 900));
    let paydays: Vec<u32> = breakdown
        .rows()
        .filter(|row| row.values[1] != 0)
        .map(|row| row.date.day())
        .collect();
    assert_eq!(paydays, vec![25, 25, 25]);
}

#[test]
fn formula_sheet_reproduces_engine_totals() {
    let breakdown = sample_breakdown();
    let sheet = FormulaSheet::from_breakdown(&breakdown, &ReportConfig::default());
    assert_eq!(
        sheet.evaluated_column("DAILY_TOTAL").unwrap(),
        breakdown.daily_totals()
    );
    assert_eq!(
        sheet.evaluated_column("CUMULATIVE_TOTAL").unwrap(),
        breakdown.cumulative_totals()
    );
}
