mod common;

use budget_plot::{
    recurrence::{parse_sentence, RecurrenceRule, TimeUnit},
    BudgetError, Period,
};
use chrono::Weekday;
use common::ymd;

fn resolve(start: &str, end: &str, frequency: &str) -> Vec<chrono::NaiveDate> {
    Period::new(start, end)
        .unwrap()
        .resolve(frequency)
        .unwrap_or_else(|err| panic!("`{frequency}` did not resolve: {err}"))
}

#[test]
fn weekday_list_without_anchor_starts_at_period() {
    // 2022-01-01 is a Saturday
    assert_eq!(
        resolve("2022-01-01", "2022-01-16", "every monday and friday"),
        vec![ymd(2022, 1, 3), ymd(2022, 1, 7), ymd(2022, 1, 10), ymd(2022, 1, 14)]
    );
}

#[test]
fn biweekly_weekday_counts_weeks_from_start() {
    assert_eq!(
        resolve(
            "2022-01-01",
            "2022-02-05",
            "every 2 weeks on friday starting 2022-01-05"
        ),
        vec![ymd(2022, 1, 7), ymd(2022, 1, 21), ymd(2022, 2, 4)]
    );
}

#[test]
fn monthly_day_skips_short_months() {
    assert_eq!(
        resolve("2022-01-01", "2022-06-30", "every month on the 31st"),
        vec![ymd(2022, 1, 31), ymd(2022, 3, 31), ymd(2022, 5, 31)]
    );
}

#[test]
fn count_limits_occurrences() {
    assert_eq!(
        resolve("2022-01-01", "2022-12-31", "monthly starting 2022-01-15 for 3 times"),
        vec![ymd(2022, 1, 15), ymd(2022, 2, 15), ymd(2022, 3, 15)]
    );
}

#[test]
fn written_dates_and_other_interval() {
    assert_eq!(
        resolve(
            "2022-01-01",
            "2022-01-31",
            "every other day starting Jan 2, 2022 until Jan 8, 2022"
        ),
        vec![ymd(2022, 1, 2), ymd(2022, 1, 4), ymd(2022, 1, 6), ymd(2022, 1, 8)]
    );
}

#[test]
fn leap_day_only_in_leap_years() {
    assert_eq!(
        resolve("2020-01-01", "2028-12-31", "yearly starting 2020-02-29"),
        vec![ymd(2020, 2, 29), ymd(2024, 2, 29), ymd(2028, 2, 29)]
    );
}

#[test]
fn weekends_and_shorthand_leads() {
    assert_eq!(
        resolve("2022-01-03", "2022-01-16", "every weekend"),
        vec![ymd(2022, 1, 8), ymd(2022, 1, 9), ymd(2022, 1, 15), ymd(2022, 1, 16)]
    );
    assert_eq!(resolve("2022-01-03", "2022-01-05", "Daily").len(), 3);
}

#[test]
fn sentence_builds_structured_rule() {
    let parsed = parse_sentence("every 2 weeks on tuesday and thursday until 2022-03-01").unwrap();
    let expected = RecurrenceRule {
        until: Some(ymd(2022, 3, 1)),
        ..RecurrenceRule::new(2, TimeUnit::Week).with_weekdays([Weekday::Tue, Weekday::Thu])
    };
    assert_eq!(parsed.rule, expected);
    assert!(parsed.advisories.is_empty());
}

#[test]
fn unsupported_sentences_fail_with_expression() {
    let period = Period::new("2022-01-01", "2022-01-31").unwrap();
    for frequency in ["every fortnight", "every month on monday", "sometimes", "2022-13-45"] {
        match period.resolve(frequency) {
            Err(BudgetError::RecurrenceResolution { expression }) => {
                assert_eq!(expression, frequency)
            }
            other => panic!("`{frequency}` gave {other:?}"),
        }
    }
}

#[test]
fn oversized_intervals_resolve_without_panicking() {
    let period = Period::new("2022-01-01", "2022-12-31").unwrap();
    for frequency in [
        "every 100000000 days starting 2022-01-01",
        "every 20000000 weeks starting 2022-01-01",
        "every 2147483647 months",
        "every 3000000000 months",
        "every 3000000000 years",
        "every 4294967295 days",
    ] {
        match period.resolve(frequency) {
            Ok(dates) => assert!(dates.len() <= 1, "{frequency}: {dates:?}"),
            Err(BudgetError::RecurrenceResolution { expression }) => {
                assert_eq!(expression, frequency)
            }
            Err(other) => panic!("{frequency}: unexpected error {other}"),
        }
    }
}
