use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    fn rrule_name(self) -> &'static str {
        match self {
            TimeUnit::Day => "DAILY",
            TimeUnit::Week => "WEEKLY",
            TimeUnit::Month => "MONTHLY",
            TimeUnit::Year => "YEARLY",
        }
    }
}

/// Structured recurrence, enumerated with RFC 5545 `RRULE` semantics.
///
/// Without an explicit `start` the rule is anchored on the first day of the
/// window it is enumerated over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub every: u32,
    pub unit: TimeUnit,
    pub weekdays: Vec<Weekday>,
    pub month_day: Option<u32>,
    pub start: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
    pub count: Option<u32>,
}

impl RecurrenceRule {
    pub fn new(every: u32, unit: TimeUnit) -> Self {
        Self {
            every: every.max(1),
            unit,
            weekdays: Vec::new(),
            month_day: None,
            start: None,
            until: None,
            count: None,
        }
    }

    pub fn with_weekdays(mut self, weekdays: impl IntoIterator<Item = Weekday>) -> Self {
        self.add_weekdays(weekdays);
        self
    }

    /// Merges weekdays into the rule, keeping them Monday-first and unique.
    pub fn add_weekdays(&mut self, weekdays: impl IntoIterator<Item = Weekday>) {
        self.weekdays.extend(weekdays);
        self.weekdays.sort_by_key(|day| day.num_days_from_monday());
        self.weekdays.dedup();
    }

    /// Every occurrence inside `[window_start, window_end]`, ascending.
    pub fn occurrences_between(
        &self,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Vec<NaiveDate> {
        let dtstart = self.start.unwrap_or(window_start);
        let limit = match self.until {
            Some(until) => until.min(window_end),
            None => window_end,
        };
        if limit < dtstart || window_end < window_start {
            return Vec::new();
        }
        let mut sink = Sink {
            out: Vec::new(),
            remaining: self.count,
            window_start,
        };
        match self.unit {
            TimeUnit::Day => self.walk_days(dtstart, limit, &mut sink),
            TimeUnit::Week => self.walk_weeks(dtstart, limit, &mut sink),
            TimeUnit::Month => self.walk_months(dtstart, limit, &mut sink),
            TimeUnit::Year => self.walk_years(dtstart, limit, &mut sink),
        }
        sink.out
    }

    // Steps that leave the calendar or the i32 index range end the walk.

    fn walk_days(&self, dtstart: NaiveDate, limit: NaiveDate, sink: &mut Sink) {
        let step = Duration::days(i64::from(self.every));
        let mut date = dtstart;
        while date <= limit {
            if self.weekdays.is_empty() || self.weekdays.contains(&date.weekday()) {
                if !sink.push(date) {
                    return;
                }
            }
            match date.checked_add_signed(step) {
                Some(next) => date = next,
                None => return,
            }
        }
    }

    fn walk_weeks(&self, dtstart: NaiveDate, limit: NaiveDate, sink: &mut Sink) {
        let weekdays = if self.weekdays.is_empty() {
            vec![dtstart.weekday()]
        } else {
            self.weekdays.clone()
        };
        let step = Duration::weeks(i64::from(self.every));
        let mut week = week_start(dtstart);
        while week <= limit {
            for day in &weekdays {
                let offset = Duration::days(i64::from(day.num_days_from_monday()));
                let Some(date) = week.checked_add_signed(offset) else {
                    return;
                };
                if date < dtstart {
                    continue;
                }
                if date > limit {
                    return;
                }
                if !sink.push(date) {
                    return;
                }
            }
            match week.checked_add_signed(step) {
                Some(next) => week = next,
                None => return,
            }
        }
    }

    fn walk_months(&self, dtstart: NaiveDate, limit: NaiveDate, sink: &mut Sink) {
        let day = self.month_day.unwrap_or_else(|| dtstart.day());
        let step = i32::try_from(self.every).ok();
        let last = month_index(limit);
        let mut idx = month_index(dtstart);
        while idx <= last {
            let (year, month) = from_month_index(idx);
            // months without the requested day are skipped, as rrule does
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                if date >= dtstart && date <= limit && !sink.push(date) {
                    return;
                }
            }
            match step.and_then(|step| idx.checked_add(step)) {
                Some(next) => idx = next,
                None => return,
            }
        }
    }

    fn walk_years(&self, dtstart: NaiveDate, limit: NaiveDate, sink: &mut Sink) {
        let step = i32::try_from(self.every).ok();
        let mut year = dtstart.year();
        while year <= limit.year() {
            if let Some(date) = NaiveDate::from_ymd_opt(year, dtstart.month(), dtstart.day()) {
                if date <= limit && !sink.push(date) {
                    return;
                }
            }
            match step.and_then(|step| year.checked_add(step)) {
                Some(next) => year = next,
                None => return,
            }
        }
    }

    /// `DTSTART`/`RRULE` rendering used in diagnostics.
    pub fn to_rrule(&self) -> String {
        let mut parts = vec![
            format!("FREQ={}", self.unit.rrule_name()),
            format!("INTERVAL={}", self.every),
        ];
        if !self.weekdays.is_empty() {
            let days: Vec<&str> = self.weekdays.iter().map(|day| rrule_day(*day)).collect();
            parts.push(format!("BYDAY={}", days.join(",")));
        }
        if let Some(day) = self.month_day {
            parts.push(format!("BYMONTHDAY={day}"));
        }
        if let Some(until) = self.until {
            parts.push(format!("UNTIL={}", until.format("%Y%m%d")));
        }
        if let Some(count) = self.count {
            parts.push(format!("COUNT={count}"));
        }
        let rule = format!("RRULE:{}", parts.join(";"));
        match self.start {
            Some(start) => format!("DTSTART:{}\n{}", start.format("%Y%m%d"), rule),
            None => rule,
        }
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rrule())
    }
}

/// Collects occurrences, honouring `COUNT` from dtstart while only keeping
/// those at or after the window start.
struct Sink {
    out: Vec<NaiveDate>,
    remaining: Option<u32>,
    window_start: NaiveDate,
}

impl Sink {
    fn push(&mut self, date: NaiveDate) -> bool {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return false;
            }
            *remaining -= 1;
        }
        if date >= self.window_start {
            self.out.push(date);
        }
        self.remaining != Some(0)
    }
}

fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = Duration::days(i64::from(date.weekday().num_days_from_monday()));
    date.checked_sub_signed(offset).unwrap_or(date)
}

fn month_index(date: NaiveDate) -> i32 {
    date.year() * 12 + date.month() as i32 - 1
}

fn from_month_index(idx: i32) -> (i32, u32) {
    (idx.div_euclid(12), idx.rem_euclid(12) as u32 + 1)
}

fn rrule_day(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn daily_rule_honours_start_and_until() {
        let mut rule = RecurrenceRule::new(1, TimeUnit::Day);
        rule.start = Some(ymd(2022, 5, 3));
        rule.until = Some(ymd(2022, 5, 5));
        assert_eq!(
            rule.occurrences_between(ymd(2022, 5, 1), ymd(2022, 5, 10)),
            vec![ymd(2022, 5, 3), ymd(2022, 5, 4), ymd(2022, 5, 5)]
        );
    }

    #[test]
    fn every_third_day_keeps_phase_before_window() {
        let mut rule = RecurrenceRule::new(3, TimeUnit::Day);
        rule.start = Some(ymd(2022, 1, 1));
        assert_eq!(
            rule.occurrences_between(ymd(2022, 1, 5), ymd(2022, 1, 12)),
            vec![ymd(2022, 1, 7), ymd(2022, 1, 10)]
        );
    }

    #[test]
    fn biweekly_weekday_list_counts_weeks_from_start() {
        // 2022-01-05 is a Wednesday
        let mut rule =
            RecurrenceRule::new(2, TimeUnit::Week).with_weekdays([Weekday::Sat, Weekday::Fri]);
        rule.start = Some(ymd(2022, 1, 5));
        assert_eq!(
            rule.occurrences_between(ymd(2022, 1, 1), ymd(2022, 1, 31)),
            vec![
                ymd(2022, 1, 7),
                ymd(2022, 1, 8),
                ymd(2022, 1, 21),
                ymd(2022, 1, 22),
            ]
        );
    }

    #[test]
    fn monthly_rule_skips_short_months() {
        let mut rule = RecurrenceRule::new(1, TimeUnit::Month);
        rule.start = Some(ymd(2021, 1, 31));
        assert_eq!(
            rule.occurrences_between(ymd(2021, 1, 1), ymd(2021, 5, 31)),
            vec![ymd(2021, 1, 31), ymd(2021, 3, 31), ymd(2021, 5, 31)]
        );
    }

    #[test]
    fn monthly_rule_with_explicit_day() {
        let mut rule = RecurrenceRule::new(1, TimeUnit::Month);
        rule.start = Some(ymd(2022, 1, 20));
        rule.month_day = Some(15);
        assert_eq!(
            rule.occurrences_between(ymd(2022, 1, 1), ymd(2022, 3, 31)),
            vec![ymd(2022, 2, 15), ymd(2022, 3, 15)]
        );
    }

    #[test]
    fn yearly_leap_day_only_in_leap_years() {
        let mut rule = RecurrenceRule::new(1, TimeUnit::Year);
        rule.start = Some(ymd(2020, 2, 29));
        assert_eq!(
            rule.occurrences_between(ymd(2020, 1, 1), ymd(2025, 1, 1)),
            vec![ymd(2020, 2, 29), ymd(2024, 2, 29)]
        );
    }

    #[test]
    fn count_includes_occurrences_before_window() {
        let mut rule = RecurrenceRule::new(1, TimeUnit::Day);
        rule.start = Some(ymd(2022, 1, 1));
        rule.count = Some(5);
        assert_eq!(
            rule.occurrences_between(ymd(2022, 1, 4), ymd(2022, 1, 31)),
            vec![ymd(2022, 1, 4), ymd(2022, 1, 5)]
        );
    }

    #[test]
    fn unanchored_rule_starts_at_window() {
        let rule = RecurrenceRule::new(1, TimeUnit::Week);
        assert_eq!(
            rule.occurrences_between(ymd(2022, 1, 3), ymd(2022, 1, 20)),
            vec![ymd(2022, 1, 3), ymd(2022, 1, 10), ymd(2022, 1, 17)]
        );
    }

    #[test]
    fn until_before_start_is_empty() {
        let mut rule = RecurrenceRule::new(1, TimeUnit::Day);
        rule.start = Some(ymd(2022, 2, 1));
        rule.until = Some(ymd(2022, 1, 1));
        assert!(rule
            .occurrences_between(ymd(2021, 1, 1), ymd(2023, 1, 1))
            .is_empty());
    }

    #[test]
    fn huge_intervals_stop_after_first_occurrence() {
        let start = ymd(2022, 1, 1);
        for unit in [TimeUnit::Day, TimeUnit::Week, TimeUnit::Month, TimeUnit::Year] {
            for every in [100_000_000, i32::MAX as u32, u32::MAX] {
                let mut rule = RecurrenceRule::new(every, unit);
                rule.start = Some(start);
                assert_eq!(
                    rule.occurrences_between(start, ymd(2022, 12, 31)),
                    vec![start],
                    "{unit:?} every {every}"
                );
            }
        }
    }

    #[test]
    fn weekly_walk_near_calendar_end_terminates() {
        let end = NaiveDate::MAX;
        let start = end - Duration::days(20);
        let rule = RecurrenceRule::new(1, TimeUnit::Week);
        let dates = rule.occurrences_between(start, end);
        assert_eq!(dates.first(), Some(&start));
        assert!(dates.iter().all(|date| *date <= end));
    }

    #[test]
    fn renders_rrule() {
        let mut rule =
            RecurrenceRule::new(2, TimeUnit::Week).with_weekdays([Weekday::Fri, Weekday::Sat]);
        rule.start = Some(ymd(2022, 1, 1));
        rule.until = Some(ymd(2022, 6, 30));
        assert_eq!(
            rule.to_rrule(),
            "DTSTART:20220101\nRRULE:FREQ=WEEKLY;INTERVAL=2;BYDAY=FR,SA;UNTIL=20220630"
        );
    }
}
