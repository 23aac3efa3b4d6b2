//! Translates natural-language recurrence sentences into [`RecurrenceRule`]s.
//!
//! Accepted shapes include "every day", "every weekday", "every 2 weeks on
//! Friday and Saturday", "every month on the 15th", "monthly starting
//! 2020-11-03", each optionally followed by "starting <date>", "until <date>"
//! and "for N times".

use chrono::{NaiveDate, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::rule::{RecurrenceRule, TimeUnit};
use crate::dates::parse_date_stamp;

static ORDINAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})(st|nd|rd|th)?$").expect("valid ordinal pattern"));

const START_WORDS: &[&str] = &["starting", "from", "beginning", "since"];
const UNTIL_WORDS: &[&str] = &["until", "till", "through", "ending", "to"];
const FILLER_WORDS: &[&str] = &["and", "the", "at"];
const WEEKDAY_NAMES: &[&str] = &[
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Reasons a sentence could not be translated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SentenceError {
    #[error("empty sentence")]
    Empty,
    #[error("sentence must start with `every` or a period word, found `{0}`")]
    UnknownLead(String),
    #[error("expected a time unit, found `{0}`")]
    UnknownUnit(String),
    #[error("interval must be at least 1")]
    ZeroInterval,
    #[error("unknown weekday `{token}`{}", suggestion_suffix(.suggestion))]
    UnknownWeekday {
        token: String,
        suggestion: Option<&'static str>,
    },
    #[error("could not read a date from `{0}`")]
    BadDate(String),
    #[error("expected {expected} after `{after}`")]
    Incomplete {
        after: String,
        expected: &'static str,
    },
    #[error("unexpected `{0}`")]
    Unexpected(String),
    #[error("{0}")]
    Conflict(String),
}

fn suggestion_suffix(suggestion: &Option<&'static str>) -> String {
    match suggestion {
        Some(name) => format!(" (did you mean `{name}`?)"),
        None => String::new(),
    }
}

/// A translated sentence plus advisory notes that are never errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSentence {
    pub rule: RecurrenceRule,
    pub advisories: Vec<String>,
}

#[derive(Debug, Clone)]
struct Token {
    raw: String,
    lower: String,
}

pub fn parse_sentence(sentence: &str) -> Result<ParsedSentence, SentenceError> {
    let tokens: Vec<Token> = sentence
        .replace(',', " ")
        .split_whitespace()
        .map(|raw| Token {
            raw: raw.to_string(),
            lower: raw.to_lowercase(),
        })
        .collect();
    Parser {
        tokens,
        pos: 0,
        advisories: Vec::new(),
    }
    .parse()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    advisories: Vec<String>,
}

impl Parser {
    fn parse(mut self) -> Result<ParsedSentence, SentenceError> {
        let lead = self.next().ok_or(SentenceError::Empty)?;
        let mut rule = match lead.lower.as_str() {
            "daily" => RecurrenceRule::new(1, TimeUnit::Day),
            "weekly" => RecurrenceRule::new(1, TimeUnit::Week),
            "monthly" => RecurrenceRule::new(1, TimeUnit::Month),
            "yearly" | "annually" => RecurrenceRule::new(1, TimeUnit::Year),
            "every" | "each" => self.parse_body()?,
            _ => return Err(SentenceError::UnknownLead(lead.raw)),
        };
        self.parse_qualifiers(&mut rule)?;
        if let (Some(start), Some(until)) = (rule.start, rule.until) {
            if until < start {
                self.advise(format!(
                    "until {until} precedes start {start}; the rule has no occurrences"
                ));
            }
        }
        Ok(ParsedSentence {
            rule,
            advisories: self.advisories,
        })
    }

    fn parse_body(&mut self) -> Result<RecurrenceRule, SentenceError> {
        let token = self.next().ok_or_else(|| SentenceError::Incomplete {
            after: "every".into(),
            expected: "a time unit",
        })?;
        if let Some(every) = parse_count(&token.lower) {
            if every == 0 {
                return Err(SentenceError::ZeroInterval);
            }
            return self.parse_unit(every);
        }
        if token.lower == "other" {
            return self.parse_unit(2);
        }
        let weekly = RecurrenceRule::new(1, TimeUnit::Week);
        match token.lower.as_str() {
            "weekday" | "weekdays" => {
                return Ok(weekly.with_weekdays([
                    Weekday::Mon,
                    Weekday::Tue,
                    Weekday::Wed,
                    Weekday::Thu,
                    Weekday::Fri,
                ]));
            }
            "weekend" | "weekends" => {
                return Ok(weekly.with_weekdays([Weekday::Sat, Weekday::Sun]));
            }
            _ => {}
        }
        if let Some(unit) = unit_for(&token.lower) {
            return Ok(RecurrenceRule::new(1, unit));
        }
        if weekday_for(&token.lower).is_some() {
            self.pos -= 1;
            let days = self.parse_weekdays()?;
            return Ok(weekly.with_weekdays(days));
        }
        Err(SentenceError::UnknownUnit(token.raw))
    }

    fn parse_unit(&mut self, every: u32) -> Result<RecurrenceRule, SentenceError> {
        let token = self.next().ok_or_else(|| SentenceError::Incomplete {
            after: every.to_string(),
            expected: "a time unit",
        })?;
        unit_for(&token.lower)
            .map(|unit| RecurrenceRule::new(every, unit))
            .ok_or(SentenceError::UnknownUnit(token.raw))
    }

    fn parse_qualifiers(&mut self, rule: &mut RecurrenceRule) -> Result<(), SentenceError> {
        while let Some(token) = self.next() {
            let word = token.lower.as_str();
            if word == "on" {
                self.parse_on(rule)?;
            } else if START_WORDS.contains(&word) {
                self.skip_optional("on");
                rule.start = Some(self.parse_date(&token.raw)?);
            } else if UNTIL_WORDS.contains(&word) {
                rule.until = Some(self.parse_date(&token.raw)?);
            } else if word == "for" {
                rule.count = Some(self.parse_times()?);
            } else if FILLER_WORDS.contains(&word) {
                self.advise(format!("ignored `{}`", token.raw));
            } else {
                return Err(SentenceError::Unexpected(token.raw));
            }
        }
        Ok(())
    }

    fn parse_on(&mut self, rule: &mut RecurrenceRule) -> Result<(), SentenceError> {
        if self.peek_is("the") {
            self.pos += 1;
            let day = self.parse_ordinal()?;
            if rule.unit != TimeUnit::Month {
                return Err(SentenceError::Conflict(
                    "a day of the month only applies to monthly rules".into(),
                ));
            }
            rule.month_day = Some(day);
            return Ok(());
        }
        if matches!(rule.unit, TimeUnit::Month | TimeUnit::Year) {
            return Err(SentenceError::Conflict(
                "weekdays only apply to daily or weekly rules".into(),
            ));
        }
        let days = self.parse_weekdays()?;
        rule.add_weekdays(days);
        Ok(())
    }

    fn parse_weekdays(&mut self) -> Result<Vec<Weekday>, SentenceError> {
        let mut days = Vec::new();
        while let Some(token) = self.peek() {
            if token.lower == "and" && !days.is_empty() {
                self.pos += 1;
                continue;
            }
            match weekday_for(&token.lower) {
                Some(day) => {
                    days.push(day);
                    self.pos += 1;
                }
                None if days.is_empty() || !is_keyword(&token.lower) => {
                    return Err(SentenceError::UnknownWeekday {
                        token: token.raw.clone(),
                        suggestion: closest_weekday(&token.lower),
                    })
                }
                None => break,
            }
        }
        if days.is_empty() {
            return Err(SentenceError::Incomplete {
                after: "on".into(),
                expected: "a weekday",
            });
        }
        Ok(days)
    }

    fn parse_ordinal(&mut self) -> Result<u32, SentenceError> {
        let token = self.next().ok_or_else(|| SentenceError::Incomplete {
            after: "the".into(),
            expected: "a day of the month",
        })?;
        let day = ORDINAL
            .captures(&token.lower)
            .and_then(|caps| caps[1].parse::<u32>().ok())
            .filter(|day| (1..=31).contains(day))
            .ok_or_else(|| SentenceError::Unexpected(token.raw.clone()))?;
        self.skip_optional("day");
        if self.peek_is("of") {
            self.pos += 1;
            self.skip_optional("the");
            self.skip_optional("month");
        }
        Ok(day)
    }

    fn parse_times(&mut self) -> Result<u32, SentenceError> {
        let token = self.next().ok_or_else(|| SentenceError::Incomplete {
            after: "for".into(),
            expected: "a number of times",
        })?;
        let count = parse_count(&token.lower).ok_or(SentenceError::Unexpected(token.raw))?;
        match self.next() {
            Some(unit) if matches!(unit.lower.as_str(), "time" | "times" | "occurrences") => {
                Ok(count)
            }
            Some(other) => Err(SentenceError::Unexpected(other.raw)),
            None => Err(SentenceError::Incomplete {
                after: "for".into(),
                expected: "`times`",
            }),
        }
    }

    /// Reads the words up to the next keyword as one date.
    fn parse_date(&mut self, after: &str) -> Result<NaiveDate, SentenceError> {
        let mut words = Vec::new();
        while let Some(token) = self.peek() {
            if is_keyword(&token.lower) {
                break;
            }
            words.push(token.raw.clone());
            self.pos += 1;
        }
        if words.is_empty() {
            return Err(SentenceError::Incomplete {
                after: after.to_string(),
                expected: "a date",
            });
        }
        let text = words.join(" ");
        parse_date_stamp(&text).ok_or(SentenceError::BadDate(text))
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_is(&self, word: &str) -> bool {
        self.peek().map(|token| token.lower == word).unwrap_or(false)
    }

    fn skip_optional(&mut self, word: &str) {
        if self.peek_is(word) {
            self.pos += 1;
        }
    }

    fn advise(&mut self, note: String) {
        self.advisories.push(note);
    }
}

fn is_keyword(word: &str) -> bool {
    word == "on"
        || word == "for"
        || word == "and"
        || START_WORDS.contains(&word)
        || UNTIL_WORDS.contains(&word)
}

fn parse_count(word: &str) -> Option<u32> {
    if let Ok(value) = word.parse::<u32>() {
        return Some(value);
    }
    let value = match word {
        "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        _ => return None,
    };
    Some(value)
}

fn unit_for(word: &str) -> Option<TimeUnit> {
    match word.strip_suffix('s').unwrap_or(word) {
        "day" => Some(TimeUnit::Day),
        "week" => Some(TimeUnit::Week),
        "month" => Some(TimeUnit::Month),
        "year" => Some(TimeUnit::Year),
        _ => None,
    }
}

fn weekday_for(word: &str) -> Option<Weekday> {
    let word = match word.strip_suffix('s') {
        Some(stem) if stem.ends_with("day") => stem,
        _ => word,
    };
    let day = match word {
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tue" | "tues" => Weekday::Tue,
        "wednesday" | "wed" => Weekday::Wed,
        "thursday" | "thu" | "thur" | "thurs" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        "sunday" | "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(day)
}

fn closest_weekday(word: &str) -> Option<&'static str> {
    WEEKDAY_NAMES
        .iter()
        .map(|name| (*name, strsim::levenshtein(word, name)))
        .filter(|(_, distance)| *distance <= 2)
        .min_by_key(|(_, distance)| *distance)
        .map(|(name, _)| name)
}
