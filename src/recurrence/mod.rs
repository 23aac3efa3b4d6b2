//! Recurrence rules and the sentence grammar that produces them.

pub mod rule;
pub mod sentence;

pub use rule::{RecurrenceRule, TimeUnit};
pub use sentence::{parse_sentence, ParsedSentence, SentenceError};
