//! # Feature: Time Expression Parsing
//!
//! Turns free text such as "через 5 сек пойти гулять" or "завтра в 9:00 купить
//! молоко" into a concrete local instant plus the remaining note text.
//! Matchers are independent strategies tried in an explicit priority order.
//!
//! - **Version**: 1.2.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Calendar dates with month names, English glosses of every pattern
//! - 1.1.0: Relative days ("завтра", "15 числа") with optional clock time
//! - 1.0.0: Relative durations and clock times

pub mod lexicon;
pub mod matchers;

use chrono::NaiveDateTime;
use log::debug;
use std::ops::Range;
use thiserror::Error;

pub use matchers::{
    CalendarDateMatcher, ClockTimeMatcher, RelativeDayMatcher, RelativeDurationMatcher,
};

/// Pattern family a matcher recognises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatcherKind {
    RelativeDuration,
    ClockTime,
    RelativeDay,
    CalendarDate,
}

impl std::fmt::Display for MatcherKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatcherKind::RelativeDuration => write!(f, "relative_duration"),
            MatcherKind::ClockTime => write!(f, "clock_time"),
            MatcherKind::RelativeDay => write!(f, "relative_day"),
            MatcherKind::CalendarDate => write!(f, "calendar_date"),
        }
    }
}

/// Priority used when a whole message may carry both the note and the time
pub const MESSAGE_PRIORITY: &[MatcherKind] = &[
    MatcherKind::CalendarDate,
    MatcherKind::RelativeDay,
    MatcherKind::ClockTime,
    MatcherKind::RelativeDuration,
];

/// Priority used for a reply to "Через сколько напомнить?"
pub const REPLY_PRIORITY: &[MatcherKind] = &[
    MatcherKind::RelativeDay,
    MatcherKind::CalendarDate,
    MatcherKind::RelativeDuration,
    MatcherKind::ClockTime,
];

/// Raw result of a single matcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeMatch {
    pub fire_at: NaiveDateTime,
    /// Byte ranges of the time phrase inside the input
    pub spans: Vec<Range<usize>>,
}

/// One pattern family
pub trait TimeMatcher: Send + Sync {
    fn kind(&self) -> MatcherKind;

    fn try_parse(&self, text: &str, now: NaiveDateTime) -> Option<TimeMatch>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    #[error("no time expression recognised")]
    Unrecognized,

    #[error("time {fire_at} has already passed")]
    AlreadyPassed { fire_at: NaiveDateTime },
}

/// Successful parse: when to fire and what is left of the message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTime {
    pub fire_at: NaiveDateTime,
    pub note: String,
    pub kind: MatcherKind,
}

pub struct TimeParser {
    matchers: Vec<Box<dyn TimeMatcher>>,
}

impl TimeParser {
    /// Build a parser trying the given families in order
    pub fn with_priority(order: &[MatcherKind]) -> Result<Self, regex::Error> {
        let mut matchers: Vec<Box<dyn TimeMatcher>> = Vec::with_capacity(order.len());
        for kind in order {
            let matcher: Box<dyn TimeMatcher> = match kind {
                MatcherKind::RelativeDuration => Box::new(RelativeDurationMatcher::new()?),
                MatcherKind::ClockTime => Box::new(ClockTimeMatcher::new()?),
                MatcherKind::RelativeDay => Box::new(RelativeDayMatcher::new()?),
                MatcherKind::CalendarDate => Box::new(CalendarDateMatcher::new()?),
            };
            matchers.push(matcher);
        }
        Ok(Self { matchers })
    }

    pub fn for_message() -> Result<Self, regex::Error> {
        Self::with_priority(MESSAGE_PRIORITY)
    }

    pub fn for_reply() -> Result<Self, regex::Error> {
        Self::with_priority(REPLY_PRIORITY)
    }

    pub fn priority(&self) -> Vec<MatcherKind> {
        self.matchers.iter().map(|m| m.kind()).collect()
    }

    /// Parse `text` relative to `now`. The first matcher that recognises the
    /// text decides the outcome.
    pub fn parse(&self, text: &str, now: NaiveDateTime) -> Result<ParsedTime, TimeParseError> {
        for matcher in &self.matchers {
            let Some(found) = matcher.try_parse(text, now) else {
                continue;
            };

            debug!(
                "Time expression matched by {}: {} -> {}",
                matcher.kind(),
                text,
                found.fire_at
            );

            if found.fire_at <= now {
                return Err(TimeParseError::AlreadyPassed {
                    fire_at: found.fire_at,
                });
            }

            return Ok(ParsedTime {
                fire_at: found.fire_at,
                note: residual_note(text, &found.spans),
                kind: matcher.kind(),
            });
        }
        Err(TimeParseError::Unrecognized)
    }
}

/// Remove the time phrase spans and tidy what remains
pub fn residual_note(text: &str, spans: &[Range<usize>]) -> String {
    let mut sorted: Vec<Range<usize>> = spans
        .iter()
        .filter(|span| span.start <= span.end && span.end <= text.len())
        .cloned()
        .collect();
    sorted.sort_by_key(|span| span.start);

    let mut kept = String::with_capacity(text.len());
    let mut cursor = 0;
    for span in sorted {
        if span.start > cursor {
            kept.push_str(&text[cursor..span.start]);
            kept.push(' ');
        }
        cursor = cursor.max(span.end);
    }
    if cursor < text.len() {
        kept.push_str(&text[cursor..]);
    }

    kept.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | '-' | ':' | '.' | ';' | '—'))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    #[test]
    fn test_walk_in_five_seconds() {
        let parser = TimeParser::for_message().unwrap();
        let now = at(2024, 3, 1, 12, 0);

        let parsed = parser.parse("through 5 sec go for a walk", now).unwrap();
        assert_eq!(parsed.note, "go for a walk");
        assert_eq!(parsed.fire_at, now + Duration::seconds(5));
        assert_eq!(parsed.kind, MatcherKind::RelativeDuration);

        let parsed = parser.parse("через 5 сек пойти гулять", now).unwrap();
        assert_eq!(parsed.note, "пойти гулять");
        assert_eq!(parsed.fire_at, now + Duration::seconds(5));
    }

    #[test]
    fn test_tomorrow_with_clock_time() {
        let parser = TimeParser::for_message().unwrap();
        let now = at(2024, 3, 1, 20, 0);

        let parsed = parser.parse("tomorrow at 9:00 buy milk", now).unwrap();
        assert_eq!(parsed.fire_at, at(2024, 3, 2, 9, 0));
        assert_eq!(parsed.note, "buy milk");

        let parsed = parser.parse("завтра в 9:00 купить молоко", now).unwrap();
        assert_eq!(parsed.fire_at, at(2024, 3, 2, 9, 0));
        assert_eq!(parsed.note, "купить молоко");
    }

    #[test]
    fn test_calendar_date_next_year() {
        let parser = TimeParser::for_message().unwrap();
        let now = at(2024, 7, 15, 10, 0);

        let parsed = parser.parse("10 May at 14:00 pharmacy", now).unwrap();
        assert_eq!(parsed.fire_at, at(2025, 5, 10, 14, 0));
        assert_eq!(parsed.note, "pharmacy");
        assert_eq!(parsed.kind, MatcherKind::CalendarDate);
    }

    #[test]
    fn test_note_before_time_phrase() {
        let parser = TimeParser::for_message().unwrap();
        let now = at(2024, 3, 1, 12, 0);

        let parsed = parser.parse("позвонить маме, через 2 часа", now).unwrap();
        assert_eq!(parsed.note, "позвонить маме");
        assert_eq!(parsed.fire_at, now + Duration::hours(2));

        let parsed = parser.parse("созвон в 17:00", now).unwrap();
        assert_eq!(parsed.note, "созвон");
        assert_eq!(parsed.fire_at, at(2024, 3, 1, 17, 0));
    }

    #[test]
    fn test_clock_hours_are_not_durations() {
        let now = at(2024, 3, 1, 12, 0);
        for parser in [
            TimeParser::for_message().unwrap(),
            TimeParser::for_reply().unwrap(),
        ] {
            let parsed = parser.parse("в 10 часов", now).unwrap();
            assert_eq!(parsed.fire_at, at(2024, 3, 2, 10, 0));
            assert_eq!(parsed.kind, MatcherKind::ClockTime);
        }
    }

    #[test]
    fn test_reply_priority_prefers_day_over_clock() {
        let parser = TimeParser::for_reply().unwrap();
        let now = at(2024, 3, 1, 12, 0);

        let parsed = parser.parse("завтра в 10 часов", now).unwrap();
        assert_eq!(parsed.fire_at, at(2024, 3, 2, 10, 0));
        assert_eq!(parsed.kind, MatcherKind::RelativeDay);
        assert_eq!(parser.priority(), REPLY_PRIORITY.to_vec());
    }

    #[test]
    fn test_clock_time_next_to_ordinary_words() {
        let parser = TimeParser::for_message().unwrap();
        let now = at(2024, 3, 1, 12, 0);

        let cases = [
            ("at 10:30 market run", at(2024, 3, 2, 10, 30), "market run"),
            ("at 9:15 decorate the tree", at(2024, 3, 2, 9, 15), "decorate the tree"),
            ("купить 3 майки в 17:00", at(2024, 3, 1, 17, 0), "купить 3 майки"),
            ("call 2 mayors at 17:00", at(2024, 3, 1, 17, 0), "call 2 mayors"),
            ("в 18:45 забрать 3 посылки", at(2024, 3, 1, 18, 45), "забрать 3 посылки"),
        ];
        for (text, fire_at, note) in cases {
            let parsed = parser.parse(text, now).unwrap();
            assert_eq!(parsed.kind, MatcherKind::ClockTime, "{text}");
            assert_eq!(parsed.fire_at, fire_at, "{text}");
            assert_eq!(parsed.note, note, "{text}");
        }
    }

    #[test]
    fn test_duration_after_counted_noun() {
        let now = at(2024, 3, 1, 12, 0);
        for parser in [
            TimeParser::for_message().unwrap(),
            TimeParser::for_reply().unwrap(),
        ] {
            let parsed = parser
                .parse("купить 2 минералки через 10 минут", now)
                .unwrap();
            assert_eq!(parsed.kind, MatcherKind::RelativeDuration);
            assert_eq!(parsed.fire_at, now + Duration::minutes(10));
            assert_eq!(parsed.note, "купить 2 минералки");
        }
    }

    #[test]
    fn test_day_and_date_next_to_counted_nouns() {
        let parser = TimeParser::for_message().unwrap();
        let now = at(2024, 3, 1, 12, 0);

        let parsed = parser
            .parse("завтра в 10:30 отнести 2 мешка в гараж", now)
            .unwrap();
        assert_eq!(parsed.kind, MatcherKind::RelativeDay);
        assert_eq!(parsed.fire_at, at(2024, 3, 2, 10, 30));
        assert_eq!(parsed.note, "отнести 2 мешка в гараж");

        let parsed = parser.parse("10 мая в 14:00 купить 5 масок", now).unwrap();
        assert_eq!(parsed.kind, MatcherKind::CalendarDate);
        assert_eq!(parsed.fire_at, at(2024, 5, 10, 14, 0));
        assert_eq!(parsed.note, "купить 5 масок");
    }

    #[test]
    fn test_unrecognized() {
        let parser = TimeParser::for_message().unwrap();
        let now = at(2024, 3, 1, 12, 0);
        assert_eq!(
            parser.parse("позвонить маме", now),
            Err(TimeParseError::Unrecognized)
        );
        assert_eq!(parser.parse("", now), Err(TimeParseError::Unrecognized));
    }

    struct StaleMatcher;

    impl TimeMatcher for StaleMatcher {
        fn kind(&self) -> MatcherKind {
            MatcherKind::ClockTime
        }

        fn try_parse(&self, _text: &str, now: NaiveDateTime) -> Option<TimeMatch> {
            Some(TimeMatch {
                fire_at: now - Duration::minutes(1),
                spans: vec![],
            })
        }
    }

    #[test]
    fn test_already_passed() {
        let parser = TimeParser {
            matchers: vec![Box::new(StaleMatcher)],
        };
        let now = at(2024, 3, 1, 12, 0);
        assert_eq!(
            parser.parse("anything", now),
            Err(TimeParseError::AlreadyPassed {
                fire_at: now - Duration::minutes(1)
            })
        );
    }

    #[test]
    fn test_relative_property_over_values() {
        let parser = TimeParser::for_reply().unwrap();
        let now = at(2024, 3, 1, 12, 0);
        for value in [1_i64, 2, 15, 59, 120, 1000] {
            for (token, unit) in [("сек", 1), ("минут", 60), ("часов", 3_600), ("h", 3_600)] {
                let parsed = parser.parse(&format!("через {value} {token}"), now).unwrap();
                assert_eq!(parsed.fire_at, now + Duration::seconds(value * unit));
                assert!(parsed.note.is_empty());
            }
        }
    }

    #[test]
    fn test_residual_note_cleanup() {
        let text = "завтра, в 9:00 - купить молоко";
        let note = residual_note(text, &[0..12, 14..21]);
        assert_eq!(note, "купить молоко");
        assert_eq!(residual_note("abc", &[]), "abc");
    }
}
