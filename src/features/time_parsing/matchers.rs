//! Independent matcher strategies, one per time expression family.
//!
//! Every matcher runs case-insensitive patterns against the original text so
//! the byte spans it reports can be cut straight out of the user's message.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::ops::Range;

use super::lexicon::{self, CLOCK_LEAD_INS, RELATIVE_LEAD_INS};
use super::{MatcherKind, TimeMatch, TimeMatcher};

/// Time used when a day is named without a clock time
pub const DEFAULT_DAY_TIME: (u32, u32) = (9, 0);

fn default_day_time() -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(DEFAULT_DAY_TIME.0, DEFAULT_DAY_TIME.1, 0)
}

/// "через 5 сек", "in 10 minutes", "2ч"
pub struct RelativeDurationMatcher {
    pattern: Regex,
}

impl RelativeDurationMatcher {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(r"(?i)(?:(\p{L}+)\s+)?\b(\d+)\s*(\p{L}+)")?,
        })
    }
}

impl TimeMatcher for RelativeDurationMatcher {
    fn kind(&self) -> MatcherKind {
        MatcherKind::RelativeDuration
    }

    fn try_parse(&self, text: &str, now: NaiveDateTime) -> Option<TimeMatch> {
        let mut search_from = 0;
        while let Some(caps) = self.pattern.captures_at(text, search_from) {
            let (Some(number), Some(unit_token)) = (caps.get(2), caps.get(3)) else {
                break;
            };
            // A rejected candidate may have swallowed the lead-in of the next one
            search_from = number.end();

            let preceding = caps.get(1);
            let preceding_word = preceding.map(|m| m.as_str().to_lowercase());
            if preceding_word
                .as_deref()
                .is_some_and(|word| CLOCK_LEAD_INS.contains(&word))
            {
                continue;
            }
            if follows_colon(text, number.start()) {
                continue;
            }

            let Some(unit) = lexicon::unit_for(&unit_token.as_str().to_lowercase()) else {
                continue;
            };
            let Ok(value) = number.as_str().parse::<i64>() else {
                continue;
            };
            if value <= 0 {
                continue;
            }

            let fire_at = unit
                .duration(value)
                .and_then(|delta| now.checked_add_signed(delta))?;

            let start = match (preceding, preceding_word.as_deref()) {
                (Some(word), Some(lower)) if RELATIVE_LEAD_INS.contains(&lower) => word.start(),
                _ => number.start(),
            };

            return Some(TimeMatch {
                fire_at,
                spans: vec![start..unit_token.end()],
            });
        }
        None
    }
}

/// Whether the number starting at `start` is the minutes part of "HH:MM"
fn follows_colon(text: &str, start: usize) -> bool {
    text[..start].ends_with(':')
}

/// "в 17:00", "at 9:30", "в 10 часов"
pub struct ClockTimeMatcher {
    pattern: Regex,
}

impl ClockTimeMatcher {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(
                r"(?i)\b(?:в|во|at)\s+(\d{1,2})(?::(\d{2})\b|\s*(?:часов|часа|час|hours?|o'clock|ч|h)\b)",
            )?,
        })
    }

    /// First valid clock time in `text` and the span it occupies
    pub fn find_time(&self, text: &str) -> Option<(NaiveTime, Range<usize>)> {
        self.pattern.captures_iter(text).find_map(|caps| {
            let whole = caps.get(0)?;
            let hour = caps.get(1)?.as_str().parse::<u32>().ok()?;
            let minute = match caps.get(2) {
                Some(m) => m.as_str().parse::<u32>().ok()?,
                None => 0,
            };
            let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
            Some((time, whole.range()))
        })
    }
}

impl TimeMatcher for ClockTimeMatcher {
    fn kind(&self) -> MatcherKind {
        MatcherKind::ClockTime
    }

    fn try_parse(&self, text: &str, now: NaiveDateTime) -> Option<TimeMatch> {
        let (time, span) = self.find_time(text)?;
        let today = now.date().and_time(time);
        let fire_at = if today > now {
            today
        } else {
            now.date().checked_add_days(Days::new(1))?.and_time(time)
        };
        Some(TimeMatch {
            fire_at,
            spans: vec![span],
        })
    }
}

/// "завтра", "послезавтра", "15 числа", "on the 15th", with an optional clock time
pub struct RelativeDayMatcher {
    pattern: Regex,
    clock: ClockTimeMatcher,
}

impl RelativeDayMatcher {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(
                r"(?i)\b(?:(послезавтра|завтра|(?:the\s+)?day\s+after\s+tomorrow|tomorrow)|(\d{1,2})\s*числа|on\s+the\s+(\d{1,2})(?:st|nd|rd|th)?)\b",
            )?,
            clock: ClockTimeMatcher::new()?,
        })
    }

    /// Day of month `day` at `time`: this month while still ahead of `now`,
    /// otherwise next month
    fn day_of_month(day: u32, time: NaiveTime, now: NaiveDateTime) -> Option<NaiveDateTime> {
        let this_month = NaiveDate::from_ymd_opt(now.year(), now.month(), day)
            .map(|date| date.and_time(time))
            .filter(|at| *at > now);
        if this_month.is_some() {
            return this_month;
        }

        let (year, month) = if now.month() == 12 {
            (now.year() + 1, 1)
        } else {
            (now.year(), now.month() + 1)
        };
        NaiveDate::from_ymd_opt(year, month, day).map(|date| date.and_time(time))
    }
}

impl TimeMatcher for RelativeDayMatcher {
    fn kind(&self) -> MatcherKind {
        MatcherKind::RelativeDay
    }

    fn try_parse(&self, text: &str, now: NaiveDateTime) -> Option<TimeMatch> {
        let caps = self.pattern.captures(text)?;
        let day_span = caps.get(0)?.range();

        let mut spans = vec![day_span.clone()];
        let time = match self.clock.find_time(text) {
            Some((time, span)) if span.start >= day_span.end || span.end <= day_span.start => {
                spans.push(span);
                time
            }
            _ => default_day_time()?,
        };

        let fire_at = if let Some(word) = caps.get(1) {
            let offset = lexicon::day_offset_for(&word.as_str().to_lowercase())?;
            now.date().checked_add_days(Days::new(offset))?.and_time(time)
        } else {
            let day = caps
                .get(2)
                .or_else(|| caps.get(3))?
                .as_str()
                .parse::<u32>()
                .ok()?;
            Self::day_of_month(day, time, now)?
        };

        Some(TimeMatch { fire_at, spans })
    }
}

/// "10 мая в 14:00", "10 May at 14:00"
pub struct CalendarDateMatcher {
    pattern: Regex,
}

impl CalendarDateMatcher {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(
                r"(?i)(?:^|[^:\d\p{L}])(\d{1,2})\s+(\p{L}+)\b(?:\s+(?:в|во|at)\s+(\d{1,2}):(\d{2})\b)?",
            )?,
        })
    }
}

impl TimeMatcher for CalendarDateMatcher {
    fn kind(&self) -> MatcherKind {
        MatcherKind::CalendarDate
    }

    fn try_parse(&self, text: &str, now: NaiveDateTime) -> Option<TimeMatch> {
        for caps in self.pattern.captures_iter(text) {
            let Some(month) = caps
                .get(2)
                .and_then(|word| lexicon::month_for(&word.as_str().to_lowercase()))
            else {
                continue;
            };
            let day_match = caps.get(1)?;
            let day = day_match.as_str().parse::<u32>().ok()?;

            let time = match (caps.get(3), caps.get(4)) {
                (Some(hour), Some(minute)) => NaiveTime::from_hms_opt(
                    hour.as_str().parse().ok()?,
                    minute.as_str().parse().ok()?,
                    0,
                )?,
                _ => default_day_time()?,
            };

            let this_year = NaiveDate::from_ymd_opt(now.year(), month, day)
                .map(|date| date.and_time(time))
                .filter(|at| *at > now);
            let fire_at = match this_year {
                Some(at) => at,
                None => NaiveDate::from_ymd_opt(now.year() + 1, month, day)?.and_time(time),
            };

            return Some(TimeMatch {
                fire_at,
                spans: vec![day_match.start()..caps.get(0)?.end()],
            });
        }
        None
    }
}
