//! Word tables for the time expression matchers.
//!
//! Russian is the primary locale; the English entries cover the same
//! patterns for mixed-language chats.

use chrono::Duration;

/// Unit of a relative duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
}

impl TimeUnit {
    /// Duration of `value` units, `None` on overflow
    pub fn duration(self, value: i64) -> Option<Duration> {
        let seconds = match self {
            TimeUnit::Seconds => Some(value),
            TimeUnit::Minutes => value.checked_mul(60),
            TimeUnit::Hours => value.checked_mul(3_600),
        }?;
        Duration::try_seconds(seconds)
    }
}

/// Words that may introduce a relative duration ("через 5 минут")
pub const RELATIVE_LEAD_INS: &[&str] = &["через", "in", "through", "after"];

/// Words that introduce a clock time ("в 17:00"); a number after one of these
/// is never a relative duration
pub const CLOCK_LEAD_INS: &[&str] = &["в", "во", "at"];

/// Spelled-out unit forms, matched as a whole token
const UNIT_WORDS: &[(&[&str], TimeUnit)] = &[
    (
        &[
            "сек", "секунд", "секунда", "секунды", "секунду", "секунде", "sec", "secs", "second",
            "seconds",
        ],
        TimeUnit::Seconds,
    ),
    (
        &[
            "мин", "минут", "минута", "минуты", "минуту", "минутку", "минутки", "min", "mins",
            "minute", "minutes",
        ],
        TimeUnit::Minutes,
    ),
    (
        &[
            "час", "часа", "часов", "часик", "часика", "hour", "hours", "hr", "hrs",
        ],
        TimeUnit::Hours,
    ),
];

/// Single-letter abbreviations
const UNIT_ABBREVIATIONS: &[(&str, TimeUnit)] = &[
    ("с", TimeUnit::Seconds),
    ("s", TimeUnit::Seconds),
    ("м", TimeUnit::Minutes),
    ("m", TimeUnit::Minutes),
    ("ч", TimeUnit::Hours),
    ("h", TimeUnit::Hours),
];

/// Resolve a lowercased unit token such as "секунды", "мин" or "h".
/// Words that merely start like a unit ("минералки") are not units.
pub fn unit_for(token: &str) -> Option<TimeUnit> {
    if let Some((_, unit)) = UNIT_ABBREVIATIONS.iter().find(|(abbr, _)| *abbr == token) {
        return Some(*unit);
    }
    UNIT_WORDS
        .iter()
        .find(|(forms, _)| forms.contains(&token))
        .map(|(_, unit)| *unit)
}

/// Russian month stems and the case endings they take
/// ("января", "в январе", "январь")
const RU_MONTHS: &[(&str, &[&str], u32)] = &[
    ("январ", &["ь", "я", "е"], 1),
    ("феврал", &["ь", "я", "е"], 2),
    ("март", &["", "а", "е"], 3),
    ("апрел", &["ь", "я", "е"], 4),
    ("ма", &["й", "я", "е"], 5),
    ("июн", &["ь", "я", "е"], 6),
    ("июл", &["ь", "я", "е"], 7),
    ("август", &["", "а", "е"], 8),
    ("сентябр", &["ь", "я", "е"], 9),
    ("октябр", &["ь", "я", "е"], 10),
    ("ноябр", &["ь", "я", "е"], 11),
    ("декабр", &["ь", "я", "е"], 12),
];

/// English full names and their standard abbreviations
const EN_MONTHS: &[(&[&str], u32)] = &[
    (&["january", "jan"], 1),
    (&["february", "feb"], 2),
    (&["march", "mar"], 3),
    (&["april", "apr"], 4),
    (&["may"], 5),
    (&["june", "jun"], 6),
    (&["july", "jul"], 7),
    (&["august", "aug"], 8),
    (&["september", "sep", "sept"], 9),
    (&["october", "oct"], 10),
    (&["november", "nov"], 11),
    (&["december", "dec"], 12),
];

/// Month number (1-12) for a lowercased month word. The whole word must be a
/// month form, so "market" or "майки" are not months.
pub fn month_for(word: &str) -> Option<u32> {
    let russian = RU_MONTHS.iter().find_map(|(stem, endings, month)| {
        let ending = word.strip_prefix(stem)?;
        endings.contains(&ending).then_some(*month)
    });
    russian.or_else(|| {
        EN_MONTHS
            .iter()
            .find(|(forms, _)| forms.contains(&word))
            .map(|(_, month)| *month)
    })
}

/// Day offset for a relative day word ("завтра" -> 1)
pub fn day_offset_for(phrase: &str) -> Option<u64> {
    let normalized = phrase.split_whitespace().collect::<Vec<_>>().join(" ");
    match normalized.as_str() {
        "завтра" | "tomorrow" => Some(1),
        "послезавтра" | "day after tomorrow" | "the day after tomorrow" => Some(2),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_inflections() {
        for token in ["сек", "секунд", "секунды", "секунду", "с", "sec", "seconds", "s"] {
            assert_eq!(unit_for(token), Some(TimeUnit::Seconds), "{token}");
        }
        for token in ["мин", "минут", "минуты", "минуту", "м", "min", "minutes", "m"] {
            assert_eq!(unit_for(token), Some(TimeUnit::Minutes), "{token}");
        }
        for token in ["час", "часа", "часов", "ч", "h", "hour", "hours", "hrs"] {
            assert_eq!(unit_for(token), Some(TimeUnit::Hours), "{token}");
        }
    }

    #[test]
    fn test_single_letters_do_not_prefix_match() {
        assert_eq!(unit_for("сентября"), None);
        assert_eq!(unit_for("мая"), None);
        assert_eq!(unit_for("months"), None);
        assert_eq!(unit_for("seats"), None);
    }

    #[test]
    fn test_unit_lookalike_words() {
        for token in ["минералки", "минимум", "часто", "часы", "секция", "minecraft", "hourglass"] {
            assert_eq!(unit_for(token), None, "{token}");
        }
    }

    #[test]
    fn test_month_lookup() {
        assert_eq!(month_for("мая"), Some(5));
        assert_eq!(month_for("марта"), Some(3));
        assert_eq!(month_for("декабря"), Some(12));
        assert_eq!(month_for("may"), Some(5));
        assert_eq!(month_for("september"), Some(9));
        assert_eq!(month_for("минут"), None);
        assert_eq!(month_for("январе"), Some(1));
        assert_eq!(month_for("май"), Some(5));
        assert_eq!(month_for("sept"), Some(9));
    }

    #[test]
    fn test_month_lookalike_words() {
        for word in ["market", "mayors", "decorate", "janitor", "майки", "маму", "мартышка", "июньский"] {
            assert_eq!(month_for(word), None, "{word}");
        }
    }

    #[test]
    fn test_unit_duration_overflow() {
        assert_eq!(TimeUnit::Hours.duration(2), Some(Duration::hours(2)));
        assert_eq!(TimeUnit::Hours.duration(i64::MAX), None);
    }

    #[test]
    fn test_day_offsets() {
        assert_eq!(day_offset_for("завтра"), Some(1));
        assert_eq!(day_offset_for("послезавтра"), Some(2));
        assert_eq!(day_offset_for("the  day after tomorrow"), Some(2));
        assert_eq!(day_offset_for("вчера"), None);
    }
}
