use std::sync::OnceLock;

use billscan_core::{ExtractedRecord, Money, Timestamp};
use chrono::{FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use regex::Regex;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_amount, r"^[-+][0-9]+\.[0-9]{2}$");
// Spaces are not glyphs, so the day and the hour usually arrive glued together.
re!(re_timestamp, r"^(20[0-9]{2})-([0-9]{2})-([0-9]{2})\s*([0-9]{1,2}):([0-9]{1,2})");

/// What one recognized line turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Amount(Money),
    Timestamp(Timestamp),
}

/// Classifies recognized band strings as amounts or timestamps.
///
/// By default only the calendar day of a timestamp is trusted: hour and
/// minute are parsed and then dropped, leaving midnight in the configured
/// zone. `keep_time_of_day` switches that off.
#[derive(Debug, Clone, Copy)]
pub struct FieldInterpreter {
    zone: FixedOffset,
    keep_time_of_day: bool,
}

impl Default for FieldInterpreter {
    fn default() -> Self {
        Self::new(default_zone(), false)
    }
}

/// UTC+08:00.
pub fn default_zone() -> FixedOffset {
    FixedOffset::east_opt(8 * 3600).unwrap_or_else(|| Utc.fix())
}

impl FieldInterpreter {
    pub fn new(zone: FixedOffset, keep_time_of_day: bool) -> Self {
        Self { zone, keep_time_of_day }
    }

    pub fn interpret(&self, text: &str) -> Option<Field> {
        if let Some(amount) = parse_amount(text) {
            return Some(Field::Amount(amount));
        }
        self.parse_timestamp(text).map(Field::Timestamp)
    }

    /// Feeds one line into `record`. Returns `true` once the record is complete.
    pub fn absorb(&self, record: &mut ExtractedRecord, text: &str) -> bool {
        match self.interpret(text) {
            Some(Field::Amount(m)) => {
                if !record.offer_amount(m) {
                    tracing::debug!(%text, "Ignoring additional amount");
                }
            }
            Some(Field::Timestamp(t)) => {
                if !record.offer_timestamp(t) {
                    tracing::debug!(%text, "Ignoring additional timestamp");
                }
            }
            None => {}
        }
        record.is_complete()
    }

    pub fn parse_timestamp(&self, text: &str) -> Option<Timestamp> {
        let c = re_timestamp().captures(text)?;
        let year: i32 = c.get(1)?.as_str().parse().ok()?;
        let month: u32 = c.get(2)?.as_str().parse().ok()?;
        let day: u32 = c.get(3)?.as_str().parse().ok()?;
        let hour: u32 = c.get(4)?.as_str().parse().ok()?;
        let minute: u32 = c.get(5)?.as_str().parse().ok()?;

        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        let time = if self.keep_time_of_day {
            NaiveTime::from_hms_opt(hour, minute, 0)?
        } else {
            NaiveTime::from_hms_opt(0, 0, 0)?
        };
        self.zone.from_local_datetime(&date.and_time(time)).single()
    }
}

/// `sign digits "." two-digits`, stored as truncated cents.
pub fn parse_amount(text: &str) -> Option<Money> {
    if !re_amount().is_match(text) {
        return None;
    }
    text.parse().ok()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
