use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// A recognized date-time in the civil zone the reader was configured with.
pub type Timestamp = DateTime<FixedOffset>;

/// Amount and timestamp read from one screenshot.
///
/// Both fields start empty and are filled as text bands are interpreted.
/// The first value seen for a field is kept; a record is only handed to
/// callers once [`ExtractedRecord::is_complete`] holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    pub amount: Option<Money>,
    pub timestamp: Option<Timestamp>,
}

impl ExtractedRecord {
    pub fn new(amount: Money, timestamp: Timestamp) -> Self {
        Self { amount: Some(amount), timestamp: Some(timestamp) }
    }

    pub fn is_complete(&self) -> bool {
        self.amount.is_some() && self.timestamp.is_some()
    }

    /// Returns `true` if the amount was stored, `false` if one was already present.
    pub fn offer_amount(&mut self, amount: Money) -> bool {
        if self.amount.is_some() {
            return false;
        }
        self.amount = Some(amount);
        true
    }

    /// Returns `true` if the timestamp was stored, `false` if one was already present.
    pub fn offer_timestamp(&mut self, timestamp: Timestamp) -> bool {
        if self.timestamp.is_some() {
            return false;
        }
        self.timestamp = Some(timestamp);
        true
    }

    pub fn amount_cents(&self) -> Option<i64> {
        self.amount.and_then(Money::to_cents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(day: u32) -> Timestamp {
        FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, day, 0, 0, 0)
            .unwrap()
    }

    #[test]
    fn empty_record_is_incomplete() {
        let r = ExtractedRecord::default();
        assert!(!r.is_complete());
        assert_eq!(r.amount_cents(), None);
    }

    #[test]
    fn first_value_wins() {
        let mut r = ExtractedRecord::default();
        assert!(r.offer_amount(Money::from_cents(-999)));
        assert!(!r.offer_amount(Money::from_cents(100)));
        assert!(!r.is_complete());
        assert!(r.offer_timestamp(ts(7)));
        assert!(!r.offer_timestamp(ts(8)));
        assert!(r.is_complete());
        assert_eq!(r.amount_cents(), Some(-999));
        assert_eq!(r.timestamp, Some(ts(7)));
    }

    #[test]
    fn serializes_timestamp_with_offset() {
        let r = ExtractedRecord::new(Money::from_cents(1234), ts(7));
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("2024-03-07T00:00:00+08:00"), "json was {json}");
    }
}
