pub mod money;
pub mod record;

pub use money::{Money, MoneyParseError};
pub use record::{ExtractedRecord, Timestamp};
