/// Arrival time of a reading or creation time of a notification. Always UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
