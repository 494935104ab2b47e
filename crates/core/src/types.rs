/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Host-side instants are whole seconds since the Unix epoch.
pub type EpochSeconds = i64;
