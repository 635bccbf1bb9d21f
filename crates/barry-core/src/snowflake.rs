//! Snowflake helpers.
//!
//! Discord IDs are 64-bit integers whose upper 42 bits hold the number of
//! milliseconds elapsed since the Discord epoch (the first second of 2015).

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// The Discord epoch, in milliseconds since the Unix epoch.
pub const DISCORD_EPOCH: u64 = 1_420_070_400_000;

/// Number of low bits that do not belong to the timestamp.
const TIMESTAMP_SHIFT: u32 = 22;

/// Extracts the creation timestamp (Unix milliseconds) embedded in a snowflake.
///
/// Returns `None` when the string is not a valid unsigned 64-bit integer.
///
/// # Example
///
/// ```
/// use barry_core::snowflake::extract_timestamp;
///
/// assert_eq!(extract_timestamp("175928847299117063"), Some(1_462_015_105_796));
/// ```
pub fn extract_timestamp(snowflake: &str) -> Option<u64> {
    let id: u64 = snowflake.parse().ok()?;
    Some((id >> TIMESTAMP_SHIFT) + DISCORD_EPOCH)
}

/// Same as [`extract_timestamp`], converted to a [`SystemTime`].
pub fn created_at(snowflake: &str) -> Option<SystemTime> {
    extract_timestamp(snowflake).map(|ms| UNIX_EPOCH + Duration::from_millis(ms))
}

/// Formats a point in time as a Discord relative timestamp markdown tag
/// (`<t:UNIX:R>`), rendered client-side as e.g. "in 5 minutes".
pub fn relative_timestamp(time: SystemTime) -> String {
    let secs = time
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    format!("<t:{secs}:R>")
}
