use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::Write;

/// RFC 3339 with millisecond precision, e.g. `2024-03-01T09:30:00.000Z`.
pub fn write_timestamp(buf: &mut String, timestamp: &DateTime<Utc>) {
  buf.push_str(&timestamp.to_rfc3339_opts(SecondsFormat::Millis, true));
}

/// Formats with a `strftime`-style string.
pub fn write_timestamp_with_format(buf: &mut String, timestamp: &DateTime<Utc>, format: &str) {
  let _ = write!(buf, "{}", timestamp.format(format));
}
