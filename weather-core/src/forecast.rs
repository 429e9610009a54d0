use chrono::{DateTime, Duration, FixedOffset, Utc};
use tracing::warn;

use crate::model::HourlyEntry;

/// How far ahead the report looks.
pub const WINDOW_HOURS: i64 = 4;

/// Parse a provider timestamp such as `2024-06-01T14:00+08:00`.
///
/// The provider omits seconds, so both `HH:MM` and `HH:MM:SS` forms are accepted.
pub fn parse_fx_time(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M%:z"))
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M%z"))
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M%#z"))
        .ok()
}

/// Keep entries with `now < t <= now + 4h`, preserving input order.
///
/// Entries without a parseable timestamp are dropped.
pub fn within_window(entries: &[HourlyEntry], now: DateTime<Utc>) -> Vec<HourlyEntry> {
    let cutoff = now + Duration::hours(WINDOW_HOURS);

    entries
        .iter()
        .filter(|entry| {
            let Some(raw) = entry.fx_time.as_deref() else {
                warn!("dropping hourly entry without fxTime");
                return false;
            };
            let Some(t) = parse_fx_time(raw) else {
                warn!(fx_time = raw, "dropping hourly entry with unparseable fxTime");
                return false;
            };

            let t = t.with_timezone(&Utc);
            now < t && t <= cutoff
        })
        .cloned()
        .collect()
}
