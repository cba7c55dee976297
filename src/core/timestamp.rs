//! Timestamp rendering driven by the record's flags
//!
//! Layout follows the classic stdlib logger: `2009/01/23 01:23:23.123123`.
//! Date and time parts are independent; microseconds only apply when the
//! time part is present.

use super::flags::Flags;
use chrono::{DateTime, FixedOffset, Local, Utc};
use std::sync::Arc;

/// Function used by a logger to stamp records
pub type TimeSource = Arc<dyn Fn() -> DateTime<FixedOffset> + Send + Sync>;

/// The wall clock in the local offset
#[must_use]
pub fn system_time_source() -> TimeSource {
    Arc::new(|| Local::now().fixed_offset())
}

/// A time source that always returns `at`
#[must_use]
pub fn fixed_time_source(at: DateTime<FixedOffset>) -> TimeSource {
    Arc::new(move || at)
}

/// Render `time` according to `flags`; empty when neither date nor time is set
#[must_use]
pub fn format_timestamp(time: &DateTime<FixedOffset>, flags: Flags) -> String {
    let have_date = flags.contains(Flags::DATE);
    let have_time = flags.contains(Flags::TIME);
    let pattern = match (have_date, have_time, flags.contains(Flags::MICROSECONDS)) {
        (false, false, _) => return String::new(),
        (true, false, _) => "%Y/%m/%d",
        (false, true, false) => "%H:%M:%S",
        (false, true, true) => "%H:%M:%S%.6f",
        (true, true, false) => "%Y/%m/%d %H:%M:%S",
        (true, true, true) => "%Y/%m/%d %H:%M:%S%.6f",
    };

    let time = if flags.contains(Flags::UTC) {
        time.with_timezone(&Utc).fixed_offset()
    } else {
        *time
    };
    time.format(pattern).to_string()
}
