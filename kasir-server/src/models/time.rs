//! Timestamps in the shop's local time zone

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Zone every API timestamp is rendered in
pub const LOCAL_TZ: Tz = chrono_tz::Asia::Jakarta;

pub fn to_local(ts: DateTime<Utc>) -> DateTime<Tz> {
    ts.with_timezone(&LOCAL_TZ)
}
