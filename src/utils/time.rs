use chrono::{DateTime, Utc};

/// Wall clock for request handlers; services take `now` as an argument.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}
