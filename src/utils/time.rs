use chrono::{DateTime, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// `candidate`, pushed forward to `floor` when the clock lags behind a
/// previously recorded moment.
pub fn not_before(candidate: DateTime<Utc>, floor: DateTime<Utc>) -> DateTime<Utc> {
    candidate.max(floor)
}
