use time::{Duration, PrimitiveDateTime};

pub(crate) fn attempt_deadline(
    started_at: PrimitiveDateTime,
    duration_minutes: i32,
) -> PrimitiveDateTime {
    started_at + Duration::minutes(i64::from(duration_minutes))
}

/// Answers are accepted up to and including the deadline instant.
pub(crate) fn is_expired(
    started_at: PrimitiveDateTime,
    duration_minutes: i32,
    now: PrimitiveDateTime,
) -> bool {
    now > attempt_deadline(started_at, duration_minutes)
}

/// Submission stays open for `grace_seconds` past the deadline.
pub(crate) fn can_submit(
    started_at: PrimitiveDateTime,
    duration_minutes: i32,
    grace_seconds: u64,
    now: PrimitiveDateTime,
) -> bool {
    let grace = Duration::seconds(i64::try_from(grace_seconds).unwrap_or(0));
    now <= attempt_deadline(started_at, duration_minutes) + grace
}
