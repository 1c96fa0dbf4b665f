use crate::domain::models::dashboard::ActivityKind;

pub mod sqlite_event_repo;
pub mod sqlite_registration_repo;
pub mod sqlite_ticket_repo;
pub mod sqlite_scanner_repo;

pub mod postgres_event_repo;
pub mod postgres_registration_repo;
pub mod postgres_ticket_repo;
pub mod postgres_scanner_repo;

/// Timestamp column and row condition that turn an `events` row into an activity of `kind`.
/// `None` for kinds sourced from registrations.
pub(crate) fn event_activity_source(kind: ActivityKind) -> Option<(&'static str, &'static str)> {
    match kind {
        ActivityKind::EventCreated => Some(("created_at", "status <> 'DRAFT'")),
        ActivityKind::EventCancelled => Some(("cancelled_at", "cancelled_at IS NOT NULL")),
        ActivityKind::EventStarted => Some(("start_time", "status IN ('ONGOING', 'COMPLETED')")),
        ActivityKind::EventCompleted => Some(("end_time", "status = 'COMPLETED'")),
        ActivityKind::Registration | ActivityKind::Cancellation => None,
    }
}

/// Same as [`event_activity_source`] for the `registrations r` side of the join.
pub(crate) fn registration_activity_source(kind: ActivityKind) -> Option<(&'static str, &'static str)> {
    match kind {
        ActivityKind::Registration => Some(("r.created_at", "1 = 1")),
        ActivityKind::Cancellation => Some(("r.cancelled_at", "r.cancelled_at IS NOT NULL")),
        _ => None,
    }
}

/// `%q%` with LIKE wildcards in `q` escaped. Pair with `ESCAPE '\'`.
pub(crate) fn contains_pattern(q: &str) -> String {
    let mut pattern = String::with_capacity(q.len() + 2);
    pattern.push('%');
    for c in q.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
