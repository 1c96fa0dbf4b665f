use std::sync::Arc;

use chrono::Utc;

use crate::domain::models::dashboard::{Activity, ActivityKind, ActivityRow, EventPerformance, OrganizerStats, UpcomingEvent};
use crate::domain::models::principal::Principal;
use crate::domain::ports::{EventRepository, RegistrationRepository};
use crate::domain::services::retry::{retry_transient, RetryPolicy};
use crate::error::AppError;

pub const MAX_ACTIVITY_LIMIT: usize = 100;
pub const DEFAULT_UPCOMING_LIMIT: i64 = 5;

/// Read-only rollups over the catalog and ledger stores. Nothing here writes.
pub struct DashboardAggregator {
    events: Arc<dyn EventRepository>,
    registrations: Arc<dyn RegistrationRepository>,
    retry: RetryPolicy,
}

impl DashboardAggregator {
    pub fn new(events: Arc<dyn EventRepository>, registrations: Arc<dyn RegistrationRepository>, retry: RetryPolicy) -> Self {
        Self { events, registrations, retry }
    }

    pub async fn stats_for_organizer(&self, organizer_id: &str) -> Result<OrganizerStats, AppError> {
        let events = retry_transient(self.retry, "event_totals", move || self.events.totals_for_creator(organizer_id)).await?;
        if events.total_events == 0 {
            return Err(AppError::NotFound(format!("Organizer {} has no events", organizer_id)));
        }

        let registrations = retry_transient(self.retry, "registration_totals", move || {
            self.registrations.totals_for_creator(organizer_id)
        }).await?;

        Ok(OrganizerStats {
            organizer_id: organizer_id.to_string(),
            total_events: events.total_events,
            upcoming_events: events.upcoming_events,
            total_registrations: registrations.total_registrations,
            revenue_cents: registrations.revenue_cents,
        })
    }

    /// Registrations, check-ins and revenue of one event. Creator only.
    pub async fn event_performance(&self, event_id: &str, principal: &Principal) -> Result<EventPerformance, AppError> {
        let event = retry_transient(self.retry, "find_event", move || self.events.find_by_id(event_id)).await?
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", event_id)))?
            .with_current_status(Utc::now());
        if !event.is_owned_by(&principal.id) {
            return Err(AppError::Forbidden("Only the event creator can view its performance".into()));
        }

        let attendance = retry_transient(self.retry, "event_attendance", move || {
            self.registrations.attendance_for_event(event_id)
        }).await?;

        Ok(EventPerformance {
            revenue_cents: attendance.confirmed * event.price_cents,
            event_id: event.id,
            event_name: event.name,
            status: event.status,
            capacity: event.capacity,
            confirmed: attendance.confirmed,
            cancelled: attendance.cancelled,
            checked_in: attendance.checked_in,
        })
    }

    /// Most recent activity first. `limit` is clamped to 1..=100.
    pub async fn recent_activity(&self, limit: usize, organizer_id: Option<&str>) -> Result<Vec<Activity>, AppError> {
        let limit = limit.clamp(1, MAX_ACTIVITY_LIMIT);
        let per_kind = limit as i64;

        let mut batches = Vec::new();
        for kind in [ActivityKind::Registration, ActivityKind::Cancellation] {
            let rows = retry_transient(self.retry, "registration_activity", move || {
                self.registrations.recent_activity(kind, organizer_id, per_kind)
            }).await?;
            batches.push((kind, rows));
        }
        for kind in [
            ActivityKind::EventCreated,
            ActivityKind::EventCancelled,
            ActivityKind::EventStarted,
            ActivityKind::EventCompleted,
        ] {
            let rows = retry_transient(self.retry, "event_activity", move || {
                self.events.recent_activity(kind, organizer_id, per_kind)
            }).await?;
            batches.push((kind, rows));
        }

        Ok(merge_recent(batches, limit))
    }

    pub async fn upcoming_events(&self, organizer_id: &str, limit: i64) -> Result<Vec<UpcomingEvent>, AppError> {
        let events = retry_transient(self.retry, "upcoming_events", move || {
            self.events.list_upcoming_for_creator(organizer_id, limit)
        }).await?;

        Ok(events.into_iter().map(|e| UpcomingEvent {
            id: e.id,
            name: e.name,
            start_time: e.start_time,
            location: e.location,
            registered_count: e.registered_count,
            capacity: e.capacity,
        }).collect())
    }
}

fn merge_recent(batches: Vec<(ActivityKind, Vec<ActivityRow>)>, limit: usize) -> Vec<Activity> {
    let mut merged: Vec<Activity> = batches.into_iter()
        .flat_map(|(kind, rows)| rows.into_iter().map(move |row| Activity::from_row(kind, row)))
        .collect();
    merged.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
    merged.truncate(limit);
    merged
}
