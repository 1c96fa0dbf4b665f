use crate::domain::{
    models::{
        dashboard::{ActivityKind, ActivityRow, EventTotals},
        event::{Event, EventCancellation, EventFilter},
    },
    ports::EventRepository,
};
use crate::error::AppError;
use crate::infra::repositories::{contains_pattern, event_activity_source};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

pub struct PostgresEventRepo {
    pool: PgPool,
}

impl PostgresEventRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PostgresEventRepo {
    async fn create(&self, event: &Event) -> Result<Event, AppError> {
        sqlx::query_as::<_, Event>(
            r#"INSERT INTO events (
                id, name, description, start_time, end_time, location, category, tags,
                is_online, capacity, registered_count, price_cents, status, creator_id, created_at, cancelled_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING *"#
        )
            .bind(&event.id)
            .bind(&event.name)
            .bind(&event.description)
            .bind(event.start_time)
            .bind(event.end_time)
            .bind(&event.location)
            .bind(&event.category)
            .bind(&event.tags)
            .bind(event.is_online)
            .bind(event.capacity)
            .bind(event.registered_count)
            .bind(event.price_cents)
            .bind(event.status)
            .bind(&event.creator_id)
            .bind(event.created_at)
            .bind(event.cancelled_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn list(&self, filter: &EventFilter) -> Result<Vec<Event>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM events WHERE TRUE");

        match &filter.creator_id {
            Some(creator_id) => { qb.push(" AND creator_id = ").push_bind(creator_id.clone()); }
            None => { qb.push(" AND status <> 'DRAFT'"); }
        }
        if let Some(category) = &filter.category {
            qb.push(" AND LOWER(category) = LOWER(").push_bind(category.clone()).push(")");
        }
        if let Some(q) = &filter.q {
            let pattern = contains_pattern(q.trim());
            qb.push(" AND (name ILIKE ").push_bind(pattern.clone()).push(" ESCAPE '\\'")
                .push(" OR description ILIKE ").push_bind(pattern.clone()).push(" ESCAPE '\\'")
                .push(" OR location ILIKE ").push_bind(pattern).push(" ESCAPE '\\'")
                .push(")");
        }
        if let Some(online) = filter.online {
            qb.push(" AND is_online = ").push_bind(online);
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status);
        }
        qb.push(" ORDER BY start_time ASC");

        qb.build_query_as::<Event>()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn publish(&self, id: &str) -> Result<Option<Event>, AppError> {
        sqlx::query_as::<_, Event>("UPDATE events SET status = 'UPCOMING' WHERE id = $1 AND status = 'DRAFT' RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn cancel(&self, id: &str, at: DateTime<Utc>) -> Result<Option<EventCancellation>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::from)?;

        let event = sqlx::query_as::<_, Event>(
            "UPDATE events SET status = 'CANCELLED', cancelled_at = $1, registered_count = 0
             WHERE id = $2 AND status <> 'CANCELLED'
             RETURNING *"
        )
            .bind(at)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::from)?;
        let Some(event) = event else {
            return Ok(None);
        };

        let registrations = sqlx::query(
            "UPDATE registrations SET status = 'CANCELLED', cancelled_at = $1
             WHERE event_id = $2 AND status = 'CONFIRMED'"
        )
            .bind(at)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::from)?
            .rows_affected();

        let tickets = sqlx::query(
            "UPDATE tickets SET status = 'CANCELLED', cancelled_at = $1
             WHERE event_id = $2 AND status <> 'CANCELLED'"
        )
            .bind(at)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::from)?
            .rows_affected();

        tx.commit().await.map_err(AppError::from)?;
        Ok(Some(EventCancellation { event, registrations, tickets }))
    }

    async fn try_reserve_seat(&self, id: &str, now: DateTime<Utc>) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE events SET registered_count = registered_count + 1
             WHERE id = $1 AND registered_count < capacity AND status IN ('UPCOMING', 'ONGOING') AND end_time > $2"
        )
            .bind(id)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(result.rows_affected() == 1)
    }

    async fn release_seat(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE events SET registered_count = GREATEST(registered_count - 1, 0) WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(())
    }

    async fn advance_statuses(&self, now: DateTime<Utc>) -> Result<Vec<Event>, AppError> {
        let mut moved = sqlx::query_as::<_, Event>(
            "UPDATE events SET status = 'COMPLETED' WHERE status IN ('UPCOMING', 'ONGOING') AND end_time <= $1 RETURNING *"
        )
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::from)?;

        let started = sqlx::query_as::<_, Event>(
            "UPDATE events SET status = 'ONGOING' WHERE status = 'UPCOMING' AND start_time <= $1 AND end_time > $1 RETURNING *"
        )
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::from)?;

        moved.extend(started);
        Ok(moved)
    }

    async fn totals_for_creator(&self, creator_id: &str) -> Result<EventTotals, AppError> {
        sqlx::query_as::<_, EventTotals>(
            "SELECT COUNT(*)::BIGINT AS total_events,
                    COUNT(*) FILTER (WHERE status = 'UPCOMING' AND start_time > $1)::BIGINT AS upcoming_events
             FROM events WHERE creator_id = $2"
        )
            .bind(Utc::now())
            .bind(creator_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn list_upcoming_for_creator(&self, creator_id: &str, limit: i64) -> Result<Vec<Event>, AppError> {
        sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE creator_id = $1 AND status = 'UPCOMING' AND start_time > $2 ORDER BY start_time ASC LIMIT $3"
        )
            .bind(creator_id)
            .bind(Utc::now())
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn recent_activity(&self, kind: ActivityKind, organizer_id: Option<&str>, limit: i64) -> Result<Vec<ActivityRow>, AppError> {
        let Some((column, condition)) = event_activity_source(kind) else {
            return Ok(vec![]);
        };

        let sql = format!(
            "SELECT id AS event_id, name AS event_name, creator_id AS actor_id, {column} AS occurred_at
             FROM events
             WHERE {condition} AND ($1::TEXT IS NULL OR creator_id = $1)
             ORDER BY {column} DESC LIMIT $2"
        );
        sqlx::query_as::<_, ActivityRow>(&sql)
            .bind(organizer_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::from)
    }
}
