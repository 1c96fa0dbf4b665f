use crate::domain::{models::scanner::EventScanner, ports::ScannerRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresScannerRepo {
    pool: PgPool,
}

impl PostgresScannerRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScannerRepository for PostgresScannerRepo {
    async fn add(&self, scanner: &EventScanner) -> Result<EventScanner, AppError> {
        sqlx::query_as::<_, EventScanner>(
            "INSERT INTO event_scanners (event_id, scanner_id, added_at) VALUES ($1, $2, $3) RETURNING *"
        )
            .bind(&scanner.event_id)
            .bind(&scanner.scanner_id)
            .bind(scanner.added_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                    AppError::Conflict("Scanner already assigned to this event".into())
                }
                _ => AppError::from(e),
            })
    }

    async fn remove(&self, event_id: &str, scanner_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM event_scanners WHERE event_id = $1 AND scanner_id = $2")
            .bind(event_id)
            .bind(scanner_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, event_id: &str) -> Result<Vec<EventScanner>, AppError> {
        sqlx::query_as::<_, EventScanner>("SELECT * FROM event_scanners WHERE event_id = $1 ORDER BY added_at ASC")
            .bind(event_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn is_assigned(&self, event_id: &str, scanner_id: &str) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM event_scanners WHERE event_id = $1 AND scanner_id = $2)"
        )
            .bind(event_id)
            .bind(scanner_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from)
    }
}
