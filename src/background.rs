use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use tokio::time::sleep;
use tracing::{debug, error, info, info_span, Instrument};
use crate::state::AppState;

/// Persists time-driven status changes (UPCOMING -> ONGOING -> COMPLETED) on an interval.
pub async fn start_lifecycle_sweeper(state: Arc<AppState>) {
    let interval = Duration::from_secs(state.config.status_sweep_secs.max(1));
    info!("Starting event lifecycle sweeper (every {}s)...", interval.as_secs());

    loop {
        let now = Utc::now();
        let span = info_span!("lifecycle_sweep", at = %now);

        async {
            match state.catalog.advance_statuses(now).await {
                Ok(moved) if moved.is_empty() => debug!("No event changed status"),
                Ok(moved) => info!("Advanced {} event(s)", moved.len()),
                Err(e) => error!("Lifecycle sweep failed: {:?}", e),
            }
        }
            .instrument(span)
            .await;

        sleep(interval).await;
    }
}
