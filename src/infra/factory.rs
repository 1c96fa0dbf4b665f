use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::domain::ports::{EventRepository, RegistrationRepository, ScannerRepository, TicketRepository};
use crate::domain::services::{
    catalog::EventCatalog, dashboard::DashboardAggregator, ledger::RegistrationLedger,
    retry::RetryPolicy, tickets::TicketIssuer,
};
use crate::infra::repositories::{
    postgres_event_repo::PostgresEventRepo, postgres_registration_repo::PostgresRegistrationRepo,
    postgres_scanner_repo::PostgresScannerRepo, postgres_ticket_repo::PostgresTicketRepo,
    sqlite_event_repo::SqliteEventRepo, sqlite_registration_repo::SqliteRegistrationRepo,
    sqlite_scanner_repo::SqliteScannerRepo, sqlite_ticket_repo::SqliteTicketRepo,
};

/// The four stores behind the services, whichever backend they live on.
pub struct Repositories {
    pub events: Arc<dyn EventRepository>,
    pub registrations: Arc<dyn RegistrationRepository>,
    pub tickets: Arc<dyn TicketRepository>,
    pub scanners: Arc<dyn ScannerRepository>,
}

impl Repositories {
    pub fn sqlite(pool: SqlitePool) -> Self {
        Self {
            events: Arc::new(SqliteEventRepo::new(pool.clone())),
            registrations: Arc::new(SqliteRegistrationRepo::new(pool.clone())),
            tickets: Arc::new(SqliteTicketRepo::new(pool.clone())),
            scanners: Arc::new(SqliteScannerRepo::new(pool)),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            events: Arc::new(PostgresEventRepo::new(pool.clone())),
            registrations: Arc::new(PostgresRegistrationRepo::new(pool.clone())),
            tickets: Arc::new(PostgresTicketRepo::new(pool.clone())),
            scanners: Arc::new(PostgresScannerRepo::new(pool)),
        }
    }
}

/// Wires the services on top of `repos`. Used by the server and by tests.
pub fn build_state(config: &Config, repos: Repositories) -> AppState {
    let retry = RetryPolicy::from_config(config);

    let catalog = Arc::new(EventCatalog::new(repos.events.clone(), repos.scanners, retry));
    let tickets = Arc::new(TicketIssuer::new(repos.tickets, catalog.clone(), retry));
    let ledger = Arc::new(RegistrationLedger::new(repos.registrations.clone(), catalog.clone(), tickets.clone(), retry));
    let dashboard = Arc::new(DashboardAggregator::new(repos.events, repos.registrations, retry));

    AppState {
        config: config.clone(),
        catalog,
        ledger,
        tickets,
        dashboard,
    }
}

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        build_state(config, Repositories::postgres(pool))
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        build_state(config, Repositories::sqlite(pool))
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
