use eventhub_backend::{
    api::router::create_router,
    config::Config,
    domain::models::principal::{Claims, Principal, Role},
    infra::factory::{build_state, Repositories},
    state::AppState,
};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use sqlx::{sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions}, Pool, Sqlite};
use std::str::FromStr;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const ISSUER: &str = "test-issuer";
pub const AUDIENCE: &str = "eventhub-frontend";

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            jwt_public_key: include_str!("../tests/keys/test_public.pem").to_string(),
            auth_issuer: ISSUER.to_string(),
            auth_audience: AUDIENCE.to_string(),
            status_sweep_secs: 30,
            store_max_retries: 3,
            store_initial_backoff_ms: 10,
        };

        let state = Arc::new(build_state(&config, Repositories::sqlite(pool.clone())));
        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    pub fn repos(&self) -> Repositories {
        Repositories::sqlite(self.pool.clone())
    }

    /// Signs an access token the way the external auth provider would.
    pub fn token(&self, user_id: &str, role: Role) -> String {
        let now = Utc::now();
        let claims = Claims {
            iss: ISSUER.to_string(),
            sub: user_id.to_string(),
            aud: AUDIENCE.to_string(),
            exp: (now + Duration::hours(1)).timestamp() as usize,
            iat: now.timestamp() as usize,
            role,
        };
        let key = EncodingKey::from_ed_pem(include_bytes!("../tests/keys/test_private.pem")).unwrap();
        encode(&Header::new(Algorithm::EdDSA), &claims, &key).unwrap()
    }

    pub fn organizer(&self, id: &str) -> (Principal, String) {
        (Principal::new(id, Role::Organizer), self.token(id, Role::Organizer))
    }

    pub fn attendee(&self, id: &str) -> (Principal, String) {
        (Principal::new(id, Role::Attendee), self.token(id, Role::Attendee))
    }

    pub fn scanner(&self, id: &str) -> (Principal, String) {
        (Principal::new(id, Role::Scanner), self.token(id, Role::Scanner))
    }

    pub async fn call(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, json)
    }

    /// Creates an event starting tomorrow and returns its JSON. `overrides` are merged into the payload.
    pub async fn create_event(&self, token: &str, overrides: Value) -> Value {
        let start = Utc::now() + Duration::days(1);
        let mut payload = json!({
            "name": "Tech Conference",
            "description": "Annual technology conference",
            "start_time": start.to_rfc3339(),
            "end_time": (start + Duration::hours(8)).to_rfc3339(),
            "location": "Convention Center",
            "category": "Technology",
            "tags": ["tech", "networking"],
            "capacity": 100,
            "price_cents": 0
        });
        if let (Some(base), Some(extra)) = (payload.as_object_mut(), overrides.as_object()) {
            for (k, v) in extra {
                base.insert(k.clone(), v.clone());
            }
        }

        let (status, body) = self.call("POST", "/api/v1/events", Some(token), Some(payload)).await;
        assert_eq!(status, StatusCode::CREATED, "event creation failed: {}", body);
        body
    }

    pub async fn register(&self, event_id: &str, token: &str) -> (StatusCode, Value) {
        self.call("POST", &format!("/api/v1/events/{}/registrations", event_id), Some(token), None).await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}
