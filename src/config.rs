use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_public_key: String, // Ed25519 public key (PEM) of the external auth provider
    pub auth_issuer: String,
    pub auth_audience: String,
    pub status_sweep_secs: u64,
    pub store_max_retries: u32,
    pub store_initial_backoff_ms: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            jwt_public_key: env::var("JWT_PUBLIC_KEY").expect("JWT_PUBLIC_KEY must be set (Ed25519 Public Key)"),
            auth_issuer: env::var("AUTH_ISSUER").unwrap_or_else(|_| "https://auth.eventhub.local".to_string()),
            auth_audience: env::var("AUTH_AUDIENCE").unwrap_or_else(|_| "eventhub-frontend".to_string()),
            status_sweep_secs: env::var("STATUS_SWEEP_SECS").unwrap_or_else(|_| "30".to_string()).parse().expect("STATUS_SWEEP_SECS must be a number"),
            store_max_retries: env::var("STORE_MAX_RETRIES").unwrap_or_else(|_| "3".to_string()).parse().expect("STORE_MAX_RETRIES must be a number"),
            store_initial_backoff_ms: env::var("STORE_INITIAL_BACKOFF_MS").unwrap_or_else(|_| "50".to_string()).parse().expect("STORE_INITIAL_BACKOFF_MS must be a number"),
        }
    }
}
