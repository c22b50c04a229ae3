use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Where the `products` table lives.
///
/// `Postgres` talks to the database directly through sqlx; `Rest` goes through
/// a PostgREST endpoint (e.g. Supabase) authenticated with a service-role key.
#[derive(Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Postgres { database_url: String },
    Rest { endpoint: String, service_key: String },
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreConfig::Postgres { .. } => f
                .debug_struct("Postgres")
                .field("database_url", &"[redacted]")
                .finish(),
            StoreConfig::Rest { endpoint, .. } => f
                .debug_struct("Rest")
                .field("endpoint", endpoint)
                .field("service_key", &"[redacted]")
                .finish(),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub store: StoreConfig,
    pub sheet_id: Option<String>,
    pub credentials_base64: Option<String>,
    pub credentials_path: Option<PathBuf>,
    pub sync_secret: Option<String>,
    pub sync_cron: Option<String>,
    pub http_timeout_secs: u64,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("store", &self.store)
            .field("sheet_id", &self.sheet_id)
            .field(
                "credentials_base64",
                &self.credentials_base64.as_ref().map(|_| "[redacted]"),
            )
            .field("credentials_path", &self.credentials_path)
            .field(
                "sync_secret",
                &self.sync_secret.as_ref().map(|_| "[redacted]"),
            )
            .field("sync_cron", &self.sync_cron)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
