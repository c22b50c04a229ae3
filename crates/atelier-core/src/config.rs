use crate::app_config::{AppConfig, Environment, StoreConfig};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Blank values are treated the same as unset ones so that an empty line in a
/// `.env` file does not masquerade as configuration.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default =
        |var: &str, default: &str| -> String { optional(var).unwrap_or_else(|| default.to_string()) };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let store = match (
        optional("DATABASE_URL"),
        optional("SUPABASE_URL"),
        optional("SUPABASE_SERVICE_ROLE_KEY"),
    ) {
        (Some(database_url), _, _) => StoreConfig::Postgres { database_url },
        (None, Some(endpoint), Some(service_key)) => StoreConfig::Rest {
            endpoint,
            service_key,
        },
        (None, Some(_), None) => {
            return Err(ConfigError::MissingEnvVar(
                "SUPABASE_SERVICE_ROLE_KEY".to_string(),
            ))
        }
        (None, None, _) => {
            return Err(ConfigError::MissingEnvVar(
                "DATABASE_URL or SUPABASE_URL".to_string(),
            ))
        }
    };

    let env = parse_environment(&or_default("ATELIER_ENV", "development"))?;

    let raw_bind = or_default("ATELIER_BIND_ADDR", "0.0.0.0:3000");
    let bind_addr = raw_bind
        .parse::<SocketAddr>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "ATELIER_BIND_ADDR".to_string(),
            reason: e.to_string(),
        })?;

    let log_level = or_default("ATELIER_LOG_LEVEL", "info");

    let http_timeout_secs = parse_u64("ATELIER_HTTP_TIMEOUT_SECS", "30")?;
    let db_max_connections = parse_u32("ATELIER_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("ATELIER_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("ATELIER_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    if db_min_connections > db_max_connections {
        return Err(ConfigError::InvalidEnvVar {
            var: "ATELIER_DB_MIN_CONNECTIONS".to_string(),
            reason: format!(
                "min connections ({db_min_connections}) exceeds max connections ({db_max_connections})"
            ),
        });
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        store,
        sheet_id: optional("GOOGLE_SHEET_ID"),
        credentials_base64: optional("GOOGLE_CREDENTIALS_BASE64"),
        credentials_path: optional("GOOGLE_APPLICATION_CREDENTIALS").map(PathBuf::from),
        sync_secret: optional("SYNC_SECRET"),
        sync_cron: optional("ATELIER_SYNC_CRON"),
        http_timeout_secs,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "ATELIER_ENV".to_string(),
            reason: format!("expected development, test, or production; got {other:?}"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
