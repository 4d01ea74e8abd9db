//! Server configuration from environment variables.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `DATABASE_URL` | `postgres://localhost/folio` |
//! | `HOST` / `PORT` | `0.0.0.0` / `3000` |
//! | `DB_MAX_CONNECTIONS` | `10` |
//! | `STAGE_TTL_SECS` | `300` |
//! | `RATE_LIMIT_ENABLED` | `true` |
//! | `RATE_LIMIT_REQUESTS` / `RATE_LIMIT_PERIOD_SECS` | `100` / `60` |
//! | `ALLOWED_ORIGINS` | `http://localhost:3000` |
//! | `LOG_FORMAT` | `text` (`json` for structured output) |
//! | `LOG_FILE` | unset (stdout only) |
//! | `LOG_ANSI` | auto-detected |

use std::time::Duration;

use folio_core::defaults;
use folio_core::Error;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/folio";
const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    pub file: Option<String>,
    pub ansi: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub stage_ttl: Duration,
    pub rate_limit_enabled: bool,
    pub rate_limit_requests: u32,
    pub rate_limit_period: Duration,
    pub allowed_origins: Vec<String>,
    pub log: LogConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            host: defaults::SERVER_HOST.to_string(),
            port: defaults::SERVER_PORT,
            db_max_connections: defaults::DB_MAX_CONNECTIONS,
            stage_ttl: Duration::from_secs(defaults::STAGE_TTL_SECS),
            rate_limit_enabled: true,
            rate_limit_requests: defaults::RATE_LIMIT_REQUESTS as u32,
            rate_limit_period: Duration::from_secs(defaults::RATE_LIMIT_PERIOD_SECS),
            allowed_origins: vec![DEFAULT_ALLOWED_ORIGIN.to_string()],
            log: LogConfig {
                format: LogFormat::Text,
                file: None,
                ansi: None,
            },
        }
    }
}

impl ApiConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`. Unset variables fall back to
    /// defaults; set but unparsable values are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let rate_limit_requests: u32 = parse_or(&var, "RATE_LIMIT_REQUESTS", base.rate_limit_requests)?;
        let rate_limit_period_secs: u64 =
            parse_or(&var, "RATE_LIMIT_PERIOD_SECS", base.rate_limit_period.as_secs())?;
        if rate_limit_requests == 0 || rate_limit_period_secs == 0 {
            return Err(Error::Config(
                "RATE_LIMIT_REQUESTS and RATE_LIMIT_PERIOD_SECS must be non-zero".to_string(),
            ));
        }

        let log_format = match var("LOG_FORMAT").as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(Error::Config(format!(
                    "LOG_FORMAT must be 'text' or 'json', got '{}'",
                    other
                )))
            }
        };

        let allowed_origins = match var("ALLOWED_ORIGINS") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            None => base.allowed_origins,
        };

        Ok(Self {
            database_url: var("DATABASE_URL").unwrap_or(base.database_url),
            host: var("HOST").unwrap_or(base.host),
            port: parse_or(&var, "PORT", base.port)?,
            db_max_connections: parse_or(&var, "DB_MAX_CONNECTIONS", base.db_max_connections)?,
            stage_ttl: Duration::from_secs(parse_or(
                &var,
                "STAGE_TTL_SECS",
                base.stage_ttl.as_secs(),
            )?),
            rate_limit_enabled: var("RATE_LIMIT_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(base.rate_limit_enabled),
            rate_limit_requests,
            rate_limit_period: Duration::from_secs(rate_limit_period_secs),
            allowed_origins,
            log: LogConfig {
                format: log_format,
                file: var("LOG_FILE"),
                ansi: var("LOG_ANSI").map(|v| v == "true" || v == "1"),
            },
        })
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> Result<T, Error>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} is not a valid number: '{}'", key, raw))),
        None => Ok(default),
    }
}
