use std::net::SocketAddr;

use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite://newsint.db";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_EMBEDDING_URL: &str = "http://localhost:8080";
const DEFAULT_LLM_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_LLM_MODEL: &str = "llama-3.3-70b-versatile";
const DEFAULT_DUPLICATE_THRESHOLD: f32 = 0.85;
const DEFAULT_COLLABORATOR_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_DB_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_DB_ACQUIRE_TIMEOUT_SECS: u64 = 10;

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

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub embedding_url: String,
    pub llm_url: String,
    pub llm_api_key: Option<String>,
    pub llm_model: String,
    pub duplicate_threshold: f32,
    pub collaborator_timeout_secs: u64,
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
            .field("database_url", &"[redacted]")
            .field("embedding_url", &self.embedding_url)
            .field("llm_url", &self.llm_url)
            .field(
                "llm_api_key",
                &self.llm_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("llm_model", &self.llm_model)
            .field("duplicate_threshold", &self.duplicate_threshold)
            .field(
                "collaborator_timeout_secs",
                &self.collaborator_timeout_secs,
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}

/// Load application configuration from environment variables.
///
/// All values have development-friendly defaults; only malformed values
/// (an unparseable bind address or environment name) are rejected.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if `NEWSINT_BIND_ADDR` or
/// `NEWSINT_ENV` is set to an unparseable value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    let database_url = read_string("DATABASE_URL", DEFAULT_DATABASE_URL);
    let env = parse_environment(&read_string("NEWSINT_ENV", "development"))?;

    let bind_raw = read_string("NEWSINT_BIND_ADDR", DEFAULT_BIND_ADDR);
    let bind_addr: SocketAddr = bind_raw
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            var: "NEWSINT_BIND_ADDR",
            value: bind_raw.clone(),
        })?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level: read_string("NEWSINT_LOG_LEVEL", DEFAULT_LOG_LEVEL),
        embedding_url: read_string("NEWSINT_EMBEDDING_URL", DEFAULT_EMBEDDING_URL),
        llm_url: read_string("NEWSINT_LLM_URL", DEFAULT_LLM_URL),
        llm_api_key: std::env::var("NEWSINT_LLM_API_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty()),
        llm_model: read_string("NEWSINT_LLM_MODEL", DEFAULT_LLM_MODEL),
        duplicate_threshold: read_f32(
            "NEWSINT_DUPLICATE_THRESHOLD",
            DEFAULT_DUPLICATE_THRESHOLD,
        )
        .clamp(0.0, 1.0),
        collaborator_timeout_secs: read_u64(
            "NEWSINT_COLLABORATOR_TIMEOUT_SECS",
            DEFAULT_COLLABORATOR_TIMEOUT_SECS,
        ),
        db_max_connections: read_u32("NEWSINT_DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
        db_min_connections: read_u32("NEWSINT_DB_MIN_CONNECTIONS", DEFAULT_DB_MIN_CONNECTIONS),
        db_acquire_timeout_secs: read_u64(
            "NEWSINT_DB_ACQUIRE_TIMEOUT_SECS",
            DEFAULT_DB_ACQUIRE_TIMEOUT_SECS,
        ),
    })
}

fn parse_environment(raw: &str) -> Result<Environment, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "development" | "dev" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" | "prod" => Ok(Environment::Production),
        _ => Err(ConfigError::InvalidValue {
            var: "NEWSINT_ENV",
            value: raw.to_string(),
        }),
    }
}

fn read_string(var: &str, default: &str) -> String {
    std::env::var(var)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn read_u32(var: &str, default: u32) -> u32 {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(default)
}

fn read_u64(var: &str, default: u64) -> u64 {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn read_f32(var: &str, default: f32) -> f32 {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse::<f32>().ok())
        .unwrap_or(default)
}
