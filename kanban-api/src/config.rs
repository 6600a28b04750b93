//! API Configuration Module
//!
//! CORS, bind address, storage backend selection and move retry settings.
//! Configuration is loaded from environment variables with defaults suited
//! to local development.

use std::net::SocketAddr;
use thiserror::Error;

/// Configuration errors raised at startup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration: {field}")]
    MissingRequired { field: String },

    #[error("Invalid configuration value for {field}: {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

// ============================================================================
// STORAGE BACKEND
// ============================================================================

/// Which store backs the board service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageBackend {
    #[default]
    Postgres,
    /// Process-local store; state is lost on restart.
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Postgres => "postgres",
            StorageBackend::Memory => "memory",
        }
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(StorageBackend::Postgres),
            "memory" | "mem" => Ok(StorageBackend::Memory),
            other => Err(ConfigError::InvalidValue {
                field: "KANBAN_STORAGE".to_string(),
                value: other.to_string(),
                reason: "expected 'postgres' or 'memory'".to_string(),
            }),
        }
    }
}

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// Default number of attempts for a move that keeps hitting conflicts.
pub const DEFAULT_MOVE_RETRY_LIMIT: u32 = 3;

/// API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    // ========================================================================
    // CORS Configuration
    // ========================================================================
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Whether to allow credentials in CORS requests.
    pub cors_allow_credentials: bool,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    // ========================================================================
    // Server
    // ========================================================================
    pub bind_addr: SocketAddr,

    pub storage_backend: StorageBackend,

    /// Total attempts for a move before giving up with a conflict error.
    pub move_retry_limit: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            cors_allow_credentials: false,
            cors_max_age_secs: 86400,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            storage_backend: StorageBackend::default(),
            move_retry_limit: DEFAULT_MOVE_RETRY_LIMIT,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `KANBAN_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `KANBAN_CORS_ALLOW_CREDENTIALS`: "true" or "false" (default: false)
    /// - `KANBAN_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `KANBAN_API_BIND`: Full bind address, wins over `PORT`
    /// - `PORT`: Port to bind on all interfaces (default: 3000)
    /// - `KANBAN_STORAGE`: "postgres" or "memory" (default: postgres)
    /// - `KANBAN_MOVE_RETRY_LIMIT`: Attempts per move (default: 3, minimum 1)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let cors_origins = std::env::var("KANBAN_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let cors_allow_credentials = std::env::var("KANBAN_CORS_ALLOW_CREDENTIALS")
            .ok()
            .map(|s| s.to_lowercase() == "true")
            .unwrap_or(false);

        let cors_max_age_secs = std::env::var("KANBAN_CORS_MAX_AGE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.cors_max_age_secs);

        let storage_backend = match std::env::var("KANBAN_STORAGE") {
            Ok(value) => value.parse()?,
            Err(_) => StorageBackend::default(),
        };

        let move_retry_limit = std::env::var("KANBAN_MOVE_RETRY_LIMIT")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_MOVE_RETRY_LIMIT)
            .max(1);

        Ok(Self {
            cors_origins,
            cors_allow_credentials,
            cors_max_age_secs,
            bind_addr: resolve_bind_addr()?,
            storage_backend,
            move_retry_limit,
        })
    }

    /// Check if running in production mode (strict CORS).
    pub fn is_production(&self) -> bool {
        !self.cors_origins.is_empty()
    }

    /// Check if a given origin is allowed.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        if self.cors_origins.is_empty() {
            return true;
        }

        self.cors_origins.iter().any(|allowed| {
            if allowed == origin {
                return true;
            }
            // Wildcard subdomains: *.example.com
            if let Some(pattern) = allowed.strip_prefix("*.") {
                if let Some(origin_domain) = origin.strip_prefix("https://") {
                    return origin_domain.ends_with(&format!(".{}", pattern));
                }
            }
            false
        })
    }
}

/// Resolve the listen address from `KANBAN_API_BIND` or `PORT`.
fn resolve_bind_addr() -> Result<SocketAddr, ConfigError> {
    if let Ok(bind) = std::env::var("KANBAN_API_BIND") {
        return bind.parse().map_err(|_| ConfigError::InvalidValue {
            field: "KANBAN_API_BIND".to_string(),
            value: bind.clone(),
            reason: "expected host:port".to_string(),
        });
    }

    let port = match std::env::var("PORT") {
        Ok(port) => port.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
            field: "PORT".to_string(),
            value: port.clone(),
            reason: "expected a port number".to_string(),
        })?,
        Err(_) => 3000,
    };
    Ok(SocketAddr::from(([0, 0, 0, 0], port)))
}
