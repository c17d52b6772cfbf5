use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_PATH: &str = "/api";

/// Upper bound for session and profile cache lifetimes. Larger values are clamped.
pub const MAX_TTL_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub store: StoreConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub api: ApiConfig,
    pub cors: CorsConfig,
    pub session: SessionConfig,
    pub profile_cache: ProfileCacheConfig,
    pub guard: GuardConfig,
    pub completion: CompletionConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout: u64,
    pub acquire_timeout: u64,
}

/// Keys issued by the hosted store. Both are empty in development.
#[derive(Deserialize, Serialize, Clone, Default)]
pub struct StoreConfig {
    /// Public key every API caller must present in the `apikey` header.
    pub anon_key: String,
    /// Elevated key for trusted server-side callers. Never leaves the server.
    pub service_role_key: String,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("anon_key", &self.anon_key)
            .field("service_role_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub address: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub base_path: String,
    pub additional_base_paths: Vec<String>,
    pub enable_swagger: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    pub ttl_seconds: i64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProfileCacheConfig {
    pub ttl_seconds: u64,
    pub cleanup_interval_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GuardConfig {
    pub loading_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CompletionConfig {
    /// Base amount in minor currency units for attendance created on completion.
    pub default_base_amount: i64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/classroom_db".to_string(),
            max_connections: 16,
            min_connections: 4,
            connection_timeout: 5,
            acquire_timeout: 5,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            address: "127.0.0.1".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_API_BASE_PATH.to_string(),
            additional_base_paths: Vec::new(),
            enable_swagger: true,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3000".to_string()],
            allow_credentials: true,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { ttl_seconds: 7 * 24 * 60 * 60 }
    }
}

impl Default for ProfileCacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 300,
            cleanup_interval_seconds: 60,
        }
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self { loading_timeout_seconds: 20 }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self { default_base_amount: 0 }
    }
}

fn clamped_ttl(seconds: i64, min_seconds: i64) -> chrono::Duration {
    chrono::Duration::seconds(seconds.clamp(min_seconds, MAX_TTL_SECONDS))
}

impl SessionConfig {
    /// Session lifetime, at least one minute.
    pub fn ttl(&self) -> chrono::Duration {
        clamped_ttl(self.ttl_seconds, 60)
    }
}

impl ProfileCacheConfig {
    pub fn ttl(&self) -> chrono::Duration {
        clamped_ttl(i64::try_from(self.ttl_seconds).unwrap_or(MAX_TTL_SECONDS), 1)
    }
}

impl Config {
    /// Load configuration from multiple sources in priority order:
    /// 1. Built-in defaults
    /// 2. Classroom.toml (base configuration file)
    /// 3. Environment variables (prefixed with CLASSROOM_, nested on `__`)
    /// 4. DATABASE_URL environment variable
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file("Classroom.toml"))
            .merge(Env::prefixed("CLASSROOM_").split("__"))
            .merge(Env::raw().only(&["DATABASE_URL"]).map(|_| "database.url".into()))
    }
}
