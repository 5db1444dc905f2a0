//! Configuration management
//!
//! Sources are layered, later ones winning:
//! built-in defaults, `config/default.toml`, `config/{APP_ENV}.toml`,
//! `APP__SECTION__KEY` environment variables, then the well-known
//! Supabase variables (`DATABASE_URL`, `SUPABASE_URL`, ...).

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_JWT_AUDIENCE;
use crate::error::AppError;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub supabase: SupabaseSettings,
    pub logging: LoggingSettings,
    pub features: FeatureFlags,
    pub rate_limit: RateLimitSettings,
    pub reports: ReportSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub request_timeout_secs: u64,
    pub cors_origins: Vec<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            env: "development".into(),
            host: "127.0.0.1".into(),
            port: 8080,
            name: "assessly".into(),
            request_timeout_secs: 30,
            cors_origins: vec!["http://localhost:3000".into()],
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub run_migrations: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_secs: 3,
            run_migrations: false,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SupabaseSettings {
    pub url: String,
    pub anon_key: String,
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub service_role_key: Option<String>,
}

impl Default for SupabaseSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            jwt_secret: String::new(),
            jwt_audience: DEFAULT_JWT_AUDIENCE.into(),
            service_role_key: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
    pub format: LogFormat,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info,assessly=debug,tower_http=info".into(),
            format: LogFormat::Pretty,
            directory: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FeatureFlags {
    pub websocket: bool,
    pub reports: bool,
    pub system_performance: bool,
    pub rate_limit: bool,
    pub prometheus: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            websocket: true,
            reports: true,
            system_performance: true,
            rate_limit: true,
            prometheus: true,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RateLimitSettings {
    pub per_second: u32,
    pub burst: u32,
    /// Key on the right-most `x-forwarded-for` hop. Enable only behind a
    /// proxy that appends the peer address.
    pub trust_forwarded_for: bool,
    /// How often idle client keys are evicted from the limiter.
    pub cleanup_interval_secs: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            per_second: 50,
            burst: 100,
            trust_forwarded_for: false,
            cleanup_interval_secs: 60,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ReportSettings {
    /// A report left in `generating` longer than this may be generated again.
    pub generation_stale_after_secs: u64,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            generation_stale_after_secs: 600,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .set_override("app.env", env.clone())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("app.cors_origins")
                    .try_parsing(true),
            )
            .set_override_option("database.url", env_var("DATABASE_URL"))?
            .set_override_option("supabase.url", env_var("SUPABASE_URL"))?
            .set_override_option("supabase.anon_key", env_var("SUPABASE_ANON_KEY"))?
            .set_override_option("supabase.jwt_secret", env_var("SUPABASE_JWT_SECRET"))?
            .set_override_option(
                "supabase.service_role_key",
                env_var("SUPABASE_SERVICE_ROLE_KEY"),
            )?
            .set_override_option("logging.format", env_var("LOG_FORMAT"))?
            .build()?;

        let config: AppConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the server cannot start with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.database.url.trim().is_empty() {
            return Err(AppError::InvalidConfig(
                "database.url (DATABASE_URL) is required".into(),
            ));
        }
        if self.supabase.jwt_secret.trim().is_empty() {
            return Err(AppError::InvalidConfig(
                "supabase.jwt_secret (SUPABASE_JWT_SECRET) is required".into(),
            ));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(AppError::InvalidConfig(format!(
                "database.min_connections ({}) exceeds database.max_connections ({})",
                self.database.min_connections, self.database.max_connections
            )));
        }
        if self.features.rate_limit && (self.rate_limit.per_second == 0 || self.rate_limit.burst == 0) {
            return Err(AppError::InvalidConfig(
                "rate_limit.per_second and rate_limit.burst must be positive".into(),
            ));
        }
        if self.reports.generation_stale_after_secs == 0 {
            return Err(AppError::InvalidConfig(
                "reports.generation_stale_after_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.app.env.eq_ignore_ascii_case("production")
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.database.url = "postgres://localhost/assessly".into();
        config.supabase.jwt_secret = "secret".into();
        config
    }

    #[test]
    fn test_defaults_roundtrip_through_config_builder() {
        let built = Config::builder()
            .add_source(Config::try_from(&AppConfig::default()).unwrap())
            .build()
            .unwrap();
        let config: AppConfig = built.try_deserialize().unwrap();
        assert_eq!(config.app.port, 8080);
        assert_eq!(config.supabase.jwt_audience, "authenticated");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.features.reports);
    }

    #[test]
    fn test_validate_requires_database_and_secret() {
        assert!(valid_config().validate().is_ok());

        let mut config = valid_config();
        config.database.url.clear();
        assert!(matches!(config.validate(), Err(AppError::InvalidConfig(_))));

        let mut config = valid_config();
        config.supabase.jwt_secret = "   ".into();
        assert!(matches!(config.validate(), Err(AppError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_pool_bounds() {
        let mut config = valid_config();
        config.database.min_connections = 20;
        config.database.max_connections = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_forwarded_for_is_untrusted_by_default() {
        let config = AppConfig::default();
        assert!(!config.rate_limit.trust_forwarded_for);
        assert!(config.reports.generation_stale_after_secs > 0);

        let mut config = valid_config();
        config.reports.generation_stale_after_secs = 0;
        assert!(config.validate().is_err());
    }
}
