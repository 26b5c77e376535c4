mod engine;

pub use engine::EngineConfig;

use std::env;
use std::path::PathBuf;

use thiserror::Error;

/// Distinguishes runtime behavior for different stages of a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Process-level configuration read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    /// Engine configuration file; built-in defaults apply when unset.
    pub engine_config_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("IDRIS_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("IDRIS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let engine_config_path = match env::var("IDRIS_ENGINE_CONFIG") {
            Ok(path) if path.trim().is_empty() => {
                return Err(ConfigError::InvalidEnvironment {
                    key: "IDRIS_ENGINE_CONFIG",
                    reason: "must not be blank when set".to_string(),
                })
            }
            Ok(path) => Some(PathBuf::from(path.trim())),
            Err(env::VarError::NotPresent) => None,
            Err(env::VarError::NotUnicode(_)) => {
                return Err(ConfigError::InvalidEnvironment {
                    key: "IDRIS_ENGINE_CONFIG",
                    reason: "must be valid unicode".to_string(),
                })
            }
        };

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            engine_config_path,
        })
    }

    /// Resolve the engine configuration, preferring `override_path` over the environment.
    pub fn engine_config(
        &self,
        override_path: Option<&std::path::Path>,
    ) -> Result<EngineConfig, ConfigError> {
        match override_path.or(self.engine_config_path.as_deref()) {
            Some(path) => EngineConfig::from_path(path),
            None => Ok(EngineConfig::default()),
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} {reason}")]
    InvalidEnvironment { key: &'static str, reason: String },
    #[error("invalid weight table: {reason}")]
    InvalidWeightTable { reason: String },
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },
    #[error("unable to read engine configuration '{}'", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to parse engine configuration: {source}")]
    Parse {
        #[from]
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("IDRIS_ENV");
        env::remove_var("IDRIS_LOG_LEVEL");
        env::remove_var("IDRIS_ENGINE_CONFIG");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.engine_config_path.is_none());
        assert_eq!(
            config.engine_config(None).expect("defaults"),
            EngineConfig::default()
        );
    }

    #[test]
    fn reads_environment_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("IDRIS_ENV", "prod");
        env::set_var("IDRIS_LOG_LEVEL", "debug");
        env::set_var("IDRIS_ENGINE_CONFIG", "/etc/idris/engine.toml");

        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Production);
        assert_eq!(config.telemetry.log_level, "debug");
        assert_eq!(
            config.engine_config_path.as_deref(),
            Some(std::path::Path::new("/etc/idris/engine.toml"))
        );
        reset_env();
    }

    #[test]
    fn blank_engine_config_path_is_rejected() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("IDRIS_ENGINE_CONFIG", "  ");
        let err = AppConfig::load().expect_err("blank path");
        assert!(matches!(
            err,
            ConfigError::InvalidEnvironment {
                key: "IDRIS_ENGINE_CONFIG",
                ..
            }
        ));
        reset_env();
    }

    #[test]
    fn missing_engine_config_file_reports_path() {
        let config = AppConfig {
            environment: AppEnvironment::Test,
            telemetry: TelemetryConfig {
                log_level: "info".to_string(),
            },
            engine_config_path: Some(PathBuf::from("/nonexistent/idris.toml")),
        };
        let err = config.engine_config(None).expect_err("file missing");
        assert!(err.to_string().contains("/nonexistent/idris.toml"));
    }
}
