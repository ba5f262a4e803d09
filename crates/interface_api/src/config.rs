//! API configuration

use serde::Deserialize;

use domain_workflow::WorkflowConfig;

/// Entity store backing the workflow service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local store, lost on restart
    Memory,
    Postgres,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// JWT secret for authentication
    pub jwt_secret: String,
    /// JWT expiration in seconds
    pub jwt_expiration_secs: u64,
    /// Database URL, used by the postgres backend
    pub database_url: String,
    /// Log level
    pub log_level: String,
    pub log_format: LogFormat,
    pub store: StoreBackend,
    /// Reload-and-retry attempts after a lost version race
    pub max_conflict_retries: u32,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            database_url: "postgres://localhost/emergency_claims".to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            store: StoreBackend::Postgres,
            max_conflict_retries: 3,
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `API_*` environment variables over the defaults
    ///
    /// `API_JWT_SECRET` maps to `jwt_secret`, `API_STORE=memory` selects the
    /// in-memory store, and so on.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        config::Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("jwt_secret", defaults.jwt_secret)?
            .set_default("jwt_expiration_secs", defaults.jwt_expiration_secs as i64)?
            .set_default("database_url", defaults.database_url)?
            .set_default("log_level", defaults.log_level)?
            .set_default("log_format", "text")?
            .set_default("store", "postgres")?
            .set_default("max_conflict_retries", i64::from(defaults.max_conflict_retries))?
            .set_default("default_page_size", i64::from(defaults.default_page_size))?
            .set_default("max_page_size", i64::from(defaults.max_page_size))?
            .add_source(config::Environment::with_prefix("API").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Service tuning derived from the API settings
    pub fn workflow_config(&self) -> WorkflowConfig {
        WorkflowConfig {
            max_conflict_retries: self.max_conflict_retries,
            default_page_size: self.default_page_size,
            max_page_size: self.max_page_size,
            ..WorkflowConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_config_follows_api_settings() {
        let config = ApiConfig {
            max_conflict_retries: 7,
            max_page_size: 50,
            ..ApiConfig::default()
        };
        let workflow = config.workflow_config();
        assert_eq!(workflow.max_conflict_retries, 7);
        assert_eq!(workflow.max_page_size, 50);
        assert_eq!(workflow.default_page_size, 20);
    }

    #[test]
    fn test_server_addr() {
        assert_eq!(ApiConfig::default().server_addr(), "0.0.0.0:8080");
    }
}
