//! Configuration for the zarr-api service.

use serde::{Deserialize, Serialize};

/// Service configuration, overridable from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Bind address.
    pub host: String,

    /// Bind port.
    pub port: u16,

    /// Byte budget for the shared response cache, in megabytes.
    pub cache_size_mb: usize,

    /// Log level for the tracing subscriber.
    pub log_level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9000,
            cache_size_mb: 64,
            log_level: "info".to_string(),
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("ZARR_API_HOST") {
            config.host = val;
        }

        if let Ok(val) = std::env::var("ZARR_API_PORT") {
            if let Ok(port) = val.parse() {
                config.port = port;
            }
        }

        if let Ok(val) = std::env::var("ZARR_API_CACHE_MB") {
            if let Ok(size) = val.parse() {
                config.cache_size_mb = size;
            }
        }

        if let Ok(val) = std::env::var("ZARR_API_LOG_LEVEL") {
            config.log_level = val;
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() {
            return Err("host must not be empty".to_string());
        }

        if self.cache_size_mb == 0 {
            return Err("cache_size_mb must be > 0".to_string());
        }

        Ok(())
    }

    /// Cache byte budget.
    pub fn cache_size_bytes(&self) -> usize {
        self.cache_size_mb * 1024 * 1024
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.port, 9000);
        assert_eq!(config.cache_size_mb, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ApiConfig::default();
        config.cache_size_mb = 0;
        assert!(config.validate().is_err());

        config = ApiConfig::default();
        config.host = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cache_size_bytes() {
        let mut config = ApiConfig::default();
        config.cache_size_mb = 2;
        assert_eq!(config.cache_size_bytes(), 2 * 1024 * 1024);
    }
}
