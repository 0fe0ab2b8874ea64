use super::{types::Config, ConfigError};
use crate::queue::MAX_ROUNDS;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Round cap within 1..=100
/// - Delay ranges are ordered
/// - Log ring has room for at least one line
/// - An `[images]` section names at least one provider key
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    let runner = &config.runner;
    if runner.max_rounds == 0 || runner.max_rounds > MAX_ROUNDS {
        return Err(ConfigError::ValidationError(format!(
            "runner.max_rounds must be between 1 and {}",
            MAX_ROUNDS
        )));
    }

    if runner.step_delay_min_ms > runner.step_delay_max_ms {
        return Err(ConfigError::ValidationError(
            "runner.step_delay_min_ms cannot exceed runner.step_delay_max_ms".to_string(),
        ));
    }

    if runner.browse_delay_min_ms > runner.browse_delay_max_ms {
        return Err(ConfigError::ValidationError(
            "runner.browse_delay_min_ms cannot exceed runner.browse_delay_max_ms".to_string(),
        ));
    }

    if runner.log_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "runner.log_capacity cannot be 0".to_string(),
        ));
    }

    if let Some(images) = &config.images {
        if !images.has_provider() {
            return Err(ConfigError::ValidationError(
                "images section requires pexels_api_key or unsplash_api_key".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ImagesConfig, ServerConfig};
    use crate::orchestrator::RunnerConfig;
    use std::net::IpAddr;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let config = Config {
            server: ServerConfig {
                host: "0.0.0.0".parse::<IpAddr>().unwrap(),
                port: 0,
            },
            ..Default::default()
        };
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_max_rounds_out_of_range() {
        let config = Config {
            runner: RunnerConfig {
                max_rounds: 101,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_inverted_delay_range() {
        let config = Config {
            runner: RunnerConfig {
                step_delay_min_ms: 5000,
                step_delay_max_ms: 1000,
                ..Default::default()
            },
            ..Default::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("step_delay_min_ms"));
    }

    #[test]
    fn test_validate_images_without_key() {
        let config = Config {
            images: Some(ImagesConfig::default()),
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }
}
