use reqwest::Url;

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Analyzer page URL parses, default origin is http(s)
/// - Recommendation top_k is positive
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if let Some(page_url) = &config.analyzer.page_url {
        Url::parse(page_url).map_err(|e| {
            ConfigError::ValidationError(format!("analyzer.page_url is invalid: {}", e))
        })?;
    }

    let origin = Url::parse(&config.analyzer.default_origin).map_err(|e| {
        ConfigError::ValidationError(format!("analyzer.default_origin is invalid: {}", e))
    })?;
    if !matches!(origin.scheme(), "http" | "https") {
        return Err(ConfigError::ValidationError(format!(
            "analyzer.default_origin must be http or https, got {}",
            origin.scheme()
        )));
    }

    if config.recommend.default_top_k == 0 {
        return Err(ConfigError::ValidationError(
            "recommend.default_top_k cannot be 0".to_string(),
        ));
    }

    Ok(())
}
