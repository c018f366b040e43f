use crate::config::types::{
    AddressConfig, Config, ExtractorConfig, FetcherConfig, PipelineConfig, TargetEntry,
};
use crate::url::validate_url;
use crate::ConfigError;

/// Upper bound on in-flight tasks accepted from configuration
pub const MAX_CONCURRENCY_LIMIT: usize = 100;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetcher_config(&config.fetcher)?;
    validate_pipeline_config(&config.pipeline)?;
    validate_extractor_config(&config.extractor)?;
    validate_address_config(&config.address)?;
    validate_targets(&config.targets)?;
    Ok(())
}

/// Validates fetcher configuration
pub fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if !config.requests_per_second.is_finite() || config.requests_per_second <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "requests_per_second must be a positive number, got {}",
            config.requests_per_second
        )));
    }

    if config.timeout_seconds < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_seconds must be >= 1, got {}",
            config.timeout_seconds
        )));
    }

    if config.user_agents.is_empty() {
        return Err(ConfigError::Validation(
            "user_agents cannot be empty".to_string(),
        ));
    }

    if config.user_agents.iter().any(|ua| ua.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "user_agents cannot contain blank entries".to_string(),
        ));
    }

    Ok(())
}

/// Validates pipeline configuration
pub fn validate_pipeline_config(config: &PipelineConfig) -> Result<(), ConfigError> {
    validate_max_concurrency(config.max_concurrency)
}

/// Validates a concurrency width, whether configured or passed to a run
pub fn validate_max_concurrency(max_concurrency: usize) -> Result<(), ConfigError> {
    if max_concurrency < 1 || max_concurrency > MAX_CONCURRENCY_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max_concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY_LIMIT, max_concurrency
        )));
    }
    Ok(())
}

/// Validates extractor tables
fn validate_extractor_config(config: &ExtractorConfig) -> Result<(), ConfigError> {
    if config.info_block_keywords.is_empty() {
        return Err(ConfigError::Validation(
            "info_block_keywords cannot be empty".to_string(),
        ));
    }

    if config.info_block_keywords.iter().any(|k| k.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "info_block_keywords cannot contain blank entries".to_string(),
        ));
    }

    if config.labels.is_empty() {
        return Err(ConfigError::Validation(
            "extractor labels cannot be empty".to_string(),
        ));
    }

    if let Some(rule) = config.labels.iter().find(|r| r.label.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "label for field '{}' cannot be blank",
            rule.field
        )));
    }

    if config.contact_keywords.iter().any(|k| k.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "contact_keywords cannot contain blank entries".to_string(),
        ));
    }

    Ok(())
}

/// Validates address normalization tables
fn validate_address_config(config: &AddressConfig) -> Result<(), ConfigError> {
    if config.regions.is_empty() {
        return Err(ConfigError::Validation("regions cannot be empty".to_string()));
    }

    if config.regions.iter().any(|r| r.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "regions cannot contain blank entries".to_string(),
        ));
    }

    if config.locality_suffixes.is_empty() {
        return Err(ConfigError::Validation(
            "locality_suffixes cannot be empty".to_string(),
        ));
    }

    if config.locality_suffixes.iter().any(|s| s.is_empty()) {
        return Err(ConfigError::Validation(
            "locality_suffixes cannot contain empty entries".to_string(),
        ));
    }

    Ok(())
}

/// Validates target keyword groups
fn validate_targets(targets: &[TargetEntry]) -> Result<(), ConfigError> {
    for entry in targets {
        if entry.keyword.trim().is_empty() {
            return Err(ConfigError::Validation(
                "target keyword cannot be empty".to_string(),
            ));
        }

        for url in &entry.urls {
            validate_url(url).map_err(|e| {
                ConfigError::InvalidUrl(format!(
                    "Invalid URL '{}' for keyword '{}': {}",
                    url, entry.keyword, e
                ))
            })?;
        }
    }

    Ok(())
}
