use crate::config::types::{Config, CrawlConfig, OutputConfig, SourceConfig};
use crate::lang;
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_config(&config.crawl)?;
    validate_source_config(&config.source)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawl configuration
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.max_depth < 1 || config.max_depth > 5 {
        return Err(ConfigError::Validation(format!(
            "max_depth must be between 1 and 5, got {}",
            config.max_depth
        )));
    }

    if config.fan_out_limit < 1 || config.fan_out_limit > 100 {
        return Err(ConfigError::Validation(format!(
            "fan_out_limit must be between 1 and 100, got {}",
            config.fan_out_limit
        )));
    }

    if config.crawl_interval_ms > 3_600_000 {
        return Err(ConfigError::Validation(format!(
            "crawl_interval_ms must be at most one hour, got {}ms",
            config.crawl_interval_ms
        )));
    }

    if config.target_languages.is_empty() {
        return Err(ConfigError::Validation(
            "target_languages cannot be empty".to_string(),
        ));
    }

    for code in &config.target_languages {
        if !lang::is_supported(code) {
            return Err(ConfigError::Validation(format!(
                "Unsupported target language: '{}'",
                code
            )));
        }
    }

    if !lang::is_supported(&config.base_language) {
        return Err(ConfigError::Validation(format!(
            "Unsupported base language: '{}'",
            config.base_language
        )));
    }

    // The base language must be its own canonical edition; a script variant
    // cannot anchor cross-language link resolution
    if lang::canonical_code(&config.base_language) != config.base_language {
        return Err(ConfigError::Validation(format!(
            "base_language '{}' is a script variant; use '{}' instead",
            config.base_language,
            lang::canonical_code(&config.base_language)
        )));
    }

    Ok(())
}

/// Validates content source configuration
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.contact_url.is_empty() {
        return Err(ConfigError::Validation(
            "contact_url cannot be empty".to_string(),
        ));
    }

    // Validate contact email (basic validation)
    validate_email(&config.contact_email)?;

    if !config.api_endpoint.contains("{lang}") {
        return Err(ConfigError::Validation(format!(
            "api_endpoint must contain a '{{lang}}' placeholder, got '{}'",
            config.api_endpoint
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.export_dir.is_empty() {
        return Err(ConfigError::Validation(
            "export_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    // Basic email format check: must contain @ and have text on both sides
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || domain.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    // Domain part should contain at least one dot
    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
