use crate::config::types::{
    Config, CrawlerConfig, InputConfig, OutputConfig, ResolverConfig, UserAgentConfig,
};
use crate::url::PageTemplate;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_resolver_config(&config.resolver)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_input_config(&config.input)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates scheduling limits
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 64 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 64, got {}",
            config.concurrency
        )));
    }

    if config.flush_threshold < 1 {
        return Err(ConfigError::Validation(format!(
            "flush_threshold must be >= 1, got {}",
            config.flush_threshold
        )));
    }

    Ok(())
}

/// Validates the page template and locator matching rules
fn validate_resolver_config(config: &ResolverConfig) -> Result<(), ConfigError> {
    PageTemplate::parse(&config.page_template)?;

    if config.image_extensions.is_empty() {
        return Err(ConfigError::Validation(
            "image_extensions cannot be empty".to_string(),
        ));
    }

    for extension in &config.image_extensions {
        if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::Validation(format!(
                "image extension must be alphanumeric without a leading dot, got '{}'",
                extension
            )));
        }
    }

    if config.small_suffix.is_empty() {
        return Err(ConfigError::Validation(
            "small_suffix cannot be empty".to_string(),
        ));
    }

    if config.small_suffix.contains(|c: char| c == '/' || c == '.') {
        return Err(ConfigError::Validation(format!(
            "small_suffix cannot contain '/' or '.', got '{}'",
            config.small_suffix
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
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

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

fn validate_input_config(config: &InputConfig) -> Result<(), ConfigError> {
    if config.dataset_path.is_empty() {
        return Err(ConfigError::Validation(
            "dataset_path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.store_path.is_empty() {
        return Err(ConfigError::Validation(
            "store_path cannot be empty".to_string(),
        ));
    }

    if let Some(seed) = &config.seed_path {
        if seed.is_empty() {
            return Err(ConfigError::Validation(
                "seed_path cannot be empty when set".to_string(),
            ));
        }
        if seed == &config.store_path {
            return Err(ConfigError::Validation(
                "seed_path must differ from store_path".to_string(),
            ));
        }
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::Validation(format!("Invalid email format: '{}'", email));

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') || !domain.contains('.') {
        return Err(invalid());
    }

    Ok(())
}
