use crate::config::types::{
    Config, CrawlerConfig, MarkupConfig, OutputConfig, SiteConfig, UserAgentConfig,
    PAGE_PLACEHOLDER,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Upper bound accepted for the concurrency ceiling
pub const MAX_CONCURRENT_FETCHES: u32 = 500;

/// Upper bound accepted for the record cap
pub const MAX_RECORD_CAP: u64 = 1_000_000_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_markup_config(&config.markup)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the listing URLs
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    validate_http_url(&config.root_url, "root_url")?;

    if !config.page_url_template.contains(PAGE_PLACEHOLDER) {
        return Err(ConfigError::Validation(format!(
            "page_url_template must contain '{}', got '{}'",
            PAGE_PLACEHOLDER, config.page_url_template
        )));
    }

    let first_page = config
        .page_url_template
        .replace(PAGE_PLACEHOLDER, "1");
    validate_http_url(&first_page, "page_url_template")?;

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > MAX_CONCURRENT_FETCHES
    {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and {}, got {}",
            MAX_CONCURRENT_FETCHES, config.max_concurrent_fetches
        )));
    }

    if config.record_cap < 1 || config.record_cap > MAX_RECORD_CAP {
        return Err(ConfigError::Validation(format!(
            "record_cap must be between 1 and {}, got {}",
            MAX_RECORD_CAP, config.record_cap
        )));
    }

    if config.records_per_page < 1 {
        return Err(ConfigError::Validation(
            "records_per_page must be >= 1".to_string(),
        ));
    }

    if config.request_timeout_secs < 1 || config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeouts must be >= 1s, got request={}s connect={}s",
            config.request_timeout_secs, config.connect_timeout_secs
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
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

    if !config.contact_url.is_empty() {
        Url::parse(&config.contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

/// Validates that every markup selector compiles and discriminators are set
fn validate_markup_config(config: &MarkupConfig) -> Result<(), ConfigError> {
    for (name, selector) in [
        ("pagination", &config.pagination),
        ("pagination_item", &config.pagination_item),
        ("section", &config.section),
        ("sub_section", &config.sub_section),
        ("name", &config.name),
        ("location", &config.location),
        ("reputation", &config.reputation),
        ("tag", &config.tag),
    ] {
        compile_selector(name, selector)?;
    }

    for (name, class) in [
        ("details_class", &config.details_class),
        ("reputation_class", &config.reputation_class),
        ("tags_class", &config.tags_class),
    ] {
        if class.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.csv_path.is_empty() {
        return Err(ConfigError::Validation(
            "csv_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Compiles a CSS selector, naming the offending config key on failure
pub fn compile_selector(name: &str, selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector)
        .map_err(|e| ConfigError::InvalidSelector(format!("{} = '{}': {:?}", name, selector, e)))
}

/// Requires an absolute http(s) URL
fn validate_http_url(raw: &str, name: &str) -> Result<(), ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", name, raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "{} '{}' must use http or https",
            name, raw
        )));
    }

    Ok(())
}
