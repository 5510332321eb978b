use crate::config::types::{Config, FetcherConfig, ImageConfig, ProductSelectorConfig, SourceConfig};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

const MAX_CANVAS_SIDE: u32 = 10_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_source_config(&config.source)?;
    validate_product_selectors(&config.products)?;
    validate_fetcher_config(&config.fetcher)?;
    validate_image_config(&config.images)?;

    if config.output.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the entry point and link-level selectors
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.entry_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid entry_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "entry_url '{}' must use http or https",
            config.entry_url
        )));
    }

    validate_selector("category_selector", &config.category_selector)?;
    validate_selector("subcategory_selector", &config.subcategory_selector)?;

    Ok(())
}

fn validate_product_selectors(config: &ProductSelectorConfig) -> Result<(), ConfigError> {
    validate_selector("section_selector", &config.section_selector)?;
    validate_selector("title_selector", &config.title_selector)?;
    validate_selector("description_selector", &config.description_selector)?;
    validate_selector("feature_selector", &config.feature_selector)?;
    validate_selector("image_selector", &config.image_selector)?;
    validate_selector("carousel_selector", &config.carousel_selector)?;
    Ok(())
}

fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

fn validate_image_config(config: &ImageConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("canvas_width", config.canvas_width),
        ("canvas_height", config.canvas_height),
    ] {
        if value < 1 || value > MAX_CANVAS_SIDE {
            return Err(ConfigError::Validation(format!(
                "{} must be between 1 and {}, got {}",
                name, MAX_CANVAS_SIDE, value
            )));
        }
    }

    if config.storage_root.is_empty() {
        return Err(ConfigError::Validation(
            "storage_root cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Checks that a CSS selector parses
fn validate_selector(name: &str, selector: &str) -> Result<(), ConfigError> {
    if selector.trim().is_empty() {
        return Err(ConfigError::InvalidSelector(format!(
            "{} cannot be empty",
            name
        )));
    }

    Selector::parse(selector)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidSelector(format!("{} '{}': {}", name, selector, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_selector() {
        assert!(validate_selector("s", "section.elementor-section").is_ok());
        assert!(validate_selector("s", r#"div[class*="elementor-element-"].e-con"#).is_ok());

        assert!(validate_selector("s", "").is_err());
        assert!(validate_selector("s", "div[[").is_err());
    }

    #[test]
    fn test_rejects_non_http_entry_url() {
        let mut config = Config::default();
        config.source.entry_url = "ftp://example.com/catalog".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));

        config.source.entry_url = "not a url".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_rejects_bad_canvas() {
        let mut config = Config::default();
        config.images.canvas_height = 0;
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));

        config.images.canvas_height = MAX_CANVAS_SIDE + 1;
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.fetcher.user_agent = "  ".to_string();
        assert!(validate(&config).is_err());
    }
}
