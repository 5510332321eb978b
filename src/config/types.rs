use serde::Deserialize;

/// Main configuration structure for Catalog-Ingest
///
/// Every section is optional; a missing section or key falls back to the
/// documented default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub products: ProductSelectorConfig,
    pub fetcher: FetcherConfig,
    pub images: ImageConfig,
    pub output: OutputConfig,
}

/// Where the crawl starts and how the two link levels are found
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SourceConfig {
    /// Listing page that links to every category
    pub entry_url: String,

    /// Container selector for category links on the entry page
    pub category_selector: String,

    /// Container selector for subcategory links on a category page
    pub subcategory_selector: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            entry_url: "https://casters.ro/produse/utilaje-carmangerie/".to_string(),
            category_selector:
                r#"div[class*="elementor-element-"].e-con-full.e-flex.e-con.e-child"#.to_string(),
            subcategory_selector: "div.elementor-widget-call-to-action".to_string(),
        }
    }
}

/// Selectors describing a product block on a listing page
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProductSelectorConfig {
    /// Repeating block that may hold one product
    pub section_selector: String,

    /// Heading that marks a block as a product; its text is the product name
    pub title_selector: String,

    pub description_selector: String,

    /// List items holding the feature bullets
    pub feature_selector: String,

    /// Single main product image
    pub image_selector: String,

    /// Carousel slides carrying `background-image: url(...)` styles
    pub carousel_selector: String,
}

impl Default for ProductSelectorConfig {
    fn default() -> Self {
        Self {
            section_selector: "section.elementor-section".to_string(),
            title_selector: "h4.elementor-heading-title".to_string(),
            description_selector: "div.elementor-widget-text-editor p".to_string(),
            feature_selector: "div.elementor-widget-toggle .elementor-tab-content ul li"
                .to_string(),
            image_selector: "div.elementor-widget-image img".to_string(),
            carousel_selector: "div.elementor-carousel-image".to_string(),
        }
    }
}

/// HTTP fetcher behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetcherConfig {
    /// Identity header sent with every request
    pub user_agent: String,

    /// Pause after every page fetch (milliseconds)
    pub pacing_delay_ms: u64,

    /// Whole-request timeout (seconds)
    pub timeout_secs: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0".to_string(),
            pacing_delay_ms: 1000,
            timeout_secs: 30,
        }
    }
}

/// Image normalization and storage
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ImageConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,

    /// Root directory; each product gets a subdirectory named by its id
    pub storage_root: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            canvas_width: 580,
            canvas_height: 760,
            storage_root: "products/extra".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path to the SQLite catalog database
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "catalog.db".to_string(),
        }
    }
}
