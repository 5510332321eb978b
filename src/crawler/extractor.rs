//! HTML extractor for category links, subcategory links and product records
//!
//! Extraction never fails: a missing optional element degrades to an empty
//! value and a page with no product blocks yields an empty list.

use crate::config::{ProductSelectorConfig, SourceConfig};
use crate::IngestError;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use url::Url;

/// A product record as found on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    /// Heading text; the product's natural key
    pub title: String,
    pub description: String,
    /// Feature bullets in document order
    pub features: Vec<String>,
    /// Main image first, then carousel slides, in document order
    pub images: Vec<String>,
}

/// Compiled container selectors for the two link levels
#[derive(Debug, Clone)]
pub struct LinkSelectors {
    category: Selector,
    subcategory: Selector,
}

impl LinkSelectors {
    pub fn from_config(config: &SourceConfig) -> Result<Self, IngestError> {
        Ok(Self {
            category: compile_selector(&config.category_selector)?,
            subcategory: compile_selector(&config.subcategory_selector)?,
        })
    }
}

/// Compiled selectors describing a product block
#[derive(Debug, Clone)]
pub struct ProductSelectors {
    section: Selector,
    title: Selector,
    description: Selector,
    feature: Selector,
    image: Selector,
    carousel: Selector,
}

impl ProductSelectors {
    pub fn from_config(config: &ProductSelectorConfig) -> Result<Self, IngestError> {
        Ok(Self {
            section: compile_selector(&config.section_selector)?,
            title: compile_selector(&config.title_selector)?,
            description: compile_selector(&config.description_selector)?,
            feature: compile_selector(&config.feature_selector)?,
            image: compile_selector(&config.image_selector)?,
            carousel: compile_selector(&config.carousel_selector)?,
        })
    }
}

/// Parses a CSS selector, keeping the offending text in the error
pub fn compile_selector(selector: &str) -> Result<Selector, IngestError> {
    Selector::parse(selector).map_err(|e| IngestError::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// Extracts category links from the entry listing page
pub fn extract_category_links(html: &str, selectors: &LinkSelectors, base_url: &Url) -> Vec<String> {
    extract_links(html, &selectors.category, base_url)
}

/// Extracts subcategory links from a category page
pub fn extract_subcategory_links(
    html: &str,
    selectors: &LinkSelectors,
    base_url: &Url,
) -> Vec<String> {
    extract_links(html, &selectors.subcategory, base_url)
}

/// Returns the first link inside each container matching `container`
///
/// Containers are visited in document order; a container without an anchor
/// carrying a non-empty `href` contributes nothing. Relative links are
/// resolved against `base_url`.
///
/// # Example
///
/// ```
/// use catalog_ingest::crawler::{compile_selector, extract_links};
/// use url::Url;
///
/// let html = r#"<div class="card"><a href="/a/">A</a><a href="/x/">X</a></div>
///               <div class="card">no link</div>
///               <div class="card"><a href="/b/">B</a></div>"#;
/// let selector = compile_selector("div.card").unwrap();
/// let base = Url::parse("https://example.com/").unwrap();
///
/// let links = extract_links(html, &selector, &base);
/// assert_eq!(links, vec!["https://example.com/a/", "https://example.com/b/"]);
/// ```
pub fn extract_links(html: &str, container: &Selector, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(anchor) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(container)
        .filter_map(|element| {
            element
                .select(&anchor)
                .filter_map(|a| a.value().attr("href"))
                .map(str::trim)
                .find(|href| !href.is_empty())
                .map(|href| resolve_url(href, base_url))
        })
        .collect()
}

/// Extracts every product block on a listing page
pub fn extract_products(html: &str, selectors: &ProductSelectors, base_url: &Url) -> Vec<ProductDraft> {
    let document = Html::parse_document(html);

    document
        .select(&selectors.section)
        .filter_map(|section| extract_product(section, selectors, base_url))
        .collect()
}

/// Builds a draft from one block, or `None` when the block has no title
fn extract_product(
    section: ElementRef<'_>,
    selectors: &ProductSelectors,
    base_url: &Url,
) -> Option<ProductDraft> {
    let title = section.select(&selectors.title).next().map(element_text)?;

    let description = section
        .select(&selectors.description)
        .next()
        .map(element_text)
        .unwrap_or_default();

    let features = section
        .select(&selectors.feature)
        .map(element_text)
        .collect();

    let mut images = Vec::new();

    if let Some(src) = section
        .select(&selectors.image)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty())
    {
        images.push(resolve_url(src, base_url));
    }

    for slide in section.select(&selectors.carousel) {
        let style = slide.value().attr("style").unwrap_or_default();
        if let Some(url) = url_in_style(style) {
            images.push(resolve_url(url, base_url));
        }
    }

    Some(ProductDraft {
        title,
        description,
        features,
        images,
    })
}

/// Finds the first `url(...)` in an inline style, without surrounding quotes
pub fn url_in_style(style: &str) -> Option<&str> {
    static URL_IN_STYLE: OnceLock<Regex> = OnceLock::new();
    let pattern = URL_IN_STYLE
        .get_or_init(|| Regex::new(r#"url\(\s*['"]?(.*?)['"]?\s*\)"#).expect("valid regex"));

    pattern
        .captures(style)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
        .filter(|url| !url.is_empty())
}

/// Element text with whitespace runs collapsed and ends trimmed
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolves `href` against `base_url`, keeping it verbatim if that fails
fn resolve_url(href: &str, base_url: &Url) -> String {
    base_url
        .join(href)
        .map(|url| url.to_string())
        .unwrap_or_else(|_| href.to_string())
}
