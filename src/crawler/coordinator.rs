//! Crawl coordinator - main ingest orchestration logic
//!
//! This module walks the fixed category → subcategory → product listing
//! hierarchy and drives the fetcher, extractor, upserter and image
//! processor strictly in sequence:
//! - The entry page is fetched once; failing it ends the run
//! - Each category page, and each subcategory page under it, is scanned
//!   for product blocks
//! - Page fetch failures and store write failures are contained to the
//!   page or item they hit and recorded in the run report

use crate::catalog::{
    attach_image, display_name_from_url, get_or_create_category, get_or_create_subcategory,
    upsert_product, Category, SubCategory,
};
use crate::config::Config;
use crate::crawler::extractor::{
    extract_category_links, extract_products, extract_subcategory_links, LinkSelectors,
    ProductDraft, ProductSelectors,
};
use crate::crawler::report::{CrawlReport, FailureStage};
use crate::crawler::PageSource;
use crate::media::ImageProcessor;
use crate::storage::{CatalogStore, RunStatus, RunTotals};
use crate::IngestError;
use url::Url;

/// Main ingest coordinator
///
/// The page source and the catalog store are injected so tests can run the
/// whole walk against mock servers and in-memory databases.
pub struct Coordinator<P, S> {
    source: P,
    store: S,
    images: ImageProcessor,
    links: LinkSelectors,
    products: ProductSelectors,
    entry_url: Url,
}

impl<P: PageSource, S: CatalogStore> Coordinator<P, S> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - Selectors, entry URL and image settings
    /// * `source` - Where pages and images are fetched from
    /// * `store` - The catalog store written to
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(IngestError)` - The entry URL or a selector is invalid
    pub fn new(config: &Config, source: P, store: S) -> Result<Self, IngestError> {
        Ok(Self {
            source,
            store,
            images: ImageProcessor::new(&config.images),
            links: LinkSelectors::from_config(&config.source)?,
            products: ProductSelectors::from_config(&config.products)?,
            entry_url: Url::parse(&config.source.entry_url)?,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs the walk and records it in the store's run log
    ///
    /// The run row is finished as `completed`, `completed_with_errors` or
    /// `failed` depending on the outcome.
    pub async fn run_logged(&mut self, config_hash: &str) -> Result<CrawlReport, IngestError> {
        let run_id = self.store.create_run(config_hash)?;
        tracing::info!("Starting ingest run {}", run_id);

        let outcome = self.run().await;

        let (status, totals) = match &outcome {
            Ok(report) if report.is_clean() => (RunStatus::Completed, report.totals()),
            Ok(report) => (RunStatus::CompletedWithErrors, report.totals()),
            Err(_) => (RunStatus::Failed, RunTotals::default()),
        };
        self.store.finish_run(run_id, status, &totals)?;

        outcome
    }

    /// Runs the walk
    ///
    /// 1. Fetch the entry page and extract category links
    /// 2. For each category: upsert it, fetch its page, extract subcategory links
    /// 3. Scan the category page, then each subcategory page, for products
    /// 4. Upsert every product and attach each image that processes cleanly
    ///
    /// Only a failure on the entry page is returned as an error.
    pub async fn run(&mut self) -> Result<CrawlReport, IngestError> {
        let start_time = std::time::Instant::now();
        let entry_url = self.entry_url.clone();

        let (entry_page, html) = self.fetch_html(entry_url.as_str()).await?;

        // Nested containers can match the category selector more than once
        let mut category_links = Vec::new();
        for link in extract_category_links(&html, &self.links, &entry_page) {
            if !category_links.contains(&link) {
                category_links.push(link);
            }
        }
        tracing::info!(
            "Found {} category links on {}",
            category_links.len(),
            entry_url
        );

        let mut report = CrawlReport::default();
        for category_url in &category_links {
            self.crawl_category(category_url, &mut report).await;
        }

        tracing::info!(
            "Ingest finished in {:?}: {} pages, {} products created, {} updated, {} images attached, {} skipped, {} failures",
            start_time.elapsed(),
            report.pages_scanned,
            report.products_created,
            report.products_updated,
            report.images_attached,
            report.images_skipped,
            report.failures.len()
        );

        Ok(report)
    }

    /// Processes one category and every subcategory page it links to
    async fn crawl_category(&mut self, category_url: &str, report: &mut CrawlReport) {
        let name = display_name_from_url(category_url);
        tracing::info!("Category '{}' ({})", name, category_url);

        let category = match get_or_create_category(&mut self.store, &name) {
            Ok(category) => category,
            Err(e) => {
                report.record_failure(category_url, FailureStage::CategoryWrite, e);
                return;
            }
        };
        report.categories += 1;

        let (page_url, html) = match self.fetch_html(category_url).await {
            Ok(page) => page,
            Err(e) => {
                report.record_failure(category_url, FailureStage::CategoryPage, e);
                return;
            }
        };

        let mut subcategory_urls = Vec::new();
        for link in extract_subcategory_links(&html, &self.links, &page_url) {
            let is_self = link == category_url || link == page_url.as_str();
            if !is_self && !subcategory_urls.contains(&link) {
                subcategory_urls.push(link);
            }
        }
        tracing::debug!(
            "Category '{}' has {} subcategory pages",
            category.name,
            subcategory_urls.len()
        );

        // The category page itself lists products filed directly under it
        self.scan_products(category_url, &page_url, &html, &category, None, report)
            .await;

        for sub_url in &subcategory_urls {
            self.crawl_subcategory(sub_url, &category, report).await;
        }
    }

    async fn crawl_subcategory(
        &mut self,
        sub_url: &str,
        category: &Category,
        report: &mut CrawlReport,
    ) {
        let name = display_name_from_url(sub_url);

        let subcategory = match get_or_create_subcategory(&mut self.store, &name, category) {
            Ok(subcategory) => subcategory,
            Err(e) => {
                report.record_failure(sub_url, FailureStage::SubCategoryWrite, e);
                return;
            }
        };

        // Every product on the page would be rejected for the same reason
        if subcategory.category_id != category.id {
            report.record_failure(
                sub_url,
                FailureStage::SubCategoryWrite,
                format!(
                    "subcategory '{}' is already filed under category {}, not '{}' ({}); page skipped",
                    subcategory.name, subcategory.category_id, category.name, category.id
                ),
            );
            return;
        }
        report.subcategories += 1;

        let (page_url, html) = match self.fetch_html(sub_url).await {
            Ok(page) => page,
            Err(e) => {
                report.record_failure(sub_url, FailureStage::ProductPage, e);
                return;
            }
        };

        self.scan_products(sub_url, &page_url, &html, category, Some(&subcategory), report)
            .await;
    }

    async fn scan_products(
        &mut self,
        url: &str,
        page_url: &Url,
        html: &str,
        category: &Category,
        subcategory: Option<&SubCategory>,
        report: &mut CrawlReport,
    ) {
        let drafts = extract_products(html, &self.products, page_url);
        tracing::info!("Scanning {}: {} products", url, drafts.len());
        report.pages_scanned += 1;

        for draft in &drafts {
            self.ingest_product(url, draft, category, subcategory, report)
                .await;
        }
    }

    /// Upserts one product and attaches its images in order
    async fn ingest_product(
        &mut self,
        page_url: &str,
        draft: &ProductDraft,
        category: &Category,
        subcategory: Option<&SubCategory>,
        report: &mut CrawlReport,
    ) {
        let (product, created) = match upsert_product(
            &mut self.store,
            &draft.title,
            &draft.description,
            &draft.features,
            category,
            subcategory,
        ) {
            Ok(result) => result,
            Err(e) => {
                report.record_failure(
                    page_url,
                    FailureStage::ProductWrite,
                    format!("'{}': {}", draft.title, e),
                );
                return;
            }
        };

        if created {
            report.products_created += 1;
        } else {
            report.products_updated += 1;
        }
        tracing::debug!(
            "{} product '{}' (id {}), {} images",
            if created { "Created" } else { "Updated" },
            product.name,
            product.id,
            draft.images.len()
        );

        for (index, image_url) in draft.images.iter().enumerate() {
            let Some(path) = self
                .images
                .process(&self.source, image_url, product.id, index + 1)
                .await
            else {
                report.images_skipped += 1;
                continue;
            };

            match attach_image(&mut self.store, &product, &path.to_string_lossy()) {
                Ok(_) => report.images_attached += 1,
                Err(e) => report.record_failure(image_url.as_str(), FailureStage::ImageWrite, e),
            }
        }
    }

    /// Fetches a page and decodes it as (lossy) UTF-8
    ///
    /// Also returns the URL the page was served from; relative links on the
    /// page resolve against it, not against the requested URL.
    async fn fetch_html(&self, url: &str) -> Result<(Url, String), IngestError> {
        let (final_url, body) = self.source.fetch_page(url).await.into_page(url)?;
        let page_url = Url::parse(&final_url)?;
        Ok((page_url, String::from_utf8_lossy(&body).into_owned()))
    }
}
