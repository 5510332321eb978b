//! Per-run counters and the list of isolated failures

use crate::storage::RunTotals;
use std::fmt;

/// The step of the walk at which a failure was isolated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureStage {
    /// Fetching a category page or reading its subcategory links
    CategoryPage,
    /// Fetching a page that lists products
    ProductPage,
    CategoryWrite,
    SubCategoryWrite,
    ProductWrite,
    ImageWrite,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CategoryPage => "category page",
            Self::ProductPage => "product page",
            Self::CategoryWrite => "category write",
            Self::SubCategoryWrite => "subcategory write",
            Self::ProductWrite => "product write",
            Self::ImageWrite => "image write",
        };
        f.write_str(name)
    }
}

/// A failure that was contained to one page or item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    /// Page URL, or the item's source URL for writes
    pub url: String,
    pub stage: FailureStage,
    pub message: String,
}

/// Summary of one crawl run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    pub categories: u32,
    pub subcategories: u32,
    pub pages_scanned: u32,
    pub products_created: u32,
    pub products_updated: u32,
    pub images_attached: u32,
    pub images_skipped: u32,
    pub failures: Vec<PageFailure>,
}

impl CrawlReport {
    pub fn record_failure(
        &mut self,
        url: impl Into<String>,
        stage: FailureStage,
        message: impl fmt::Display,
    ) {
        let failure = PageFailure {
            url: url.into(),
            stage,
            message: message.to_string(),
        };
        tracing::warn!(
            "{} failed for {}: {}",
            failure.stage,
            failure.url,
            failure.message
        );
        self.failures.push(failure);
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Counters in the shape stored with the run log
    pub fn totals(&self) -> RunTotals {
        RunTotals {
            pages_scanned: self.pages_scanned,
            products_created: self.products_created,
            products_updated: self.products_updated,
            images_attached: self.images_attached,
            images_skipped: self.images_skipped,
            failures: self.failures.len() as u32,
        }
    }
}
