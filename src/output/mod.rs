//! Output module for run reports and catalog statistics
//!
//! This module handles:
//! - Rendering the end-of-run report
//! - Loading and printing catalog statistics

pub mod stats;

pub use stats::{load_statistics, print_statistics, CatalogStatistics};

use crate::crawler::CrawlReport;
use std::fmt::Write;

/// Renders a run report as plain text
pub fn format_report(report: &CrawlReport) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "=== Ingest Report ===\n");
    let _ = writeln!(out, "Categories: {}", report.categories);
    let _ = writeln!(out, "Subcategories: {}", report.subcategories);
    let _ = writeln!(out, "Pages scanned: {}", report.pages_scanned);
    let _ = writeln!(
        out,
        "Products: {} created, {} updated",
        report.products_created, report.products_updated
    );
    let _ = writeln!(
        out,
        "Images: {} attached, {} skipped",
        report.images_attached, report.images_skipped
    );

    if report.failures.is_empty() {
        let _ = writeln!(out, "\nNo failures");
    } else {
        let _ = writeln!(out, "\nFailures ({}):", report.failures.len());
        for failure in &report.failures {
            let _ = writeln!(
                out,
                "  - [{}] {}: {}",
                failure.stage, failure.url, failure.message
            );
        }
    }

    out
}

/// Prints a run report to stdout
pub fn print_report(report: &CrawlReport) {
    print!("{}", format_report(report));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::FailureStage;

    #[test]
    fn test_format_clean_report() {
        let report = CrawlReport {
            categories: 1,
            subcategories: 2,
            pages_scanned: 3,
            products_created: 2,
            images_attached: 2,
            images_skipped: 2,
            ..Default::default()
        };

        let text = format_report(&report);

        assert!(text.contains("Products: 2 created, 0 updated"));
        assert!(text.contains("Images: 2 attached, 2 skipped"));
        assert!(text.contains("No failures"));
    }

    #[test]
    fn test_format_report_lists_failures() {
        let mut report = CrawlReport::default();
        report.record_failure(
            "https://example.com/p/",
            FailureStage::ProductPage,
            "HTTP 500 for https://example.com/p/",
        );

        let text = format_report(&report);

        assert!(text.contains("Failures (1):"));
        assert!(text.contains("[product page] https://example.com/p/"));
    }
}
