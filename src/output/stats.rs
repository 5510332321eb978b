//! Statistics generation from the catalog database
//!
//! This module provides functionality for extracting and displaying
//! catalog statistics from the storage layer.

use crate::storage::{CatalogStore, RunRecord};
use crate::IngestError;

/// Catalog statistics summary
#[derive(Debug, Clone)]
pub struct CatalogStatistics {
    pub categories: u64,
    pub subcategories: u64,
    pub products: u64,
    pub product_images: u64,

    /// Most recent ingest run, if any
    pub latest_run: Option<RunRecord>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `store` - The catalog store to query
///
/// # Returns
///
/// * `Ok(CatalogStatistics)` - Successfully loaded statistics
/// * `Err(IngestError)` - Failed to query statistics
pub fn load_statistics(store: &dyn CatalogStore) -> Result<CatalogStatistics, IngestError> {
    Ok(CatalogStatistics {
        categories: store.count_categories()?,
        subcategories: store.count_subcategories()?,
        products: store.count_products()?,
        product_images: store.count_product_images()?,
        latest_run: store.get_latest_run()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CatalogStatistics) {
    println!("=== Catalog Statistics ===\n");

    println!("Catalog:");
    println!("  Categories: {}", stats.categories);
    println!("  Subcategories: {}", stats.subcategories);
    println!("  Products: {}", stats.products);
    println!("  Product images: {}", stats.product_images);

    if stats.products > 0 {
        println!(
            "  Images per product: {:.1}",
            stats.product_images as f64 / stats.products as f64
        );
    }
    println!();

    match &stats.latest_run {
        Some(run) => {
            println!("Latest Run (#{}):", run.id);
            println!("  Status: {}", run.status.to_db_string());
            println!("  Started: {}", run.started_at);
            println!(
                "  Finished: {}",
                run.finished_at.as_deref().unwrap_or("(not finished)")
            );
            println!("  Config hash: {}", run.config_hash);
            println!("  Pages scanned: {}", run.totals.pages_scanned);
            println!(
                "  Products: {} created, {} updated",
                run.totals.products_created, run.totals.products_updated
            );
            println!(
                "  Images: {} attached, {} skipped",
                run.totals.images_attached, run.totals.images_skipped
            );
            println!("  Failures: {}", run.totals.failures);
        }
        None => println!("No ingest runs recorded"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{get_or_create_category, get_or_create_subcategory};
    use crate::storage::SqliteCatalog;

    #[test]
    fn test_load_statistics() {
        let mut store = SqliteCatalog::open_in_memory().unwrap();
        let category = get_or_create_category(&mut store, "Utilaje").unwrap();
        get_or_create_subcategory(&mut store, "Tocatoare", &category).unwrap();
        store.create_run("hash").unwrap();

        let stats = load_statistics(&store).unwrap();

        assert_eq!(stats.categories, 1);
        assert_eq!(stats.subcategories, 1);
        assert_eq!(stats.products, 0);
        assert_eq!(stats.product_images, 0);
        assert_eq!(stats.latest_run.unwrap().config_hash, "hash");
    }
}
