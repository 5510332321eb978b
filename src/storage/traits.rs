//! Storage traits and error types
//!
//! This module defines the trait interface the pipeline consumes as its
//! catalog store, and the associated error types.

use crate::catalog::{Category, Product, ProductFields, ProductImage, SubCategory};
use crate::storage::{RunRecord, RunStatus, RunTotals};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Catalog store consumed by the ingest pipeline
///
/// Lookups are by natural key (the display name). Implementations enforce
/// slug uniqueness and relational integrity; the pipeline never deletes.
pub trait CatalogStore {
    // ===== Categories =====

    fn find_category_by_name(&self, name: &str) -> StorageResult<Option<Category>>;

    fn create_category(&mut self, name: &str, slug: &str) -> StorageResult<Category>;

    // ===== Subcategories =====

    fn find_subcategory_by_name(&self, name: &str) -> StorageResult<Option<SubCategory>>;

    fn create_subcategory(
        &mut self,
        name: &str,
        slug: &str,
        category_id: i64,
    ) -> StorageResult<SubCategory>;

    // ===== Products =====

    /// Finds the oldest product with the given name
    fn find_product_by_name(&self, name: &str) -> StorageResult<Option<Product>>;

    fn create_product(
        &mut self,
        name: &str,
        slug: &str,
        fields: &ProductFields,
    ) -> StorageResult<Product>;

    /// Overwrites the mutable fields of an existing product
    fn update_product(&mut self, product_id: i64, fields: &ProductFields)
        -> StorageResult<Product>;

    // ===== Product Images =====

    /// Appends an image row; never merges with existing rows
    fn create_product_image(
        &mut self,
        product_id: i64,
        image_path: &str,
    ) -> StorageResult<ProductImage>;

    /// Lists a product's images in insertion order
    fn list_product_images(&self, product_id: i64) -> StorageResult<Vec<ProductImage>>;

    // ===== Run Log =====

    /// Records the start of an ingest run and returns its id
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Marks a run as finished with its final status and counters
    fn finish_run(&mut self, run_id: i64, status: RunStatus, totals: &RunTotals)
        -> StorageResult<()>;

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    // ===== Statistics =====

    fn count_categories(&self) -> StorageResult<u64>;

    fn count_subcategories(&self) -> StorageResult<u64>;

    fn count_products(&self) -> StorageResult<u64>;

    fn count_product_images(&self) -> StorageResult<u64>;
}
