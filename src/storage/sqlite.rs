//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the CatalogStore trait.

use crate::catalog::{Category, Product, ProductFields, ProductImage, SubCategory};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{CatalogStore, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus, RunTotals};
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;

const PRODUCT_COLUMNS: &str = "id, name, slug, description, features, category_id, subcategory_id,
     created_at, updated_at";

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, status, pages_scanned,
     products_created, products_updated, images_attached, images_skipped, failures";

/// SQLite storage backend
pub struct SqliteCatalog {
    conn: Connection,
}

impl SqliteCatalog {
    /// Opens (or creates) the catalog database at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteCatalog)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory catalog, used by tests and dry runs
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn get_category(&self, id: i64) -> StorageResult<Category> {
        self.conn
            .query_row(
                "SELECT id, name, slug FROM categories WHERE id = ?1",
                params![id],
                category_from_row,
            )
            .optional()?
            .ok_or_else(|| StorageError::NotFound(format!("Category ID {}", id)))
    }

    fn get_subcategory(&self, id: i64) -> StorageResult<SubCategory> {
        self.conn
            .query_row(
                "SELECT id, name, slug, category_id FROM subcategories WHERE id = ?1",
                params![id],
                subcategory_from_row,
            )
            .optional()?
            .ok_or_else(|| StorageError::NotFound(format!("SubCategory ID {}", id)))
    }

    fn get_product(&self, id: i64) -> StorageResult<Product> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS),
                params![id],
                ProductRow::from_row,
            )
            .optional()?
            .ok_or_else(|| StorageError::NotFound(format!("Product ID {}", id)))?;

        row.into_product()
    }
}

impl CatalogStore for SqliteCatalog {
    // ===== Categories =====

    fn find_category_by_name(&self, name: &str) -> StorageResult<Option<Category>> {
        let category = self
            .conn
            .query_row(
                "SELECT id, name, slug FROM categories WHERE name = ?1",
                params![name],
                category_from_row,
            )
            .optional()?;

        Ok(category)
    }

    fn create_category(&mut self, name: &str, slug: &str) -> StorageResult<Category> {
        self.conn
            .execute(
                "INSERT INTO categories (name, slug) VALUES (?1, ?2)",
                params![name, slug],
            )
            .map_err(classify_write_error)?;

        self.get_category(self.conn.last_insert_rowid())
    }

    // ===== Subcategories =====

    fn find_subcategory_by_name(&self, name: &str) -> StorageResult<Option<SubCategory>> {
        let subcategory = self
            .conn
            .query_row(
                "SELECT id, name, slug, category_id FROM subcategories WHERE name = ?1",
                params![name],
                subcategory_from_row,
            )
            .optional()?;

        Ok(subcategory)
    }

    fn create_subcategory(
        &mut self,
        name: &str,
        slug: &str,
        category_id: i64,
    ) -> StorageResult<SubCategory> {
        self.conn
            .execute(
                "INSERT INTO subcategories (name, slug, category_id) VALUES (?1, ?2, ?3)",
                params![name, slug, category_id],
            )
            .map_err(classify_write_error)?;

        self.get_subcategory(self.conn.last_insert_rowid())
    }

    // ===== Products =====

    fn find_product_by_name(&self, name: &str) -> StorageResult<Option<Product>> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM products WHERE name = ?1 ORDER BY id LIMIT 1",
                    PRODUCT_COLUMNS
                ),
                params![name],
                ProductRow::from_row,
            )
            .optional()?;

        row.map(ProductRow::into_product).transpose()
    }

    fn create_product(
        &mut self,
        name: &str,
        slug: &str,
        fields: &ProductFields,
    ) -> StorageResult<Product> {
        let now = Utc::now().to_rfc3339();
        let features = serde_json::to_string(&fields.features)?;

        self.conn
            .execute(
                "INSERT INTO products (name, slug, description, features, category_id,
                 subcategory_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
                params![
                    name,
                    slug,
                    fields.description,
                    features,
                    fields.category_id,
                    fields.subcategory_id,
                    now
                ],
            )
            .map_err(classify_write_error)?;

        self.get_product(self.conn.last_insert_rowid())
    }

    fn update_product(
        &mut self,
        product_id: i64,
        fields: &ProductFields,
    ) -> StorageResult<Product> {
        let now = Utc::now().to_rfc3339();
        let features = serde_json::to_string(&fields.features)?;

        let changed = self
            .conn
            .execute(
                "UPDATE products SET description = ?1, features = ?2, category_id = ?3,
                 subcategory_id = ?4, updated_at = ?5 WHERE id = ?6",
                params![
                    fields.description,
                    features,
                    fields.category_id,
                    fields.subcategory_id,
                    now,
                    product_id
                ],
            )
            .map_err(classify_write_error)?;

        if changed == 0 {
            return Err(StorageError::NotFound(format!("Product ID {}", product_id)));
        }

        self.get_product(product_id)
    }

    // ===== Product Images =====

    fn create_product_image(
        &mut self,
        product_id: i64,
        image_path: &str,
    ) -> StorageResult<ProductImage> {
        self.conn
            .execute(
                "INSERT INTO product_images (product_id, image_path) VALUES (?1, ?2)",
                params![product_id, image_path],
            )
            .map_err(classify_write_error)?;

        Ok(ProductImage {
            id: self.conn.last_insert_rowid(),
            product_id,
            image_path: image_path.to_string(),
        })
    }

    fn list_product_images(&self, product_id: i64) -> StorageResult<Vec<ProductImage>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, product_id, image_path FROM product_images
             WHERE product_id = ?1 ORDER BY id",
        )?;

        let images = stmt
            .query_map(params![product_id], |row| {
                Ok(ProductImage {
                    id: row.get(0)?,
                    product_id: row.get(1)?,
                    image_path: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(images)
    }

    // ===== Run Log =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO ingest_runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        totals: &RunTotals,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE ingest_runs SET status = ?1, finished_at = ?2, pages_scanned = ?3,
             products_created = ?4, products_updated = ?5, images_attached = ?6,
             images_skipped = ?7, failures = ?8 WHERE id = ?9",
            params![
                status.to_db_string(),
                now,
                totals.pages_scanned,
                totals.products_created,
                totals.products_updated,
                totals.images_attached,
                totals.images_skipped,
                totals.failures,
                run_id
            ],
        )?;

        if changed == 0 {
            return Err(StorageError::NotFound(format!("Run ID {}", run_id)));
        }

        Ok(())
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM ingest_runs ORDER BY id DESC LIMIT 1",
                    RUN_COLUMNS
                ),
                [],
                |row| {
                    Ok(RunRecord {
                        id: row.get(0)?,
                        started_at: row.get(1)?,
                        finished_at: row.get(2)?,
                        config_hash: row.get(3)?,
                        status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
                            .unwrap_or(RunStatus::Failed),
                        totals: RunTotals {
                            pages_scanned: row.get(5)?,
                            products_created: row.get(6)?,
                            products_updated: row.get(7)?,
                            images_attached: row.get(8)?,
                            images_skipped: row.get(9)?,
                            failures: row.get(10)?,
                        },
                    })
                },
            )
            .optional()?;

        Ok(run)
    }

    // ===== Statistics =====

    fn count_categories(&self) -> StorageResult<u64> {
        self.count_rows("categories")
    }

    fn count_subcategories(&self) -> StorageResult<u64> {
        self.count_rows("subcategories")
    }

    fn count_products(&self) -> StorageResult<u64> {
        self.count_rows("products")
    }

    fn count_product_images(&self) -> StorageResult<u64> {
        self.count_rows("product_images")
    }
}

impl SqliteCatalog {
    /// Table names are compile-time constants, never user input
    fn count_rows(&self, table: &'static str) -> StorageResult<u64> {
        let count: i64 =
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })?;
        Ok(count as u64)
    }
}

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
    })
}

fn subcategory_from_row(row: &Row<'_>) -> rusqlite::Result<SubCategory> {
    Ok(SubCategory {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        category_id: row.get(3)?,
    })
}

/// Raw product row; features are still JSON text
struct ProductRow {
    id: i64,
    name: String,
    slug: String,
    description: String,
    features: String,
    category_id: i64,
    subcategory_id: Option<i64>,
    created_at: String,
    updated_at: String,
}

impl ProductRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            slug: row.get(2)?,
            description: row.get(3)?,
            features: row.get(4)?,
            category_id: row.get(5)?,
            subcategory_id: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    fn into_product(self) -> StorageResult<Product> {
        Ok(Product {
            id: self.id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            features: serde_json::from_str(&self.features)?,
            category_id: self.category_id,
            subcategory_id: self.subcategory_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Surfaces UNIQUE / FOREIGN KEY failures as constraint violations
fn classify_write_error(err: rusqlite::Error) -> StorageError {
    match err {
        rusqlite::Error::SqliteFailure(ref code, ref message)
            if code.code == ErrorCode::ConstraintViolation =>
        {
            StorageError::ConstraintViolation(
                message.clone().unwrap_or_else(|| code.to_string()),
            )
        }
        other => StorageError::Sqlite(other),
    }
}
