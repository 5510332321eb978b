//! Storage module for the catalog store
//!
//! This module handles all database operations for the pipeline, including:
//! - SQLite database initialization and schema management
//! - Category, subcategory, product and product image persistence
//! - The ingest run log

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteCatalog;
pub use traits::{CatalogStore, StorageError, StorageResult};

use crate::IngestError;

use std::path::Path;

/// Initializes or opens a catalog database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteCatalog)` - Successfully initialized storage
/// * `Err(IngestError)` - Failed to initialize storage
pub fn open_catalog(path: &Path) -> Result<SqliteCatalog, IngestError> {
    Ok(SqliteCatalog::new(path)?)
}

/// Represents an ingest run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub totals: RunTotals,
}

/// Counters stored with a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTotals {
    pub pages_scanned: u32,
    pub products_created: u32,
    pub products_updated: u32,
    pub images_attached: u32,
    pub images_skipped: u32,
    pub failures: u32,
}

/// Status of an ingest run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    CompletedWithErrors,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::CompletedWithErrors => "completed_with_errors",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "completed_with_errors" => Some(Self::CompletedWithErrors),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
