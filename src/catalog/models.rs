//! Catalog entities as they come back from the store

/// A top-level product category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// A subcategory filed under exactly one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubCategory {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub category_id: i64,
}

/// A product row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    /// Ordered feature bullets
    pub features: Vec<String>,
    pub category_id: i64,
    pub subcategory_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

/// A stored image file attached to a product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductImage {
    pub id: i64,
    pub product_id: i64,
    pub image_path: String,
}

/// Mutable product fields written on create and on every re-ingest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFields {
    pub description: String,
    pub features: Vec<String>,
    pub category_id: i64,
    pub subcategory_id: Option<i64>,
}
