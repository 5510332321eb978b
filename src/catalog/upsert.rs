//! Create-or-update of catalog entities keyed by natural identity
//!
//! None of these functions catch store failures; the caller decides how far
//! an error propagates.

use crate::catalog::naming::slugify;
use crate::catalog::{Category, Product, ProductFields, ProductImage, SubCategory};
use crate::storage::{CatalogStore, StorageError, StorageResult};

/// Looks a category up by name, creating it with a derived slug on a miss
pub fn get_or_create_category<S: CatalogStore + ?Sized>(
    store: &mut S,
    name: &str,
) -> StorageResult<Category> {
    if let Some(category) = store.find_category_by_name(name)? {
        return Ok(category);
    }

    tracing::debug!("Creating category '{}'", name);
    store.create_category(name, &slugify(name))
}

/// Looks a subcategory up by name, creating it under `category` on a miss
///
/// An existing subcategory is returned unchanged, even when it was first
/// filed under a different category.
pub fn get_or_create_subcategory<S: CatalogStore + ?Sized>(
    store: &mut S,
    name: &str,
    category: &Category,
) -> StorageResult<SubCategory> {
    if let Some(subcategory) = store.find_subcategory_by_name(name)? {
        return Ok(subcategory);
    }

    tracing::debug!("Creating subcategory '{}' under '{}'", name, category.name);
    store.create_subcategory(name, &slugify(name), category.id)
}

/// Creates a product, or overwrites the mutable fields of the existing one
///
/// Returns the stored product and whether it was newly created. Rejects a
/// subcategory that belongs to a different category than `category`.
pub fn upsert_product<S: CatalogStore + ?Sized>(
    store: &mut S,
    name: &str,
    description: &str,
    features: &[String],
    category: &Category,
    subcategory: Option<&SubCategory>,
) -> StorageResult<(Product, bool)> {
    if let Some(sub) = subcategory {
        if sub.category_id != category.id {
            return Err(StorageError::ConstraintViolation(format!(
                "subcategory '{}' belongs to category {}, not '{}' ({})",
                sub.name, sub.category_id, category.name, category.id
            )));
        }
    }

    let fields = ProductFields {
        description: description.to_string(),
        features: features.to_vec(),
        category_id: category.id,
        subcategory_id: subcategory.map(|s| s.id),
    };

    match store.find_product_by_name(name)? {
        Some(existing) => {
            let product = store.update_product(existing.id, &fields)?;
            Ok((product, false))
        }
        None => {
            let product = store.create_product(name, &slugify(name), &fields)?;
            Ok((product, true))
        }
    }
}

/// Appends an image row for `product`; never checks for duplicates
pub fn attach_image<S: CatalogStore + ?Sized>(
    store: &mut S,
    product: &Product,
    image_path: &str,
) -> StorageResult<ProductImage> {
    store.create_product_image(product.id, image_path)
}
