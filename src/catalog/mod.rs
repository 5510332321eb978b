//! Catalog domain: entities, naming rules and upsert semantics

mod models;
mod naming;
mod upsert;

pub use models::{Category, Product, ProductFields, ProductImage, SubCategory};
pub use naming::{display_name_from_url, slugify};
pub use upsert::{attach_image, get_or_create_category, get_or_create_subcategory, upsert_product};
