// ==========================================
// Vendi Backoffice - Product entity
// ==========================================
// Catalog item owned by one account (tenant). Written by the import
// pipeline and the product CRUD; stock_quantity mutations outside the
// pipeline must emit a stock movement.
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Product - catalog item
// ==========================================
// name_slug is the persisted slugified name used by the composite
// identity key lookup (account, name_slug, size, brand, color).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub account_id: i64,
    pub name: String,
    pub name_slug: String,
    pub description: Option<String>,
    pub sku: Option<String>,
    pub supplier_code: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub cost_price: Option<f64>,
    pub base_price: Option<f64>,
    pub stock_quantity: i64,
    pub active: bool,
    /// Back-reference to the import job that created this product.
    pub product_import_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==========================================
// ProductAttributes - build/update payload
// ==========================================
// What one import row maps to before persistence. The repository
// derives name_slug on write.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductAttributes {
    pub name: String,
    pub description: Option<String>,
    pub sku: Option<String>,
    pub supplier_code: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub cost_price: Option<f64>,
    pub base_price: Option<f64>,
    pub stock_quantity: i64,
    pub active: bool,
}
