// ==========================================
// Vendi Backoffice - Sale entities (revert collaborator)
// ==========================================
// The import core only needs the draft / non-draft distinction and
// enough of the item shape to remove reverted products from draft
// sales and recompute their totals.
// ==========================================

use crate::domain::types::SaleStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: i64,
    pub account_id: i64,
    pub status: SaleStatus,
    pub total_amount: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleItem {
    pub id: i64,
    pub sale_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: f64,
    pub total_price: f64,
    pub created_at: DateTime<Utc>,
}
