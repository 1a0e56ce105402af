// ==========================================
// Vendi Backoffice - Account (tenant) entities
// ==========================================
// Every catalog row is scoped to one account. AccountConfig is the
// per-tenant configuration row; PricingConfig / ImportDefaults are
// the read-only views the import pipeline consumes.
// ==========================================

use crate::domain::types::{NameNormalization, RoundingMode, SkuMode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

// ==========================================
// AccountConfig - per-tenant configuration row
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    pub id: i64,
    pub account_id: i64,
    pub automatic_pricing_markup_percent: Option<f64>,
    pub automatic_pricing_rounding_mode: Option<RoundingMode>,
    pub automatic_pricing_use_csv_when_cost_empty: bool,
    pub product_import_auto_generate_sku: bool,
    pub product_import_ignore_errors: bool,
    pub product_import_name_normalization: Option<NameNormalization>,
    pub product_import_sku_generation_mode: Option<SkuMode>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==========================================
// PricingConfig - automatic pricing input
// ==========================================
// Read-only input to the pricing calculator. Defaults applied when
// the tenant has no configuration: markup 35%, round up to X9.90.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    pub markup_percent: f64,
    pub rounding_mode: RoundingMode,
    /// Keep the price supplied by the file when the row has no cost.
    pub use_csv_cost_when_missing: bool,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            markup_percent: 35.0,
            rounding_mode: RoundingMode::Up990,
            use_csv_cost_when_missing: true,
        }
    }
}

// ==========================================
// ImportDefaults - new-job option defaults
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportDefaults {
    pub auto_generate_sku: bool,
    pub ignore_errors: bool,
    pub name_normalization: NameNormalization,
    pub sku_generation_mode: SkuMode,
}
