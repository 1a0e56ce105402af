// ==========================================
// Vendi Backoffice - Import configuration reader trait
// ==========================================
// Read interface for the per-account configuration the import
// pipeline consumes (no writes, no business logic).
// ==========================================

use crate::domain::account::{ImportDefaults, PricingConfig};
use async_trait::async_trait;
use std::error::Error;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// Implementor: ConfigManager (reads the account_configs table)
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// Automatic pricing parameters for the account.
    ///
    /// # Defaults (no configuration row)
    /// - markup_percent: 35
    /// - rounding_mode: up_9_90
    /// - use_csv_cost_when_missing: true
    async fn pricing_config(&self, account_id: i64) -> Result<PricingConfig, Box<dyn Error>>;

    /// Option defaults for a new import job (the values last chosen
    /// by the account, or falsy defaults).
    async fn import_defaults(&self, account_id: i64) -> Result<ImportDefaults, Box<dyn Error>>;

    /// Remember the options chosen for a job as the account defaults
    /// for the next upload.
    async fn save_import_defaults(
        &self,
        account_id: i64,
        defaults: ImportDefaults,
    ) -> Result<(), Box<dyn Error>>;
}
