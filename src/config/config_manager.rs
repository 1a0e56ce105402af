// ==========================================
// Vendi Backoffice - Configuration manager
// ==========================================
// Reads and writes per-account configuration.
// Storage: account_configs table (one row per account)
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::domain::account::{ImportDefaults, PricingConfig};
use crate::domain::types::{NameNormalization, SkuMode};
use crate::repository::account_config_repo::AccountConfigRepository;
use async_trait::async_trait;
use rusqlite::Connection;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager
// ==========================================
pub struct ConfigManager {
    repo: AccountConfigRepository,
}

impl ConfigManager {
    /// # Arguments
    /// - db_path: database file path
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            repo: AccountConfigRepository::new(db_path)?,
        })
    }

    /// Build from an existing connection. The unified PRAGMAs are
    /// re-applied (idempotent) so the connection behaves like every
    /// other one in the system.
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let guard = conn
                .lock()
                .map_err(|e| format!("Falha ao obter lock: {}", e))?;
            crate::db::configure_sqlite_connection(&guard)?;
        }
        Ok(Self {
            repo: AccountConfigRepository::from_connection(conn),
        })
    }

    /// Persist pricing parameters for the account.
    pub fn save_pricing(
        &self,
        account_id: i64,
        pricing: &PricingConfig,
    ) -> Result<(), Box<dyn Error>> {
        self.repo.save_pricing(account_id, pricing)?;
        Ok(())
    }
}

#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn pricing_config(&self, account_id: i64) -> Result<PricingConfig, Box<dyn Error>> {
        let defaults = PricingConfig::default();
        let config = self.repo.find_by_account(account_id)?;

        Ok(match config {
            Some(cfg) => PricingConfig {
                markup_percent: cfg
                    .automatic_pricing_markup_percent
                    .unwrap_or(defaults.markup_percent),
                rounding_mode: cfg
                    .automatic_pricing_rounding_mode
                    .unwrap_or(defaults.rounding_mode),
                use_csv_cost_when_missing: cfg.automatic_pricing_use_csv_when_cost_empty,
            },
            None => defaults,
        })
    }

    async fn import_defaults(&self, account_id: i64) -> Result<ImportDefaults, Box<dyn Error>> {
        let config = self.repo.find_by_account(account_id)?;

        Ok(match config {
            Some(cfg) => ImportDefaults {
                auto_generate_sku: cfg.product_import_auto_generate_sku,
                ignore_errors: cfg.product_import_ignore_errors,
                name_normalization: cfg
                    .product_import_name_normalization
                    .unwrap_or(NameNormalization::None),
                sku_generation_mode: cfg
                    .product_import_sku_generation_mode
                    .unwrap_or(SkuMode::NamePrefix),
            },
            None => ImportDefaults::default(),
        })
    }

    async fn save_import_defaults(
        &self,
        account_id: i64,
        defaults: ImportDefaults,
    ) -> Result<(), Box<dyn Error>> {
        self.repo.save_import_defaults(account_id, &defaults)?;
        Ok(())
    }
}
