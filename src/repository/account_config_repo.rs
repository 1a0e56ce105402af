// ==========================================
// Vendi Backoffice - Account config repository
// ==========================================
// One configuration row per account: automatic pricing parameters and
// the defaults used when creating a new import job.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::account::{AccountConfig, ImportDefaults, PricingConfig};
use crate::domain::types::{NameNormalization, RoundingMode, SkuMode};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::product_repo::parse_timestamp;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

pub struct AccountConfigRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AccountConfigRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn find_by_account(&self, account_id: i64) -> RepositoryResult<Option<AccountConfig>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, account_id, automatic_pricing_markup_percent,
                    automatic_pricing_rounding_mode,
                    automatic_pricing_use_csv_when_cost_empty,
                    product_import_auto_generate_sku, product_import_ignore_errors,
                    product_import_name_normalization, product_import_sku_generation_mode,
                    created_at, updated_at
             FROM account_configs WHERE account_id = ?1",
        )?;
        let result = stmt
            .query_row(params![account_id], map_config_row)
            .optional()?;
        Ok(result)
    }

    /// Persist the pricing parameters (creates the row when absent).
    pub fn save_pricing(&self, account_id: i64, pricing: &PricingConfig) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            r#"
            INSERT INTO account_configs (
                account_id, automatic_pricing_markup_percent,
                automatic_pricing_rounding_mode,
                automatic_pricing_use_csv_when_cost_empty, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            ON CONFLICT(account_id) DO UPDATE SET
                automatic_pricing_markup_percent = excluded.automatic_pricing_markup_percent,
                automatic_pricing_rounding_mode = excluded.automatic_pricing_rounding_mode,
                automatic_pricing_use_csv_when_cost_empty = excluded.automatic_pricing_use_csv_when_cost_empty,
                updated_at = excluded.updated_at
            "#,
            params![
                account_id,
                pricing.markup_percent,
                pricing.rounding_mode.as_str(),
                pricing.use_csv_cost_when_missing,
                now,
            ],
        )?;
        Ok(())
    }

    /// Persist the import option defaults chosen on the last upload
    /// (creates the row when absent).
    pub fn save_import_defaults(
        &self,
        account_id: i64,
        defaults: &ImportDefaults,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            r#"
            INSERT INTO account_configs (
                account_id, product_import_auto_generate_sku,
                product_import_ignore_errors, product_import_name_normalization,
                product_import_sku_generation_mode, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            ON CONFLICT(account_id) DO UPDATE SET
                product_import_auto_generate_sku = excluded.product_import_auto_generate_sku,
                product_import_ignore_errors = excluded.product_import_ignore_errors,
                product_import_name_normalization = excluded.product_import_name_normalization,
                product_import_sku_generation_mode = excluded.product_import_sku_generation_mode,
                updated_at = excluded.updated_at
            "#,
            params![
                account_id,
                defaults.auto_generate_sku,
                defaults.ignore_errors,
                defaults.name_normalization.as_str(),
                defaults.sku_generation_mode.as_str(),
                now,
            ],
        )?;
        Ok(())
    }
}

fn map_config_row(row: &Row<'_>) -> rusqlite::Result<AccountConfig> {
    let rounding: Option<String> = row.get(3)?;
    let normalization: Option<String> = row.get(7)?;
    let sku_mode: Option<String> = row.get(8)?;

    Ok(AccountConfig {
        id: row.get(0)?,
        account_id: row.get(1)?,
        automatic_pricing_markup_percent: row.get(2)?,
        automatic_pricing_rounding_mode: rounding.as_deref().and_then(RoundingMode::parse),
        automatic_pricing_use_csv_when_cost_empty: row.get(4)?,
        product_import_auto_generate_sku: row.get(5)?,
        product_import_ignore_errors: row.get(6)?,
        product_import_name_normalization: normalization
            .as_deref()
            .map(NameNormalization::parse),
        product_import_sku_generation_mode: sku_mode.as_deref().map(SkuMode::parse),
        created_at: parse_timestamp(row.get::<_, String>(9)?),
        updated_at: parse_timestamp(row.get::<_, String>(10)?),
    })
}
