// ==========================================
// Vendi Backoffice - Row uniqueness validators
// ==========================================
// Check a row's SKU and composite identity key against the current
// run (ledger) and the persisted catalog of the account. Failures are
// recorded per-row data, never exceptions.
// ==========================================

use crate::domain::slug::slugify;
use crate::importer::duplicate_key::DuplicateKey;
use crate::importer::ledger::ImportLedger;
use crate::importer::traits::CatalogStore;
use crate::repository::error::RepositoryResult;

// ==========================================
// SkuValidator
// ==========================================
pub struct SkuValidator<'a, C: CatalogStore> {
    account_id: i64,
    catalog: &'a C,
}

impl<'a, C: CatalogStore> SkuValidator<'a, C> {
    pub fn new(account_id: i64, catalog: &'a C) -> Self {
        Self {
            account_id,
            catalog,
        }
    }

    /// Blank SKU is always valid (products may have no SKU).
    pub async fn validate(
        &self,
        sku: Option<&str>,
        ledger: &ImportLedger,
        exclude_id: Option<i64>,
    ) -> RepositoryResult<Vec<String>> {
        let sku = sku.map(str::trim).unwrap_or("");
        if sku.is_empty() {
            return Ok(Vec::new());
        }

        if ledger.sku_claimed(sku) {
            return Ok(vec![format!("SKU '{}' já foi usado nesta importação", sku)]);
        }

        if self
            .catalog
            .sku_exists(self.account_id, sku, exclude_id)
            .await?
        {
            return Ok(vec![format!("SKU '{}' já existe no sistema", sku)]);
        }

        Ok(Vec::new())
    }
}

// ==========================================
// CompositeKeyValidator
// ==========================================
// Duplicate detection by (name, size, brand, color). Catches
// collisions introduced by normalization (two differently-cased names
// slugifying to the same key) that the pre-flight pass may have
// missed against edited data.
pub struct CompositeKeyValidator<'a, C: CatalogStore> {
    account_id: i64,
    catalog: &'a C,
}

impl<'a, C: CatalogStore> CompositeKeyValidator<'a, C> {
    pub fn new(account_id: i64, catalog: &'a C) -> Self {
        Self {
            account_id,
            catalog,
        }
    }

    pub async fn validate(
        &self,
        name: &str,
        size: Option<&str>,
        brand: Option<&str>,
        color: Option<&str>,
        ledger: &ImportLedger,
        exclude_id: Option<i64>,
    ) -> RepositoryResult<Vec<String>> {
        let Some(key) = DuplicateKey::from_attributes(name, size, brand, color) else {
            return Ok(Vec::new());
        };

        if ledger.key_claimed(&key) {
            return Ok(vec![format!(
                "Já existe um produto com o nome '{}' nesta importação (mesmo tamanho/marca/cor)",
                name
            )]);
        }

        let exists = self
            .catalog
            .composite_key_exists(
                self.account_id,
                &slugify(name),
                &DuplicateKey::normalize_part(size),
                &DuplicateKey::normalize_part(brand),
                &DuplicateKey::normalize_part(color),
                exclude_id,
            )
            .await?;

        if exists {
            return Ok(vec![format!(
                "Já existe um produto com o nome '{}' no sistema (mesmo tamanho/marca/cor)",
                name
            )]);
        }

        Ok(Vec::new())
    }
}
