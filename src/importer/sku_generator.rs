// ==========================================
// Vendi Backoffice - SKU generator
// ==========================================
// Three strategies, all collision-checked against BOTH the current
// run's claimed SKUs and the persisted catalog of the account: a SKU
// claimed earlier in the batch blocks a later row even before the
// earlier row is committed.
// ==========================================

use crate::domain::slug::slugify;
use crate::domain::types::SkuMode;
use crate::importer::ledger::ImportLedger;
use crate::importer::traits::CatalogStore;
use crate::repository::error::RepositoryResult;
use rand::Rng;

const NUMBERS_ONLY_LENGTH: u32 = 8;
const NUMBERS_AND_LETTERS_LENGTH: usize = 6;
const ALPHANUMERIC_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const RANDOM_MAX_ATTEMPTS: usize = 1000;
const NAME_PREFIX_MAX_ATTEMPTS: u32 = 99;

pub struct SkuGenerator<'a, C: CatalogStore> {
    account_id: i64,
    mode: SkuMode,
    catalog: &'a C,
}

impl<'a, C: CatalogStore> SkuGenerator<'a, C> {
    pub fn new(account_id: i64, mode: SkuMode, catalog: &'a C) -> Self {
        Self {
            account_id,
            mode,
            catalog,
        }
    }

    /// Generate a free SKU, or None when the strategy exhausts its
    /// attempts (the row is then imported without a SKU).
    pub async fn generate(
        &self,
        product_name: Option<&str>,
        ledger: &ImportLedger,
        exclude_id: Option<i64>,
    ) -> RepositoryResult<Option<String>> {
        match self.mode {
            SkuMode::NamePrefix => self.generate_name_prefix(product_name, ledger, exclude_id).await,
            SkuMode::NumbersOnly => self.generate_numbers_only(ledger, exclude_id).await,
            SkuMode::NumbersAndLetters => {
                self.generate_numbers_and_letters(ledger, exclude_id).await
            }
        }
    }

    /// Slugified, uppercased product name truncated to 8 chars; on
    /// collision a 2-digit suffix over a 6-char base, up to 99 tries.
    async fn generate_name_prefix(
        &self,
        product_name: Option<&str>,
        ledger: &ImportLedger,
        exclude_id: Option<i64>,
    ) -> RepositoryResult<Option<String>> {
        let name = product_name.map(str::trim).unwrap_or("");
        if name.is_empty() {
            return Ok(None);
        }

        let base: String = slugify(name)
            .to_uppercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        if base.is_empty() {
            return Ok(None);
        }

        let base: String = base.chars().take(8).collect();
        if !self.sku_exists(&base, ledger, exclude_id).await? {
            return Ok(Some(base));
        }

        let short_base: String = base.chars().take(6).collect();
        for counter in 1..=NAME_PREFIX_MAX_ATTEMPTS {
            let candidate = format!("{}{:02}", short_base, counter);
            if !self.sku_exists(&candidate, ledger, exclude_id).await? {
                return Ok(Some(candidate));
            }
        }

        Ok(None)
    }

    /// 8 random digits, up to 1000 tries.
    async fn generate_numbers_only(
        &self,
        ledger: &ImportLedger,
        exclude_id: Option<i64>,
    ) -> RepositoryResult<Option<String>> {
        let min = 10u64.pow(NUMBERS_ONLY_LENGTH - 1);
        let max = 10u64.pow(NUMBERS_ONLY_LENGTH) - 1;

        for _ in 0..RANDOM_MAX_ATTEMPTS {
            let candidate = rand::thread_rng().gen_range(min..=max).to_string();
            if !self.sku_exists(&candidate, ledger, exclude_id).await? {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    /// 6 random A-Z/0-9 chars, up to 1000 tries.
    async fn generate_numbers_and_letters(
        &self,
        ledger: &ImportLedger,
        exclude_id: Option<i64>,
    ) -> RepositoryResult<Option<String>> {
        for _ in 0..RANDOM_MAX_ATTEMPTS {
            let candidate: String = (0..NUMBERS_AND_LETTERS_LENGTH)
                .map(|_| {
                    let idx = rand::thread_rng().gen_range(0..ALPHANUMERIC_CHARS.len());
                    ALPHANUMERIC_CHARS[idx] as char
                })
                .collect();
            if !self.sku_exists(&candidate, ledger, exclude_id).await? {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    async fn sku_exists(
        &self,
        sku: &str,
        ledger: &ImportLedger,
        exclude_id: Option<i64>,
    ) -> RepositoryResult<bool> {
        if ledger.sku_claimed(sku) {
            return Ok(true);
        }
        self.catalog.sku_exists(self.account_id, sku, exclude_id).await
    }
}
