// ==========================================
// Vendi Backoffice - Apply pricing service
// ==========================================
// Bulk-rewrites the sale price of every parsed row from its cost via
// the pricing calculator, in place, before processing. Rows without a
// positive cost are flagged as not auto-priced and keep whatever
// price the file supplied.
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::domain::product_import::ProductImport;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::pricing::Calculator;
use crate::repository::product_import_repo::ProductImportRepository;
use tracing::{info, instrument};

pub struct ApplyPricingService<'a, R: ImportConfigReader> {
    import_repo: &'a ProductImportRepository,
    config: &'a R,
}

impl<'a, R: ImportConfigReader> ApplyPricingService<'a, R> {
    pub fn new(import_repo: &'a ProductImportRepository, config: &'a R) -> Self {
        Self {
            import_repo,
            config,
        }
    }

    /// Rewrite every row's sale price using the account's pricing
    /// configuration. Returns the reloaded job.
    #[instrument(skip(self))]
    pub async fn call(&self, account_id: i64, import_id: i64) -> ImportResult<ProductImport> {
        let import = self
            .import_repo
            .find_by_id(account_id, import_id)?
            .ok_or(ImportError::ImportNotFound(import_id))?;

        let pricing = self
            .config
            .pricing_config(account_id)
            .await
            .map_err(|e| ImportError::Internal(e.to_string()))?;

        let mut rows = import.parsed_data;
        let mut priced = 0usize;
        let mut skipped = 0usize;

        for row in &mut rows {
            let cost = row.cost_price.filter(|c| *c > 0.0);
            match cost.and_then(|c| {
                Calculator::calculate(c, pricing.markup_percent, pricing.rounding_mode)
            }) {
                Some(price) => {
                    row.sale_price = Some(price);
                    row.sale_price_auto = Some(true);
                    priced += 1;
                }
                None => {
                    // No positive cost: never default the price to
                    // zero, just flag the row as not auto-priced.
                    row.sale_price_auto = Some(false);
                    skipped += 1;
                }
            }
        }

        self.import_repo.update_parsed_data(import.id, &rows)?;
        info!(
            priced,
            skipped,
            markup = pricing.markup_percent,
            mode = %pricing.rounding_mode,
            "precificação automática aplicada"
        );

        Ok(self.import_repo.require(account_id, import_id)?)
    }
}
