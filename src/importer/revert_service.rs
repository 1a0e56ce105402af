// ==========================================
// Vendi Backoffice - Revert service
// ==========================================
// Undo a completed import: delete the products it created, pulling
// them out of draft sales first (with totals recomputed). Blocked as
// soon as any produced product is on a confirmed (non-draft) sale.
// ==========================================

use crate::domain::product_import::ProductImport;
use crate::domain::types::ImportStatus;
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::product_import_repo::ProductImportRepository;
use crate::repository::product_repo::ProductRepository;
use crate::repository::sale_repo::SaleRepository;
use tracing::{info, instrument};

pub struct RevertService<'a> {
    import_repo: &'a ProductImportRepository,
    product_repo: &'a ProductRepository,
    sale_repo: &'a SaleRepository,
}

impl<'a> RevertService<'a> {
    pub fn new(
        import_repo: &'a ProductImportRepository,
        product_repo: &'a ProductRepository,
        sale_repo: &'a SaleRepository,
    ) -> Self {
        Self {
            import_repo,
            product_repo,
            sale_repo,
        }
    }

    /// Whether the job can be reverted right now (completed and none
    /// of its products on a confirmed sale).
    pub fn revertible(&self, import: &ProductImport) -> ImportResult<bool> {
        if import.status != ImportStatus::Completed {
            return Ok(false);
        }
        Ok(self.count_products_with_confirmed_sales(import)? == 0)
    }

    #[instrument(skip(self))]
    pub async fn call(&self, account_id: i64, import_id: i64) -> ImportResult<ProductImport> {
        let import = self
            .import_repo
            .find_by_id(account_id, import_id)?
            .ok_or(ImportError::ImportNotFound(import_id))?;

        if import.status != ImportStatus::Completed {
            return Err(ImportError::RevertNotCompleted);
        }

        let blocked = self.count_products_with_confirmed_sales(&import)?;
        if blocked > 0 {
            return Err(ImportError::RevertBlockedBySales { count: blocked });
        }

        let products = self
            .product_repo
            .list_by_import(account_id, import.id)?;
        let mut removed = 0usize;

        for product in &products {
            // Draft sales lose the product and get their totals
            // recomputed; confirmed sales were ruled out above.
            self.sale_repo
                .remove_product_from_draft_sales(account_id, product.id)?;
            self.product_repo.delete(account_id, product.id)?;
            removed += 1;
        }

        self.import_repo
            .update_status(import.id, ImportStatus::Reverted)?;
        info!(removed, "importação revertida");

        Ok(self.import_repo.require(account_id, import_id)?)
    }

    fn count_products_with_confirmed_sales(
        &self,
        import: &ProductImport,
    ) -> ImportResult<usize> {
        let products = self
            .product_repo
            .list_by_import(import.account_id, import.id)?;
        let mut count = 0;
        for product in &products {
            if self.sale_repo.product_has_non_draft_sales(product.id)? {
                count += 1;
            }
        }
        Ok(count)
    }
}
