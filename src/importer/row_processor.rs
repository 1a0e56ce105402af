// ==========================================
// Vendi Backoffice - Row processor
// ==========================================
// Drives one parsed row to a catalog mutation: create-vs-update
// resolution, name normalization, SKU generation, uniqueness
// validation, persistence and the matching stock movement.
// Validation failures become recorded row failures, never errors;
// Err is reserved for unexpected persistence trouble.
// ==========================================

use crate::domain::product::{Product, ProductAttributes};
use crate::domain::product_import::{ProductImport, RawRow};
use crate::domain::stock_movement::MovementMetadata;
use crate::domain::types::{ImportMode, MovementKind};
use crate::importer::duplicate_key::DuplicateKey;
use crate::importer::error::ImportResult;
use crate::importer::ledger::ImportLedger;
use crate::importer::name_normalizer::NameNormalizer;
use crate::importer::sku_generator::SkuGenerator;
use crate::importer::traits::{CatalogStore, MovementSink};
use crate::importer::validators::{CompositeKeyValidator, SkuValidator};
use tracing::debug;
use uuid::Uuid;

// ==========================================
// RowOutcome - what happened to one row
// ==========================================
#[derive(Debug)]
pub enum RowOutcome {
    Created(Product),
    Updated(Product),
    /// create_only: the supplier code matched an existing product, so
    /// its stock was topped up instead of creating a duplicate.
    StockAdded(Product),
    Failed(Vec<String>),
}

impl RowOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, RowOutcome::Failed(_))
    }
}

// ==========================================
// RowProcessor
// ==========================================
pub struct RowProcessor<'a, C: CatalogStore, M: MovementSink> {
    account_id: i64,
    acting_user_id: i64,
    run_id: Uuid,
    import: &'a ProductImport,
    catalog: &'a C,
    movements: &'a M,
}

impl<'a, C: CatalogStore, M: MovementSink> RowProcessor<'a, C, M> {
    pub fn new(
        import: &'a ProductImport,
        acting_user_id: i64,
        run_id: Uuid,
        catalog: &'a C,
        movements: &'a M,
    ) -> Self {
        Self {
            account_id: import.account_id,
            acting_user_id,
            run_id,
            import,
            catalog,
            movements,
        }
    }

    /// Process one row. Successes and failures are both recorded in
    /// the ledger; the outcome is returned so the orchestrator can
    /// early-exit in strict mode.
    pub async fn process(
        &self,
        row: &RawRow,
        row_number: usize,
        ledger: &mut ImportLedger,
    ) -> ImportResult<RowOutcome> {
        match self.import.import_mode {
            ImportMode::CreateOnly => self.process_create(row, row_number, ledger).await,
            ImportMode::UpdateOnly => self.process_update(row, row_number, ledger).await,
        }
    }

    // ===== create_only =====

    async fn process_create(
        &self,
        row: &RawRow,
        row_number: usize,
        ledger: &mut ImportLedger,
    ) -> ImportResult<RowOutcome> {
        // Known supplier code: add quantity to the existing product
        // instead of creating a duplicate.
        if let Some(code) = present(row.supplier_code.as_deref()) {
            if let Some(existing) = self
                .catalog
                .find_by_supplier_code(self.account_id, code)
                .await?
            {
                return self
                    .add_stock_to_existing(existing, code, row, row_number, ledger)
                    .await;
            }
        }

        let name = self.normalized_name(row);
        if name.trim().is_empty() {
            return Ok(self.fail(row, row_number, ledger, vec!["Nome é obrigatório".to_string()]));
        }

        let mut attrs = self.map_attributes(row, &name);

        if attrs.sku.is_none() && self.import.auto_generate_sku {
            let generator =
                SkuGenerator::new(self.account_id, self.import.sku_generation_mode, self.catalog);
            attrs.sku = generator.generate(Some(&name), ledger, None).await?;
        }

        if let Some(errors) = self.uniqueness_errors(&attrs, ledger, None).await? {
            return Ok(self.fail(row, row_number, ledger, errors));
        }

        let product = match self
            .catalog
            .insert_product(self.account_id, &attrs, Some(self.import.id))
            .await
        {
            Ok(product) => product,
            Err(e) => {
                return Ok(self.fail(
                    row,
                    row_number,
                    ledger,
                    vec![format!("Erro ao salvar produto: {}", e)],
                ));
            }
        };

        if product.stock_quantity > 0 {
            self.movements
                .record_movement(
                    &product,
                    Some(self.acting_user_id),
                    MovementKind::Initial,
                    product.stock_quantity,
                    0,
                    product.stock_quantity,
                    &format!("Estoque inicial - Importação #{}", self.import.id),
                    MovementMetadata::for_import(self.import.id, row_number, self.run_id),
                )
                .await?;
        }

        self.track_success(&attrs, ledger);
        debug!(row = row_number, product_id = product.id, "produto criado");
        Ok(RowOutcome::Created(product))
    }

    async fn add_stock_to_existing(
        &self,
        existing: Product,
        code: &str,
        row: &RawRow,
        row_number: usize,
        ledger: &mut ImportLedger,
    ) -> ImportResult<RowOutcome> {
        let quantity = row.stock_quantity.unwrap_or(0);
        if quantity <= 0 {
            ledger.record_success();
            return Ok(RowOutcome::StockAdded(existing));
        }

        let before = existing.stock_quantity;
        let after = before + quantity;
        self.catalog
            .set_stock_quantity(self.account_id, existing.id, after)
            .await?;
        self.movements
            .record_movement(
                &existing,
                Some(self.acting_user_id),
                MovementKind::AdjustmentIn,
                quantity,
                before,
                after,
                &format!(
                    "Entrada de estoque via importação #{} (código de fornecedor {})",
                    self.import.id, code
                ),
                MovementMetadata::for_import(self.import.id, row_number, self.run_id),
            )
            .await?;

        ledger.record_success();
        debug!(
            row = row_number,
            product_id = existing.id,
            quantity,
            "estoque somado a produto existente"
        );

        let mut updated = existing;
        updated.stock_quantity = after;
        Ok(RowOutcome::StockAdded(updated))
    }

    // ===== update_only =====

    async fn process_update(
        &self,
        row: &RawRow,
        row_number: usize,
        ledger: &mut ImportLedger,
    ) -> ImportResult<RowOutcome> {
        let Some(id) = row.id else {
            return Ok(self.fail(
                row,
                row_number,
                ledger,
                vec!["ID do produto é obrigatório no modo de atualização".to_string()],
            ));
        };

        let Some(existing) = self.catalog.find_product(self.account_id, id).await? else {
            return Ok(self.fail(
                row,
                row_number,
                ledger,
                vec![format!("Produto com ID {} não encontrado", id)],
            ));
        };

        let name = self.normalized_name(row);
        if name.trim().is_empty() {
            return Ok(self.fail(row, row_number, ledger, vec!["Nome é obrigatório".to_string()]));
        }

        let mut attrs = self.map_attributes(row, &name);
        // Rows without a quantity keep the current stock level.
        if row.stock_quantity.is_none() {
            attrs.stock_quantity = existing.stock_quantity;
        }

        if attrs.sku.is_none() && self.import.auto_generate_sku {
            let generator =
                SkuGenerator::new(self.account_id, self.import.sku_generation_mode, self.catalog);
            attrs.sku = generator.generate(Some(&name), ledger, Some(id)).await?;
        }

        // The product's own id is excluded from uniqueness checks.
        if let Some(errors) = self.uniqueness_errors(&attrs, ledger, Some(id)).await? {
            return Ok(self.fail(row, row_number, ledger, errors));
        }

        let product = match self.catalog.update_product(self.account_id, id, &attrs).await {
            Ok(product) => product,
            Err(e) => {
                return Ok(self.fail(
                    row,
                    row_number,
                    ledger,
                    vec![format!("Erro ao salvar produto: {}", e)],
                ));
            }
        };

        // Stock changes on update are adjustments, never "initial".
        let delta = product.stock_quantity - existing.stock_quantity;
        if delta != 0 {
            let kind = if delta > 0 {
                MovementKind::AdjustmentIn
            } else {
                MovementKind::AdjustmentOut
            };
            self.movements
                .record_movement(
                    &product,
                    Some(self.acting_user_id),
                    kind,
                    delta,
                    existing.stock_quantity,
                    product.stock_quantity,
                    &format!("Ajuste de estoque - Importação #{}", self.import.id),
                    MovementMetadata::for_import(self.import.id, row_number, self.run_id),
                )
                .await?;
        }

        self.track_success(&attrs, ledger);
        debug!(row = row_number, product_id = product.id, "produto atualizado");
        Ok(RowOutcome::Updated(product))
    }

    // ===== shared helpers =====

    fn normalized_name(&self, row: &RawRow) -> String {
        let raw = row.name.as_deref().unwrap_or("");
        NameNormalizer::normalize(raw, self.import.name_normalization)
    }

    fn map_attributes(&self, row: &RawRow, name: &str) -> ProductAttributes {
        ProductAttributes {
            name: name.to_string(),
            description: row.description.clone(),
            sku: present(row.sku.as_deref()).map(String::from),
            supplier_code: present(row.supplier_code.as_deref()).map(String::from),
            category: row.category.clone(),
            brand: row.brand.clone(),
            color: row.color.clone(),
            size: row.size.clone(),
            cost_price: row.cost_price,
            base_price: row.sale_price,
            stock_quantity: row.stock_quantity.unwrap_or(0),
            active: row.active,
        }
    }

    async fn uniqueness_errors(
        &self,
        attrs: &ProductAttributes,
        ledger: &ImportLedger,
        exclude_id: Option<i64>,
    ) -> ImportResult<Option<Vec<String>>> {
        let sku_validator = SkuValidator::new(self.account_id, self.catalog);
        let sku_errors = sku_validator
            .validate(attrs.sku.as_deref(), ledger, exclude_id)
            .await?;
        if !sku_errors.is_empty() {
            return Ok(Some(sku_errors));
        }

        let key_validator = CompositeKeyValidator::new(self.account_id, self.catalog);
        let key_errors = key_validator
            .validate(
                &attrs.name,
                attrs.size.as_deref(),
                attrs.brand.as_deref(),
                attrs.color.as_deref(),
                ledger,
                exclude_id,
            )
            .await?;
        if !key_errors.is_empty() {
            return Ok(Some(key_errors));
        }

        Ok(None)
    }

    fn track_success(&self, attrs: &ProductAttributes, ledger: &mut ImportLedger) {
        if let Some(key) = DuplicateKey::from_attributes(
            &attrs.name,
            attrs.size.as_deref(),
            attrs.brand.as_deref(),
            attrs.color.as_deref(),
        ) {
            ledger.track_key(key);
        }
        if let Some(sku) = attrs.sku.as_deref() {
            ledger.track_sku(sku);
        }
        ledger.record_success();
    }

    fn fail(
        &self,
        row: &RawRow,
        row_number: usize,
        ledger: &mut ImportLedger,
        errors: Vec<String>,
    ) -> RowOutcome {
        ledger.record_failure(row_number, Some(row.clone()), errors.clone());
        RowOutcome::Failed(errors)
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
