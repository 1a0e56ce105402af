// ==========================================
// Vendi Backoffice - Import pipeline seams
// ==========================================
// Boundary contracts the pipeline consumes. Implemented by the
// rusqlite repositories here; swappable in tests or when the storage
// layer changes.
// ==========================================

use crate::domain::product::{Product, ProductAttributes};
use crate::domain::product_import::{RawRow, RowError};
use crate::domain::stock_movement::MovementMetadata;
use crate::domain::types::MovementKind;
use crate::repository::error::RepositoryResult;
use crate::repository::product_repo::ProductRepository;
use crate::repository::stock_movement_repo::StockMovementRepository;
use async_trait::async_trait;

// ==========================================
// ParsedFile - shared parser output contract
// ==========================================
// rows going into processing + row-level errors, both ordered by the
// 1-based row number in the source file.
#[derive(Debug, Default)]
pub struct ParsedFile {
    pub rows: Vec<RawRow>,
    pub errors: Vec<RowError>,
    pub total_rows: i64,
}

// ==========================================
// SourceParser Trait
// ==========================================
// Implementors: CsvParser, XmlParser
// Row-level validation errors accumulate in ParsedFile::errors and do
// not stop the parse; file-level syntax errors abort it (Err).
pub trait SourceParser: Send + Sync {
    fn parse(&self, bytes: &[u8]) -> crate::importer::error::ImportResult<ParsedFile>;
}

// ==========================================
// CatalogStore Trait
// ==========================================
// Tenant-scoped catalog access used by SKU generation, the uniqueness
// validators and the row processor.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert_product(
        &self,
        account_id: i64,
        attrs: &ProductAttributes,
        product_import_id: Option<i64>,
    ) -> RepositoryResult<Product>;

    async fn update_product(
        &self,
        account_id: i64,
        id: i64,
        attrs: &ProductAttributes,
    ) -> RepositoryResult<Product>;

    async fn find_product(&self, account_id: i64, id: i64) -> RepositoryResult<Option<Product>>;

    async fn find_by_supplier_code(
        &self,
        account_id: i64,
        supplier_code: &str,
    ) -> RepositoryResult<Option<Product>>;

    async fn sku_exists(
        &self,
        account_id: i64,
        sku: &str,
        exclude_id: Option<i64>,
    ) -> RepositoryResult<bool>;

    async fn composite_key_exists(
        &self,
        account_id: i64,
        name_slug: &str,
        size: &str,
        brand: &str,
        color: &str,
        exclude_id: Option<i64>,
    ) -> RepositoryResult<bool>;

    async fn set_stock_quantity(
        &self,
        account_id: i64,
        id: i64,
        quantity: i64,
    ) -> RepositoryResult<()>;
}

// ==========================================
// MovementSink Trait
// ==========================================
// Inventory movement recording. The acting user is always explicit.
#[async_trait]
pub trait MovementSink: Send + Sync {
    #[allow(clippy::too_many_arguments)]
    async fn record_movement(
        &self,
        product: &Product,
        acting_user_id: Option<i64>,
        kind: MovementKind,
        quantity_change: i64,
        quantity_before: i64,
        quantity_after: i64,
        note: &str,
        metadata: MovementMetadata,
    ) -> RepositoryResult<()>;
}

// ==========================================
// Repository-backed implementations
// ==========================================

#[async_trait]
impl CatalogStore for ProductRepository {
    async fn insert_product(
        &self,
        account_id: i64,
        attrs: &ProductAttributes,
        product_import_id: Option<i64>,
    ) -> RepositoryResult<Product> {
        self.insert(account_id, attrs, product_import_id)
    }

    async fn update_product(
        &self,
        account_id: i64,
        id: i64,
        attrs: &ProductAttributes,
    ) -> RepositoryResult<Product> {
        self.update(account_id, id, attrs)
    }

    async fn find_product(&self, account_id: i64, id: i64) -> RepositoryResult<Option<Product>> {
        self.find_by_id(account_id, id)
    }

    async fn find_by_supplier_code(
        &self,
        account_id: i64,
        supplier_code: &str,
    ) -> RepositoryResult<Option<Product>> {
        ProductRepository::find_by_supplier_code(self, account_id, supplier_code)
    }

    async fn sku_exists(
        &self,
        account_id: i64,
        sku: &str,
        exclude_id: Option<i64>,
    ) -> RepositoryResult<bool> {
        ProductRepository::sku_exists(self, account_id, sku, exclude_id)
    }

    async fn composite_key_exists(
        &self,
        account_id: i64,
        name_slug: &str,
        size: &str,
        brand: &str,
        color: &str,
        exclude_id: Option<i64>,
    ) -> RepositoryResult<bool> {
        ProductRepository::composite_key_exists(
            self, account_id, name_slug, size, brand, color, exclude_id,
        )
    }

    async fn set_stock_quantity(
        &self,
        account_id: i64,
        id: i64,
        quantity: i64,
    ) -> RepositoryResult<()> {
        ProductRepository::set_stock_quantity(self, account_id, id, quantity)
    }
}

#[async_trait]
impl MovementSink for StockMovementRepository {
    async fn record_movement(
        &self,
        product: &Product,
        acting_user_id: Option<i64>,
        kind: MovementKind,
        quantity_change: i64,
        quantity_before: i64,
        quantity_after: i64,
        note: &str,
        metadata: MovementMetadata,
    ) -> RepositoryResult<()> {
        self.insert(
            product.id,
            product.account_id,
            acting_user_id,
            kind,
            quantity_change,
            quantity_before,
            quantity_after,
            Some(note),
            &metadata,
        )?;
        Ok(())
    }
}
