// ==========================================
// Vendi Backoffice - Domain layer
// ==========================================
// Entities and shared types for the catalog import core.
// No data access logic, no pipeline logic.
// ==========================================

pub mod account;
pub mod product;
pub mod product_import;
pub mod sale;
pub mod slug;
pub mod stock_movement;
pub mod types;

// Re-export core types
pub use account::{Account, AccountConfig, ImportDefaults, PricingConfig};
pub use product::{Product, ProductAttributes};
pub use product_import::{ProductImport, ProductImportOptions, RawRow, RowError};
pub use sale::{Sale, SaleItem};
pub use stock_movement::{MovementMetadata, StockMovement};
pub use types::{
    ImportMode, ImportStatus, MovementKind, NameNormalization, RoundingMode, SaleStatus, SkuMode,
    SourceKind,
};
