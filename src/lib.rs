// ==========================================
// Vendi Backoffice - Core library
// ==========================================
// Multi-tenant retail backoffice core: the product catalog import
// pipeline with automatic pricing.
// Stack: Rust + SQLite
// ==========================================

// ==========================================
// Module declarations
// ==========================================

// Domain layer - entities and types
pub mod domain;

// Data access layer
pub mod repository;

// Import layer - the catalog import pipeline
pub mod importer;

// Configuration layer - per-account settings
pub mod config;

// Database infrastructure (connection init / unified PRAGMAs)
pub mod db;

// Logging
pub mod logging;

// API layer - business facade
pub mod api;

// ==========================================
// Re-export core types
// ==========================================

// Domain types
pub use domain::types::{
    ImportMode, ImportStatus, MovementKind, NameNormalization, RoundingMode, SaleStatus, SkuMode,
    SourceKind,
};

// Domain entities
pub use domain::{
    Account, AccountConfig, ImportDefaults, PricingConfig, Product, ProductAttributes,
    ProductImport, ProductImportOptions, RawRow, RowError, Sale, SaleItem, StockMovement,
};

// Pipeline
pub use importer::{
    ApplyPricingService, Calculator, CsvParser, DuplicateKey, ImportError, ImportLedger,
    ImportResult, NameNormalizer, ParseService, ProcessService, ProcessSummary, RevertService,
    RowProcessor, SkuGenerator, XmlParser,
};

// API
pub use api::{ApiError, ApiResult, ImportApi};

// ==========================================
// Constants
// ==========================================

// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Application name
pub const APP_NAME: &str = "Vendi Backoffice";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
