// ==========================================
// Vendi Backoffice - API layer
// ==========================================
// Business facade over the import pipeline, consumed by the CLI and
// by whatever web layer sits on top.
// ==========================================

pub mod error;
pub mod import_api;

// Re-export core types
pub use error::{ApiError, ApiResult};
pub use import_api::ImportApi;
