// ==========================================
// Vendi Backoffice - Import job entity
// ==========================================
// One upload-to-completion lifecycle: raw file bytes are parsed into
// an ordered sequence of typed rows, processed against the catalog,
// and the per-row outcome is accumulated on the job itself.
// ==========================================

use crate::domain::types::{ImportMode, ImportStatus, NameNormalization, SkuMode, SourceKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// RawRow - one parsed line / NF-e product element
// ==========================================
// Fixed typed record populated once at parse time; downstream stages
// consume typed fields, never re-parse raw strings. JSON field names
// keep the Portuguese CSV column vocabulary so stored rows can be
// re-rendered for user correction and resubmission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    /// Target product id (update_only mode).
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "nome", default)]
    pub name: Option<String>,
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(rename = "codigo_fornecedor", default)]
    pub supplier_code: Option<String>,
    #[serde(rename = "categoria", default)]
    pub category: Option<String>,
    #[serde(rename = "marca", default)]
    pub brand: Option<String>,
    #[serde(rename = "cor", default)]
    pub color: Option<String>,
    #[serde(rename = "tamanho", default)]
    pub size: Option<String>,
    #[serde(rename = "preco_custo", default)]
    pub cost_price: Option<f64>,
    #[serde(rename = "preco_venda", default)]
    pub sale_price: Option<f64>,
    /// Some(true) when the sale price was written by automatic pricing,
    /// Some(false) when pricing ran but left the row unpriced.
    #[serde(rename = "preco_venda_auto", default)]
    pub sale_price_auto: Option<bool>,
    #[serde(rename = "quantidade_estoque", default)]
    pub stock_quantity: Option<i64>,
    #[serde(rename = "ativo", default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Default for RawRow {
    fn default() -> Self {
        Self {
            id: None,
            name: None,
            description: None,
            sku: None,
            supplier_code: None,
            category: None,
            brand: None,
            color: None,
            size: None,
            cost_price: None,
            sale_price: None,
            sale_price_auto: None,
            stock_quantity: None,
            active: true,
        }
    }
}

// ==========================================
// RowError - one failed row with its payload
// ==========================================
// `data` retains the original row so the caller can re-render it for
// correction; `row` is the 1-based position in the source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowError {
    pub row: usize,
    #[serde(default)]
    pub data: Option<RawRow>,
    pub errors: Vec<String>,
}

impl RowError {
    pub fn new(row: usize, data: Option<RawRow>, errors: Vec<String>) -> Self {
        Self { row, data, errors }
    }

    /// File-level error with no associated row (row 0).
    pub fn top_level(message: String) -> Self {
        Self {
            row: 0,
            data: None,
            errors: vec![message],
        }
    }
}

// ==========================================
// ProductImportOptions - per-job flags
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductImportOptions {
    pub import_mode: ImportMode,
    pub auto_generate_sku: bool,
    pub ignore_errors: bool,
    pub name_normalization: NameNormalization,
    pub sku_generation_mode: SkuMode,
}

impl Default for ProductImportOptions {
    fn default() -> Self {
        Self {
            import_mode: ImportMode::CreateOnly,
            auto_generate_sku: false,
            ignore_errors: false,
            name_normalization: NameNormalization::None,
            sku_generation_mode: SkuMode::NamePrefix,
        }
    }
}

// ==========================================
// ProductImport - the import job
// ==========================================
// Invariant: processed_rows = successful_rows + failed_rows after any
// processing pass. parsed_data and import_errors are independently
// ordered by row number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductImport {
    pub id: i64,
    pub account_id: i64,
    pub user_id: i64,
    pub source_kind: SourceKind,
    pub status: ImportStatus,
    pub import_mode: ImportMode,
    pub auto_generate_sku: bool,
    pub ignore_errors: bool,
    pub name_normalization: NameNormalization,
    pub sku_generation_mode: SkuMode,
    pub observations: Option<String>,
    pub parsed_data: Vec<RawRow>,
    pub import_errors: Vec<RowError>,
    pub total_rows: i64,
    pub processed_rows: i64,
    pub successful_rows: i64,
    pub failed_rows: i64,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductImport {
    pub fn create_only(&self) -> bool {
        self.import_mode == ImportMode::CreateOnly
    }

    pub fn update_only(&self) -> bool {
        self.import_mode == ImportMode::UpdateOnly
    }

    /// Deleting (soft) is only allowed while the import has not
    /// completed successfully.
    pub fn deletable(&self) -> bool {
        self.status != ImportStatus::Completed
    }

    /// All stored errors for a given 1-based row number.
    pub fn errors_for_row(&self, row: usize) -> Vec<&RowError> {
        self.import_errors.iter().filter(|e| e.row == row).collect()
    }

    /// True when any stored error is attached to an actual row
    /// (row >= 1); top-level file errors live at row 0.
    pub fn has_row_level_errors(&self) -> bool {
        self.import_errors.iter().any(|e| e.row >= 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_row_json_keeps_portuguese_keys() {
        let row = RawRow {
            name: Some("Camisa".to_string()),
            stock_quantity: Some(5),
            cost_price: Some(10.0),
            ..RawRow::default()
        };

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["nome"], "Camisa");
        assert_eq!(json["quantidade_estoque"], 5);
        assert_eq!(json["preco_custo"], 10.0);
        assert_eq!(json["ativo"], true);

        let back: RawRow = serde_json::from_value(json).unwrap();
        assert_eq!(back, row);
    }

    #[test]
    fn test_raw_row_defaults_on_missing_fields() {
        let row: RawRow = serde_json::from_str(r#"{"nome": "Tênis"}"#).unwrap();
        assert_eq!(row.name.as_deref(), Some("Tênis"));
        assert!(row.active);
        assert!(row.stock_quantity.is_none());
    }

    #[test]
    fn test_errors_for_row_lookup() {
        let mut import = ProductImport {
            id: 1,
            account_id: 1,
            user_id: 1,
            source_kind: SourceKind::Csv,
            status: ImportStatus::Ready,
            import_mode: ImportMode::CreateOnly,
            auto_generate_sku: false,
            ignore_errors: false,
            name_normalization: NameNormalization::None,
            sku_generation_mode: SkuMode::NamePrefix,
            observations: None,
            parsed_data: vec![],
            import_errors: vec![],
            total_rows: 0,
            processed_rows: 0,
            successful_rows: 0,
            failed_rows: 0,
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        import.import_errors.push(RowError::top_level("boom".to_string()));
        import
            .import_errors
            .push(RowError::new(2, None, vec!["Nome é obrigatório".to_string()]));

        assert!(import.errors_for_row(1).is_empty());
        assert_eq!(import.errors_for_row(2).len(), 1);
        assert!(import.has_row_level_errors());
    }
}
