// ==========================================
// Vendi Backoffice - Domain type definitions
// ==========================================
// Enums shared across the import pipeline, the
// repositories and the API layer.
// Serialization format: snake_case (matches database columns)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// SourceKind - import file format
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Csv, // delimited text with header row
    Xml, // Brazilian NF-e invoice
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Csv => "csv",
            SourceKind::Xml => "xml",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "csv" => Some(SourceKind::Csv),
            "xml" => Some(SourceKind::Xml),
            _ => None,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// ImportStatus - import job lifecycle
// ==========================================
// Transitions are monotonic:
// pending -> parsing -> ready -> processing -> {completed | failed}
// completed -> reverted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    Pending,
    Parsing,
    Ready,
    Processing,
    Completed,
    Failed,
    Reverted,
}

impl ImportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStatus::Pending => "pending",
            ImportStatus::Parsing => "parsing",
            ImportStatus::Ready => "ready",
            ImportStatus::Processing => "processing",
            ImportStatus::Completed => "completed",
            ImportStatus::Failed => "failed",
            ImportStatus::Reverted => "reverted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(ImportStatus::Pending),
            "parsing" => Some(ImportStatus::Parsing),
            "ready" => Some(ImportStatus::Ready),
            "processing" => Some(ImportStatus::Processing),
            "completed" => Some(ImportStatus::Completed),
            "failed" => Some(ImportStatus::Failed),
            "reverted" => Some(ImportStatus::Reverted),
            _ => None,
        }
    }

    /// Display label shown in the backoffice UI (pt-BR).
    pub fn label(&self) -> &'static str {
        match self {
            ImportStatus::Pending => "Pendente",
            ImportStatus::Parsing => "Processando",
            ImportStatus::Ready => "Pronto",
            ImportStatus::Processing => "Importando",
            ImportStatus::Completed => "Concluído",
            ImportStatus::Failed => "Falhou",
            ImportStatus::Reverted => "Revertido",
        }
    }
}

impl fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// ImportMode - create vs update semantics
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    CreateOnly, // new products; supplier-code match adds stock instead
    UpdateOnly, // rows must carry the id of an existing product
}

impl ImportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportMode::CreateOnly => "create_only",
            ImportMode::UpdateOnly => "update_only",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "create_only" => Some(ImportMode::CreateOnly),
            "update_only" => Some(ImportMode::UpdateOnly),
            _ => None,
        }
    }
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// NameNormalization - product name rewrite mode
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameNormalization {
    #[default]
    None,
    Uppercase,
    Sentence,
    Title,
}

impl NameNormalization {
    pub fn as_str(&self) -> &'static str {
        match self {
            NameNormalization::None => "none",
            NameNormalization::Uppercase => "uppercase",
            NameNormalization::Sentence => "sentence",
            NameNormalization::Title => "title",
        }
    }

    /// Blank or unknown values fall back to `None` (no rewrite).
    pub fn parse(value: &str) -> Self {
        match value {
            "uppercase" => NameNormalization::Uppercase,
            "sentence" => NameNormalization::Sentence,
            "title" => NameNormalization::Title,
            _ => NameNormalization::None,
        }
    }
}

impl fmt::Display for NameNormalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// SkuMode - SKU generation strategy
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkuMode {
    #[default]
    NamePrefix, // slug of the product name, numeric suffix on collision
    NumbersOnly, // 8 random digits
    NumbersAndLetters, // 6 random A-Z0-9 chars
}

impl SkuMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkuMode::NamePrefix => "name_prefix",
            SkuMode::NumbersOnly => "numbers_only",
            SkuMode::NumbersAndLetters => "numbers_and_letters",
        }
    }

    /// Blank or unknown values fall back to the default strategy.
    pub fn parse(value: &str) -> Self {
        match value {
            "numbers_only" => SkuMode::NumbersOnly,
            "numbers_and_letters" => SkuMode::NumbersAndLetters,
            _ => SkuMode::NamePrefix,
        }
    }
}

impl fmt::Display for SkuMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// RoundingMode - automatic pricing rounding
// ==========================================
// The two *_9_90 modes enforce a 9.90 price floor; cents_90 does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    Down990, // round down to the previous X9.90
    Up990,   // round up to the next X9.90
    Cents90, // keep integer part, force cents to .90
}

impl RoundingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundingMode::Down990 => "down_9_90",
            RoundingMode::Up990 => "up_9_90",
            RoundingMode::Cents90 => "cents_90",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "down_9_90" => Some(RoundingMode::Down990),
            "up_9_90" => Some(RoundingMode::Up990),
            "cents_90" => Some(RoundingMode::Cents90),
            _ => None,
        }
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// MovementKind - stock movement taxonomy
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    Initial,       // first stock of a freshly created product
    AdjustmentIn,  // quantity added (e.g. duplicate supplier code on import)
    AdjustmentOut, // quantity removed
    Sale,
    Return,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Initial => "initial",
            MovementKind::AdjustmentIn => "adjustment_in",
            MovementKind::AdjustmentOut => "adjustment_out",
            MovementKind::Sale => "sale",
            MovementKind::Return => "return",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "initial" => Some(MovementKind::Initial),
            "adjustment_in" => Some(MovementKind::AdjustmentIn),
            "adjustment_out" => Some(MovementKind::AdjustmentOut),
            "sale" => Some(MovementKind::Sale),
            "return" => Some(MovementKind::Return),
            _ => None,
        }
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// SaleStatus - sale lifecycle (revert collaborator)
// ==========================================
// Only the draft / non-draft distinction matters to the import core:
// reverting an import is blocked once a produced product is on a
// confirmed (non-draft) sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Draft,
    Completed,
    Cancelled,
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Draft => "draft",
            SaleStatus::Completed => "completed",
            SaleStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(SaleStatus::Draft),
            "completed" => Some(SaleStatus::Completed),
            "cancelled" => Some(SaleStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            ImportStatus::Pending,
            ImportStatus::Parsing,
            ImportStatus::Ready,
            ImportStatus::Processing,
            ImportStatus::Completed,
            ImportStatus::Failed,
            ImportStatus::Reverted,
        ] {
            assert_eq!(ImportStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ImportStatus::parse("bogus"), None);
    }

    #[test]
    fn test_name_normalization_falls_back_to_none() {
        assert_eq!(NameNormalization::parse(""), NameNormalization::None);
        assert_eq!(NameNormalization::parse("unknown"), NameNormalization::None);
        assert_eq!(NameNormalization::parse("title"), NameNormalization::Title);
    }

    #[test]
    fn test_sku_mode_falls_back_to_name_prefix() {
        assert_eq!(SkuMode::parse(""), SkuMode::NamePrefix);
        assert_eq!(SkuMode::parse("numbers_only"), SkuMode::NumbersOnly);
    }

    #[test]
    fn test_rounding_mode_strings() {
        assert_eq!(RoundingMode::parse("down_9_90"), Some(RoundingMode::Down990));
        assert_eq!(RoundingMode::parse("up_9_90"), Some(RoundingMode::Up990));
        assert_eq!(RoundingMode::parse("cents_90"), Some(RoundingMode::Cents90));
        assert_eq!(RoundingMode::parse("other"), None);
    }
}
