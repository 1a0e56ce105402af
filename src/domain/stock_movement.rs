// ==========================================
// Vendi Backoffice - Stock movement entity
// ==========================================
// Audit record for every stock_quantity mutation. quantity_change is
// signed; quantity_before/quantity_after snapshot the product around
// the mutation.
// ==========================================

use crate::domain::types::MovementKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: i64,
    pub product_id: i64,
    pub account_id: i64,
    /// Acting user, passed explicitly by the caller (no ambient state).
    pub user_id: Option<i64>,
    pub movement_type: MovementKind,
    pub quantity_change: i64,
    pub quantity_before: i64,
    pub quantity_after: i64,
    pub observations: Option<String>,
    pub metadata: MovementMetadata,
    pub created_at: DateTime<Utc>,
}

// ==========================================
// MovementMetadata - JSON payload on the movement
// ==========================================
// Import-produced movements carry the job id, the source row and the
// processing run id for traceability.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovementMetadata {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub product_import_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub row: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub run_id: Option<Uuid>,
}

impl MovementMetadata {
    pub fn for_import(product_import_id: i64, row: usize, run_id: Uuid) -> Self {
        Self {
            product_import_id: Some(product_import_id),
            row: Some(row),
            run_id: Some(run_id),
        }
    }
}
