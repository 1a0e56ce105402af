// ==========================================
// Vendi Backoffice - Import result ledger
// ==========================================
// Transient accumulator for one processing run: success/failure
// counters, the per-row error list, and the composite keys / SKUs
// already claimed by earlier rows of the same run (so a later row
// collides even before the earlier one is visible in the catalog).
// ==========================================

use crate::domain::product_import::{RawRow, RowError};
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct ImportLedger {
    processed_rows: i64,
    successful_rows: i64,
    failed_rows: i64,
    errors: Vec<RowError>,
    claimed_keys: HashSet<String>,
    claimed_skus: HashSet<String>,
}

impl ImportLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self) {
        self.successful_rows += 1;
        self.processed_rows += 1;
    }

    pub fn record_failure(&mut self, row_number: usize, data: Option<RawRow>, errors: Vec<String>) {
        self.failed_rows += 1;
        self.processed_rows += 1;
        self.errors.push(RowError::new(row_number, data, errors));
    }

    /// Claim a composite identity key for the rest of the run.
    pub fn track_key(&mut self, key: String) {
        self.claimed_keys.insert(key);
    }

    /// Claim a SKU for the rest of the run (blank ignored).
    pub fn track_sku(&mut self, sku: &str) {
        if !sku.trim().is_empty() {
            self.claimed_skus.insert(sku.to_string());
        }
    }

    pub fn key_claimed(&self, key: &str) -> bool {
        self.claimed_keys.contains(key)
    }

    pub fn sku_claimed(&self, sku: &str) -> bool {
        self.claimed_skus.contains(sku)
    }

    pub fn processed_rows(&self) -> i64 {
        self.processed_rows
    }

    pub fn successful_rows(&self) -> i64 {
        self.successful_rows
    }

    pub fn failed_rows(&self) -> i64 {
        self.failed_rows
    }

    pub fn errors(&self) -> &[RowError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<RowError> {
        self.errors
    }
}
