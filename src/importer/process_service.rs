// ==========================================
// Vendi Backoffice - Import orchestrator
// ==========================================
// Drives one processing run over a parsed job: pre-flight gating,
// per-row processing with the result ledger, counter persistence and
// final status determination.
// Flow: preflight -> per-row loop -> finalize
// ==========================================

use crate::domain::product_import::{ProductImport, RowError};
use crate::domain::types::ImportStatus;
use crate::importer::duplicate_key::DuplicateKey;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::ledger::ImportLedger;
use crate::importer::row_processor::RowProcessor;
use crate::importer::traits::{CatalogStore, MovementSink};
use crate::repository::product_import_repo::ProductImportRepository;
use std::collections::HashMap;
use tracing::{info, instrument, warn};
use uuid::Uuid;

// ==========================================
// ProcessSummary - outcome of one run
// ==========================================
#[derive(Debug)]
pub struct ProcessSummary {
    pub status: ImportStatus,
    pub processed_rows: i64,
    pub successful_rows: i64,
    pub failed_rows: i64,
    pub errors: Vec<RowError>,
}

// ==========================================
// ProcessService
// ==========================================
pub struct ProcessService<'a, C: CatalogStore, M: MovementSink> {
    import_repo: &'a ProductImportRepository,
    catalog: &'a C,
    movements: &'a M,
}

impl<'a, C: CatalogStore, M: MovementSink> ProcessService<'a, C, M> {
    pub fn new(
        import_repo: &'a ProductImportRepository,
        catalog: &'a C,
        movements: &'a M,
    ) -> Self {
        Self {
            import_repo,
            catalog,
            movements,
        }
    }

    /// Run the import. Blocking pre-flight errors and strict-mode
    /// aborts return Err after persisting the job state; a run that
    /// reaches its end returns the summary (status `failed` when every
    /// attempted row failed, `completed` otherwise).
    #[instrument(skip(self))]
    pub async fn call(
        &self,
        account_id: i64,
        import_id: i64,
        acting_user_id: i64,
    ) -> ImportResult<ProcessSummary> {
        let import = self
            .import_repo
            .find_by_id(account_id, import_id)?
            .ok_or(ImportError::ImportNotFound(import_id))?;

        if import.parsed_data.is_empty() {
            return Err(ImportError::MissingParsedData);
        }

        let run_id = Uuid::new_v4();
        info!(%run_id, total_rows = import.parsed_data.len(), "iniciando processamento");
        self.import_repo
            .update_status(import.id, ImportStatus::Processing)?;

        // Errors kept from earlier passes, minus stale duplicate
        // annotations (recomputed below against the current rows).
        let base_errors: Vec<RowError> = import
            .import_errors
            .iter()
            .filter(|e| !is_duplicate_annotation(e))
            .cloned()
            .collect();

        // Pre-flight: parse errors block the whole run in strict mode.
        if !import.ignore_errors && import.has_row_level_errors() {
            self.import_repo
                .update_status(import.id, ImportStatus::Failed)?;
            return Err(ImportError::BlockedByParseErrors);
        }

        // Pre-flight: intra-file composite-key duplicates (create mode).
        let duplicate_errors = if import.create_only() {
            DuplicateKey::detect_in_rows(&import.parsed_data)
        } else {
            Vec::new()
        };

        if !duplicate_errors.is_empty() {
            if import.ignore_errors {
                // Annotate and continue; the offending rows fail below.
                let mut stored = base_errors.clone();
                stored.extend(duplicate_errors.iter().cloned());
                self.import_repo.update_import_errors(import.id, &stored)?;
            } else {
                let mut stored = base_errors.clone();
                stored.extend(duplicate_errors.iter().cloned());
                self.import_repo.update_import_errors(import.id, &stored)?;
                self.import_repo
                    .update_status(import.id, ImportStatus::Failed)?;
                return Err(ImportError::BlockedByDuplicates);
            }
        } else if base_errors != import.import_errors {
            // Stale duplicate annotations no longer apply.
            self.import_repo
                .update_import_errors(import.id, &base_errors)?;
        }

        let duplicate_rows: HashMap<usize, Vec<String>> = duplicate_errors
            .iter()
            .map(|e| (e.row, e.errors.clone()))
            .collect();

        let mut ledger = ImportLedger::new();
        let processor =
            RowProcessor::new(&import, acting_user_id, run_id, self.catalog, self.movements);

        for (index, row) in import.parsed_data.iter().enumerate() {
            let row_number = index + 1;

            // Rows flagged by the duplicate pre-flight are failed
            // without touching the catalog.
            if let Some(messages) = duplicate_rows.get(&row_number) {
                ledger.record_failure(row_number, Some(row.clone()), messages.clone());
                continue;
            }

            match processor.process(row, row_number, &mut ledger).await {
                Ok(outcome) => {
                    if !outcome.is_success() && !import.ignore_errors {
                        // Strict mode: the first failure aborts the
                        // run; no further row is attempted.
                        return self.fail_import(&import, base_errors, ledger);
                    }
                }
                Err(e) => {
                    // Unexpected error on one row must not abort an
                    // ignore_errors run.
                    warn!(row = row_number, error = %e, "erro inesperado ao processar linha");
                    ledger.record_failure(
                        row_number,
                        Some(row.clone()),
                        vec![format!("Erro inesperado: {}", e)],
                    );
                    if !import.ignore_errors {
                        return self.fail_import(&import, base_errors, ledger);
                    }
                }
            }
        }

        self.finalize(&import, base_errors, ledger)
    }

    /// Strict-mode abort: persist partial counters, merged errors and
    /// the failed status, then surface the abort to the caller.
    fn fail_import(
        &self,
        import: &ProductImport,
        base_errors: Vec<RowError>,
        ledger: ImportLedger,
    ) -> ImportResult<ProcessSummary> {
        let (processed, successful, failed) = (
            ledger.processed_rows(),
            ledger.successful_rows(),
            ledger.failed_rows(),
        );
        let mut errors = base_errors;
        errors.extend(ledger.into_errors());

        self.import_repo.update_run_outcome(
            import.id,
            processed,
            successful,
            failed,
            &errors,
            ImportStatus::Failed,
        )?;

        info!(processed, successful, failed, "importação cancelada por erro");
        Err(ImportError::AbortedByRowFailure)
    }

    fn finalize(
        &self,
        import: &ProductImport,
        base_errors: Vec<RowError>,
        ledger: ImportLedger,
    ) -> ImportResult<ProcessSummary> {
        let (processed, successful, failed) = (
            ledger.processed_rows(),
            ledger.successful_rows(),
            ledger.failed_rows(),
        );
        let status = if failed == processed {
            ImportStatus::Failed
        } else {
            ImportStatus::Completed
        };

        let mut errors = base_errors;
        errors.extend(ledger.into_errors());

        self.import_repo.update_run_outcome(
            import.id,
            processed,
            successful,
            failed,
            &errors,
            status,
        )?;

        info!(processed, successful, failed, %status, "processamento concluído");
        Ok(ProcessSummary {
            status,
            processed_rows: processed,
            successful_rows: successful,
            failed_rows: failed,
            errors,
        })
    }
}

/// An error entry written by the duplicate pre-flight (as opposed to
/// parse or processing errors). Used to drop stale annotations before
/// recomputing duplicates against edited rows.
pub(crate) fn is_duplicate_annotation(error: &RowError) -> bool {
    if error.errors.is_empty() {
        return false;
    }
    error.errors.iter().all(|message| {
        let lower = message.to_lowercase();
        lower.contains("produto duplicado")
            || lower.contains("nome duplicado")
            || lower.contains("também na linha")
    })
}
