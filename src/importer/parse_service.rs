// ==========================================
// Vendi Backoffice - Parse service
// ==========================================
// Runs the source parser for a job and persists the outcome: rows,
// row errors and total count. Row-level errors still produce `ready`
// (the processing stage decides whether they block); file-level
// syntax errors fail the job with a single top-level error.
// ==========================================

use crate::domain::product_import::{ProductImport, RowError};
use crate::domain::types::{ImportStatus, SourceKind};
use crate::importer::csv_parser::CsvParser;
use crate::importer::error::ImportResult;
use crate::importer::traits::SourceParser;
use crate::importer::xml_parser::XmlParser;
use crate::repository::product_import_repo::ProductImportRepository;
use tracing::{error, info, instrument};

pub struct ParseService<'a> {
    import_repo: &'a ProductImportRepository,
}

impl<'a> ParseService<'a> {
    pub fn new(import_repo: &'a ProductImportRepository) -> Self {
        Self { import_repo }
    }

    /// Parse the uploaded bytes for the job and persist the result.
    /// Returns the reloaded job.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn call(
        &self,
        account_id: i64,
        import_id: i64,
        bytes: &[u8],
    ) -> ImportResult<ProductImport> {
        let import = self.import_repo.require(account_id, import_id)?;
        self.import_repo
            .update_status(import.id, ImportStatus::Parsing)?;

        let parser: Box<dyn SourceParser> = match import.source_kind {
            SourceKind::Csv => Box::new(CsvParser),
            SourceKind::Xml => Box::new(XmlParser),
        };

        match parser.parse(bytes) {
            Ok(parsed) => {
                info!(
                    rows = parsed.rows.len(),
                    row_errors = parsed.errors.len(),
                    total = parsed.total_rows,
                    "arquivo parseado"
                );
                // Ready even with row errors, so the user can review.
                self.import_repo.store_parse_result(
                    import.id,
                    &parsed.rows,
                    &parsed.errors,
                    parsed.total_rows,
                    ImportStatus::Ready,
                )?;
            }
            Err(e) => {
                error!(error = %e, "falha ao parsear arquivo");
                self.import_repo.store_parse_result(
                    import.id,
                    &[],
                    &[RowError::top_level(e.to_string())],
                    0,
                    ImportStatus::Failed,
                )?;
                return Err(e);
            }
        }

        Ok(self.import_repo.require(account_id, import_id)?)
    }
}
