// ==========================================
// Vendi Backoffice - Import job repository
// ==========================================
// Persistence for product_imports: parsed rows and row errors live in
// JSON columns; counters and status are updated by the pipeline as a
// run progresses.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::product_import::{ProductImport, ProductImportOptions, RawRow, RowError};
use crate::domain::types::{ImportMode, ImportStatus, NameNormalization, SkuMode, SourceKind};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::product_repo::parse_timestamp;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const IMPORT_COLUMNS: &str = "id, account_id, user_id, source_kind, status, import_mode, \
     auto_generate_sku, ignore_errors, name_normalization, sku_generation_mode, observations, \
     parsed_data, import_errors, total_rows, processed_rows, successful_rows, failed_rows, \
     deleted_at, created_at, updated_at";

pub struct ProductImportRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProductImportRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Create a new job in `pending` state, before parsing runs.
    pub fn insert(
        &self,
        account_id: i64,
        user_id: i64,
        source_kind: SourceKind,
        options: &ProductImportOptions,
    ) -> RepositoryResult<ProductImport> {
        let conn = self.get_conn()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            r#"
            INSERT INTO product_imports (
                account_id, user_id, source_kind, status, import_mode,
                auto_generate_sku, ignore_errors, name_normalization,
                sku_generation_mode, created_at, updated_at
            ) VALUES (?1, ?2, ?3, 'pending', ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                account_id,
                user_id,
                source_kind.as_str(),
                options.import_mode.as_str(),
                options.auto_generate_sku,
                options.ignore_errors,
                options.name_normalization.as_str(),
                options.sku_generation_mode.as_str(),
                now,
                now,
            ],
        )?;

        let id = conn.last_insert_rowid();
        drop(conn);
        self.require(account_id, id)
    }

    pub fn find_by_id(&self, account_id: i64, id: i64) -> RepositoryResult<Option<ProductImport>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {IMPORT_COLUMNS} FROM product_imports
             WHERE account_id = ?1 AND id = ?2 AND deleted_at IS NULL"
        ))?;
        let result = stmt
            .query_row(params![account_id, id], map_import_row)
            .optional()?;
        result.map(decode_import).transpose()
    }

    /// Fetch or NotFound; internal helper for post-write reloads.
    pub fn require(&self, account_id: i64, id: i64) -> RepositoryResult<ProductImport> {
        self.find_by_id(account_id, id)?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "ProductImport".to_string(),
                id: id.to_string(),
            })
    }

    /// All jobs of an account, newest first, soft-deleted excluded.
    pub fn list(&self, account_id: i64) -> RepositoryResult<Vec<ProductImport>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {IMPORT_COLUMNS} FROM product_imports
             WHERE account_id = ?1 AND deleted_at IS NULL
             ORDER BY created_at DESC, id DESC"
        ))?;
        let rows = stmt.query_map(params![account_id], map_import_row)?;
        let mut imports = Vec::new();
        for row in rows {
            imports.push(decode_import(row?)?);
        }
        Ok(imports)
    }

    pub fn update_status(&self, id: i64, status: ImportStatus) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "UPDATE product_imports SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.as_str(), Utc::now().to_rfc3339(), id],
        )?;
        Ok(())
    }

    /// Store the parser output in one write: rows, errors, total count
    /// and the resulting status.
    pub fn store_parse_result(
        &self,
        id: i64,
        rows: &[RawRow],
        errors: &[RowError],
        total_rows: i64,
        status: ImportStatus,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "UPDATE product_imports
             SET parsed_data = ?1, import_errors = ?2, total_rows = ?3,
                 status = ?4, updated_at = ?5
             WHERE id = ?6",
            params![
                serde_json::to_string(rows)?,
                serde_json::to_string(errors)?,
                total_rows,
                status.as_str(),
                Utc::now().to_rfc3339(),
                id,
            ],
        )?;
        Ok(())
    }

    /// Replace parsed rows (user edited the data before reprocessing).
    pub fn update_parsed_data(&self, id: i64, rows: &[RawRow]) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "UPDATE product_imports SET parsed_data = ?1, updated_at = ?2 WHERE id = ?3",
            params![serde_json::to_string(rows)?, Utc::now().to_rfc3339(), id],
        )?;
        Ok(())
    }

    pub fn update_import_errors(&self, id: i64, errors: &[RowError]) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "UPDATE product_imports SET import_errors = ?1, updated_at = ?2 WHERE id = ?3",
            params![serde_json::to_string(errors)?, Utc::now().to_rfc3339(), id],
        )?;
        Ok(())
    }

    /// Persist the run outcome: counters, accumulated errors and the
    /// final (or aborted) status, in a single update.
    pub fn update_run_outcome(
        &self,
        id: i64,
        processed_rows: i64,
        successful_rows: i64,
        failed_rows: i64,
        errors: &[RowError],
        status: ImportStatus,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "UPDATE product_imports
             SET processed_rows = ?1, successful_rows = ?2, failed_rows = ?3,
                 import_errors = ?4, status = ?5, updated_at = ?6
             WHERE id = ?7",
            params![
                processed_rows,
                successful_rows,
                failed_rows,
                serde_json::to_string(errors)?,
                status.as_str(),
                Utc::now().to_rfc3339(),
                id,
            ],
        )?;
        Ok(())
    }

    /// Soft delete: the job disappears from listings but its audit
    /// trail (movements metadata) stays valid.
    pub fn soft_delete(&self, account_id: i64, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            "UPDATE product_imports SET deleted_at = ?1, updated_at = ?1
             WHERE account_id = ?2 AND id = ?3 AND deleted_at IS NULL",
            params![Utc::now().to_rfc3339(), account_id, id],
        )?;
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ProductImport".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

// Raw row from SQLite before JSON decoding.
struct ImportRowRaw {
    id: i64,
    account_id: i64,
    user_id: i64,
    source_kind: String,
    status: String,
    import_mode: String,
    auto_generate_sku: bool,
    ignore_errors: bool,
    name_normalization: Option<String>,
    sku_generation_mode: Option<String>,
    observations: Option<String>,
    parsed_data: String,
    import_errors: String,
    total_rows: i64,
    processed_rows: i64,
    successful_rows: i64,
    failed_rows: i64,
    deleted_at: Option<String>,
    created_at: String,
    updated_at: String,
}

fn map_import_row(row: &Row<'_>) -> rusqlite::Result<ImportRowRaw> {
    Ok(ImportRowRaw {
        id: row.get(0)?,
        account_id: row.get(1)?,
        user_id: row.get(2)?,
        source_kind: row.get(3)?,
        status: row.get(4)?,
        import_mode: row.get(5)?,
        auto_generate_sku: row.get(6)?,
        ignore_errors: row.get(7)?,
        name_normalization: row.get(8)?,
        sku_generation_mode: row.get(9)?,
        observations: row.get(10)?,
        parsed_data: row.get(11)?,
        import_errors: row.get(12)?,
        total_rows: row.get(13)?,
        processed_rows: row.get(14)?,
        successful_rows: row.get(15)?,
        failed_rows: row.get(16)?,
        deleted_at: row.get(17)?,
        created_at: row.get(18)?,
        updated_at: row.get(19)?,
    })
}

fn decode_import(raw: ImportRowRaw) -> RepositoryResult<ProductImport> {
    let source_kind = SourceKind::parse(&raw.source_kind).ok_or_else(|| {
        RepositoryError::InternalError(format!("source_kind desconhecido: {}", raw.source_kind))
    })?;
    let status = ImportStatus::parse(&raw.status).ok_or_else(|| {
        RepositoryError::InternalError(format!("status desconhecido: {}", raw.status))
    })?;
    let import_mode = ImportMode::parse(&raw.import_mode).ok_or_else(|| {
        RepositoryError::InternalError(format!("import_mode desconhecido: {}", raw.import_mode))
    })?;

    Ok(ProductImport {
        id: raw.id,
        account_id: raw.account_id,
        user_id: raw.user_id,
        source_kind,
        status,
        import_mode,
        auto_generate_sku: raw.auto_generate_sku,
        ignore_errors: raw.ignore_errors,
        name_normalization: NameNormalization::parse(raw.name_normalization.as_deref().unwrap_or("")),
        sku_generation_mode: SkuMode::parse(raw.sku_generation_mode.as_deref().unwrap_or("")),
        observations: raw.observations,
        parsed_data: serde_json::from_str(&raw.parsed_data)?,
        import_errors: serde_json::from_str(&raw.import_errors)?,
        total_rows: raw.total_rows,
        processed_rows: raw.processed_rows,
        successful_rows: raw.successful_rows,
        failed_rows: raw.failed_rows,
        deleted_at: raw
            .deleted_at
            .map(|s| parse_timestamp(s)),
        created_at: parse_timestamp(raw.created_at),
        updated_at: parse_timestamp(raw.updated_at),
    })
}
