// ==========================================
// Vendi Backoffice - Import API
// ==========================================
// Facade over the import pipeline: upload/parse, bulk pricing,
// processing, revert, and the live pricing preview endpoint.
// All operations are account-scoped; the acting user is explicit.
// ==========================================

use crate::config::config_manager::ConfigManager;
use crate::config::import_config_trait::ImportConfigReader;
use crate::db::{configure_sqlite_connection, init_schema};
use crate::domain::account::{ImportDefaults, PricingConfig};
use crate::domain::product::Product;
use crate::domain::product_import::{ProductImport, ProductImportOptions, RawRow};
use crate::domain::types::{RoundingMode, SourceKind};
use crate::importer::apply_pricing::ApplyPricingService;
use crate::importer::duplicate_key::DuplicateKey;
use crate::importer::error::ImportError;
use crate::importer::parse_service::ParseService;
use crate::importer::pricing::Calculator;
use crate::importer::process_service::{is_duplicate_annotation, ProcessService, ProcessSummary};
use crate::importer::revert_service::RevertService;
use crate::api::error::{ApiError, ApiResult};
use crate::repository::product_import_repo::ProductImportRepository;
use crate::repository::product_repo::ProductRepository;
use crate::repository::sale_repo::SaleRepository;
use crate::repository::stock_movement_repo::StockMovementRepository;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::info;

// ==========================================
// ImportApi
// ==========================================
pub struct ImportApi {
    import_repo: ProductImportRepository,
    product_repo: ProductRepository,
    movement_repo: StockMovementRepository,
    sale_repo: SaleRepository,
    config: ConfigManager,
}

impl ImportApi {
    /// Open (and bootstrap) the database and build the facade. All
    /// repositories share one connection.
    pub fn new(db_path: &str) -> ApiResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)
            .map_err(|e| ApiError::InvalidArgument(format!("banco de dados: {}", e)))?;
        init_schema(&conn).map_err(|e| ApiError::InvalidArgument(format!("schema: {}", e)))?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ApiResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| ApiError::InvalidArgument(format!("lock: {}", e)))?;
            configure_sqlite_connection(&guard)
                .map_err(|e| ApiError::InvalidArgument(format!("pragma: {}", e)))?;
        }

        Ok(Self {
            import_repo: ProductImportRepository::from_connection(conn.clone()),
            product_repo: ProductRepository::from_connection(conn.clone()),
            movement_repo: StockMovementRepository::from_connection(conn.clone()),
            sale_repo: SaleRepository::from_connection(conn.clone()),
            config: ConfigManager::from_connection(conn)
                .map_err(|e| ApiError::InvalidArgument(e.to_string()))?,
        })
    }

    // ===== upload & parse =====

    /// Create a job from already-downloaded file bytes and parse it
    /// immediately. The chosen options become the account's defaults
    /// for the next upload. A file-level syntax error leaves the job
    /// in `failed`; the job is returned either way.
    pub async fn create_import(
        &self,
        account_id: i64,
        user_id: i64,
        source_kind: SourceKind,
        options: ProductImportOptions,
        bytes: &[u8],
    ) -> ApiResult<ProductImport> {
        let import = self
            .import_repo
            .insert(account_id, user_id, source_kind, &options)?;
        info!(import_id = import.id, kind = %source_kind, "importação criada");

        self.config
            .save_import_defaults(
                account_id,
                ImportDefaults {
                    auto_generate_sku: options.auto_generate_sku,
                    ignore_errors: options.ignore_errors,
                    name_normalization: options.name_normalization,
                    sku_generation_mode: options.sku_generation_mode,
                },
            )
            .await
            .map_err(|e| ApiError::InvalidArgument(e.to_string()))?;

        let parse_service = ParseService::new(&self.import_repo);
        match parse_service.call(account_id, import.id, bytes).await {
            Ok(parsed) => Ok(parsed),
            // Syntax errors are recorded on the job itself.
            Err(ImportError::CsvSyntax(_)) | Err(ImportError::XmlSyntax(_)) => {
                Ok(self.import_repo.require(account_id, import.id)?)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Defaults for the upload form, from the account configuration.
    pub async fn import_defaults(&self, account_id: i64) -> ApiResult<ImportDefaults> {
        self.config
            .import_defaults(account_id)
            .await
            .map_err(|e| ApiError::InvalidArgument(e.to_string()))
    }

    // ===== review & edit =====

    pub fn get_import(&self, account_id: i64, import_id: i64) -> ApiResult<ProductImport> {
        self.import_repo
            .find_by_id(account_id, import_id)?
            .ok_or(ApiError::ImportNotFound(import_id))
    }

    pub fn list_imports(&self, account_id: i64) -> ApiResult<Vec<ProductImport>> {
        Ok(self.import_repo.list(account_id)?)
    }

    /// Replace the parsed rows with user-corrected data and recompute
    /// the duplicate annotations against the new rows.
    pub fn update_parsed_data(
        &self,
        account_id: i64,
        import_id: i64,
        rows: Vec<RawRow>,
    ) -> ApiResult<ProductImport> {
        let import = self.get_import(account_id, import_id)?;
        self.import_repo.update_parsed_data(import.id, &rows)?;

        if import.create_only() {
            let mut errors: Vec<_> = import
                .import_errors
                .iter()
                .filter(|e| !is_duplicate_annotation(e))
                .cloned()
                .collect();
            errors.extend(DuplicateKey::detect_in_rows(&rows));
            self.import_repo.update_import_errors(import.id, &errors)?;
        }

        Ok(self.import_repo.require(account_id, import_id)?)
    }

    /// Soft-delete a job from the listing. Completed imports cannot
    /// be deleted (revert them instead).
    pub fn delete_import(&self, account_id: i64, import_id: i64) -> ApiResult<()> {
        let import = self.get_import(account_id, import_id)?;
        if !import.deletable() {
            return Err(ApiError::DeleteCompletedImport);
        }
        self.import_repo.soft_delete(account_id, import.id)?;
        Ok(())
    }

    // ===== automatic pricing =====

    pub async fn pricing_config(&self, account_id: i64) -> ApiResult<PricingConfig> {
        self.config
            .pricing_config(account_id)
            .await
            .map_err(|e| ApiError::InvalidArgument(e.to_string()))
    }

    pub fn save_pricing_config(
        &self,
        account_id: i64,
        pricing: &PricingConfig,
    ) -> ApiResult<()> {
        self.config
            .save_pricing(account_id, pricing)
            .map_err(|e| ApiError::InvalidArgument(e.to_string()))?;
        Ok(())
    }

    /// Bulk-apply automatic pricing to every parsed row of the job.
    pub async fn apply_pricing(
        &self,
        account_id: i64,
        import_id: i64,
    ) -> ApiResult<ProductImport> {
        let service = ApplyPricingService::new(&self.import_repo, &self.config);
        Ok(service.call(account_id, import_id).await?)
    }

    /// Live preview endpoint: one price per cost entry, None for
    /// unparseable costs. Bit-identical to the batch path (same
    /// calculator).
    pub fn calculate_prices(
        &self,
        costs: &[String],
        markup_percent: f64,
        rounding_mode: RoundingMode,
    ) -> Vec<Option<f64>> {
        costs
            .iter()
            .map(|cost| Calculator::calculate_str(cost, markup_percent, rounding_mode))
            .collect()
    }

    // ===== processing & revert =====

    pub async fn process_import(
        &self,
        account_id: i64,
        import_id: i64,
        acting_user_id: i64,
    ) -> ApiResult<ProcessSummary> {
        let service = ProcessService::new(&self.import_repo, &self.product_repo, &self.movement_repo);
        Ok(service.call(account_id, import_id, acting_user_id).await?)
    }

    pub async fn revert_import(
        &self,
        account_id: i64,
        import_id: i64,
    ) -> ApiResult<ProductImport> {
        let service = RevertService::new(&self.import_repo, &self.product_repo, &self.sale_repo);
        Ok(service.call(account_id, import_id).await?)
    }

    /// Products created by one import job.
    pub fn imported_products(&self, account_id: i64, import_id: i64) -> ApiResult<Vec<Product>> {
        Ok(self.product_repo.list_by_import(account_id, import_id)?)
    }
}

