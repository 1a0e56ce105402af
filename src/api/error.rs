// ==========================================
// Vendi Backoffice - API layer error types
// ==========================================
// Converts pipeline/repository errors into user-facing messages.
// ==========================================

use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API layer error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Importação não encontrada: {0}")]
    ImportNotFound(i64),

    #[error("Não é possível excluir uma importação já concluída com sucesso.")]
    DeleteCompletedImport,

    #[error("Parâmetro inválido: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result type alias
pub type ApiResult<T> = Result<T, ApiError>;
