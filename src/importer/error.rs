// ==========================================
// Vendi Backoffice - Import module error types
// ==========================================
// Tool: thiserror derive macro
// User-facing messages are pt-BR; they surface in the backoffice UI
// and in persisted import_errors.
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// Import pipeline error type
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== file-level syntax errors (abort the whole parse) =====
    #[error("Erro ao parsear CSV: {0}")]
    CsvSyntax(String),

    #[error("Arquivo XML inválido ou não é uma NF-e: {0}")]
    XmlSyntax(String),

    // ===== job state errors =====
    #[error("Dados parseados não encontrados ou inválidos")]
    MissingParsedData,

    #[error("Importação não encontrada: {0}")]
    ImportNotFound(i64),

    // ===== pre-flight blocking errors (strict mode) =====
    #[error("Existem erros no arquivo. Desmarque 'Ignorar linhas com erro' para ver os detalhes.")]
    BlockedByParseErrors,

    #[error("Existem produtos duplicados no arquivo (mesmo nome, tamanho, marca e cor). Corrija antes de importar.")]
    BlockedByDuplicates,

    // ===== run abort (strict mode, first row failure) =====
    #[error("Importação cancelada devido a erros. Verifique os detalhes abaixo.")]
    AbortedByRowFailure,

    // ===== revert errors =====
    #[error("Só é possível reverter importações concluídas")]
    RevertNotCompleted,

    #[error("Não é possível reverter: {count} produto(s) possuem vendas confirmadas. Remova os produtos das vendas ou cancele as vendas antes de reverter a importação.")]
    RevertBlockedBySales { count: usize },

    // ===== collaborator errors =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    // ===== generic errors =====
    #[error("Erro interno: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvSyntax(err.to_string())
    }
}

impl From<roxmltree::Error> for ImportError {
    fn from(err: roxmltree::Error) -> Self {
        ImportError::XmlSyntax(err.to_string())
    }
}

/// Result type alias
pub type ImportResult<T> = Result<T, ImportError>;
