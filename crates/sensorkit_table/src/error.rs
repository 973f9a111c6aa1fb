//! Top-level error categories surfaced to configuration providers.

use std::path::PathBuf;

use thiserror::Error;

/// "Generation failed" errors, one variant per caller-visible category.
#[derive(Debug, Error)]
pub enum TableError {
    /// Bad sensor count, missing sensor names or empty labels.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Header/row shape violated an internal invariant.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),
    /// Workbook could not be saved to the target path.
    #[error("failed to write {}: {message}", path.display())]
    OutputWrite {
        /// Target workbook path.
        path: PathBuf,
        /// Underlying writer error text.
        message: String,
    },
}

impl TableError {
    /// Short machine-friendly category name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::SchemaMismatch(_) => "schema_mismatch",
            Self::OutputWrite { .. } => "output_write",
        }
    }
}

pub type Result<T> = std::result::Result<T, TableError>;
