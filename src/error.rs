use thiserror::Error;

/// Main error type for the sparse SDRF table.
/// Aggregates errors from the standard library, dependencies and the crate's own modules.
#[derive(Error, Debug)]
pub enum SdrfError {
    #[error("{0}")]
    WithContextError(String),

    #[error("{0}")]
    AnyhowError(#[from] anyhow::Error),

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    // Third-party library errors
    #[error("{0}")]
    JsonError(#[from] serde_json::Error),

    // Database module errors
    #[error("{0}")]
    RangeError(#[from] crate::database::range::RangeError),

    #[error("{0}")]
    ColumnError(#[from] crate::database::column::ColumnError),

    #[error("{0}")]
    TableError(#[from] crate::database::table::TableError),

    // Analysis module errors
    #[error("{0}")]
    CriteriaError(#[from] crate::analysis::criteria::CriteriaError),
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, SdrfError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| SdrfError::WithContextError(format!("{}: {}", message, e)))
    }
}
