use thiserror::Error;

/// Error type for external row-data operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("Failed to connect to data source: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Failed to read row: {0}")]
    Row(String),

    #[error("Invalid table data specification: {0}")]
    InvalidSpec(String),
}
