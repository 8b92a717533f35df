#[derive(Debug, thiserror::Error)]
pub enum CoviscopeError {
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("{0}")]
    Validation(String),

    #[error("Connectivity error: {0}")]
    Connectivity(String),

    #[error("Query execution error: {0}")]
    QueryExecution(#[source] duckdb::Error),

    #[error("Row mapping error: {0}")]
    RowMapping(String),

    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, CoviscopeError>;
