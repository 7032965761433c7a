use cricstat_api::ApiError;
use cricstat_catalog::YamlError;
use cricstat_db::schema::SchemaError;
use cricstat_db::{OperationError, QueryError};
use cricstat_import::IngestError;
use thiserror::Error;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Opening or migrating the database failed
    #[error("Database error: {0}")]
    Schema(#[from] SchemaError),

    /// A create, update, delete or lookup failed
    #[error("{0}")]
    Operation(#[from] OperationError),

    /// A catalog query failed
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// Cricbuzz API error
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Ingestion failed
    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    /// Sample dataset could not be loaded
    #[error("Dataset error: {0}")]
    Dataset(#[from] YamlError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Runtime creation or async error
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// A command-line value the parser accepted but the command cannot use
    #[error("{0}")]
    InvalidArgument(String),
}

impl CliError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Suggested next step for API failures.
    pub(crate) fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Api(e) | Self::Ingest(IngestError::Api(e)) => Some(e.category().hint()),
            _ => None,
        }
    }
}
