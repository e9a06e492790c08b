use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("request to {url} failed with status {status}: {body}")]
    Transport {
        url: String,
        status: u16,
        body: String,
    },

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected schema from {url}: {body}")]
    SchemaFormat { url: String, body: String },

    #[error("/dados returned an unexpected format (expected a list) on page {page}")]
    TransportFormat { page: u32 },

    #[error("schema has no columns, nothing to create")]
    EmptySchema,

    #[error("table {0} not found")]
    TableNotFound(String),

    #[error("row {row}: {message}")]
    RowInsert { row: u64, message: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IngestError {
    /// Process exit code for an error that reached the top level.
    pub fn exit_code(&self) -> u8 {
        match self {
            IngestError::Configuration(_) | IngestError::EmptySchema => 1,
            _ => 2,
        }
    }
}

pub type Result<T, E = IngestError> = std::result::Result<T, E>;
