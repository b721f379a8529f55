use thiserror::Error;

/// The pipeline failure categories an orchestrator can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    FetchFailed,
    TableNotFound,
    MalformedRow,
    InvalidCapacity,
    UploadFailed,
    Other,
}

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Fetch failed for {url}: {cause}")]
    FetchFailed { url: String, cause: String },

    #[error("No table matching `{signature}` found")]
    TableNotFound { signature: String },

    #[error("Row {row_index} is malformed: expected at least {expected} data cells, found {found}")]
    MalformedRow {
        row_index: usize,
        found: usize,
        expected: usize,
    },

    #[error("Row {rank} has an invalid capacity: {value:?}")]
    InvalidCapacity { rank: usize, value: String },

    #[error("Upload of {blob_name} failed: {cause}")]
    UploadFailed { blob_name: String, cause: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Stage handoff error: {0}")]
    Handoff(String),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EtlError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EtlError::FetchFailed { .. } => ErrorKind::FetchFailed,
            EtlError::TableNotFound { .. } => ErrorKind::TableNotFound,
            EtlError::MalformedRow { .. } => ErrorKind::MalformedRow,
            EtlError::InvalidCapacity { .. } => ErrorKind::InvalidCapacity,
            EtlError::UploadFailed { .. } => ErrorKind::UploadFailed,
            _ => ErrorKind::Other,
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_maps_pipeline_variants() {
        let err = EtlError::MalformedRow { row_index: 4, found: 3, expected: 7 };
        assert_eq!(err.kind(), ErrorKind::MalformedRow);
        assert!(err.to_string().contains("Row 4"));

        let err = EtlError::Config("missing url".into());
        assert_eq!(err.kind(), ErrorKind::Other);
    }
}
