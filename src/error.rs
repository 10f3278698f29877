use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Cyclic hierarchy: component '{id}' repeats on path {}", .path.join(" -> "))]
    CyclicHierarchy { id: String, path: Vec<String> },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LookupError>;
