use thiserror::Error;

/// Failure taxonomy for the scrape/preprocess pipeline.
///
/// Per-player `Fetch`/`Parse` failures during bulk extraction are logged and
/// the player is skipped; `SchemaMismatch` always aborts the run since it
/// signals a page-layout or pipeline-version change.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("unrecognized position {0:?} (expected quarterback, running-back, wide-receiver or tight-end)")]
    InvalidPosition(String),

    #[error("request to {url} returned status {status}")]
    Fetch { url: String, status: u16 },

    #[error("expected page structure missing: {0}")]
    Parse(String),

    #[error("{context}: expected {expected} values, got {got}")]
    SchemaMismatch {
        context: String,
        expected: usize,
        got: usize,
    },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("io error on {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error on {path}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
