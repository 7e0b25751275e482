//! Harness error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid fixture json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown fixture function '{0}'")]
    UnknownFunction(String),
    #[error("{function}: input '{field}' is missing or has the wrong type")]
    BadInput {
        function: String,
        field: &'static str,
    },
    #[error("unknown evaluator '{0}', expected recursive|compiled|both")]
    UnknownEvaluator(String),
    #[error("no fixture json files found in {0}")]
    NoFixtures(String),
}

impl HarnessError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
