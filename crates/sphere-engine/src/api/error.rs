use thiserror::Error;

/// Construction-time failures. Frame-time code never returns errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("catalog has no emotion categories")]
    EmptyCatalog,

    #[error("duplicate emotion id `{0}`")]
    DuplicateId(String),

    #[error("catalog must contain exactly one neutral entry, found {0}")]
    NeutralCount(usize),

    #[error("`{field}` must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: f64,
    },
}

impl ConfigError {
    pub(crate) fn out_of_range(field: &'static str, expected: &'static str, value: f64) -> Self {
        ConfigError::OutOfRange {
            field,
            expected,
            value,
        }
    }
}
