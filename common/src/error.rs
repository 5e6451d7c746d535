use thiserror::Error;

/// Common error type shared by every member crate. Mirrors the shape of a typical service-layer
/// error enum: one variant per external failure domain, with `#[from]` conversions so call sites
/// can use `?` without manual mapping.
#[derive(Debug, Error)]
pub enum EmError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("{0}")]
    Generic(String),
}

impl From<String> for EmError {
    fn from(value: String) -> Self {
        Self::Generic(value)
    }
}

impl From<&str> for EmError {
    fn from(value: &str) -> Self {
        Self::Generic(value.to_owned())
    }
}

pub type EmResult<T> = Result<T, EmError>;
