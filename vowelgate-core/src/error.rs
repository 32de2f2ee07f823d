use thiserror::Error;

/// All errors produced by vowelgate-core.
///
/// Degenerate audio or pitch data never produces an error; only a caller
/// contract violation does.
#[derive(Debug, Error)]
pub enum VowelGateError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, VowelGateError>;

/// Shorthand for building an `InvalidConfiguration` error.
pub(crate) fn invalid(msg: impl Into<String>) -> VowelGateError {
    VowelGateError::InvalidConfiguration(msg.into())
}
