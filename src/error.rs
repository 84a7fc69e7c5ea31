use thiserror::Error;

/// Errors surfaced at the caller boundary.
///
/// Malformed data never produces an error; it is coerced or short-circuited
/// instead. Only bad clustering parameters are rejected.
#[derive(Debug, Error)]
pub enum Error {
    /// A clustering parameter is out of its valid range.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: String,
    },

    /// A parameter document could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
