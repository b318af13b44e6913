use thiserror::Error;

/// Rejection of a malformed alert request. Raised before any state is touched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("malformed pair '{0}': expected BASE/QUOTE")]
    MalformedPair(String),

    #[error("invalid asset '{0}': only letters are allowed")]
    InvalidAsset(String),

    #[error("cannot split '{0}': no known quote asset suffix")]
    UnknownQuote(String),

    #[error("invalid price '{0}'")]
    InvalidPrice(String),

    #[error("price must be positive, got {0}")]
    NonPositivePrice(f64),
}
