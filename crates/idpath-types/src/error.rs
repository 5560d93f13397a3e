use thiserror::Error;

/// Errors produced when building or parsing ids and addresses.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    #[error("invalid hex in id token {token:?}")]
    InvalidHex { token: String },

    #[error("malformed id token {token:?}: expected two hex digits")]
    MalformedToken { token: String },

    #[error("id text is not ASCII: {0:?}")]
    NonAscii(String),

    #[error("id too long: {actual} bytes, at most 255 allowed")]
    TooLong { actual: usize },

    #[error("id at position {index} is invalid")]
    InvalidId { index: usize },
}

impl IdError {
    /// Returns `true` if this error came from parsing text.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidHex { .. } | Self::MalformedToken { .. } | Self::NonAscii(_)
        )
    }
}
