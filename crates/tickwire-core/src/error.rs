use thiserror::Error;

/// Validation errors raised before any backend call is made.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("status text cannot be empty")]
    EmptyStatusText,
    #[error("status text length {len} exceeds max {max}")]
    StatusTextTooLong { len: usize, max: usize },

    #[error("coordinate pair must hold exactly 2 values, got {len}")]
    MalformedCoordinatePair { len: usize },
    #[error("longitude {value} is outside [-180, 180]")]
    LongitudeOutOfRange { value: f64 },
    #[error("latitude {value} is outside [-90, 90]")]
    LatitudeOutOfRange { value: f64 },

    #[error("ticker cannot be empty")]
    EmptyTicker,
    #[error("ticker length {len} exceeds max {max}")]
    TickerTooLong { len: usize, max: usize },
    #[error("ticker must start with an ASCII letter: '{ch}'")]
    TickerInvalidStart { ch: char },
    #[error("ticker contains invalid character '{ch}' at index {index}")]
    TickerInvalidChar { ch: char, index: usize },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },
}

/// Unified DAO error taxonomy.
///
/// Both backends map their native failure surfaces (HTTP status codes,
/// affected-row counts, driver errors) into these variants; callers never
/// see a backend-native error type.
#[derive(Debug, Error)]
pub enum DaoError {
    /// Caller-supplied entity failed local validation.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// The backend call could not complete, or its body could not be read.
    #[error("transport failure: {0}")]
    Transport(String),

    /// Backend responded with an unexpected status or an empty body.
    #[error("backend request failed: {0}")]
    BackendRequest(String),

    /// Backend body could not be decoded into the entity shape.
    #[error("failed to decode response body: {0}")]
    Codec(String),

    /// An update affected a row count other than exactly one.
    #[error("update for ticker '{ticker}' affected {rows} rows, expected exactly 1")]
    UpdateConflict { ticker: String, rows: usize },

    /// An insert affected a row count other than exactly one, or hit a
    /// duplicate-key constraint from a concurrent writer.
    #[error("insert for ticker '{ticker}' affected {rows} rows, expected exactly 1")]
    InsertFailed { ticker: String, rows: usize },

    /// Operation is a deliberate scope limit of this layer.
    #[error("operation '{operation}' is not supported")]
    Unsupported { operation: &'static str },
}

impl DaoError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn backend_request(message: impl Into<String>) -> Self {
        Self::BackendRequest(message.into())
    }

    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec(message.into())
    }
}
