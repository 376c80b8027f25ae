//! Domain error types.

/// Top-level error type for swingtrader.
#[derive(Debug, thiserror::Error)]
pub enum SwingError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {code} on {exchange}")]
    NoData { code: String, exchange: String },

    #[error("event feed error: {reason}")]
    EventFeed { reason: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    /// A sequencing bug in the caller, e.g. opening a second position.
    #[error("invariant violation: {reason}")]
    InvariantViolation { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&SwingError> for std::process::ExitCode {
    fn from(err: &SwingError) -> Self {
        let code: u8 = match err {
            SwingError::Io(_) => 1,
            SwingError::ConfigParse { .. }
            | SwingError::ConfigMissing { .. }
            | SwingError::ConfigInvalid { .. } => 2,
            SwingError::Data { .. } | SwingError::NoData { .. } | SwingError::EventFeed { .. } => 3,
            SwingError::Report { .. } => 4,
            SwingError::InvariantViolation { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
