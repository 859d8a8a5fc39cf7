//! Domain error types.

/// Top-level error type for confluence.
#[derive(Debug, thiserror::Error)]
pub enum ConfluenceError {
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

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("malformed bar at index {index}: {reason}")]
    MalformedBar { index: usize, reason: String },

    #[error("bar at row {row} is out of order: {time} precedes {previous}")]
    OutOfOrder {
        row: usize,
        time: String,
        previous: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ConfluenceError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        ConfluenceError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&ConfluenceError> for std::process::ExitCode {
    fn from(err: &ConfluenceError) -> Self {
        let code: u8 = match err {
            ConfluenceError::Io(_) => 1,
            ConfluenceError::ConfigParse { .. }
            | ConfluenceError::ConfigMissing { .. }
            | ConfluenceError::ConfigInvalid { .. } => 2,
            ConfluenceError::DataSource { .. }
            | ConfluenceError::MalformedBar { .. }
            | ConfluenceError::OutOfOrder { .. } => 3,
        };
        std::process::ExitCode::from(code)
    }
}
