use thiserror::Error;

pub type Result<T> = std::result::Result<T, CommenterError>;

/// Failure classes surfaced by the public API.
///
/// Per-unit completion failures never show up here; they are absorbed by the
/// identity fallback and only counted in the run report.
#[derive(Debug, Error)]
pub enum CommenterError {
    #[error("usage error: {message}")]
    Usage { message: String },

    #[error("completion service error: {message}")]
    Service { message: String },

    #[error("diff computation error: {message}")]
    Diff { message: String },
}

impl CommenterError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    pub fn service(message: impl Into<String>) -> Self {
        Self::Service {
            message: message.into(),
        }
    }

    pub fn diff(message: impl Into<String>) -> Self {
        Self::Diff {
            message: message.into(),
        }
    }

    /// Process exit code for the CLI: 1 usage, 2 service, 3 diff.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Usage { .. } => 1,
            Self::Service { .. } => 2,
            Self::Diff { .. } => 3,
        }
    }
}
