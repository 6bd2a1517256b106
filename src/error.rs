//! Error types for advocate-events.
//!
//! Every fallible operation in the crate returns [`Result`]. Data-quality
//! problems inside the event stream (a modification without a prior add,
//! a removal of something untracked) are *not* errors: the projection engine
//! records them as diagnostics and keeps going. The variants here cover the
//! conditions that must abort a run.

use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for advocate-events operations.
#[derive(Error, Debug)]
pub enum AdvocateError {
    /// An event log envelope could not be decoded.
    #[error("Invalid event envelope at index {index}: {message}")]
    Envelope {
        /// Position of the envelope in the log array.
        index: usize,
        /// Human-readable error message.
        message: String,
        /// Underlying serde_json error, if available.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// The event log is not a JSON array of envelopes.
    #[error("Malformed event log: {message}")]
    MalformedLog {
        /// Human-readable error message.
        message: String,
        /// Underlying serde_json error, if available.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// A git invocation failed.
    #[error("git {command} failed: {message}")]
    Git {
        /// The git subcommand and arguments that were run.
        command: String,
        /// Captured stderr or spawn failure.
        message: String,
    },

    /// The given directory is not a git work tree.
    #[error("Not a git repository: {path}")]
    NotARepository {
        /// Path that was inspected.
        path: PathBuf,
    },

    /// A request to the hosting API failed.
    #[error("Remote request failed for {url}: {message}")]
    Remote {
        /// Request URL.
        url: String,
        /// HTTP status or transport error description.
        message: String,
        /// Underlying reqwest error, if available.
        #[source]
        source: Option<reqwest::Error>,
    },

    /// A stored artifact does not exist.
    #[error("Artifact not found: {name}")]
    ArtifactNotFound {
        /// Logical artifact name.
        name: String,
    },

    /// An incremental run was requested but no cursor is stored.
    #[error("No cursor stored in '{artifact}'; run a full generation first")]
    MissingCursor {
        /// Artifact the cursor is read from.
        artifact: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Human-readable error message.
        message: String,
    },

    /// Invalid argument.
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument {
        /// Name of the invalid argument.
        name: String,
        /// Reason why the argument is invalid.
        reason: String,
    },

    /// Unsupported operation or feature.
    #[error("Unsupported: {feature}")]
    Unsupported {
        /// Name of the unsupported feature.
        feature: String,
    },

    /// I/O error.
    #[error("I/O error: {context}")]
    IoError {
        /// Context describing the operation that failed.
        context: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Serialization error.
    #[error("Serialization error: {context}")]
    SerializationError {
        /// Context describing the operation that failed.
        context: String,
        /// Underlying serde_json error.
        #[source]
        source: serde_json::Error,
    },
}

impl AdvocateError {
    /// Create a new envelope error.
    #[must_use]
    pub fn envelope(index: usize, message: impl Into<String>) -> Self {
        Self::Envelope {
            index,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new envelope error with source.
    #[must_use]
    pub fn envelope_with_source(
        index: usize,
        message: impl Into<String>,
        source: serde_json::Error,
    ) -> Self {
        Self::Envelope {
            index,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a new I/O error with context.
    #[must_use]
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::IoError {
            context: context.into(),
            source,
        }
    }

    /// Create a new git error.
    #[must_use]
    pub fn git(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Git {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Create a new remote error.
    #[must_use]
    pub fn remote(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            url: url.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a new remote error wrapping a transport error.
    #[must_use]
    pub fn remote_with_source(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Remote {
            url: url.into(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Get the process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Envelope { .. } | Self::MalformedLog { .. } => exit_codes::EXIT_DATA_ERROR,
            Self::ArtifactNotFound { .. } | Self::MissingCursor { .. } => {
                exit_codes::EXIT_NOT_FOUND
            }
            Self::Git { .. } | Self::NotARepository { .. } => exit_codes::EXIT_GIT_ERROR,
            Self::Remote { .. } => exit_codes::EXIT_REMOTE_ERROR,
            Self::InvalidConfig { .. } => exit_codes::EXIT_CONFIG_ERROR,
            Self::InvalidArgument { .. } => exit_codes::EXIT_USAGE_ERROR,
            Self::IoError { .. } => exit_codes::EXIT_IO_ERROR,
            _ => exit_codes::EXIT_GENERAL_ERROR,
        }
    }
}

/// Result type alias for advocate-events operations.
pub type Result<T> = std::result::Result<T, AdvocateError>;

impl From<std::io::Error> for AdvocateError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            context: "I/O operation failed".to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for AdvocateError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            context: "JSON operation failed".to_string(),
            source: err,
        }
    }
}

/// Exit codes for CLI operations.
pub mod exit_codes {
    /// Operation completed successfully.
    pub const EXIT_SUCCESS: i32 = 0;
    /// General/unspecified error.
    pub const EXIT_GENERAL_ERROR: i32 = 1;
    /// A required artifact or cursor is missing.
    pub const EXIT_NOT_FOUND: i32 = 3;
    /// Invalid configuration.
    pub const EXIT_CONFIG_ERROR: i32 = 5;
    /// A git command failed.
    pub const EXIT_GIT_ERROR: i32 = 8;
    /// The hosting API could not be reached or refused a request.
    pub const EXIT_REMOTE_ERROR: i32 = 9;
    /// Invalid command-line usage (BSD standard).
    pub const EXIT_USAGE_ERROR: i32 = 64;
    /// Input data format error (BSD standard).
    pub const EXIT_DATA_ERROR: i32 = 65;
    /// I/O error (BSD standard).
    pub const EXIT_IO_ERROR: i32 = 74;
}
