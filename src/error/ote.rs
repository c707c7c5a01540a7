//! Unified error type for otelib
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OteError {
    // Strategy lifecycle errors
    #[error("Cannot create {kind}: {detail}")]
    Creation { kind: String, detail: String },

    #[error("Not found: {0}")]
    NotFound(String),

    // Dispatch errors
    #[error("{0:?} is not a valid backend")]
    InvalidBackend(String),

    #[error("{0:?} is not a valid strategy")]
    InvalidStrategy(String),

    #[error("The {kind:?} strategy is (currently) not supported by the {backend:?} backend")]
    NotImplemented { kind: String, backend: String },

    // Backend errors
    #[error("Transport error: {}{detail}", status_prefix(.status))]
    Transport { status: Option<u16>, detail: String },

    #[error("Plugin error: {0}")]
    Plugin(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using OteError
pub type Result<T> = std::result::Result<T, OteError>;

impl OteError {
    /// Create a creation error for a strategy kind
    pub fn creation(kind: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Creation {
            kind: kind.into(),
            detail: detail.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a transport error, keeping the HTTP status when there is one
    pub fn transport(status: Option<u16>, detail: impl Into<String>) -> Self {
        Self::Transport {
            status,
            detail: detail.into(),
        }
    }

    /// Create a plugin error
    pub fn plugin(msg: impl Into<String>) -> Self {
        Self::Plugin(msg.into())
    }

    /// Create an invalid config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// HTTP status of a failed backend call, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

fn status_prefix(status: &Option<u16>) -> String {
    match status {
        Some(status) => format!("status={status} "),
        None => String::new(),
    }
}

impl From<reqwest::Error> for OteError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            status: err.status().map(|s| s.as_u16()),
            detail: err.to_string(),
        }
    }
}
