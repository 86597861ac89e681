use std::fmt;

use thiserror::Error;

/// Failure reported by the HTTP library itself (DNS, connect, TLS, timeout).
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    pub code: Option<u16>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: u16) -> Self {
        self.code = Some(code);
        self
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self {
            message: err.to_string(),
            code: err.status().map(|status| status.as_u16()),
        }
    }
}

/// Why a field could not be turned into its typed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HydrationReason {
    Missing,
    InvalidType { expected: &'static str },
    InvalidTimestamp(String),
    UnknownDiscriminant(i64),
    DepthExceeded(usize),
}

impl fmt::Display for HydrationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "missing required field"),
            Self::InvalidType { expected } => write!(f, "expected {}", expected),
            Self::InvalidTimestamp(raw) => write!(f, "invalid timestamp '{}'", raw),
            Self::UnknownDiscriminant(kind) => write!(f, "unknown building type {}", kind),
            Self::DepthExceeded(limit) => write!(f, "nesting deeper than {} levels", limit),
        }
    }
}

/// A JSON node could not be hydrated into a typed entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot hydrate {entity}.{field}: {reason}")]
pub struct HydrationError {
    pub entity: &'static str,
    pub field: &'static str,
    pub reason: HydrationReason,
}

impl HydrationError {
    pub fn new(entity: &'static str, field: &'static str, reason: HydrationReason) -> Self {
        Self {
            entity,
            field,
            reason,
        }
    }
}

/// Error surfaced by every facade operation.
#[derive(Debug, Error)]
pub enum FacadeError {
    #[error("{}", .0.message)]
    Transport(#[from] TransportError),

    /// Non-success response carrying an `error` or `critical` field.
    #[error("{message}")]
    Server { message: String, status: u16 },

    /// Non-success response without a usable message.
    #[error("Internal server error")]
    Unclassified { status: u16 },

    #[error(transparent)]
    Hydration(#[from] HydrationError),

    #[error("Empty response body")]
    EmptyResponse,

    #[error("Failed to encode request: {0}")]
    RequestEncoding(String),
}

impl FacadeError {
    /// Human-readable message, as shown to callers.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Numeric code attached to the failure, if any.
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Transport(err) => err.code,
            Self::Server { status, .. } | Self::Unclassified { status } => Some(*status),
            Self::Hydration(_) | Self::EmptyResponse | Self::RequestEncoding(_) => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

pub type Result<T> = std::result::Result<T, FacadeError>;
