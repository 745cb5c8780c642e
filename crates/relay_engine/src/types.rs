use std::fmt;

/// Outbound HTTP call that did not produce a usable body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Parse,
    ConfigurationMissing,
}

impl FailureKind {
    /// Could not reach the remote service, or it answered with an error status.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            FailureKind::Network | FailureKind::Timeout | FailureKind::HttpStatus(_)
        )
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::TooLarge {
                max_bytes,
                actual: Some(actual),
            } => write!(f, "response too large (max {max_bytes}, actual {actual})"),
            FailureKind::TooLarge {
                max_bytes,
                actual: None,
            } => write!(f, "response too large (max {max_bytes})"),
            FailureKind::Parse => write!(f, "invalid json body"),
            FailureKind::ConfigurationMissing => write!(f, "configuration missing"),
        }
    }
}
