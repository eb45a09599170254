use thiserror::Error;

pub const NETWORK_FAILURE_MESSAGE: &str = "network connection failed, check connectivity and retry.";
pub const SERVER_FAILURE_MESSAGE: &str = "server error, please retry later.";
pub const INVALID_ID_MESSAGE: &str = "invalid item id";

/// Failure reaching or using the remote listing service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListingError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("server rejected request with status {status}")]
    Server { status: u16 },
    #[error("{0}")]
    Unclassified(String),
    #[error("invalid item id: {0:?}")]
    InvalidId(String),
}

impl ListingError {
    pub fn transport(detail: impl Into<String>) -> Self {
        Self::Transport(detail.into())
    }

    pub fn unclassified(detail: impl Into<String>) -> Self {
        Self::Unclassified(detail.into())
    }

    /// Text suitable for display. Only unclassified failures echo their detail.
    pub fn presentable_message(&self) -> String {
        match self {
            Self::Transport(_) => NETWORK_FAILURE_MESSAGE.to_string(),
            Self::Server { .. } => SERVER_FAILURE_MESSAGE.to_string(),
            Self::Unclassified(detail) => format!("unknown error: {detail}"),
            Self::InvalidId(_) => INVALID_ID_MESSAGE.to_string(),
        }
    }
}
