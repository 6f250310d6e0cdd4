use thiserror::Error;

/// Terminal outcome of a single submission. Nothing here is retried
/// automatically; the user resubmits.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DownloadError {
    /// Rejected locally, before any network call.
    #[error("Invalid {field}: {reason}")]
    Validation {
        field: &'static str,
        reason: String,
    },

    /// The service rejected the request with structured field errors (422).
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Any other HTTP error status, with whatever detail could be decoded.
    #[error("Server error: {0}")]
    Server(String),

    /// The request budget elapsed before the transfer finished.
    #[error("Connection timed out")]
    Timeout,

    /// Transport-level failure with no response at all.
    #[error("Network error: {0}")]
    Network(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("{0}")]
    Unknown(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_text_is_distinct_from_network_text() {
        let timeout = DownloadError::Timeout.to_string();
        let network = DownloadError::Network("connection reset".into()).to_string();
        assert!(timeout.contains("timed out"));
        assert!(!timeout.contains("Network"));
        assert!(network.starts_with("Network error"));
    }
}
