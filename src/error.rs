//! Error types for the reconciliation service.

/// Errors that can occur when talking to the ISNI SRU API.
///
/// None of these cross the [`search`](crate::IsniClient::search) boundary —
/// the search pipeline logs them and degrades to an empty candidate list.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// HTTP request failed (network, timeout, etc.)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// ISNI API returned a non-success status code.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// SRU response was not well-formed XML.
    #[error("Failed to parse SRU response: {0}")]
    Xml(#[from] quick_xml::Error),

    /// I/O error (server socket, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for Results using [`ReconcileError`].
pub type Result<T> = std::result::Result<T, ReconcileError>;
