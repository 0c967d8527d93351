//! Errors from the provider transport and adapters.

/// Errors that can occur when talking to an image-generation vendor.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The vendor returned a non-2xx status code.
    #[error("Provider API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A single attempt exceeded the per-attempt timeout and was aborted.
    #[error("Provider call timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The opaque model handle could not be decoded.
    #[error("Invalid model handle: {0}")]
    InvalidHandle(String),

    /// Caller input the adapter cannot work with (e.g. no images).
    #[error("Invalid provider input: {0}")]
    InvalidInput(String),

    /// A referenced image could not be resolved to bytes.
    #[error("Failed to resolve image: {0}")]
    Image(String),

    /// Provider configuration problem (missing API key, unknown vendor).
    #[error("Provider configuration error: {0}")]
    Config(String),

    /// The retry budget allowed zero attempts.
    #[error("Retry budget exhausted before any attempt ran")]
    NoAttempts,
}
