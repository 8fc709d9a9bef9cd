//! Error types for the management API client.
//!
//! # Design
//! Two families that never mix. `ConfigError` comes back synchronously from
//! manager construction, before any request exists. `ApiError` covers one
//! call: building the request, the transport round-trip and parsing the
//! response. `NotFound` gets a dedicated variant because callers frequently
//! distinguish "the resource does not exist" from "the server returned an
//! unexpected status."

use thiserror::Error;

/// Manager construction failed because the options are unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The options document is absent or is not an object.
    #[error("must provide manager options")]
    MissingOptions,

    /// `baseUrl` is absent or null.
    #[error("must provide a base URL for the API")]
    MissingBaseUrl,

    /// `baseUrl` is not a string, or is empty.
    #[error("the provided base URL is invalid")]
    InvalidBaseUrl,

    /// `headers` is present but is not a map of strings.
    #[error("invalid headers: {0}")]
    InvalidHeaders(String),

    /// An environment variable is missing or malformed.
    #[error("environment error: {0}")]
    Env(String),
}

/// Errors returned by a single manager call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request never produced a response.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// A path parameter had a value that cannot appear in a URL segment.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_carry_original_messages() {
        assert_eq!(ConfigError::MissingOptions.to_string(), "must provide manager options");
        assert_eq!(
            ConfigError::MissingBaseUrl.to_string(),
            "must provide a base URL for the API"
        );
        assert_eq!(ConfigError::InvalidBaseUrl.to_string(), "the provided base URL is invalid");
    }

    #[test]
    fn http_error_display_includes_status_and_body() {
        let err = ApiError::Http {
            status: 429,
            body: "too many requests".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("429"));
        assert!(display.contains("too many requests"));
    }
}
