//! Error types for the posts client and its local collection.
//!
//! # Design
//! Network failures come in two flavors: the server answered with a
//! non-success status (`Http`), or no usable answer arrived at all
//! (`Transport`). A response body that fails to decode counts as the latter.
//! `NotFound` is raised locally by the collection and never by the network
//! layer; a remote 404 is an ordinary `Http { status: 404, .. }`.

use thiserror::Error;

/// Errors returned by the request executor, the collection, and the session.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned a status outside 2xx.
    #[error("HTTP error! status: {status}")]
    Http { status: u16, body: String },

    /// The call could not complete, or its body could not be decoded.
    #[error("transport error: {cause}")]
    Transport { cause: String },

    /// A local mutation targeted an id the collection does not hold.
    #[error("post {id} not found")]
    NotFound { id: u64 },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    pub(crate) fn transport(cause: impl Into<String>) -> Self {
        ApiError::Transport {
            cause: cause.into(),
        }
    }

    pub(crate) fn decode(err: serde_json::Error) -> Self {
        ApiError::transport(format!("invalid response body: {err}"))
    }

    /// HTTP status carried by the error, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_message_names_status() {
        let err = ApiError::Http {
            status: 404,
            body: "{}".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP error! status: 404");
        assert_eq!(err.status(), Some(404));
        assert!(!err.is_transport());
    }

    #[test]
    fn decode_failures_are_transport_class() {
        let json_err = serde_json::from_str::<u64>("nope").unwrap_err();
        let err = ApiError::decode(json_err);
        assert!(err.is_transport());
        assert!(err.to_string().starts_with("transport error: invalid response body"));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn not_found_names_id() {
        assert_eq!(ApiError::NotFound { id: 99 }.to_string(), "post 99 not found");
    }
}
