//! Error taxonomy for API calls.
//!
//! Every failure is reduced to one of three kinds before it reaches the
//! store: the store treats them identically (no retry, no backoff), but the
//! distinction is kept for logging and for callers that want to inspect it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
  /// Transport-level failure before a response arrived
  #[error("network error: {0}")]
  Network(String),

  /// The server answered with a non-success status
  #[error("server returned status {status}")]
  Server { status: u16 },

  /// Malformed parameters or a response body that failed to decode
  #[error("invalid request or response: {0}")]
  Validation(String),
}

impl From<reqwest::Error> for ApiError {
  fn from(err: reqwest::Error) -> Self {
    if let Some(status) = err.status() {
      ApiError::Server {
        status: status.as_u16(),
      }
    } else if err.is_decode() {
      ApiError::Validation(err.to_string())
    } else {
      ApiError::Network(err.to_string())
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_error_display() {
    let err = ApiError::Server { status: 502 };
    assert_eq!(err.to_string(), "server returned status 502");

    let err = ApiError::Network("connection refused".to_string());
    assert!(err.to_string().contains("connection refused"));
  }
}
