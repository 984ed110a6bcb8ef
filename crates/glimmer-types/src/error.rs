use thiserror::Error;

/// Errors from the persistent key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error("invalid store key: '{0}'")]
    InvalidKey(String),
}

/// Errors from the remote generative API gateway.
///
/// Every variant is recoverable at the conversation-controller level: the
/// controller turns it into an apologetic assistant turn and a notice.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("authentication failed: the API rejected the configured credential")]
    Auth,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("empty response: no usable candidate in the reply")]
    EmptyResponse,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("provider error (HTTP {status}): {message}")]
    Provider { status: u16, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_display() {
        let err = GatewayError::Provider {
            status: 503,
            message: "overloaded".to_string(),
        };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("overloaded"));
    }

    #[test]
    fn test_store_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: StoreError = io.into();
        assert!(err.to_string().contains("missing"));
    }
}
