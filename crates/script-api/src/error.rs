use thiserror::Error;

/// Failures raised by the script backend and auth transports.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid client configuration: {0}")]
    Configuration(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("server returned {code}: {body}")]
    Status { code: u16, body: String },

    #[error("invalid response payload: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        ApiError::Configuration(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        ApiError::Transport(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        ApiError::InvalidResponse(msg.into())
    }
}
