use std::{error, fmt, sync::Arc};

use batches::MatrixError;

pub mod client;

pub use client::ValhallaClient;

#[derive(Debug, Clone)]
pub enum ApiError {
    RequestError(Arc<reqwest::Error>),
    InvalidResponse {
        status_code: reqwest::StatusCode,
        url: String,
        response: Option<String>,
    },
    /// The body lacks `sources_to_targets` or its first row does not have
    /// one entry per target.
    MalformedResponse(String),
    Other(String),
}

impl error::Error for ApiError {}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiError::RequestError(e) => write!(f, "HTTP request error: {}", e),
            ApiError::InvalidResponse {
                status_code,
                url,
                response,
            } => match response {
                Some(text) => {
                    write!(f, "Invalid Response ({}) {}: {}", status_code, url, text)
                }
                None => write!(f, "Invalid Response ({}) {}", status_code, url),
            },
            ApiError::MalformedResponse(body) => write!(f, "Malformed response: {}", body),
            ApiError::Other(e) => write!(f, "{e}"),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::RequestError(Arc::new(e))
    }
}

impl From<ApiError> for MatrixError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::RequestError(e) if e.is_timeout() || e.is_connect() || e.is_request() || e.is_body() => {
                MatrixError::Transport(e.to_string())
            }
            ApiError::RequestError(e) => MatrixError::Other(e.to_string()),
            ApiError::InvalidResponse {
                status_code,
                url,
                response,
            } => MatrixError::InvalidResponse {
                status: status_code.as_u16(),
                url,
                response: response.unwrap_or_default(),
            },
            ApiError::MalformedResponse(response) => MatrixError::MalformedResponse { response },
            ApiError::Other(e) => MatrixError::Other(e),
        }
    }
}
