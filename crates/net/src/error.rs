//! Fetch error types

use std::path::PathBuf;

use thiserror::Error;

/// Fetch result type
pub type NetResult<T> = Result<T, NetError>;

/// Errors raised while fetching stylesheet text
#[derive(Debug, Error)]
pub enum NetError {
    #[error("Invalid source: {0}")]
    InvalidSource(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Timeout")]
    Timeout,

    #[error("Too many redirects")]
    TooManyRedirects,

    #[error("HTTP error {status} for {url}")]
    HttpError { status: u16, url: String },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Stylesheet {0} is not valid UTF-8")]
    Encoding(String),
}

impl From<reqwest::Error> for NetError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NetError::Timeout
        } else if err.is_connect() {
            NetError::ConnectionError(err.to_string())
        } else if err.is_redirect() {
            NetError::TooManyRedirects
        } else {
            NetError::RequestFailed(err.to_string())
        }
    }
}

impl From<url::ParseError> for NetError {
    fn from(err: url::ParseError) -> Self {
        NetError::InvalidSource(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_error_conversion() {
        let err: NetError = url::Url::parse("http://[broken").unwrap_err().into();
        assert!(matches!(err, NetError::InvalidSource(_)));
    }

    #[test]
    fn test_http_error_display() {
        let err = NetError::HttpError {
            status: 404,
            url: "https://example.com/a.css".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP error 404 for https://example.com/a.css");
    }

    #[test]
    fn test_io_error_display() {
        let err = NetError::Io {
            path: PathBuf::from("missing.css"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.to_string(), "Failed to read missing.css: not found");
    }
}
