//! Provider types shared by the fetcher and the offline provider

use std::fmt;

/// Errors that can occur while fetching a tile from the remote server.
///
/// None of these are fatal to a download batch; they are counted and the
/// batch moves on.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Request could not be sent or the body could not be read
    HttpError(String),
    /// Server answered with a non-success status
    HttpStatus { status: u16, url: String },
    /// Server answered 2xx with no body
    EmptyBody { url: String },
    /// Server answered with something other than an image
    UnexpectedContentType { content_type: String, url: String },
    /// Body is not a recognisable image
    InvalidImage(String),
    /// URL template cannot produce tile URLs
    InvalidTemplate(String),
}

impl ProviderError {
    /// Returns true if repeating the request may succeed.
    ///
    /// Network failures, 5xx responses and 429 rate limiting are transient;
    /// everything else will fail the same way again.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::HttpError(_) => true,
            ProviderError::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            ProviderError::HttpStatus { status, url } => {
                write!(f, "HTTP {} from {}", status, url)
            }
            ProviderError::EmptyBody { url } => write!(f, "Empty response body from {}", url),
            ProviderError::UnexpectedContentType { content_type, url } => {
                write!(
                    f,
                    "Unexpected content type '{}' from {} (expected an image)",
                    content_type, url
                )
            }
            ProviderError::InvalidImage(msg) => write!(f, "Invalid image data: {}", msg),
            ProviderError::InvalidTemplate(msg) => write!(f, "Invalid URL template: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Body and content type of a successful (2xx) HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub body: Vec<u8>,
    pub content_type: Option<String>,
}

impl HttpResponse {
    pub fn new(body: Vec<u8>, content_type: Option<String>) -> Self {
        Self { body, content_type }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ProviderError::HttpError("connection reset".into()).is_transient());
        assert!(ProviderError::HttpStatus { status: 503, url: "u".into() }.is_transient());
        assert!(ProviderError::HttpStatus { status: 429, url: "u".into() }.is_transient());

        assert!(!ProviderError::HttpStatus { status: 404, url: "u".into() }.is_transient());
        assert!(!ProviderError::EmptyBody { url: "u".into() }.is_transient());
        assert!(!ProviderError::InvalidImage("garbage".into()).is_transient());
    }

    #[test]
    fn test_display_includes_url() {
        let err = ProviderError::HttpStatus {
            status: 404,
            url: "https://a.tile.example/1/0/0.png".into(),
        };
        assert_eq!(err.to_string(), "HTTP 404 from https://a.tile.example/1/0/0.png");
    }
}
