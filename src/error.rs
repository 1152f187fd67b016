//! Error taxonomy shared across the crate

use thiserror::Error;

/// Errors surfaced by the content and formatting layers.
///
/// None of these are retried locally; they propagate to the page layer,
/// which maps them onto an HTTP status and a fallback page.
#[derive(Debug, Error)]
pub enum Error {
    /// Input could not be parsed as a valid calendar date/time.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// Transport or decode failure talking to the content source.
    #[error("content source error: {0}")]
    ContentSource(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The slug does not resolve to any document.
    #[error("post not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Wrap a transport/decode failure as a content-source error,
    /// keeping it reachable through `source()`.
    pub fn content_source<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error::ContentSource(err.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_source_keeps_cause() {
        let cause = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "boom");
        let err = Error::content_source(cause);
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("boom"));
    }
}
