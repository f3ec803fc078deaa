//! Error types for text rendering.

use std::convert::Infallible;

use thiserror::Error;

/// A charset name that no known encoding answers to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported charset: {charset:?}")]
pub struct UnsupportedEncoding {
    charset: String,
}

impl UnsupportedEncoding {
    pub fn new(charset: impl Into<String>) -> Self {
        Self {
            charset: charset.into(),
        }
    }

    pub fn charset(&self) -> &str {
        &self.charset
    }
}

/// Errors produced while parsing a media type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaTypeError {
    #[error("invalid media type {input:?}: {reason}")]
    Invalid { input: String, reason: String },
}

/// Errors that can occur while rendering text into a response body.
///
/// `E` is the producer's own error type. It is carried in
/// [`RenderError::Render`] exactly as the producer returned it.
#[derive(Debug, Error)]
pub enum RenderError<E> {
    #[error(transparent)]
    UnsupportedEncoding(#[from] UnsupportedEncoding),

    #[error("response body error: {0}")]
    Io(#[from] std::io::Error),

    #[error("render canceled")]
    Canceled,

    #[error(transparent)]
    Render(E),
}

/// Error type for producers that cannot fail, such as raw content writes.
pub type ContentError = RenderError<Infallible>;

impl<E> RenderError<E> {
    /// The producer's error, if that is what failed.
    pub fn into_render(self) -> Option<E> {
        match self {
            Self::Render(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }

    pub fn is_unsupported_encoding(&self) -> bool {
        matches!(self, Self::UnsupportedEncoding(_))
    }
}

impl RenderError<std::io::Error> {
    /// Fold producer I/O failures into [`RenderError::Io`].
    ///
    /// Used by producers whose only failure mode is writing to the
    /// response body.
    pub(crate) fn into_content_error(self) -> ContentError {
        match self {
            Self::UnsupportedEncoding(err) => RenderError::UnsupportedEncoding(err),
            Self::Io(err) | Self::Render(err) => RenderError::Io(err),
            Self::Canceled => RenderError::Canceled,
        }
    }
}

/// Errors loading a [`RenderConfig`](crate::RenderConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_encoding_display() {
        let err = UnsupportedEncoding::new("bogus-7");
        assert_eq!(err.charset(), "bogus-7");
        assert_eq!(err.to_string(), "unsupported charset: \"bogus-7\"");
    }

    #[test]
    fn render_error_is_transparent_for_producer_errors() {
        let err: RenderError<std::fmt::Error> = RenderError::Render(std::fmt::Error);
        assert_eq!(err.to_string(), std::fmt::Error.to_string());
        assert!(err.into_render().is_some());
    }

    #[test]
    fn render_error_from_unsupported_encoding() {
        let err: ContentError = UnsupportedEncoding::new("x").into();
        assert!(err.is_unsupported_encoding());
        assert!(!err.is_canceled());
    }

    #[test]
    fn producer_io_errors_fold_into_io() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        let err = RenderError::Render(io).into_content_error();
        match err {
            RenderError::Io(io) => assert_eq!(io.kind(), std::io::ErrorKind::BrokenPipe),
            other => panic!("expected Io, got {other:?}"),
        }
    }

    #[test]
    fn error_is_std_error() {
        let err: ContentError = RenderError::Canceled;
        let _: &dyn std::error::Error = &err;
    }
}
