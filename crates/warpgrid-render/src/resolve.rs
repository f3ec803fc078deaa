//! Content-type and charset resolution.
//!
//! Decides the exact `Content-Type` header and the body encoding from an
//! optional declared media type. The declared value is only borrowed;
//! when a charset has to be added, a new media type is built.

use tracing::debug;

use crate::encoding::{Encoding, TextEncoding};
use crate::error::UnsupportedEncoding;
use crate::media_type::MediaType;

/// Encoding used when the declared content type names no charset.
pub const DEFAULT_ENCODING: Encoding = Encoding::UTF8_NO_BOM;

/// Header value and encoding for one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedContentType {
    media_type: MediaType,
    encoding: Encoding,
}

impl ResolvedContentType {
    pub fn media_type(&self) -> &MediaType {
        &self.media_type
    }

    /// The exact `Content-Type` header value.
    pub fn header(&self) -> String {
        self.media_type.to_string()
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }
}

/// Resolve the header and encoding for a response.
///
/// - No declared type: `fallback` with the default charset.
/// - Declared without charset: a copy of `declared` with the default
///   charset added; other parameters are kept.
/// - Declared with charset: `declared` as-is, encoded in that charset.
///
/// # Errors
///
/// Returns [`UnsupportedEncoding`] when the declared charset names no
/// known encoding.
pub fn resolve(
    declared: Option<&MediaType>,
    fallback: &MediaType,
) -> Result<ResolvedContentType, UnsupportedEncoding> {
    let resolved = match declared {
        None => ResolvedContentType {
            media_type: fallback.with_charset(DEFAULT_ENCODING.name()),
            encoding: DEFAULT_ENCODING,
        },
        Some(declared) => match declared.charset() {
            None => ResolvedContentType {
                media_type: declared.with_charset(DEFAULT_ENCODING.name()),
                encoding: DEFAULT_ENCODING,
            },
            Some(charset) => ResolvedContentType {
                media_type: declared.clone(),
                encoding: encoding_for_charset(charset)?,
            },
        },
    };
    debug!(
        content_type = %resolved.media_type,
        charset = resolved.encoding.name(),
        declared = declared.is_some(),
        "resolved response content type"
    );
    Ok(resolved)
}

/// Map a charset name to an encoding.
///
/// Names matching the default encoding or UTF-16 reuse those constants
/// (so the default stays BOM-free); anything else goes through the label
/// lookup.
pub fn encoding_for_charset(charset: &str) -> Result<Encoding, UnsupportedEncoding> {
    let charset = charset.trim();
    if charset.eq_ignore_ascii_case(DEFAULT_ENCODING.name()) {
        return Ok(DEFAULT_ENCODING);
    }
    if charset.eq_ignore_ascii_case(Encoding::UTF16LE.name()) {
        return Ok(Encoding::UTF16LE);
    }
    Encoding::for_label(charset).ok_or_else(|| UnsupportedEncoding::new(charset))
}
