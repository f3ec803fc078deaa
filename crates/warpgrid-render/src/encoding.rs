//! Character encodings for response bodies.
//!
//! [`TextEncoding`] is the conversion seam between Rust strings and body
//! bytes. [`Encoding`] covers the Unicode encodings directly and every
//! WHATWG legacy encoding through `encoding_rs`. [`NoPreamble`] wraps any
//! encoding and drops its byte-order mark.

use std::borrow::Cow;
use std::fmt;

/// Byte order for the multi-byte Unicode encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    Little,
    Big,
}

/// Converts between text and bytes in one character encoding.
///
/// Counts are in Unicode scalar values (`char`s). Decoding is lossy:
/// malformed input becomes U+FFFD.
pub trait TextEncoding {
    /// Charset name written into the `Content-Type` header.
    fn name(&self) -> &'static str;

    /// Bytes emitted ahead of the first encoded character.
    fn preamble(&self) -> &'static [u8];

    fn byte_count(&self, text: &str) -> usize;

    /// Append the encoded form of `text` to `out`.
    fn encode_into(&self, text: &str, out: &mut Vec<u8>);

    fn encode(&self, text: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.byte_count(text));
        self.encode_into(text, &mut out);
        out
    }

    fn char_count(&self, bytes: &[u8]) -> usize {
        self.decode(bytes).chars().count()
    }

    fn decode(&self, bytes: &[u8]) -> String;

    /// Upper bound on encoded bytes for `char_count` characters.
    fn max_byte_count(&self, char_count: usize) -> usize;

    /// Upper bound on decoded characters for `byte_count` bytes.
    fn max_char_count(&self, byte_count: usize) -> usize;
}

impl<E: TextEncoding + ?Sized> TextEncoding for &E {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn preamble(&self) -> &'static [u8] {
        (**self).preamble()
    }

    fn byte_count(&self, text: &str) -> usize {
        (**self).byte_count(text)
    }

    fn encode_into(&self, text: &str, out: &mut Vec<u8>) {
        (**self).encode_into(text, out)
    }

    fn char_count(&self, bytes: &[u8]) -> usize {
        (**self).char_count(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> String {
        (**self).decode(bytes)
    }

    fn max_byte_count(&self, char_count: usize) -> usize {
        (**self).max_byte_count(char_count)
    }

    fn max_char_count(&self, byte_count: usize) -> usize {
        (**self).max_char_count(byte_count)
    }
}

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16BE_BOM: &[u8] = &[0xFE, 0xFF];
const UTF32LE_BOM: &[u8] = &[0xFF, 0xFE, 0x00, 0x00];
const UTF32BE_BOM: &[u8] = &[0x00, 0x00, 0xFE, 0xFF];

// Worst case for an unmappable character written as `&#NNNNNNN;`.
const MAX_NCR_LEN: usize = 10;

/// A character encoding usable for response bodies.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8 { bom: bool },
    Utf16 { order: ByteOrder, bom: bool },
    Utf32 { order: ByteOrder, bom: bool },
    /// A single- or multi-byte WHATWG encoding that `encoding_rs` can encode.
    Legacy(&'static encoding_rs::Encoding),
}

impl Encoding {
    /// UTF-8 with a byte-order mark, as returned by a charset lookup.
    pub const UTF8: Encoding = Encoding::Utf8 { bom: true };
    /// UTF-8 without a byte-order mark, the default for response bodies.
    pub const UTF8_NO_BOM: Encoding = Encoding::Utf8 { bom: false };
    pub const UTF16LE: Encoding = Encoding::Utf16 {
        order: ByteOrder::Little,
        bom: true,
    };
    pub const UTF16BE: Encoding = Encoding::Utf16 {
        order: ByteOrder::Big,
        bom: true,
    };
    pub const UTF32LE: Encoding = Encoding::Utf32 {
        order: ByteOrder::Little,
        bom: true,
    };
    pub const UTF32BE: Encoding = Encoding::Utf32 {
        order: ByteOrder::Big,
        bom: true,
    };

    /// Look up an encoding by charset label (case-insensitive, trimmed).
    ///
    /// Accepts every WHATWG label known to `encoding_rs` plus the UTF-32
    /// family. Returns `None` for unknown labels and for encodings that
    /// can only decode (such as `replacement`).
    pub fn for_label(label: &str) -> Option<Encoding> {
        let label = label.trim();
        match label.to_ascii_lowercase().as_str() {
            "utf-32" | "utf-32le" | "utf32" => return Some(Self::UTF32LE),
            "utf-32be" => return Some(Self::UTF32BE),
            _ => {}
        }

        let found = encoding_rs::Encoding::for_label_no_replacement(label.as_bytes())?;
        if found == encoding_rs::UTF_8 {
            Some(Self::UTF8)
        } else if found == encoding_rs::UTF_16LE {
            Some(Self::UTF16LE)
        } else if found == encoding_rs::UTF_16BE {
            Some(Self::UTF16BE)
        } else if found.output_encoding() == found {
            Some(Encoding::Legacy(found))
        } else {
            None
        }
    }
}

impl TextEncoding for Encoding {
    fn name(&self) -> &'static str {
        match self {
            Encoding::Utf8 { .. } => "utf-8",
            Encoding::Utf16 {
                order: ByteOrder::Little,
                ..
            } => "utf-16",
            Encoding::Utf16 {
                order: ByteOrder::Big,
                ..
            } => "utf-16be",
            Encoding::Utf32 {
                order: ByteOrder::Little,
                ..
            } => "utf-32",
            Encoding::Utf32 {
                order: ByteOrder::Big,
                ..
            } => "utf-32be",
            Encoding::Legacy(enc) => enc.name(),
        }
    }

    fn preamble(&self) -> &'static [u8] {
        match *self {
            Encoding::Utf8 { bom: true } => UTF8_BOM,
            Encoding::Utf16 {
                order: ByteOrder::Little,
                bom: true,
            } => UTF16LE_BOM,
            Encoding::Utf16 {
                order: ByteOrder::Big,
                bom: true,
            } => UTF16BE_BOM,
            Encoding::Utf32 {
                order: ByteOrder::Little,
                bom: true,
            } => UTF32LE_BOM,
            Encoding::Utf32 {
                order: ByteOrder::Big,
                bom: true,
            } => UTF32BE_BOM,
            _ => &[],
        }
    }

    fn byte_count(&self, text: &str) -> usize {
        match self {
            Encoding::Utf8 { .. } => text.len(),
            Encoding::Utf16 { .. } => text.encode_utf16().count() * 2,
            Encoding::Utf32 { .. } => text.chars().count() * 4,
            Encoding::Legacy(enc) => enc.encode(text).0.len(),
        }
    }

    fn encode_into(&self, text: &str, out: &mut Vec<u8>) {
        match *self {
            Encoding::Utf8 { .. } => out.extend_from_slice(text.as_bytes()),
            Encoding::Utf16 { order, .. } => {
                out.reserve(text.len() * 2);
                for unit in text.encode_utf16() {
                    out.extend_from_slice(&match order {
                        ByteOrder::Little => unit.to_le_bytes(),
                        ByteOrder::Big => unit.to_be_bytes(),
                    });
                }
            }
            Encoding::Utf32 { order, .. } => {
                out.reserve(text.len() * 4);
                for c in text.chars() {
                    let scalar = u32::from(c);
                    out.extend_from_slice(&match order {
                        ByteOrder::Little => scalar.to_le_bytes(),
                        ByteOrder::Big => scalar.to_be_bytes(),
                    });
                }
            }
            Encoding::Legacy(enc) => {
                let (bytes, _, _) = enc.encode(text);
                out.extend_from_slice(&bytes);
            }
        }
    }

    fn decode(&self, bytes: &[u8]) -> String {
        let text: Cow<'_, str> = match *self {
            Encoding::Utf8 { .. } => String::from_utf8_lossy(bytes),
            Encoding::Utf16 {
                order: ByteOrder::Little,
                ..
            } => encoding_rs::UTF_16LE.decode_without_bom_handling(bytes).0,
            Encoding::Utf16 {
                order: ByteOrder::Big,
                ..
            } => encoding_rs::UTF_16BE.decode_without_bom_handling(bytes).0,
            Encoding::Utf32 { order, .. } => Cow::Owned(decode_utf32(bytes, order)),
            Encoding::Legacy(enc) => enc.decode_without_bom_handling(bytes).0,
        };
        text.into_owned()
    }

    fn max_byte_count(&self, char_count: usize) -> usize {
        match self {
            Encoding::Utf8 { .. } | Encoding::Utf16 { .. } | Encoding::Utf32 { .. } => {
                char_count.saturating_mul(4)
            }
            Encoding::Legacy(enc) => {
                let utf8_len = char_count.saturating_mul(4);
                enc.new_encoder()
                    .max_buffer_length_from_utf8_if_no_unmappables(utf8_len)
                    .unwrap_or(usize::MAX)
                    .saturating_add(char_count.saturating_mul(MAX_NCR_LEN))
            }
        }
    }

    fn max_char_count(&self, byte_count: usize) -> usize {
        match self {
            Encoding::Utf8 { .. } | Encoding::Legacy(_) => byte_count,
            Encoding::Utf16 { .. } => byte_count.div_ceil(2),
            Encoding::Utf32 { .. } => byte_count.div_ceil(4),
        }
    }
}

impl fmt::Debug for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encoding")
            .field("name", &self.name())
            .field("preamble", &!self.preamble().is_empty())
            .finish()
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn decode_utf32(bytes: &[u8], order: ByteOrder) -> String {
    let mut chunks = bytes.chunks_exact(4);
    let mut out = String::with_capacity(bytes.len() / 4);
    for chunk in &mut chunks {
        let raw = [chunk[0], chunk[1], chunk[2], chunk[3]];
        let scalar = match order {
            ByteOrder::Little => u32::from_le_bytes(raw),
            ByteOrder::Big => u32::from_be_bytes(raw),
        };
        out.push(char::from_u32(scalar).unwrap_or(char::REPLACEMENT_CHARACTER));
    }
    if !chunks.remainder().is_empty() {
        out.push(char::REPLACEMENT_CHARACTER);
    }
    out
}

/// Wraps an encoding so that it never emits a preamble.
///
/// HTTP declares the charset in the `Content-Type` header, so a leading
/// byte-order mark in a generated body is redundant and throws off
/// `Content-Length`. Everything except [`preamble`](TextEncoding::preamble)
/// delegates to the wrapped encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoPreamble<E> {
    inner: E,
}

impl<E: TextEncoding> NoPreamble<E> {
    pub fn new(inner: E) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn into_inner(self) -> E {
        self.inner
    }
}

impl<E: TextEncoding> TextEncoding for NoPreamble<E> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn preamble(&self) -> &'static [u8] {
        &[]
    }

    fn byte_count(&self, text: &str) -> usize {
        self.inner.byte_count(text)
    }

    fn encode_into(&self, text: &str, out: &mut Vec<u8>) {
        self.inner.encode_into(text, out)
    }

    fn char_count(&self, bytes: &[u8]) -> usize {
        self.inner.char_count(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> String {
        self.inner.decode(bytes)
    }

    fn max_byte_count(&self, char_count: usize) -> usize {
        self.inner.max_byte_count(char_count)
    }

    fn max_char_count(&self, byte_count: usize) -> usize {
        self.inner.max_char_count(byte_count)
    }
}
