//! WarpGrid text responses.
//!
//! Handlers that answer with text, either a literal string
//! ([`ContentResult`]) or a rendered view ([`ViewExecutor`]), go through
//! the same pipeline:
//!
//! - [`resolve`] picks the exact `Content-Type` header and the body
//!   encoding from an optional declared media type. A missing charset
//!   becomes `utf-8`; an unknown one is an error.
//! - [`NoPreamble`] strips byte-order marks. HTTP carries the charset in
//!   the header, so bodies never start with a BOM.
//! - [`GuardedStream`] sits in front of the response body. Once its
//!   [`WriteGuard`] is armed, writes and flushes no longer reach the body.
//! - [`TextRender`] sets the header, hands the producer a buffered
//!   [`TextWriter`] and, if the producer fails or is canceled, arms the
//!   guard before the writer's final flush. A failed render therefore
//!   never pushes a half-written body onto the wire, and the layer above
//!   is free to send an error response instead.
//!
//! # Example
//!
//! ```
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! use warpgrid_render::{BufferedResponse, ContentResult, MediaType};
//!
//! let mut response = BufferedResponse::new();
//! ContentResult::new("x")
//!     .with_content_type(MediaType::parse("application/json; charset=utf-16").unwrap())
//!     .execute(&mut response)
//!     .await
//!     .unwrap();
//!
//! assert_eq!(response.content_type(), Some("application/json; charset=utf-16"));
//! assert_eq!(response.body().as_bytes(), [0x78, 0x00]);
//! # });
//! ```

mod config;
mod content;
mod encoding;
mod error;
mod guard;
mod header;
mod media_type;
mod render;
mod resolve;
mod response;
mod view;
mod writer;

pub use config::RenderConfig;
pub use content::ContentResult;
pub use encoding::{ByteOrder, Encoding, NoPreamble, TextEncoding};
pub use error::{ConfigError, ContentError, MediaTypeError, RenderError, UnsupportedEncoding};
pub use guard::{GuardedStream, WriteGuard};
pub use header::{CONTENT_TYPE, HeaderMap};
pub use media_type::MediaType;
pub use render::TextRender;
pub use resolve::{DEFAULT_ENCODING, ResolvedContentType, encoding_for_charset, resolve};
pub use response::{BufferedResponse, HttpResponse, ResponseBody};
pub use view::{View, ViewContext, ViewData, ViewExecutor};
pub use writer::{DEFAULT_BUFFER_SIZE, TextWriter};
