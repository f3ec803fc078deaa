//! Render coordination.
//!
//! [`TextRender`] drives one text response from start to finish:
//!
//! 1. resolve the `Content-Type` header and body encoding,
//! 2. set the header (and optional status) on the response,
//! 3. hand the producer a [`TextWriter`] over a [`GuardedStream`],
//! 4. flush on success, or arm the guard and then release the writer on
//!    failure so that nothing further reaches the body.
//!
//! ```text
//! Init ──▶ HeaderSet ──▶ Writing ──┬─▶ Flushed     (producer Ok)
//!                                  └─▶ Suppressed  (producer Err / canceled)
//! ```
//!
//! Resolution failures happen in `Init` and leave the response untouched.
//! Nothing is retried.

use std::future::Future;

use tracing::{debug, trace};

use crate::encoding::NoPreamble;
use crate::error::RenderError;
use crate::guard::{GuardedStream, WriteGuard};
use crate::media_type::MediaType;
use crate::resolve::resolve;
use crate::response::HttpResponse;
use crate::writer::{DEFAULT_BUFFER_SIZE, TextWriter};

/// One text render: content type inputs, optional status, buffer size.
#[derive(Debug, Clone)]
pub struct TextRender<'a> {
    fallback: &'a MediaType,
    declared: Option<&'a MediaType>,
    status: Option<u16>,
    buffer_size: usize,
}

impl<'a> TextRender<'a> {
    /// `fallback` is used when no content type is declared.
    pub fn new(fallback: &'a MediaType) -> Self {
        Self {
            fallback,
            declared: None,
            status: None,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    pub fn declared(mut self, declared: Option<&'a MediaType>) -> Self {
        self.declared = declared;
        self
    }

    /// Status code set on the response before the body is written.
    pub fn status(mut self, status: Option<u16>) -> Self {
        self.status = status;
        self
    }

    pub fn buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Render `producer`'s text into `response`.
    ///
    /// # Errors
    ///
    /// - [`RenderError::UnsupportedEncoding`] before anything is set on
    ///   the response.
    /// - [`RenderError::Render`] with the producer's error, after all
    ///   further body writes have been suppressed.
    /// - [`RenderError::Io`] when the final flush fails.
    pub async fn run<R, F, E>(self, response: &mut R, producer: F) -> Result<(), RenderError<E>>
    where
        R: HttpResponse + ?Sized,
        F: AsyncFnOnce(&mut TextWriter<'_>) -> Result<(), E>,
    {
        self.run_until(response, std::future::pending(), producer)
            .await
    }

    /// Like [`run`](Self::run), but gives up once `cancel` completes.
    ///
    /// Cancellation takes the failure path: the guard is armed before the
    /// writer is released and [`RenderError::Canceled`] is returned.
    pub async fn run_until<R, C, F, E>(
        self,
        response: &mut R,
        cancel: C,
        producer: F,
    ) -> Result<(), RenderError<E>>
    where
        R: HttpResponse + ?Sized,
        C: Future<Output = ()>,
        F: AsyncFnOnce(&mut TextWriter<'_>) -> Result<(), E>,
    {
        let resolved = resolve(self.declared, self.fallback)?;
        let header = resolved.header();

        response.set_content_type(header.clone());
        if let Some(status) = self.status {
            response.set_status(status);
        }

        let guard = WriteGuard::new();
        let mut stream = GuardedStream::new(response.body_mut(), &guard);
        let mut writer = TextWriter::with_capacity(
            &mut stream,
            NoPreamble::new(resolved.encoding()),
            self.buffer_size,
        );

        let outcome = tokio::select! {
            biased;
            result = producer(&mut writer) => result.map_err(RenderError::Render),
            () = cancel => Err(RenderError::Canceled),
        };

        match outcome {
            Ok(()) => {
                let bytes = writer.close().await?;
                debug!(content_type = %header, bytes, "rendered response body");
                Ok(())
            }
            Err(err) => {
                // Arm first: the release below would otherwise flush.
                guard.arm();
                if let Err(close_err) = writer.close().await {
                    trace!(error = %close_err, "release after failed render");
                }
                debug!(
                    content_type = %header,
                    canceled = err.is_canceled(),
                    "render failed, body writes suppressed"
                );
                Err(err)
            }
        }
    }
}
