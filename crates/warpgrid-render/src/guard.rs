//! Write suppression for response bodies.
//!
//! A buffered writer flushes when it is released, whether or not its
//! producer succeeded. [`GuardedStream`] sits between the writer and the
//! real body so that, once its [`WriteGuard`] is armed, those trailing
//! writes and flushes never reach the transport. The layer above can then
//! still send a proper error response.

use std::io::{self, IoSlice, SeekFrom};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncSeek, AsyncWrite, ReadBuf};
use tracing::trace;

/// One-shot flag that blocks writes through a [`GuardedStream`].
///
/// Starts disarmed. Once armed it stays armed; there is no reset.
#[derive(Debug, Default)]
pub struct WriteGuard {
    armed: AtomicBool,
}

impl WriteGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block all further writes and flushes.
    ///
    /// Returns `true` if this call armed the guard, `false` if it was
    /// already armed.
    pub fn arm(&self) -> bool {
        !self.armed.swap(true, Ordering::AcqRel)
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }
}

/// A stream whose writes and flushes become no-ops once its guard is armed.
///
/// Reads, seeks and everything else pass straight through. While armed,
/// writes report the full buffer as written so that callers drain
/// normally, but the inner stream receives nothing. `shutdown` is treated
/// like a flush.
#[derive(Debug)]
pub struct GuardedStream<'g, S> {
    inner: S,
    guard: &'g WriteGuard,
}

impl<'g, S> GuardedStream<'g, S> {
    pub fn new(inner: S, guard: &'g WriteGuard) -> Self {
        Self { inner, guard }
    }

    pub fn is_blocked(&self) -> bool {
        self.guard.is_armed()
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for GuardedStream<'_, S> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        if this.guard.is_armed() {
            trace!(bytes = buf.len(), "suppressed body write");
            return Poll::Ready(Ok(buf.len()));
        }
        Pin::new(&mut this.inner).poll_write(cx, buf)
    }

    fn poll_write_vectored(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[IoSlice<'_>],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        if this.guard.is_armed() {
            let len = bufs.iter().map(|b| b.len()).sum::<usize>();
            trace!(bytes = len, "suppressed body write");
            return Poll::Ready(Ok(len));
        }
        Pin::new(&mut this.inner).poll_write_vectored(cx, bufs)
    }

    fn is_write_vectored(&self) -> bool {
        self.inner.is_write_vectored()
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.guard.is_armed() {
            trace!("suppressed body flush");
            return Poll::Ready(Ok(()));
        }
        Pin::new(&mut this.inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.guard.is_armed() {
            trace!("suppressed body shutdown");
            return Poll::Ready(Ok(()));
        }
        Pin::new(&mut this.inner).poll_shutdown(cx)
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for GuardedStream<'_, S> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_read(cx, buf)
    }
}

impl<S: AsyncSeek + Unpin> AsyncSeek for GuardedStream<'_, S> {
    fn start_seek(self: Pin<&mut Self>, position: SeekFrom) -> io::Result<()> {
        Pin::new(&mut self.get_mut().inner).start_seek(position)
    }

    fn poll_complete(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<u64>> {
        Pin::new(&mut self.get_mut().inner).poll_complete(cx)
    }
}

impl<S: io::Write> io::Write for GuardedStream<'_, S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.guard.is_armed() {
            trace!(bytes = buf.len(), "suppressed body write");
            return Ok(buf.len());
        }
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.guard.is_armed() {
            trace!("suppressed body flush");
            return Ok(());
        }
        self.inner.flush()
    }
}

impl<S: io::Read> io::Read for GuardedStream<'_, S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<S: io::Seek> io::Seek for GuardedStream<'_, S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}
