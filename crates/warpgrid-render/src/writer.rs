//! Buffered text writer over an async byte sink.

use std::fmt::{self, Write as _};
use std::io;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::encoding::{Encoding, NoPreamble, TextEncoding};

/// Default writer buffer, in bytes of pending text.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Writes text to a byte sink in a fixed encoding.
///
/// Text accumulates in an internal buffer of at most `capacity` UTF-8
/// bytes. Longer input is split on character boundaries, so each write to
/// the sink carries at most one buffer's worth of encoded text. The buffer
/// is encoded and written out once it reaches its capacity, on [`flush`](Self::flush), and on
/// [`close`](Self::close). The encoding's preamble, if any, goes out ahead
/// of the first encoded byte.
///
/// The writer borrows the sink and never shuts it down. Dropping a writer
/// without calling `close` discards any buffered text.
pub struct TextWriter<'a, E = NoPreamble<Encoding>> {
    sink: &'a mut (dyn AsyncWrite + Unpin + Send + 'a),
    encoding: E,
    pending: String,
    capacity: usize,
    encoded: Vec<u8>,
    preamble_written: bool,
    bytes_written: u64,
}

impl<'a, E: TextEncoding> TextWriter<'a, E> {
    pub fn new(sink: &'a mut (dyn AsyncWrite + Unpin + Send + 'a), encoding: E) -> Self {
        Self::with_capacity(sink, encoding, DEFAULT_BUFFER_SIZE)
    }

    /// `capacity` is clamped to at least one byte.
    pub fn with_capacity(
        sink: &'a mut (dyn AsyncWrite + Unpin + Send + 'a),
        encoding: E,
        capacity: usize,
    ) -> Self {
        let capacity = capacity.max(1);
        Self {
            sink,
            encoding,
            pending: String::with_capacity(capacity),
            capacity,
            encoded: Vec::new(),
            preamble_written: false,
            bytes_written: 0,
        }
    }

    pub fn encoding(&self) -> &E {
        &self.encoding
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Text accepted but not yet encoded, in UTF-8 bytes.
    pub fn buffered_len(&self) -> usize {
        self.pending.len()
    }

    /// Encoded bytes handed to the sink so far, preamble included.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub async fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.push_str(text).await
    }

    pub async fn write_char(&mut self, c: char) -> io::Result<()> {
        self.push_str(c.encode_utf8(&mut [0; 4])).await
    }

    /// Write `text` followed by `\n`.
    pub async fn write_line(&mut self, text: &str) -> io::Result<()> {
        self.push_str(text).await?;
        self.push_str("\n").await
    }

    /// Write the `Display` form of `value`.
    pub async fn write_display(&mut self, value: impl fmt::Display) -> io::Result<()> {
        let mut text = String::new();
        write!(text, "{value}").map_err(|_| {
            io::Error::other("formatter error while writing value")
        })?;
        self.push_str(&text).await
    }

    /// Encode buffered text and flush the sink.
    pub async fn flush(&mut self) -> io::Result<()> {
        self.drain().await?;
        self.sink.flush().await
    }

    /// Release the writer, performing the final flush.
    ///
    /// Returns the total number of bytes handed to the sink.
    pub async fn close(mut self) -> io::Result<u64> {
        self.flush().await?;
        Ok(self.bytes_written)
    }

    /// Buffer `text` in pieces that never take `pending` past capacity,
    /// draining whenever it fills.
    async fn push_str(&mut self, mut text: &str) -> io::Result<()> {
        while !text.is_empty() {
            let room = self.capacity.saturating_sub(self.pending.len());
            let mut split = room.min(text.len());
            while !text.is_char_boundary(split) {
                split -= 1;
            }
            if split == 0 {
                if !self.pending.is_empty() {
                    self.drain().await?;
                    continue;
                }
                // A single char wider than the whole buffer.
                split = text.chars().next().map_or(text.len(), char::len_utf8);
            }
            let (head, tail) = text.split_at(split);
            self.pending.push_str(head);
            text = tail;
            if self.pending.len() >= self.capacity {
                self.drain().await?;
            }
        }
        Ok(())
    }

    async fn drain(&mut self) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        self.encoded.clear();
        if !self.preamble_written {
            self.encoded.extend_from_slice(self.encoding.preamble());
            self.preamble_written = true;
        }
        self.encoding.encode_into(&self.pending, &mut self.encoded);
        self.pending.clear();

        self.sink.write_all(&self.encoded).await?;
        self.bytes_written += self.encoded.len() as u64;
        Ok(())
    }
}

impl<E: TextEncoding> fmt::Debug for TextWriter<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextWriter")
            .field("encoding", &self.encoding.name())
            .field("capacity", &self.capacity)
            .field("buffered", &self.pending.len())
            .field("bytes_written", &self.bytes_written)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn buffers_until_flush() {
        let mut sink: Vec<u8> = Vec::new();
        let mut writer = TextWriter::new(&mut sink, NoPreamble::new(Encoding::UTF8));
        writer.write_str("hello").await.unwrap();
        assert_eq!(writer.buffered_len(), 5);
        assert_eq!(writer.bytes_written(), 0);
        writer.close().await.unwrap();
        assert_eq!(sink, b"hello");
    }

    #[tokio::test]
    async fn drains_when_capacity_reached() {
        let mut sink: Vec<u8> = Vec::new();
        let mut writer =
            TextWriter::with_capacity(&mut sink, NoPreamble::new(Encoding::UTF8), 4);
        writer.write_str("ab").await.unwrap();
        assert_eq!(writer.bytes_written(), 0);
        writer.write_str("cd").await.unwrap();
        assert_eq!(writer.bytes_written(), 4);
        assert_eq!(writer.buffered_len(), 0);
        writer.write_char('e').await.unwrap();
        writer.close().await.unwrap();
        assert_eq!(sink, b"abcde");
    }

    #[tokio::test]
    async fn preamble_precedes_first_bytes_only() {
        let mut sink: Vec<u8> = Vec::new();
        let mut writer = TextWriter::with_capacity(&mut sink, Encoding::UTF8, 1);
        writer.write_str("a").await.unwrap();
        writer.write_str("b").await.unwrap();
        assert_eq!(writer.bytes_written(), 5);
        writer.close().await.unwrap();
        assert_eq!(sink, [0xEF, 0xBB, 0xBF, b'a', b'b']);
    }

    #[tokio::test]
    async fn no_preamble_when_nothing_written() {
        let mut sink: Vec<u8> = Vec::new();
        let writer = TextWriter::new(&mut sink, Encoding::UTF16LE);
        writer.close().await.unwrap();
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn no_preamble_wrapper_suppresses_bom() {
        let mut sink: Vec<u8> = Vec::new();
        let mut writer = TextWriter::new(&mut sink, NoPreamble::new(Encoding::UTF16LE));
        writer.write_str("x").await.unwrap();
        assert_eq!(writer.close().await.unwrap(), 2);
        assert_eq!(sink, [0x78, 0x00]);
    }

    #[tokio::test]
    async fn line_and_display_helpers() {
        let mut sink: Vec<u8> = Vec::new();
        let mut writer = TextWriter::new(&mut sink, NoPreamble::new(Encoding::UTF8));
        writer.write_line("total:").await.unwrap();
        writer.write_display(42).await.unwrap();
        writer.close().await.unwrap();
        assert_eq!(sink, b"total:\n42");
    }

    #[tokio::test]
    async fn dropping_discards_buffered_text() {
        let mut sink: Vec<u8> = Vec::new();
        {
            let mut writer = TextWriter::new(&mut sink, NoPreamble::new(Encoding::UTF8));
            writer.write_str("lost").await.unwrap();
        }
        assert!(sink.is_empty());
    }

    /// Records the size of every write that reaches it.
    #[derive(Default)]
    struct SizeLog {
        bytes: Vec<u8>,
        writes: Vec<usize>,
    }

    impl AsyncWrite for SizeLog {
        fn poll_write(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            buf: &[u8],
        ) -> std::task::Poll<io::Result<usize>> {
            let this = self.get_mut();
            this.bytes.extend_from_slice(buf);
            this.writes.push(buf.len());
            std::task::Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }

        fn poll_shutdown(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn long_text_is_split_at_capacity() {
        let mut sink = SizeLog::default();
        let mut writer =
            TextWriter::with_capacity(&mut sink, NoPreamble::new(Encoding::UTF8), 8);
        writer.write_str(&"a".repeat(100)).await.unwrap();
        assert!(writer.buffered_len() <= 8);
        writer.close().await.unwrap();

        assert_eq!(sink.bytes, "a".repeat(100).into_bytes());
        assert!(sink.writes.iter().all(|&n| n <= 8), "{:?}", sink.writes);
        assert_eq!(sink.writes.len(), 13);
    }

    #[tokio::test]
    async fn split_respects_char_boundaries() {
        let mut sink = SizeLog::default();
        let mut writer =
            TextWriter::with_capacity(&mut sink, NoPreamble::new(Encoding::UTF8), 5);
        writer.write_str("ééé").await.unwrap();
        writer.write_str("日本").await.unwrap();
        writer.close().await.unwrap();

        assert_eq!(String::from_utf8(sink.bytes).unwrap(), "ééé日本");
        assert!(sink.writes.iter().all(|&n| n <= 5), "{:?}", sink.writes);
    }

    #[tokio::test]
    async fn char_wider_than_buffer_goes_out_alone() {
        let mut sink = SizeLog::default();
        let mut writer =
            TextWriter::with_capacity(&mut sink, NoPreamble::new(Encoding::UTF8), 2);
        writer.write_str("a日b").await.unwrap();
        writer.close().await.unwrap();

        assert_eq!(sink.bytes, "a日b".as_bytes());
        assert_eq!(sink.writes, vec![1, 3, 1]);
    }

    #[tokio::test]
    async fn partial_buffer_is_topped_up_before_draining() {
        let mut sink = SizeLog::default();
        let mut writer =
            TextWriter::with_capacity(&mut sink, NoPreamble::new(Encoding::UTF16LE), 4);
        writer.write_str("ab").await.unwrap();
        writer.write_line("cdef").await.unwrap();
        writer.close().await.unwrap();

        // "abcd" then "ef\n", two bytes per char.
        assert_eq!(sink.writes, vec![8, 6]);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut sink: Vec<u8> = Vec::new();
        let writer = TextWriter::with_capacity(&mut sink, Encoding::UTF8_NO_BOM, 0);
        assert_eq!(writer.capacity(), 1);
        assert_eq!(writer.encoding().name(), "utf-8");
    }
}
