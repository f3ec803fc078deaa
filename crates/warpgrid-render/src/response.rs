use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::AsyncWrite;

use crate::header::{CONTENT_TYPE, HeaderMap};

/// The response surface text rendering writes to.
///
/// Implemented by whatever the HTTP layer hands a handler. Rendering sets
/// the content type and, for raw content, the status before the first
/// body byte is written.
pub trait HttpResponse {
    type Body: AsyncWrite + Unpin + Send;

    fn set_content_type(&mut self, value: String);

    fn set_status(&mut self, status: u16);

    fn body_mut(&mut self) -> &mut Self::Body;
}

impl<R: HttpResponse + ?Sized> HttpResponse for &mut R {
    type Body = R::Body;

    fn set_content_type(&mut self, value: String) {
        (**self).set_content_type(value)
    }

    fn set_status(&mut self, status: u16) {
        (**self).set_status(status)
    }

    fn body_mut(&mut self) -> &mut Self::Body {
        (**self).body_mut()
    }
}

/// An in-memory response that collects its body.
///
/// Useful when the body has to be complete before it is handed to the
/// transport, and for observing exactly what reached the body stream.
#[derive(Debug, Clone)]
pub struct BufferedResponse {
    status: u16,
    headers: HeaderMap,
    body: ResponseBody,
}

impl BufferedResponse {
    /// A `200` response with no headers and an empty body.
    pub fn new() -> Self {
        Self {
            status: 200,
            headers: HeaderMap::new(),
            body: ResponseBody::default(),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE)
    }

    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body.bytes
    }
}

impl Default for BufferedResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpResponse for BufferedResponse {
    type Body = ResponseBody;

    fn set_content_type(&mut self, value: String) {
        self.headers.set(CONTENT_TYPE, value);
    }

    fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    fn body_mut(&mut self) -> &mut ResponseBody {
        &mut self.body
    }
}

/// Body sink of a [`BufferedResponse`].
///
/// Keeps every byte written plus counts of flushes and shutdowns.
#[derive(Debug, Clone, Default)]
pub struct ResponseBody {
    bytes: Vec<u8>,
    flushes: usize,
    shutdowns: usize,
}

impl ResponseBody {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdowns > 0
    }
}

impl AsyncWrite for ResponseBody {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.get_mut().bytes.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.get_mut().flushes += 1;
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.get_mut().shutdowns += 1;
        Poll::Ready(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncWriteExt;

    use super::*;

    #[test]
    fn defaults() {
        let resp = BufferedResponse::default();
        assert_eq!(resp.status(), 200);
        assert!(resp.headers().is_empty());
        assert_eq!(resp.content_type(), None);
        assert!(resp.body().is_empty());
    }

    #[test]
    fn content_type_is_replaced_not_appended() {
        let mut resp = BufferedResponse::new();
        resp.set_content_type("text/plain".to_string());
        resp.set_content_type("text/html; charset=utf-8".to_string());
        assert_eq!(resp.headers().len(), 1);
        assert_eq!(resp.content_type(), Some("text/html; charset=utf-8"));
    }

    #[tokio::test]
    async fn body_records_writes_and_flushes() {
        let mut resp = BufferedResponse::new();
        let body = resp.body_mut();
        body.write_all(b"hello ").await.unwrap();
        body.write_all(b"world").await.unwrap();
        body.flush().await.unwrap();
        body.shutdown().await.unwrap();

        assert_eq!(resp.body().as_bytes(), b"hello world");
        assert_eq!(resp.body().len(), 11);
        assert_eq!(resp.body().flush_count(), 1);
        assert!(resp.body().is_shut_down());
        assert_eq!(resp.into_body(), b"hello world");
    }

    #[test]
    fn mutable_references_are_responses() {
        fn mark<R: HttpResponse>(mut r: R) {
            r.set_status(418);
        }
        let mut resp = BufferedResponse::new();
        mark(&mut resp);
        assert_eq!(resp.status(), 418);
    }
}
