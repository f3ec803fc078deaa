//! Raw string responses.

use crate::config::RenderConfig;
use crate::error::ContentError;
use crate::media_type::MediaType;
use crate::render::TextRender;
use crate::response::HttpResponse;

/// A literal string body with an optional content type and status code.
///
/// Without a declared content type the body goes out as
/// `text/plain; charset=utf-8`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentResult {
    pub content: Option<String>,
    pub content_type: Option<MediaType>,
    pub status_code: Option<u16>,
}

impl ContentResult {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn with_content_type(mut self, content_type: MediaType) -> Self {
        self.content_type = Some(content_type);
        self
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    /// Write this result into `response` using the default config.
    ///
    /// # Errors
    ///
    /// See [`execute_with`](Self::execute_with).
    pub async fn execute<R>(&self, response: &mut R) -> Result<(), ContentError>
    where
        R: HttpResponse + ?Sized,
    {
        self.execute_with(response, &RenderConfig::default()).await
    }

    /// Write this result into `response`.
    ///
    /// Sets the content type, then the status code if one was given, then
    /// writes the content if there is any.
    ///
    /// # Errors
    ///
    /// [`RenderError::UnsupportedEncoding`](crate::RenderError::UnsupportedEncoding)
    /// when the declared charset is unknown (the response is left as it
    /// was), [`RenderError::Io`](crate::RenderError::Io) when the body
    /// cannot be written.
    pub async fn execute_with<R>(
        &self,
        response: &mut R,
        config: &RenderConfig,
    ) -> Result<(), ContentError>
    where
        R: HttpResponse + ?Sized,
    {
        let content = self.content.as_deref();
        TextRender::new(&config.text_content_type)
            .declared(self.content_type.as_ref())
            .status(self.status_code)
            .buffer_size(config.buffer_size)
            .run(response, async |writer| {
                match content {
                    Some(text) => writer.write_str(text).await,
                    None => Ok(()),
                }
            })
            .await
            .map_err(|err| err.into_content_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::response::BufferedResponse;

    #[tokio::test]
    async fn plain_text_by_default() {
        let mut resp = BufferedResponse::new();
        ContentResult::new("hello").execute(&mut resp).await.unwrap();

        assert_eq!(resp.status(), 200);
        assert_eq!(resp.content_type(), Some("text/plain; charset=utf-8"));
        assert_eq!(resp.body().as_bytes(), b"hello");
    }

    #[tokio::test]
    async fn status_is_applied() {
        let mut resp = BufferedResponse::new();
        ContentResult::new("created")
            .with_status(201)
            .execute(&mut resp)
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
    }

    #[tokio::test]
    async fn missing_content_writes_headers_only() {
        let mut resp = BufferedResponse::new();
        let result = ContentResult {
            status_code: Some(204),
            ..ContentResult::default()
        };
        result.execute(&mut resp).await.unwrap();

        assert_eq!(resp.status(), 204);
        assert_eq!(resp.content_type(), Some("text/plain; charset=utf-8"));
        assert!(resp.body().is_empty());
    }

    #[tokio::test]
    async fn declared_type_without_charset_is_not_mutated() {
        let declared = MediaType::parse("application/json").unwrap();
        let result = ContentResult::new("{}").with_content_type(declared.clone());

        let mut resp = BufferedResponse::new();
        result.execute(&mut resp).await.unwrap();

        assert_eq!(resp.content_type(), Some("application/json; charset=utf-8"));
        assert_eq!(result.content_type, Some(declared));
    }

    #[tokio::test]
    async fn unknown_charset_leaves_response_untouched() {
        let result = ContentResult::new("x")
            .with_content_type(MediaType::parse("text/plain; charset=bogus-7").unwrap())
            .with_status(500);

        let mut resp = BufferedResponse::new();
        let err = result.execute(&mut resp).await.unwrap_err();

        assert!(matches!(err, RenderError::UnsupportedEncoding(_)));
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.content_type(), None);
        assert!(resp.body().is_empty());
    }

    #[tokio::test]
    async fn config_fallback_is_used() {
        let config = RenderConfig {
            text_content_type: MediaType::parse("text/markdown").unwrap(),
            ..RenderConfig::default()
        };
        let mut resp = BufferedResponse::new();
        ContentResult::new("# hi")
            .execute_with(&mut resp, &config)
            .await
            .unwrap();
        assert_eq!(resp.content_type(), Some("text/markdown; charset=utf-8"));
    }
}
