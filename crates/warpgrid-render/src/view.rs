//! Rendering views into responses.
//!
//! View lookup and templating live elsewhere; a [`View`] here is anything
//! that can write itself to a [`TextWriter`] given some [`ViewData`].

use std::future::Future;

use serde_json::Value;

use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::media_type::MediaType;
use crate::render::TextRender;
use crate::response::HttpResponse;
use crate::writer::TextWriter;

/// Values handed to a view, keyed by name.
pub type ViewData = serde_json::Map<String, Value>;

/// What a view sees while it renders.
pub struct ViewContext<'a, 'w> {
    writer: &'a mut TextWriter<'w>,
    data: &'a ViewData,
}

impl<'a, 'w> ViewContext<'a, 'w> {
    pub fn new(writer: &'a mut TextWriter<'w>, data: &'a ViewData) -> Self {
        Self { writer, data }
    }

    pub fn writer(&mut self) -> &mut TextWriter<'w> {
        self.writer
    }

    pub fn data(&self) -> &ViewData {
        self.data
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}

/// A renderable view.
pub trait View {
    type Error;

    fn render(
        &self,
        ctx: &mut ViewContext<'_, '_>,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Renders views into responses as `text/html` unless told otherwise.
#[derive(Debug, Clone, Default)]
pub struct ViewExecutor {
    config: RenderConfig,
}

impl ViewExecutor {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render `view` into `response`.
    ///
    /// If the view fails, the body receives nothing beyond what was
    /// already written when the failure happened, and the view's error
    /// comes back as [`RenderError::Render`].
    ///
    /// # Errors
    ///
    /// See [`TextRender::run`].
    pub async fn execute<V, R>(
        &self,
        view: &V,
        data: &ViewData,
        response: &mut R,
        content_type: Option<&MediaType>,
    ) -> Result<(), RenderError<V::Error>>
    where
        V: View,
        R: HttpResponse + ?Sized,
    {
        self.execute_until(view, data, response, content_type, std::future::pending())
            .await
    }

    /// Like [`execute`](Self::execute), but gives up once `cancel` completes.
    ///
    /// # Errors
    ///
    /// See [`TextRender::run_until`].
    pub async fn execute_until<V, R, C>(
        &self,
        view: &V,
        data: &ViewData,
        response: &mut R,
        content_type: Option<&MediaType>,
        cancel: C,
    ) -> Result<(), RenderError<V::Error>>
    where
        V: View,
        R: HttpResponse + ?Sized,
        C: Future<Output = ()>,
    {
        TextRender::new(&self.config.view_content_type)
            .declared(content_type)
            .buffer_size(self.config.buffer_size)
            .run_until(response, cancel, async |writer| {
                let mut ctx = ViewContext::new(writer, data);
                view.render(&mut ctx).await
            })
            .await
    }
}
