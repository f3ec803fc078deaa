use std::io::Write;
use std::path::Path;

use anyhow::Context;
use warpgrid_render::{
    BufferedResponse, ContentResult, MediaType, RenderConfig, TextEncoding,
};

pub fn content(
    text: &str,
    content_type: Option<&str>,
    status: Option<u16>,
    config: Option<&Path>,
    hex: bool,
) -> anyhow::Result<()> {
    let config = match config {
        Some(path) => RenderConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => RenderConfig::default(),
    };
    let response = render_content(text, content_type, status, &config)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(format_head(&response).as_bytes())?;
    if hex {
        writeln!(stdout, "{}", hex::encode(response.body().as_bytes()))?;
    } else {
        stdout.write_all(response.body().as_bytes())?;
    }
    stdout.flush()?;
    Ok(())
}

pub fn resolve(content_type: &str) -> anyhow::Result<()> {
    println!("{}", describe(content_type)?);
    Ok(())
}

fn render_content(
    text: &str,
    content_type: Option<&str>,
    status: Option<u16>,
    config: &RenderConfig,
) -> anyhow::Result<BufferedResponse> {
    let mut result = ContentResult::new(text);
    if let Some(ct) = content_type {
        result = result.with_content_type(MediaType::parse(ct)?);
    }
    result.status_code = status;

    let runtime = tokio::runtime::Builder::new_current_thread().build()?;
    let mut response = BufferedResponse::new();
    runtime.block_on(result.execute_with(&mut response, config))?;
    tracing::debug!(bytes = response.body().len(), "content rendered");
    Ok(response)
}

fn format_head(response: &BufferedResponse) -> String {
    format!(
        "HTTP {}\nContent-Type: {}\n\n",
        response.status(),
        response.content_type().unwrap_or("-"),
    )
}

fn describe(content_type: &str) -> anyhow::Result<String> {
    let declared = MediaType::parse(content_type)?;
    let resolved = warpgrid_render::resolve(Some(&declared), &MediaType::text_plain())?;
    Ok(format!(
        "Content-Type: {}\nencoding: {}",
        resolved.header(),
        resolved.encoding().name(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_plain_text() {
        let response = render_content("hi", None, None, &RenderConfig::default()).unwrap();
        assert_eq!(
            format_head(&response),
            "HTTP 200\nContent-Type: text/plain; charset=utf-8\n\n"
        );
        assert_eq!(response.body().as_bytes(), b"hi");
    }

    #[test]
    fn renders_declared_type_and_status() {
        let response = render_content(
            "x",
            Some("application/json; charset=utf-16"),
            Some(202),
            &RenderConfig::default(),
        )
        .unwrap();
        assert_eq!(response.status(), 202);
        assert_eq!(hex::encode(response.body().as_bytes()), "7800");
    }

    #[test]
    fn unknown_charset_fails() {
        let err = render_content(
            "x",
            Some("text/plain; charset=bogus-7"),
            None,
            &RenderConfig::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("bogus-7"));
    }

    #[test]
    fn config_file_sets_fallback() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "text_content_type = \"text/markdown\"").unwrap();
        let config = RenderConfig::from_file(file.path()).unwrap();

        let response = render_content("# hi", None, None, &config).unwrap();
        assert_eq!(response.content_type(), Some("text/markdown; charset=utf-8"));
    }

    #[test]
    fn describe_adds_default_charset() {
        assert_eq!(
            describe("application/json").unwrap(),
            "Content-Type: application/json; charset=utf-8\nencoding: utf-8"
        );
    }

    #[test]
    fn describe_keeps_declared_charset() {
        assert_eq!(
            describe("text/html; charset=utf-16be").unwrap(),
            "Content-Type: text/html; charset=utf-16be\nencoding: utf-16be"
        );
    }

    #[test]
    fn describe_rejects_invalid_media_type() {
        assert!(describe("not a type").is_err());
    }
}
