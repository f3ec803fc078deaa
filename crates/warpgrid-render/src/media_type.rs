//! Media type values for the `Content-Type` header.
//!
//! Only the media-type grammar is handled here: `type/subtype` followed by
//! `; name=value` parameters. Syntax is validated with the `mime` crate;
//! the declared spelling and order of parameters are kept so that a
//! declared content type round-trips to the exact header the caller wrote.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MediaTypeError;

const CHARSET: &str = "charset";

/// A parsed media type such as `application/json; charset=utf-8`.
///
/// Values are immutable: operations that change parameters return a new
/// `MediaType` and leave the receiver untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MediaType {
    essence: String,
    params: Vec<Param>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Param {
    name: String,
    value: String,
    // Declared as a quoted-string; written back the same way.
    quoted: bool,
}

impl Param {
    fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

impl MediaType {
    /// Parse a media type, rejecting anything `mime` does not accept.
    pub fn parse(input: &str) -> Result<Self, MediaTypeError> {
        input
            .parse::<mime::Mime>()
            .map_err(|e| MediaTypeError::Invalid {
                input: input.to_string(),
                reason: e.to_string(),
            })?;

        let mut segments = split_params(input).into_iter();
        let essence = segments.next().unwrap_or_default().trim().to_string();

        let mut params = Vec::new();
        for segment in segments {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let (name, value) = segment
                .split_once('=')
                .ok_or_else(|| MediaTypeError::Invalid {
                    input: input.to_string(),
                    reason: format!("parameter `{segment}` has no value"),
                })?;
            let value = value.trim();
            params.push(Param {
                name: name.trim().to_string(),
                value: unquote(value),
                quoted: value.starts_with('"'),
            });
        }

        Ok(Self { essence, params })
    }

    /// `text/plain`, the fallback for raw content.
    pub fn text_plain() -> Self {
        Self::bare("text/plain")
    }

    /// `text/html`, the fallback for rendered views.
    pub fn text_html() -> Self {
        Self::bare("text/html")
    }

    fn bare(essence: &str) -> Self {
        Self {
            essence: essence.to_string(),
            params: Vec::new(),
        }
    }

    /// The `type/subtype` part without parameters.
    pub fn essence(&self) -> &str {
        &self.essence
    }

    pub fn type_(&self) -> &str {
        self.essence.split('/').next().unwrap_or_default()
    }

    pub fn subtype(&self) -> &str {
        self.essence.split_once('/').map(|(_, s)| s).unwrap_or_default()
    }

    /// Parameters in declaration order, unquoted.
    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|p| (p.name.as_str(), p.value.as_str()))
    }

    /// First parameter named `name` (case-insensitive).
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.is(name))
            .map(|p| p.value.as_str())
    }

    pub fn charset(&self) -> Option<&str> {
        self.param(CHARSET)
    }

    /// Copy of this media type with `charset` set to `charset`.
    ///
    /// An existing charset parameter is replaced in place; otherwise the
    /// charset becomes the first parameter, ahead of e.g. `boundary`.
    pub fn with_charset(&self, charset: &str) -> Self {
        let position = self.params.iter().position(|p| p.is(CHARSET));
        let mut params: Vec<_> = self
            .params
            .iter()
            .filter(|p| !p.is(CHARSET))
            .cloned()
            .collect();
        params.insert(
            position.unwrap_or(0),
            Param {
                name: CHARSET.to_string(),
                value: charset.to_string(),
                quoted: false,
            },
        );
        Self {
            essence: self.essence.clone(),
            params,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.essence)?;
        for Param {
            name,
            value,
            quoted,
        } in &self.params
        {
            if !quoted && is_token(value) {
                write!(f, "; {name}={value}")?;
            } else {
                write!(f, "; {name}=\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))?;
            }
        }
        Ok(())
    }
}

impl FromStr for MediaType {
    type Err = MediaTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MediaType {
    type Error = MediaTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MediaType> for String {
    fn from(value: MediaType) -> Self {
        value.to_string()
    }
}

/// Split on `;` outside of quoted strings.
fn split_params(input: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut escaped = false;
    for (i, c) in input.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            ';' if !quoted => {
                segments.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&input[start..]);
    segments
}

fn unquote(value: &str) -> String {
    let Some(inner) = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
    else {
        return value.to_string();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

// RFC 9110 token characters.
fn is_token(value: &str) -> bool {
    !value.is_empty()
        && value.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
        })
}
