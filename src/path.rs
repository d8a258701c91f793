//! Path grammar for dotted attribute paths with array markers and filters
//!
//! Two conventions share one grammar:
//!
//! - **Request paths** mark array fields with an index marker:
//!   `items[0].name` appends `name` to the current record of `items`.
//! - **Response paths** select one array element by equality:
//!   `items[type="A"].price` navigates to the element of `items` whose
//!   `type` field equals `A`.
//!
//! Bracket content without `=` is an index marker; anything else inside the
//! brackets is a filter. Only an unterminated bracket is an error.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Literal marker used by request paths for "this field is an array"
pub const ARRAY_MARKER: &str = "[0]";

/// Equality filter selecting one element of an array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub key: String,
    pub value: String,
}

/// One component of a dotted path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSegment {
    /// Field name (without the bracket suffix)
    pub name: String,
    /// Field holds an array
    pub is_array: bool,
    /// Explicit record index from `name[k]` (request side)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// Element selector from `name[key=value]` (response side)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
}

impl PathSegment {
    /// Plain object field
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_array: false,
            index: None,
            filter: None,
        }
    }

    /// Array field with an index marker
    pub fn array(name: impl Into<String>, index: Option<usize>) -> Self {
        Self {
            name: name.into(),
            is_array: true,
            index,
            filter: None,
        }
    }

    /// Array field with an equality filter
    pub fn filtered(
        name: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            is_array: true,
            index: None,
            filter: Some(Filter {
                key: key.into(),
                value: value.into(),
            }),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        match (&self.filter, self.is_array) {
            (Some(filter), _) => write!(f, "[{}=\"{}\"]", filter.key, filter.value),
            (None, true) => write!(f, "[{}]", self.index.unwrap_or(0)),
            (None, false) => Ok(()),
        }
    }
}

/// A parsed dotted path, keeping its source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AttrPath {
    text: String,
    segments: Vec<PathSegment>,
}

impl AttrPath {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(Self {
            text: text.trim().to_string(),
            segments: parse(text)?,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Last segment's field name, without any bracket suffix
    pub fn leaf_name(&self) -> &str {
        self.segments
            .last()
            .map(|s| s.name.as_str())
            .unwrap_or_default()
    }

    pub fn has_filters(&self) -> bool {
        self.segments.iter().any(|s| s.filter.is_some())
    }
}

impl fmt::Display for AttrPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl TryFrom<String> for AttrPath {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        AttrPath::parse(&value)
    }
}

impl From<AttrPath> for String {
    fn from(path: AttrPath) -> Self {
        path.text
    }
}

/// Parse a dotted path into its segments
pub fn parse(text: &str) -> Result<Vec<PathSegment>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    split_segments(text)?
        .into_iter()
        .map(|raw| parse_segment(text, raw))
        .collect()
}

/// Split on `.` outside of brackets and quotes
fn split_segments(text: &str) -> Result<Vec<&str>> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_bracket = false;
    let mut quote: Option<char> = None;

    for (i, c) in text.char_indices() {
        match (c, quote) {
            (q, Some(open)) if q == open => quote = None,
            (_, Some(_)) => {}
            ('"' | '\'', None) if in_bracket => quote = Some(c),
            ('[', None) => in_bracket = true,
            (']', None) => in_bracket = false,
            ('.', None) if !in_bracket => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    if in_bracket {
        return Err(Error::MalformedPath {
            path: text.to_string(),
            reason: "unterminated '['".into(),
        });
    }

    parts.push(&text[start..]);
    Ok(parts)
}

fn parse_segment(path: &str, raw: &str) -> Result<PathSegment> {
    let raw = raw.trim();
    let Some(open) = raw.find('[') else {
        return Ok(PathSegment::field(raw));
    };

    let name = raw[..open].trim();
    let close = find_closing(raw, open).ok_or_else(|| Error::MalformedPath {
        path: path.to_string(),
        reason: format!("unterminated '[' in segment '{}'", raw),
    })?;
    let content = raw[open + 1..close].trim();

    if let Some((key, value)) = split_filter(content) {
        return Ok(PathSegment::filtered(name, key.trim(), unquote(value.trim())));
    }

    // Plain marker; unknown content is tolerated as an index-less marker
    let index = content.parse::<usize>().ok();
    Ok(PathSegment::array(name, index))
}

fn find_closing(raw: &str, open: usize) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in raw[open + 1..].char_indices() {
        match (c, quote) {
            (q, Some(open_q)) if q == open_q => quote = None,
            (_, Some(_)) => {}
            ('"' | '\'', None) => quote = Some(c),
            (']', None) => return Some(open + 1 + i),
            _ => {}
        }
    }
    None
}

fn split_filter(content: &str) -> Option<(&str, &str)> {
    let mut quote: Option<char> = None;
    for (i, c) in content.char_indices() {
        match (c, quote) {
            (q, Some(open)) if q == open => quote = None,
            (_, Some(_)) => {}
            ('"' | '\'', None) => quote = Some(c),
            ('=', None) => {
                let value = content[i + 1..].trim_start_matches('=');
                return Some((&content[..i], value));
            }
            _ => {}
        }
    }
    None
}

fn unquote(value: &str) -> &str {
    for q in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(q) && value.ends_with(q) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
