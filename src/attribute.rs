//! Attribute model: one normalized row of an attribute table
//!
//! An `AttributeSpec` is a schema leaf: a unique request path, a declared type
//! (optionally split into a send type and a check type), a required flag, the
//! raw example text, optional bounds and an optional response path.
//!
//! ## Type text
//!
//! ```text
//! string               -> send String, check String
//! integer/string       -> send Number, check String
//! array[object]        -> ArrayOf(Object)
//! ""                   -> String (untyped)
//! ```
//!
//! ## Example text
//!
//! ```text
//! abc                  -> one value
//! 1;2;3                -> three values
//! ivan(text1);volodya(text2)
//!                      -> send "ivan" expecting "text1", send "volodya" expecting "text2"
//! ```

use crate::error::{Error, Result};
use crate::path::AttrPath;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

const NUMERIC_KEYWORDS: [&str; 6] = ["number", "integer", "int", "float", "double", "decimal"];

/// Element type of an array attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// Untyped elements (kept as strings)
    Any,
    String,
    Number,
    Object,
}

/// Closed type descriptor, parsed once from the raw type text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AttrType {
    #[default]
    String,
    Number,
    Boolean,
    Object,
    #[serde(rename = "array")]
    ArrayOf(ElementType),
}

impl AttrType {
    /// Classify a type keyword string.
    ///
    /// Precedence: array, string/text, numeric, boolean, object.
    /// Anything unrecognized is a string.
    pub fn classify(text: &str) -> Self {
        let t = text.trim().to_lowercase();

        if t.contains("array") {
            let element = if t.contains("object") {
                ElementType::Object
            } else if NUMERIC_KEYWORDS.iter().any(|k| t.contains(k)) {
                ElementType::Number
            } else if t.contains("string") || t.contains("text") {
                ElementType::String
            } else {
                ElementType::Any
            };
            return AttrType::ArrayOf(element);
        }

        if t.contains("string") || t.contains("text") {
            AttrType::String
        } else if NUMERIC_KEYWORDS.iter().any(|k| t.contains(k)) {
            AttrType::Number
        } else if t.contains("bool") {
            AttrType::Boolean
        } else if t.contains("object") {
            AttrType::Object
        } else {
            AttrType::String
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, AttrType::ArrayOf(_))
    }

    /// String scalars and string arrays (reported by length in summaries)
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            AttrType::String | AttrType::ArrayOf(ElementType::String)
        )
    }
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrType::String => write!(f, "string"),
            AttrType::Number => write!(f, "number"),
            AttrType::Boolean => write!(f, "boolean"),
            AttrType::Object => write!(f, "object"),
            AttrType::ArrayOf(ElementType::Any) => write!(f, "array"),
            AttrType::ArrayOf(ElementType::String) => write!(f, "array[string]"),
            AttrType::ArrayOf(ElementType::Number) => write!(f, "array[number]"),
            AttrType::ArrayOf(ElementType::Object) => write!(f, "array[object]"),
        }
    }
}

/// Declared type: the type used to send and the type used to check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TypePair {
    text: String,
    pub send: AttrType,
    pub check: AttrType,
}

impl TypePair {
    /// Parse `sendType/checkType` or a single type used for both
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let (send, check) = match text.split_once('/') {
            Some((send, check)) => (AttrType::classify(send), AttrType::classify(check)),
            None => {
                let t = AttrType::classify(text);
                (t, t)
            }
        };
        Self {
            text: text.to_string(),
            send,
            check,
        }
    }

    /// Original type text as written in the table
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl From<String> for TypePair {
    fn from(value: String) -> Self {
        TypePair::parse(&value)
    }
}

impl From<TypePair> for String {
    fn from(pair: TypePair) -> Self {
        pair.text
    }
}

/// One `;`-separated part of an example
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamplePart {
    pub send: String,
    pub expected: Option<String>,
}

/// Raw example text with its `send(expected)` decomposition
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Example {
    raw: String,
    parts: Vec<ExamplePart>,
}

fn pair_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // send text, then a trailing parenthesized expectation
        Regex::new(r"^(?s)(.+?)\s*\((.*)\)$").expect("send(expected) pattern is valid")
    })
}

/// Split `a;b;c` into trimmed parts; no `;` means a single part
pub fn split_values(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    if text.contains(';') {
        text.split(';').map(|s| s.trim().to_string()).collect()
    } else {
        vec![text.to_string()]
    }
}

impl Example {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let structured = raw.starts_with('[') || raw.starts_with('{');

        let parts = split_values(raw)
            .into_iter()
            .map(|part| {
                let pair = if structured {
                    None
                } else {
                    pair_pattern()
                        .captures(&part)
                        .map(|c| (c[1].trim().to_string(), c[2].trim().to_string()))
                };
                match pair {
                    Some((send, expected)) => ExamplePart {
                        send,
                        expected: Some(expected),
                    },
                    None => ExamplePart {
                        send: part,
                        expected: None,
                    },
                }
            })
            .collect();

        Self {
            raw: raw.to_string(),
            parts,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn parts(&self) -> &[ExamplePart] {
        &self.parts
    }

    /// Non-empty send values in order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.parts
            .iter()
            .map(|p| p.send.as_str())
            .filter(|s| !s.is_empty())
    }

    /// At least one part carries a `(expected)` annotation
    pub fn has_expectations(&self) -> bool {
        self.parts.iter().any(|p| p.expected.is_some())
    }

    /// Expected response value recorded for a send value
    pub fn expected_for(&self, send: &str) -> Option<&str> {
        self.parts
            .iter()
            .find(|p| p.send == send)
            .and_then(|p| p.expected.as_deref())
    }

    /// Text to send when one canonical value is needed.
    ///
    /// With `send(expected)` pairs this is the first send value; otherwise
    /// the whole raw text (which may encode a `;` list).
    pub fn canonical_send(&self) -> &str {
        if self.has_expectations() {
            self.values().next().unwrap_or_default()
        } else {
            &self.raw
        }
    }
}

impl From<String> for Example {
    fn from(value: String) -> Self {
        Example::parse(&value)
    }
}

impl From<Example> for String {
    fn from(example: Example) -> Self {
        example.raw
    }
}

/// One schema leaf
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeSpec {
    /// Request path, unique per sheet
    pub path: AttrPath,

    #[serde(rename = "type")]
    pub typ: TypePair,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub example: Example,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<String>,

    #[serde(default, rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<String>,

    /// Path into the response body; absent means no assertions
    #[serde(default, rename = "responsePath", skip_serializing_if = "Option::is_none")]
    pub response_path: Option<AttrPath>,
}

impl AttributeSpec {
    /// Create an optional attribute with an empty example
    pub fn new(path: &str, type_text: &str) -> Result<Self> {
        Ok(Self {
            path: AttrPath::parse(path)?,
            typ: TypePair::parse(type_text),
            required: false,
            example: Example::default(),
            minimum: None,
            maximum: None,
            max_length: None,
            response_path: None,
        })
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_example(mut self, example: &str) -> Self {
        self.example = Example::parse(example);
        self
    }

    pub fn with_minimum(mut self, minimum: &str) -> Self {
        self.minimum = non_empty(minimum);
        self
    }

    pub fn with_maximum(mut self, maximum: &str) -> Self {
        self.maximum = non_empty(maximum);
        self
    }

    pub fn with_max_length(mut self, max_length: &str) -> Self {
        self.max_length = non_empty(max_length);
        self
    }

    pub fn with_response_path(mut self, response_path: &str) -> Result<Self> {
        self.response_path = match response_path.trim() {
            "" => None,
            p => Some(AttrPath::parse(p)?),
        };
        Ok(self)
    }

    /// Leaf field name, e.g. `price` for `items[0].price`
    pub fn name(&self) -> &str {
        self.path.leaf_name()
    }

    /// Parsed `maxLength`; unparseable text is ignored
    pub fn max_length_value(&self) -> Option<usize> {
        let raw = self.max_length.as_deref()?;
        match parse_length(raw) {
            Ok(n) => Some(n),
            Err(e) => {
                tracing::warn!(attribute = %self.path, "ignoring maxLength: {}", e);
                None
            }
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn parse_length(raw: &str) -> Result<usize> {
    let raw = raw.trim();
    // Spreadsheet cells often render integers as "10.0"
    let digits = raw.strip_suffix(".0").unwrap_or(raw);
    digits.parse::<usize>().map_err(|_| Error::ValueParse {
        raw: raw.to_string(),
        expected: "length".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_precedence() {
        assert_eq!(AttrType::classify("String"), AttrType::String);
        assert_eq!(AttrType::classify("integer"), AttrType::Number);
        assert_eq!(AttrType::classify("Decimal(10,2)"), AttrType::Number);
        assert_eq!(AttrType::classify("bool"), AttrType::Boolean);
        assert_eq!(AttrType::classify("object"), AttrType::Object);
        assert_eq!(AttrType::classify(""), AttrType::String);
        assert_eq!(AttrType::classify("uuid"), AttrType::String);
        assert_eq!(
            AttrType::classify("array[object]"),
            AttrType::ArrayOf(ElementType::Object)
        );
        assert_eq!(
            AttrType::classify("array numbers"),
            AttrType::ArrayOf(ElementType::Number)
        );
        assert_eq!(AttrType::classify("array"), AttrType::ArrayOf(ElementType::Any));
    }

    #[test]
    fn test_type_pair_split() {
        let pair = TypePair::parse("integer/string");
        assert_eq!(pair.send, AttrType::Number);
        assert_eq!(pair.check, AttrType::String);
        assert_eq!(pair.as_str(), "integer/string");

        let single = TypePair::parse("boolean");
        assert_eq!(single.send, single.check);
    }

    #[test]
    fn test_example_pairs() {
        let ex = Example::parse("ivan(text1);volodya(text2)");
        assert!(ex.has_expectations());
        assert_eq!(ex.values().collect::<Vec<_>>(), vec!["ivan", "volodya"]);
        assert_eq!(ex.expected_for("ivan"), Some("text1"));
        assert_eq!(ex.expected_for("volodya"), Some("text2"));
        assert_eq!(ex.canonical_send(), "ivan");
    }

    #[test]
    fn test_example_plain_list() {
        let ex = Example::parse("1; 2 ;3");
        assert!(!ex.has_expectations());
        assert_eq!(ex.values().collect::<Vec<_>>(), vec!["1", "2", "3"]);
        assert_eq!(ex.canonical_send(), "1; 2 ;3");
    }

    #[test]
    fn test_example_json_not_split_into_pairs() {
        let ex = Example::parse(r#"{"a": "f(x)"}"#);
        assert!(!ex.has_expectations());
    }

    #[test]
    fn test_attribute_builder() {
        let attr = AttributeSpec::new("items[0].name", "string")
            .unwrap()
            .with_required(true)
            .with_example("abc")
            .with_max_length("5")
            .with_response_path("data.items[0].name")
            .unwrap();
        assert_eq!(attr.name(), "name");
        assert_eq!(attr.max_length_value(), Some(5));
        assert!(attr.response_path.is_some());
    }

    #[test]
    fn test_bad_max_length_ignored() {
        let attr = AttributeSpec::new("a", "string")
            .unwrap()
            .with_max_length("ten");
        assert_eq!(attr.max_length_value(), None);
    }

    #[test]
    fn test_attribute_deserializes_from_yaml() {
        let yaml = r#"
path: order.total
type: number/string
required: true
example: "10"
minimum: "0"
responsePath: result.total
"#;
        let attr: AttributeSpec = serde_norway::from_str(yaml).unwrap();
        assert_eq!(attr.typ.send, AttrType::Number);
        assert_eq!(attr.typ.check, AttrType::String);
        assert_eq!(attr.minimum.as_deref(), Some("0"));
        assert_eq!(attr.response_path.unwrap().as_str(), "result.total");
    }
}
