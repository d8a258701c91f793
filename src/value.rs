//! Typed values, defaults, and boundary-aware candidate sets
//!
//! Raw table text becomes JSON values here. Three entry points:
//!
//! - [`typed_value`] parses text according to a declared type and reports
//!   failures as errors; [`typed_value_or_raw`] is the "never abort" wrapper
//!   that logs the failure and passes the raw text through.
//! - [`default_value`] is the value used when a type has nothing better.
//! - [`candidates`] builds the ordered, distinct test values for one
//!   attribute, which the pairwise generator combines.
//!
//! Candidates are kept as *send text* (`Value::String`) for scalar types so
//! that they read exactly as the table does (`"10"`, `"true"`); structured
//! candidates (arrays) are already JSON. [`payload_value`] turns either kind
//! into the value placed in a request payload.

use crate::attribute::{AttrType, AttributeSpec, ElementType, split_values};
use crate::error::{Error, Result};
use serde_json::{json, Map, Number, Value};
use tracing::{debug, warn};

/// Options for candidate generation
#[derive(Debug, Clone)]
pub struct CandidateOptions {
    /// Character repeated to build length-boundary strings
    pub boundary_char: char,
    /// Collapse examples made only of `Y`/`N` into exactly `{"Y", "N"}`
    pub yes_no_override: bool,
}

impl Default for CandidateOptions {
    fn default() -> Self {
        Self {
            boundary_char: 'a',
            yes_no_override: true,
        }
    }
}

/// Default value for a type
pub fn default_value(ty: AttrType) -> Value {
    match ty {
        AttrType::Number => json!(0),
        AttrType::Boolean => json!(false),
        AttrType::Object => json!({}),
        AttrType::ArrayOf(ElementType::Object) => json!([{}]),
        AttrType::ArrayOf(ElementType::Number) => json!([0]),
        AttrType::ArrayOf(_) => json!([""]),
        AttrType::String => json!(""),
    }
}

/// Parse a number: text containing `.` is floating-point, otherwise integer
pub fn parse_number(raw: &str) -> Result<Number> {
    let raw = raw.trim();
    let err = || Error::ValueParse {
        raw: raw.to_string(),
        expected: "number".into(),
    };

    if raw.contains('.') {
        let f = raw.parse::<f64>().map_err(|_| err())?;
        Number::from_f64(f).ok_or_else(err)
    } else {
        raw.parse::<i64>().map(Number::from).map_err(|_| err())
    }
}

fn is_null_text(raw: &str) -> bool {
    raw.is_empty() || raw.eq_ignore_ascii_case("null")
}

/// Boolean meaning of example text: `true`/`1`/`y` or `false`/`0`/`n`
pub fn boolean_class(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "y" => Some(true),
        "false" | "0" | "n" => Some(false),
        _ => None,
    }
}

/// Parse raw text according to a type
pub fn typed_value(raw: &str, ty: AttrType) -> Result<Value> {
    let raw = raw.trim();
    if is_null_text(raw) {
        return Ok(default_value(ty));
    }

    match ty {
        AttrType::String => Ok(Value::String(raw.to_string())),
        AttrType::Number => {
            if raw.contains(';') {
                split_values(raw)
                    .iter()
                    .map(|v| parse_number(v).map(Value::Number))
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Array)
            } else {
                parse_number(raw).map(Value::Number)
            }
        }
        AttrType::Boolean => Ok(Value::Bool(matches!(
            raw.to_lowercase().as_str(),
            "true" | "1" | "y"
        ))),
        AttrType::Object => {
            let parsed = if raw.starts_with('{') && raw.ends_with('}') {
                serde_json::from_str::<Value>(raw).ok()
            } else {
                None
            };
            Ok(parsed.unwrap_or_else(|| wrap_value(raw)))
        }
        AttrType::ArrayOf(element) => {
            if raw.starts_with('[') && raw.ends_with(']') {
                if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(raw) {
                    return Ok(Value::Array(items));
                }
            }
            let parts = split_values(raw);
            let items = match element {
                ElementType::Object => parts.iter().map(|v| wrap_value(v)).collect(),
                ElementType::Number => parts
                    .iter()
                    .map(|v| parse_number(v).map(Value::Number))
                    .collect::<Result<Vec<_>>>()?,
                ElementType::String | ElementType::Any => {
                    parts.into_iter().map(Value::String).collect()
                }
            };
            Ok(Value::Array(items))
        }
    }
}

/// Parse raw text, falling back to the raw text itself on failure
pub fn typed_value_or_raw(raw: &str, ty: AttrType) -> Value {
    match typed_value(raw, ty) {
        Ok(v) => v,
        Err(e) => {
            warn!(%ty, "{}; passing raw text through", e);
            Value::String(raw.trim().to_string())
        }
    }
}

fn wrap_value(raw: &str) -> Value {
    let mut map = Map::new();
    map.insert("value".into(), Value::String(raw.to_string()));
    Value::Object(map)
}

/// Value placed in a payload for a candidate
pub fn payload_value(candidate: &Value, ty: AttrType) -> Value {
    match candidate {
        Value::String(text) => typed_value_or_raw(text, ty),
        other => other.clone(),
    }
}

/// Candidate values for an attribute with default options
pub fn candidates(attr: &AttributeSpec) -> Vec<Value> {
    candidates_with(attr, &CandidateOptions::default())
}

/// Candidate values for an attribute. Never empty.
pub fn candidates_with(attr: &AttributeSpec, opts: &CandidateOptions) -> Vec<Value> {
    let ty = attr.typ.send;
    let examples: Vec<&str> = attr.example.values().collect();
    // Explicit send(expected) pairs are exhaustive: no synthetic boundaries
    let boundaries = !attr.example.has_expectations();

    let mut values = Candidates::default();

    match ty {
        AttrType::String => {
            if opts.yes_no_override
                && !examples.is_empty()
                && examples.iter().all(|e| *e == "Y" || *e == "N")
            {
                return vec![json!("Y"), json!("N")];
            }
            for ex in &examples {
                values.push(json!(ex));
            }
            if let Some(n) = attr.max_length_value().filter(|_| boundaries) {
                values.push(json!(opts.boundary_char.to_string()));
                if n > 1 {
                    values.push(json!(boundary_string(opts.boundary_char, n)));
                }
            }
        }
        AttrType::Number => {
            for ex in &examples {
                match parse_number(ex) {
                    Ok(n) => values.push(json!(n.to_string())),
                    Err(e) => warn!(attribute = %attr.path, "skipping example: {}", e),
                }
            }
            if boundaries {
                for bound in [&attr.minimum, &attr.maximum].into_iter().flatten() {
                    match parse_number(bound) {
                        Ok(n) => values.push(json!(n.to_string())),
                        Err(e) => warn!(attribute = %attr.path, "skipping bound: {}", e),
                    }
                }
            }
        }
        AttrType::Boolean => {
            for ex in &examples {
                if let Some(b) = boolean_class(ex) {
                    values.push(json!(b.to_string()));
                }
            }
            values.push(json!("true"));
            values.push(json!("false"));
        }
        AttrType::Object => {
            if boundaries {
                if !attr.example.is_empty() {
                    values.push(json!(attr.example.raw()));
                }
            } else {
                for ex in &examples {
                    values.push(json!(ex));
                }
            }
        }
        AttrType::ArrayOf(element) => {
            if boundaries {
                if !attr.example.is_empty() {
                    values.push(typed_value_or_raw(attr.example.raw(), ty));
                }
            } else {
                for ex in &examples {
                    values.push(json!(ex));
                }
            }
            if element == ElementType::String {
                if let Some(n) = attr.max_length_value().filter(|_| boundaries) {
                    values.push(json!([opts.boundary_char.to_string()]));
                    if n > 1 {
                        values.push(json!([boundary_string(opts.boundary_char, n)]));
                    }
                }
            }
        }
    }

    if values.is_empty() {
        let fallback = default_value(ty);
        debug!(attribute = %attr.path, %fallback, "no candidates, using type default");
        values.push(fallback);
    }

    values.into_inner()
}

fn boundary_string(c: char, n: usize) -> String {
    std::iter::repeat_n(c, n).collect()
}

/// Ordered, duplicate-free candidate list
#[derive(Default)]
struct Candidates(Vec<Value>);

impl Candidates {
    fn push(&mut self, value: Value) {
        if !self.0.contains(&value) {
            self.0.push(value);
        }
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn into_inner(self) -> Vec<Value> {
        self.0
    }
}

/// Render a candidate for a human-readable summary.
///
/// Textual attributes are reported by length (`3`, `[1, 5]`).
pub fn describe_candidate(candidate: &Value, ty: AttrType) -> String {
    if ty.is_textual() {
        match candidate {
            Value::String(s) => return s.chars().count().to_string(),
            Value::Array(items) => {
                let lengths: Vec<String> = items
                    .iter()
                    .map(|i| match i {
                        Value::String(s) => s.chars().count().to_string(),
                        other => other.to_string().chars().count().to_string(),
                    })
                    .collect();
                return format!("[{}]", lengths.join(", "));
            }
            _ => {}
        }
    }
    match candidate {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn attr(ty: &str, example: &str) -> AttributeSpec {
        AttributeSpec::new("field", ty).unwrap().with_example(example)
    }

    #[test]
    fn test_defaults_by_type() {
        assert_eq!(default_value(AttrType::Number), json!(0));
        assert_eq!(default_value(AttrType::Boolean), json!(false));
        assert_eq!(default_value(AttrType::Object), json!({}));
        assert_eq!(default_value(AttrType::ArrayOf(ElementType::Object)), json!([{}]));
        assert_eq!(default_value(AttrType::ArrayOf(ElementType::Number)), json!([0]));
        assert_eq!(default_value(AttrType::ArrayOf(ElementType::Any)), json!([""]));
        assert_eq!(default_value(AttrType::String), json!(""));
    }

    #[test]
    fn test_typed_numbers() {
        assert_eq!(typed_value("10", AttrType::Number).unwrap(), json!(10));
        assert_eq!(typed_value("1.5", AttrType::Number).unwrap(), json!(1.5));
        assert_eq!(typed_value("1;2.5", AttrType::Number).unwrap(), json!([1, 2.5]));
        assert_eq!(typed_value("NULL", AttrType::Number).unwrap(), json!(0));
        assert!(typed_value("ten", AttrType::Number).is_err());
    }

    #[test]
    fn test_typed_or_raw_passes_text_through() {
        assert_eq!(typed_value_or_raw("ten", AttrType::Number), json!("ten"));
    }

    #[test]
    fn test_typed_booleans_never_reject() {
        assert_eq!(typed_value("Y", AttrType::Boolean).unwrap(), json!(true));
        assert_eq!(typed_value("1", AttrType::Boolean).unwrap(), json!(true));
        assert_eq!(typed_value("maybe", AttrType::Boolean).unwrap(), json!(false));
    }

    #[test]
    fn test_typed_objects() {
        assert_eq!(
            typed_value(r#"{"a": 1}"#, AttrType::Object).unwrap(),
            json!({"a": 1})
        );
        assert_eq!(
            typed_value("plain", AttrType::Object).unwrap(),
            json!({"value": "plain"})
        );
    }

    #[test]
    fn test_typed_arrays() {
        let any = AttrType::ArrayOf(ElementType::Any);
        assert_eq!(typed_value("[1, 2]", any).unwrap(), json!([1, 2]));
        assert_eq!(typed_value("a; b", any).unwrap(), json!(["a", "b"]));
        assert_eq!(
            typed_value("1;2", AttrType::ArrayOf(ElementType::Number)).unwrap(),
            json!([1, 2])
        );
        assert_eq!(
            typed_value("x;y", AttrType::ArrayOf(ElementType::Object)).unwrap(),
            json!([{"value": "x"}, {"value": "y"}])
        );
    }

    #[test]
    fn test_string_candidates_with_bounds() {
        let a = attr("string", "abc").with_max_length("5");
        assert_eq!(candidates(&a), vec![json!("abc"), json!("a"), json!("aaaaa")]);
    }

    #[test]
    fn test_numeric_candidates_with_bounds() {
        let a = attr("number", "10").with_minimum("0").with_maximum("99");
        assert_eq!(candidates(&a), vec![json!("10"), json!("0"), json!("99")]);
    }

    #[test]
    fn test_numeric_candidates_dedup_and_floats() {
        let a = attr("decimal", "1.50;2").with_minimum("2");
        assert_eq!(candidates(&a), vec![json!("1.5"), json!("2")]);
    }

    #[test]
    fn test_boolean_candidates() {
        assert_eq!(candidates(&attr("boolean", "")), vec![json!("true"), json!("false")]);
        assert_eq!(candidates(&attr("bool", "N")), vec![json!("false"), json!("true")]);
    }

    #[test]
    fn test_boolean_class() {
        assert_eq!(boolean_class(" Y "), Some(true));
        assert_eq!(boolean_class("0"), Some(false));
        assert_eq!(boolean_class("maybe"), None);
    }

    #[test]
    fn test_yes_no_override() {
        let a = attr("string", "Y").with_max_length("1");
        assert_eq!(candidates(&a), vec![json!("Y"), json!("N")]);

        let opts = CandidateOptions {
            yes_no_override: false,
            ..Default::default()
        };
        assert_eq!(candidates_with(&attr("string", "Y"), &opts), vec![json!("Y")]);
    }

    #[test]
    fn test_send_expected_pairs_suppress_boundaries() {
        let a = attr("string", "ivan(text1);volodya(text2)").with_max_length("10");
        assert_eq!(candidates(&a), vec![json!("ivan"), json!("volodya")]);
    }

    #[test]
    fn test_string_array_boundaries() {
        let a = attr("array[string]", "x;y").with_max_length("3");
        assert_eq!(
            candidates(&a),
            vec![json!(["x", "y"]), json!(["a"]), json!(["aaa"])]
        );
    }

    #[test]
    fn test_default_fallback() {
        assert_eq!(candidates(&attr("string", "")), vec![json!("")]);
        assert_eq!(candidates(&attr("integer", "")), vec![json!(0)]);
        assert_eq!(candidates(&attr("array[object]", "")), vec![json!([{}])]);
        assert_eq!(candidates(&attr("mystery", "")), vec![json!("")]);
    }

    #[test]
    fn test_payload_value() {
        assert_eq!(payload_value(&json!("10"), AttrType::Number), json!(10));
        assert_eq!(payload_value(&json!(["a"]), AttrType::ArrayOf(ElementType::String)), json!(["a"]));
    }

    #[test]
    fn test_describe_candidate_lengths() {
        let ty = AttrType::String;
        assert_eq!(describe_candidate(&json!("abc"), ty), "3");
        let arr = AttrType::ArrayOf(ElementType::String);
        assert_eq!(describe_candidate(&json!(["a", "bbb"]), arr), "[1, 3]");
        assert_eq!(describe_candidate(&json!("10"), AttrType::Number), "10");
    }
}
