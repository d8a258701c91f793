//! Response assertion compiler and reference runner
//!
//! A response path compiles into a flat list of instructions over numbered
//! cursors. Cursor `0` is the response root; every navigation binds a *new*
//! cursor, so later instructions refer to earlier results by number and
//! nothing is ever re-pointed in place.
//!
//! ```text
//! items[type="A"].price  expecting 1
//!
//!   $1 = $0.items
//!   $2 = $1[type="A"]        array: element with type == "A"
//!                            object: $1 itself if its type == "A"
//!   $3 = $2.price
//!   assert present $3
//!   assert type $3 is number
//!   assert $3 == 1
//! ```
//!
//! A path without filters compiles to navigate / assert type / assert value.

use crate::attribute::{AttrType, AttributeSpec, ElementType, Example};
use crate::path::{AttrPath, PathSegment};
use crate::value::{boolean_class, parse_number, typed_value_or_raw};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Cursor number; `0` is the response root
pub type Cursor = usize;

/// One static navigation step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Step {
    Key(String),
    Index(usize),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Key(key) => write!(f, ".{}", key),
            Step::Index(i) => write!(f, "[{}]", i),
        }
    }
}

/// A single navigation or assertion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Instruction {
    /// Bind `into` to the node reached by walking `steps` from `from`
    Navigate {
        from: Cursor,
        into: Cursor,
        steps: Vec<Step>,
    },
    /// Bind `into` to the element of array `from` whose `key` equals
    /// `value`, or to `from` itself when it is an object whose `key` equals
    /// `value`. Fails when neither shape matches.
    Select {
        from: Cursor,
        into: Cursor,
        key: String,
        value: String,
    },
    AssertPresent {
        cursor: Cursor,
    },
    AssertType {
        cursor: Cursor,
        #[serde(rename = "type")]
        ty: AttrType,
    },
    AssertEquals {
        cursor: Cursor,
        expected: Value,
    },
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Navigate { from, into, steps } => {
                write!(f, "${} = ${}", into, from)?;
                for step in steps {
                    write!(f, "{}", step)?;
                }
                Ok(())
            }
            Instruction::Select {
                from,
                into,
                key,
                value,
            } => write!(f, "${} = ${}[{}=\"{}\"]", into, from, key, value),
            Instruction::AssertPresent { cursor } => write!(f, "assert present ${}", cursor),
            Instruction::AssertType { cursor, ty } => {
                write!(f, "assert type ${} is {}", cursor, ty)
            }
            Instruction::AssertEquals { cursor, expected } => {
                write!(f, "assert ${} == {}", cursor, expected)
            }
        }
    }
}

/// Compile a response path into instructions.
///
/// `expected` of `None`, `null` or `""` skips the value assertion.
pub fn compile(path: &AttrPath, expected: Option<&Value>, check: AttrType) -> Vec<Instruction> {
    let mut out = Vec::new();
    let mut current: Cursor = 0;
    let mut pending: Vec<Step> = Vec::new();

    for segment in path.segments() {
        pending.push(Step::Key(segment.name.clone()));
        match segment {
            PathSegment {
                filter: Some(filter),
                ..
            } => {
                current = navigate(&mut out, current, std::mem::take(&mut pending));
                let into = current + 1;
                out.push(Instruction::Select {
                    from: current,
                    into,
                    key: filter.key.clone(),
                    value: filter.value.clone(),
                });
                current = into;
            }
            PathSegment { is_array: true, index, .. } => {
                pending.push(Step::Index(index.unwrap_or(0)));
            }
            _ => {}
        }
    }

    let filtered = path.has_filters();
    if !pending.is_empty() || !filtered {
        current = navigate(&mut out, current, pending);
    }
    if filtered {
        out.push(Instruction::AssertPresent { cursor: current });
    }
    out.push(Instruction::AssertType {
        cursor: current,
        ty: check,
    });
    if let Some(expected) = expected.filter(|v| !is_blank(v)) {
        out.push(Instruction::AssertEquals {
            cursor: current,
            expected: expected.clone(),
        });
    }
    out
}

fn navigate(out: &mut Vec<Instruction>, from: Cursor, steps: Vec<Step>) -> Cursor {
    let into = from + 1;
    out.push(Instruction::Navigate { from, into, steps });
    into
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Expected response value for an attribute.
///
/// `send` is the candidate actually placed in the request, if any. In order:
///
/// 1. `send` itself written as `value(expected)`;
/// 2. the expectation recorded for `send` in the attribute's example;
/// 3. `send` (or, without one, the example) parsed with the check type.
pub fn resolve_expected(attr: &AttributeSpec, send: Option<&Value>) -> Option<Value> {
    let check = attr.typ.check;
    let text = match send {
        Some(Value::String(text)) => text.trim(),
        Some(Value::Null) => return None,
        Some(other) => {
            return Some(match (other, check) {
                (Value::Array(_), AttrType::ArrayOf(_)) | (Value::Object(_), AttrType::Object) => {
                    other.clone()
                }
                _ => typed_value_or_raw(&other.to_string(), check),
            })
        }
        None => attr.example.canonical_send(),
    };
    if text.is_empty() {
        return None;
    }

    let inline = Example::parse(text);
    if let [part] = inline.parts() {
        if let Some(expected) = &part.expected {
            return Some(typed_value_or_raw(expected, check));
        }
    }

    if let Some(expected) = attr
        .example
        .expected_for(text)
        .or_else(|| expected_for_normalized(attr, text))
    {
        return Some(typed_value_or_raw(expected, check));
    }

    Some(typed_value_or_raw(text, check))
}

/// Example expectation whose send text means the same value as `text`.
///
/// Candidates carry normalized text (`1.50` becomes `1.5`, `Y` becomes
/// `true`), so an exact lookup misses them.
fn expected_for_normalized<'a>(attr: &'a AttributeSpec, text: &str) -> Option<&'a str> {
    let send = attr.typ.send;
    attr.example
        .parts()
        .iter()
        .filter(|part| same_value(send, &part.send, text))
        .find_map(|part| part.expected.as_deref())
}

fn same_value(ty: AttrType, a: &str, b: &str) -> bool {
    match ty {
        AttrType::Number => match (parse_number(a), parse_number(b)) {
            (Ok(x), Ok(y)) => x.as_f64() == y.as_f64(),
            _ => false,
        },
        AttrType::Boolean => boolean_class(a).is_some() && boolean_class(a) == boolean_class(b),
        _ => false,
    }
}

/// Compiled assertions for one attribute of one test vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AttributeAssertion {
    pub attribute: String,
    #[serde(rename = "responsePath")]
    pub response_path: String,
    pub instructions: Vec<Instruction>,
}

/// Compile the assertions for an attribute; `None` without a response path
pub fn compile_attribute(attr: &AttributeSpec, send: Option<&Value>) -> Option<AttributeAssertion> {
    let response_path = attr.response_path.as_ref()?;
    let expected = resolve_expected(attr, send);
    Some(AttributeAssertion {
        attribute: attr.path.to_string(),
        response_path: response_path.to_string(),
        instructions: compile(response_path, expected.as_ref(), attr.typ.check),
    })
}

/// Result of executing one instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Outcome {
    /// Rendered instruction
    pub instruction: String,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

/// Execute instructions against a response, one outcome per instruction.
///
/// Instructions that depend on a cursor an earlier instruction failed to
/// bind also fail.
pub fn run(instructions: &[Instruction], response: &Value) -> Vec<Outcome> {
    let mut cursors: Vec<Option<&Value>> = vec![Some(response)];
    instructions
        .iter()
        .map(|instruction| {
            let failure = execute(instruction, &mut cursors);
            Outcome {
                instruction: instruction.to_string(),
                passed: failure.is_none(),
                failure,
            }
        })
        .collect()
}

/// Did every outcome pass?
pub fn all_passed(outcomes: &[Outcome]) -> bool {
    outcomes.iter().all(|o| o.passed)
}

fn slot<'a>(cursors: &[Option<&'a Value>], id: Cursor) -> Option<&'a Value> {
    cursors.get(id).copied().flatten()
}

fn bind<'a>(cursors: &mut Vec<Option<&'a Value>>, id: Cursor, node: Option<&'a Value>) {
    if cursors.len() <= id {
        cursors.resize(id + 1, None);
    }
    cursors[id] = node;
}

fn execute<'a>(instruction: &Instruction, cursors: &mut Vec<Option<&'a Value>>) -> Option<String> {
    match instruction {
        Instruction::Navigate { from, into, steps } => {
            let Some(mut node) = slot(cursors, *from) else {
                bind(cursors, *into, None);
                return Some(format!("cursor ${} is unresolved", from));
            };
            for step in steps {
                let next = match step {
                    Step::Key(key) => node.get(key.as_str()),
                    Step::Index(i) => node.get(*i),
                };
                match next {
                    Some(n) => node = n,
                    None => {
                        bind(cursors, *into, None);
                        return Some(format!("'{}' not found", step));
                    }
                }
            }
            bind(cursors, *into, Some(node));
            None
        }
        Instruction::Select {
            from,
            into,
            key,
            value,
        } => {
            let Some(node) = slot(cursors, *from) else {
                bind(cursors, *into, None);
                return Some(format!("cursor ${} is unresolved", from));
            };
            let selected = match node {
                Value::Array(items) => items.iter().find(|item| field_equals(item, key, value)),
                Value::Object(_) if field_equals(node, key, value) => Some(node),
                _ => None,
            };
            bind(cursors, *into, selected);
            match selected {
                Some(_) => None,
                None => Some(format!("no element with {}=\"{}\"", key, value)),
            }
        }
        Instruction::AssertPresent { cursor } => match slot(cursors, *cursor) {
            Some(_) => None,
            None => Some(format!("${} is not present", cursor)),
        },
        Instruction::AssertType { cursor, ty } => match slot(cursors, *cursor) {
            Some(node) if type_matches(node, *ty) => None,
            Some(node) => Some(format!("expected {}, got {}", ty, node)),
            None => Some(format!("${} is not present", cursor)),
        },
        Instruction::AssertEquals { cursor, expected } => match slot(cursors, *cursor) {
            Some(node) if node == expected => None,
            Some(node) => Some(format!("expected {}, got {}", expected, node)),
            None => Some(format!("${} is not present", cursor)),
        },
    }
}

/// Filter equality: strings verbatim, numbers and booleans by JSON text
fn field_equals(node: &Value, key: &str, expected: &str) -> bool {
    match node.get(key) {
        Some(Value::String(s)) => s == expected,
        Some(v @ (Value::Number(_) | Value::Bool(_))) => v.to_string() == expected,
        _ => false,
    }
}

fn type_matches(node: &Value, ty: AttrType) -> bool {
    match ty {
        AttrType::String => node.is_string(),
        AttrType::Number => node.is_number(),
        AttrType::Boolean => node.is_boolean(),
        AttrType::Object => node.is_object(),
        AttrType::ArrayOf(element) => match node.as_array() {
            Some(items) => items.first().is_none_or(|first| match element {
                ElementType::Any => true,
                ElementType::String => first.is_string(),
                ElementType::Number => first.is_number(),
                ElementType::Object => first.is_object(),
            }),
            None => false,
        },
    }
}
