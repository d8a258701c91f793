//! Path tree builder: fold flat attribute paths into a nested payload
//!
//! Attributes are processed in input order. Object segments create objects,
//! array segments create arrays, and a non-final array segment descends into
//! the array's current record:
//!
//! ```text
//! items[0].name  = "A"   ─┐
//! items[0].price = 1     ─┴─►  {"items": [{"name": "A", "price": 1}]}
//! ```
//!
//! `items[0]` (or any index-less marker) means "the current record": the
//! last element, created when the array is empty. `items[k]` with `k >= 1`
//! addresses record `k` directly, so several records can be described by one
//! flat list. An index past the next free record appends one record instead
//! of padding the gap.
//!
//! Empty values (`null`, `""`) contribute nothing, which is how optional
//! fields drop out of a payload. Leaves are last-write-wins.

use crate::attribute::AttributeSpec;
use crate::error::{Error, Result};
use crate::path::{AttrPath, PathSegment, ARRAY_MARKER};
use serde_json::{Map, Value};
use tracing::warn;

/// Build a payload tree from `(path, value)` entries
pub fn build_from_entries<'a, I>(entries: I) -> Result<Value>
where
    I: IntoIterator<Item = (&'a AttrPath, Value)>,
{
    let mut root = Map::new();
    for (path, value) in entries {
        if is_empty_value(&value) {
            continue;
        }
        insert_at(&mut root, path.segments(), value, path)?;
    }

    let mut tree = Value::Object(root);
    normalize_array_keys(&mut tree);
    Ok(tree)
}

/// Build the payload over all attributes; `values` is aligned with `attributes`
pub fn build(attributes: &[AttributeSpec], values: &[Value]) -> Result<Value> {
    check_arity(attributes, values)?;
    build_from_entries(
        attributes
            .iter()
            .zip(values)
            .map(|(attr, value)| (&attr.path, value.clone())),
    )
}

/// Build the minimal payload: required attributes only
pub fn build_required(attributes: &[AttributeSpec], values: &[Value]) -> Result<Value> {
    check_arity(attributes, values)?;
    build_from_entries(
        attributes
            .iter()
            .zip(values)
            .filter(|(attr, _)| attr.required)
            .map(|(attr, value)| (&attr.path, value.clone())),
    )
}

fn check_arity(attributes: &[AttributeSpec], values: &[Value]) -> Result<()> {
    if attributes.len() != values.len() {
        return Err(Error::VectorArity {
            expected: attributes.len(),
            actual: values.len(),
        });
    }
    Ok(())
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn insert_at(
    node: &mut Map<String, Value>,
    segments: &[PathSegment],
    value: Value,
    path: &AttrPath,
) -> Result<()> {
    let Some((seg, rest)) = segments.split_first() else {
        return Ok(());
    };
    let mismatch = || Error::TypeMismatch {
        path: path.to_string(),
        segment: seg.to_string(),
    };

    if rest.is_empty() {
        if seg.is_array {
            let slot = node
                .entry(seg.name.clone())
                .or_insert_with(|| Value::Array(Vec::new()));
            let items = slot.as_array_mut().ok_or_else(mismatch)?;
            match value {
                Value::Array(values) => items.extend(values),
                scalar => items.push(scalar),
            }
        } else {
            node.insert(seg.name.clone(), value);
        }
        return Ok(());
    }

    let child = if seg.is_array {
        let slot = node
            .entry(seg.name.clone())
            .or_insert_with(|| Value::Array(Vec::new()));
        let items = slot.as_array_mut().ok_or_else(mismatch)?;
        let index = match seg.index {
            Some(k) if k > items.len() => {
                warn!(%path, index = k, records = items.len(), "record index skips records; appending one");
                items.len()
            }
            Some(k) if k > 0 => k,
            _ => items.len().saturating_sub(1),
        };
        while items.len() <= index {
            items.push(Value::Object(Map::new()));
        }
        &mut items[index]
    } else {
        node.entry(seg.name.clone())
            .or_insert_with(|| Value::Object(Map::new()))
    };

    let child = child.as_object_mut().ok_or_else(mismatch)?;
    insert_at(child, rest, value, path)
}

/// Hoist keys that still carry the literal `[0]` marker into arrays.
///
/// `{"tags[0]": "x"}` becomes `{"tags": ["x"]}`. Recurses into every nested
/// object and array.
pub fn normalize_array_keys(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let marked: Vec<String> = map
                .keys()
                .filter(|k| k.ends_with(ARRAY_MARKER))
                .cloned()
                .collect();

            for key in marked {
                let Some(item) = map.shift_remove(&key) else {
                    continue;
                };
                let name = key.trim_end_matches(ARRAY_MARKER).to_string();
                match map.get_mut(&name) {
                    Some(Value::Array(items)) => items.push(item),
                    Some(_) => {
                        warn!(key = %name, "replacing scalar with hoisted array");
                        map.insert(name, Value::Array(vec![item]));
                    }
                    None => {
                        map.insert(name, Value::Array(vec![item]));
                    }
                }
            }

            for child in map.values_mut() {
                normalize_array_keys(child);
            }
        }
        Value::Array(items) => {
            for item in items {
                normalize_array_keys(item);
            }
        }
        _ => {}
    }
}
