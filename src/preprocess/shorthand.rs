//! Coercion of author shorthand into node objects, and extraction of the
//! properties every node kind shares.

use crate::error::PreprocessError;
use docprep_idf::{NodeMetadata, Outline};
use docprep_types::{NodeId, TocId};
use serde_json::{Map, Number, Value};

pub(crate) type Object = Map<String, Value>;

/// Rewrites any accepted input into a node object. Rules are tried in order
/// and are mutually exclusive.
pub(crate) fn coerce(input: Value) -> Object {
    let mut obj = Object::new();
    match input {
        Value::Array(items) => {
            obj.insert("stack".into(), Value::Array(items));
        }
        Value::String(s) => {
            obj.insert("text".into(), Value::String(s));
        }
        Value::Number(n) => {
            obj.insert("text".into(), Value::String(number_text(&n)));
        }
        Value::Bool(b) => {
            obj.insert("text".into(), Value::String(b.to_string()));
        }
        Value::Null => {
            obj.insert("text".into(), Value::String(String::new()));
        }
        Value::Object(map) if map.is_empty() => {
            obj.insert("text".into(), Value::String(String::new()));
        }
        Value::Object(mut map) => {
            if map.get("text").is_some_and(Value::is_null) {
                map.insert("text".into(), Value::String(String::new()));
            }
            obj = map;
        }
    }
    obj
}

/// Truthiness as authors of document descriptions expect it: `null`,
/// `false`, `0` and `""` are absent; arrays and objects are present even
/// when empty.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub(crate) fn has_truthy(obj: &Object, key: &str) -> bool {
    obj.get(key).is_some_and(is_truthy)
}

/// Integral numbers print without a fractional part.
pub(crate) fn number_text(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// The text of a scalar value; `None` for null, arrays and objects.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_text(n)),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Removes `id` and `tocItem` from `obj`.
///
/// A falsy `id` (`""`, `0`, `false`, `null`) declares nothing and is
/// dropped. A truthy `id` that is neither a string nor a number is left in
/// place as an ordinary property. `tocItem`
/// accepts one id or a sequence of ids; entries that are not strings stand
/// for `default_toc`.
pub(crate) fn take_meta(obj: &mut Object, default_toc: &TocId) -> NodeMetadata {
    let mut meta = NodeMetadata::default();

    match obj.remove("id").filter(is_truthy) {
        Some(Value::String(s)) => meta.id = Some(NodeId::from(s)),
        Some(Value::Number(n)) => meta.id = Some(NodeId::from(number_text(&n))),
        None => {}
        Some(other) => {
            obj.insert("id".into(), other);
        }
    }

    if let Some(toc_item) = obj.remove("tocItem").filter(is_truthy) {
        let entries = match toc_item {
            Value::Array(entries) => entries,
            single => vec![single],
        };
        meta.toc_item = entries
            .into_iter()
            .map(|entry| match entry {
                Value::String(s) => TocId::from(s),
                _ => default_toc.clone(),
            })
            .collect();
    }

    meta
}

/// Removes and expands the `outline` declaration.
///
/// A bare number is the outline level; `true` means level 1. When the
/// declaration carries no `text`, the node's own scalar text is copied into
/// it. Rich text content is copied later, once normalized.
pub(crate) fn take_outline(obj: &mut Object) -> Result<Option<Outline>, PreprocessError> {
    let mut outline = match obj.remove("outline") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => return Ok(None),
        Some(Value::Bool(true)) => Outline {
            level: 1,
            text: None,
            props: Object::new(),
        },
        Some(level @ Value::Number(_)) => Outline {
            level: outline_level(&level)?,
            text: None,
            props: Object::new(),
        },
        Some(Value::Object(mut spec)) => {
            let level = match spec.remove("level") {
                Some(level) => outline_level(&level)?,
                None => 1,
            };
            let text = spec.remove("text").as_ref().and_then(scalar_text);
            Outline {
                level,
                text,
                props: spec,
            }
        }
        Some(other) => {
            return Err(PreprocessError::malformed(
                "outline",
                format!("expected a level or an object, got {}", other),
            ));
        }
    };

    if outline.text.is_none() {
        outline.text = obj.get("text").and_then(scalar_text);
    }
    Ok(Some(outline))
}

fn outline_level(value: &Value) -> Result<u32, PreprocessError> {
    value
        .as_u64()
        .and_then(|l| u32::try_from(l).ok())
        .ok_or_else(|| {
            PreprocessError::malformed(
                "outline",
                format!("level must be a non-negative integer, got {}", value),
            )
        })
}

/// Removes `key` and returns it as a child sequence.
pub(crate) fn take_sequence(
    obj: &mut Object,
    key: &str,
    kind: &'static str,
) -> Result<Vec<Value>, PreprocessError> {
    match obj.remove(key) {
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(PreprocessError::malformed(
            kind,
            format!("`{}` must be an array, got {}", key, other),
        )),
        None => Ok(Vec::new()),
    }
}
