//! Binding Expression Evaluator
//!
//! Recognises `{{ content.path }}` and `{{ item.path }}` placeholders inside
//! string values and resolves them against the content object or the current
//! repeat item. Matching is a regex scan over a flat dotted-path grammar.
//!
//! Resolution is fail-soft: a missing path yields `None` (absent), never an
//! error.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde_json::{Map, Value};

lazy_static! {
    static ref BINDING_RE: Regex =
        Regex::new(r"\{\{\s*(content|item)\.(\$index|[a-zA-Z0-9_.]+)\s*\}\}").unwrap();
}

/// Synthetic item field holding the iteration index.
pub const INDEX_FIELD: &str = "$index";

// ═══════════════════════════════════════════════════════════════════════════════
// BINDING REFERENCES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingRoot {
    Content,
    Item,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BindingRef {
    pub root: BindingRoot,
    pub path: String,
}

fn binding_from_captures(caps: &Captures) -> BindingRef {
    let root = if &caps[1] == "item" {
        BindingRoot::Item
    } else {
        BindingRoot::Content
    };
    BindingRef {
        root,
        path: caps[2].to_string(),
    }
}

/// True if `text` contains at least one binding expression.
pub fn contains_binding(text: &str) -> bool {
    BINDING_RE.is_match(text)
}

/// Returns the binding when the trimmed string is exactly one expression.
pub fn exact_binding(text: &str) -> Option<BindingRef> {
    let trimmed = text.trim();
    let caps = BINDING_RE.captures(trimmed)?;
    let whole = caps.get(0)?;
    if whole.start() == 0 && whole.end() == trimmed.len() {
        Some(binding_from_captures(&caps))
    } else {
        None
    }
}

/// All binding references in `text`, in order of appearance.
pub fn extract_binding_refs(text: &str) -> Vec<BindingRef> {
    BINDING_RE
        .captures_iter(text)
        .map(|caps| binding_from_captures(&caps))
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCOPE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy)]
pub struct ItemFrame<'a> {
    pub item: &'a Value,
    pub index: usize,
}

/// Lookup context: the content root plus the innermost repeat item, if any.
#[derive(Debug, Clone, Copy)]
pub struct BindingScope<'a> {
    content: &'a Value,
    item: Option<ItemFrame<'a>>,
}

impl<'a> BindingScope<'a> {
    pub fn new(content: &'a Value) -> Self {
        BindingScope {
            content,
            item: None,
        }
    }

    /// Scope for one repeat iteration. Content bindings keep resolving
    /// against the same root.
    pub fn with_item<'b>(&self, item: &'b Value, index: usize) -> BindingScope<'b>
    where
        'a: 'b,
    {
        BindingScope {
            content: self.content,
            item: Some(ItemFrame { item, index }),
        }
    }

    pub fn content(&self) -> &'a Value {
        self.content
    }

    pub fn item(&self) -> Option<ItemFrame<'a>> {
        self.item
    }

    pub fn lookup(&self, binding: &BindingRef) -> Option<Value> {
        match binding.root {
            BindingRoot::Content => lookup_path(self.content, &binding.path).cloned(),
            BindingRoot::Item => {
                let frame = self.item?;
                if binding.path == INDEX_FIELD {
                    Some(Value::from(frame.index))
                } else {
                    lookup_path(frame.item, &binding.path).cloned()
                }
            }
        }
    }
}

/// Walks a dotted path. Numeric segments index into arrays.
pub fn lookup_path<'v>(root: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.').try_fold(root, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESOLUTION
// ═══════════════════════════════════════════════════════════════════════════════

/// Resolve the bindings inside one string.
///
/// An exact single expression yields the bound value with its type intact
/// (or `None` when the path is missing). Mixed text substitutes each match
/// inline and always yields a string. Text without bindings is returned as is.
pub fn resolve_string(text: &str, scope: &BindingScope) -> Option<Value> {
    if !text.contains("{{") {
        return Some(Value::String(text.to_string()));
    }
    if let Some(binding) = exact_binding(text) {
        return scope.lookup(&binding);
    }
    let replaced = BINDING_RE.replace_all(text, |caps: &Captures| {
        scope
            .lookup(&binding_from_captures(caps))
            .map(|value| inline_text(&value))
            .unwrap_or_default()
    });
    Some(Value::String(replaced.into_owned()))
}

/// Like [`resolve_string`] but always produces text, for string-typed slots
/// such as `className`.
pub fn resolve_text(text: &str, scope: &BindingScope) -> Option<String> {
    match resolve_string(text, scope)? {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => Some(inline_text(&other)),
    }
}

/// Resolve every binding in a JSON value. Absent object members are dropped,
/// absent array elements become `null` so positions are kept.
pub fn resolve_value(value: &Value, scope: &BindingScope) -> Option<Value> {
    match value {
        Value::String(text) => resolve_string(text, scope),
        Value::Array(items) => Some(Value::Array(
            items
                .iter()
                .map(|item| resolve_value(item, scope).unwrap_or(Value::Null))
                .collect(),
        )),
        Value::Object(map) => Some(Value::Object(resolve_map(map, scope))),
        other => Some(other.clone()),
    }
}

pub fn resolve_map(map: &Map<String, Value>, scope: &BindingScope) -> Map<String, Value> {
    map.iter()
        .filter_map(|(key, value)| resolve_value(value, scope).map(|v| (key.clone(), v)))
        .collect()
}

/// Text rendering used for inline substitution.
pub fn inline_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.iter().map(inline_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// JavaScript-style truthiness, used for repeat `condition` filters.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Evaluate a `condition` marker: strings go through binding resolution,
/// literals are tested directly.
pub fn evaluate_condition(condition: &Value, scope: &BindingScope) -> bool {
    match condition {
        Value::String(text) => is_truthy(resolve_string(text, scope).as_ref()),
        other => is_truthy(Some(other)),
    }
}
