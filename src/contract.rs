//! Content Contract Aggregator
//!
//! Section and chrome patterns declare their content fields with paths
//! relative to their own namespace. The aggregator mounts every declaration
//! and produces one flat contract with absolute paths, rejecting two
//! declarations that write the same content slot.
//!
//! The contract also drives the CMS side: hidden-field overrides, default
//! content seeding, content validation and contract diffs.

#[cfg(feature = "napi")]
use napi_derive::napi;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

use crate::binding::lookup_path;
use crate::error::ContractError;

// ═══════════════════════════════════════════════════════════════════════════════
// CONTRACT TYPES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    Text,
    Textarea,
    Richtext,
    Image,
    Video,
    Url,
    Color,
    Number,
    Toggle,
    Select,
    StringList,
    Collection,
    #[serde(other)]
    Unknown,
}

impl FieldType {
    /// Whether a content value has the shape this field type expects.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldType::Text
            | FieldType::Textarea
            | FieldType::Richtext
            | FieldType::Url
            | FieldType::Color => value.is_string(),
            // media accepts a bare URL or a `{ src, alt }` object
            FieldType::Image | FieldType::Video => value.is_string() || value.is_object(),
            FieldType::Number => value.is_number(),
            FieldType::Toggle => value.is_boolean(),
            FieldType::Select => value.is_string() || value.is_number(),
            FieldType::StringList => value
                .as_array()
                .map(|items| items.iter().all(Value::is_string))
                .unwrap_or(false),
            FieldType::Collection => value.is_array(),
            FieldType::Unknown => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSourceField {
    pub path: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    /// Choices for `select` fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<Value>>,
    /// Per-item fields of a `collection`, relative to one array element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_fields: Option<Vec<ContentSourceField>>,
    /// Owning section, filled in by the aggregator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

impl ContentSourceField {
    pub fn new(path: &str, field_type: FieldType, label: &str) -> Self {
        ContentSourceField {
            path: path.to_string(),
            field_type,
            label: label.to_string(),
            description: None,
            placeholder: None,
            required: None,
            default: None,
            hidden: None,
            options: None,
            item_fields: None,
            section: None,
        }
    }

    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden.unwrap_or(false)
    }

    pub fn item_fields(&self) -> &[ContentSourceField] {
        self.item_fields.as_deref().unwrap_or(&[])
    }
}

/// Fields declared by one section or chrome pattern, with relative paths.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionContentDeclaration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub content_fields: Vec<ContentSourceField>,
}

/// A declaration mounted under a content namespace. An empty namespace
/// mounts the fields at the content root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentMount {
    #[serde(default)]
    pub namespace: String,
    pub declaration: SectionContentDeclaration,
}

impl ContentMount {
    pub fn new(namespace: &str, declaration: SectionContentDeclaration) -> Self {
        ContentMount {
            namespace: namespace.to_string(),
            declaration,
        }
    }

    fn section_id(&self) -> String {
        if !self.namespace.is_empty() {
            self.namespace.clone()
        } else {
            self.declaration
                .id
                .clone()
                .unwrap_or_else(|| "site".to_string())
        }
    }

    fn absolute_path(&self, relative: &str) -> String {
        if self.namespace.is_empty() {
            relative.to_string()
        } else {
            format!("{}.{}", self.namespace, relative)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractSection {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentContract {
    #[serde(default)]
    pub sections: Vec<ContractSection>,
    #[serde(default)]
    pub source_fields: Vec<ContentSourceField>,
}

impl ContentContract {
    pub fn field(&self, path: &str) -> Option<&ContentSourceField> {
        self.source_fields.iter().find(|field| field.path == path)
    }

    pub fn visible_fields(&self) -> impl Iterator<Item = &ContentSourceField> {
        self.source_fields.iter().filter(|field| !field.is_hidden())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// AGGREGATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Mount every declaration and flatten into one contract with absolute paths.
///
/// Fails on the first absolute path declared twice, whether by two mounts or
/// within one declaration.
pub fn aggregate_contract(mounts: &[ContentMount]) -> Result<ContentContract, ContractError> {
    let mut contract = ContentContract::default();
    let mut owners: HashMap<String, String> = HashMap::new();

    for mount in mounts {
        let section_id = mount.section_id();
        if !contract.sections.iter().any(|s| s.id == section_id) {
            contract.sections.push(ContractSection {
                id: section_id.clone(),
                label: mount.declaration.label.clone(),
                description: mount.declaration.description.clone(),
            });
        }

        for field in &mount.declaration.content_fields {
            let path = mount.absolute_path(&field.path);
            if let Some(first) = owners.get(&path) {
                warn!(
                    "content path {} declared by both {} and {}",
                    path, first, section_id
                );
                return Err(ContractError::PathCollision {
                    path,
                    first: first.clone(),
                    second: section_id,
                });
            }
            owners.insert(path.clone(), section_id.clone());
            let mounted = mount_field(field, path, &section_id)?;
            contract.source_fields.push(mounted);
        }
    }

    Ok(contract)
}

fn mount_field(
    field: &ContentSourceField,
    path: String,
    section_id: &str,
) -> Result<ContentSourceField, ContractError> {
    let item_fields = match &field.item_fields {
        Some(items) => Some(mount_item_fields(items, &path, section_id)?),
        None => None,
    };
    Ok(ContentSourceField {
        path,
        section: Some(section_id.to_string()),
        item_fields,
        ..field.clone()
    })
}

/// Item fields resolve per array element, so their paths stay relative.
/// Two item fields with the same path inside one collection collide.
fn mount_item_fields(
    items: &[ContentSourceField],
    collection_path: &str,
    section_id: &str,
) -> Result<Vec<ContentSourceField>, ContractError> {
    let mut seen = HashSet::new();
    let mut mounted = Vec::with_capacity(items.len());
    for item in items {
        let absolute = format!("{}.{}", collection_path, item.path);
        if !seen.insert(item.path.as_str()) {
            warn!("item path {} declared twice by {}", absolute, section_id);
            return Err(ContractError::PathCollision {
                path: absolute,
                first: section_id.to_string(),
                second: section_id.to_string(),
            });
        }
        let mut field = mount_field(item, absolute, section_id)?;
        field.path = item.path.clone();
        mounted.push(field);
    }
    Ok(mounted)
}

// ═══════════════════════════════════════════════════════════════════════════════
// HIDDEN OVERRIDES
// ═══════════════════════════════════════════════════════════════════════════════

/// Apply per-path hidden flags on a copy of the contract. Item fields are
/// addressed as `collection.itemPath`.
pub fn apply_hidden_overrides(
    contract: &ContentContract,
    overrides: &HashMap<String, bool>,
) -> ContentContract {
    let mut applied = contract.clone();
    for field in &mut applied.source_fields {
        if let Some(hidden) = overrides.get(&field.path) {
            field.hidden = Some(*hidden);
        }
        let parent = field.path.clone();
        if let Some(items) = field.item_fields.as_mut() {
            for item in items {
                if let Some(hidden) = overrides.get(&format!("{}.{}", parent, item.path)) {
                    item.hidden = Some(*hidden);
                }
            }
        }
    }
    applied
}

// ═══════════════════════════════════════════════════════════════════════════════
// DEFAULT CONTENT
// ═══════════════════════════════════════════════════════════════════════════════

fn default_for(field: &ContentSourceField) -> Option<Value> {
    match (&field.default, field.field_type) {
        (Some(default), _) => Some(default.clone()),
        (None, FieldType::Collection) | (None, FieldType::StringList) => {
            Some(Value::Array(Vec::new()))
        }
        _ => None,
    }
}

/// Write `value` at a dotted path, creating intermediate objects. Never
/// overwrites a non-object on the way down.
fn set_path(root: &mut Value, path: &str, value: Value) -> bool {
    let mut segments = path.split('.').peekable();
    let mut current = root;
    while let Some(segment) = segments.next() {
        let Value::Object(map) = current else {
            return false;
        };
        if segments.peek().is_none() {
            map.insert(segment.to_string(), value);
            return true;
        }
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    false
}

/// Content object holding every declared default.
pub fn build_default_content(contract: &ContentContract) -> Value {
    seed_content(contract, &Value::Object(Map::new()))
}

/// Copy of `content` with defaults filled in wherever a declared path is
/// absent. Existing values are never replaced.
pub fn seed_content(contract: &ContentContract, content: &Value) -> Value {
    let mut seeded = content.clone();
    for field in &contract.source_fields {
        if lookup_path(&seeded, &field.path).is_some() {
            continue;
        }
        if let Some(default) = default_for(field) {
            if !set_path(&mut seeded, &field.path, default) {
                warn!("could not seed default for {}: parent is not an object", field.path);
            }
        }
    }
    seeded
}

// ═══════════════════════════════════════════════════════════════════════════════
// VALIDATION
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ContentIssueKind {
    MissingRequired,
    TypeMismatch { expected: FieldType },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentIssue {
    pub path: String,
    #[serde(flatten)]
    pub kind: ContentIssueKind,
    pub message: String,
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        _ => false,
    }
}

fn check_field(
    field: &ContentSourceField,
    value: Option<&Value>,
    path: &str,
    issues: &mut Vec<ContentIssue>,
) {
    if is_blank(value) {
        if field.is_required() {
            issues.push(ContentIssue {
                path: path.to_string(),
                kind: ContentIssueKind::MissingRequired,
                message: format!("'{}' is required", field.label),
            });
        }
        return;
    }
    let Some(value) = value else { return };

    if !field.field_type.accepts(value) {
        issues.push(ContentIssue {
            path: path.to_string(),
            kind: ContentIssueKind::TypeMismatch {
                expected: field.field_type,
            },
            message: format!(
                "'{}' expects {:?} content, found {}",
                field.label,
                field.field_type,
                value_kind(value)
            ),
        });
        return;
    }

    if let (FieldType::Collection, Value::Array(items)) = (field.field_type, value) {
        for (index, item) in items.iter().enumerate() {
            for item_field in field.item_fields() {
                let item_path = format!("{}.{}.{}", path, index, item_field.path);
                check_field(
                    item_field,
                    lookup_path(item, &item_field.path),
                    &item_path,
                    issues,
                );
            }
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Check content against the contract. Reports, never fails.
pub fn validate_content(contract: &ContentContract, content: &Value) -> Vec<ContentIssue> {
    let mut issues = Vec::new();
    for field in &contract.source_fields {
        check_field(field, lookup_path(content, &field.path), &field.path, &mut issues);
    }
    issues
}

// ═══════════════════════════════════════════════════════════════════════════════
// DIFF
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    pub path: String,
    pub attributes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub changed: Vec<FieldChange>,
}

impl ContractDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

fn changed_attributes(old: &ContentSourceField, new: &ContentSourceField) -> Vec<String> {
    let mut attributes = Vec::new();
    if old.field_type != new.field_type {
        attributes.push("type");
    }
    if old.label != new.label {
        attributes.push("label");
    }
    if old.is_required() != new.is_required() {
        attributes.push("required");
    }
    if old.default != new.default {
        attributes.push("default");
    }
    if old.is_hidden() != new.is_hidden() {
        attributes.push("hidden");
    }
    if old.options != new.options {
        attributes.push("options");
    }
    if old.item_fields != new.item_fields {
        attributes.push("itemFields");
    }
    attributes.into_iter().map(String::from).collect()
}

/// Compare two contracts by absolute path.
pub fn diff_contracts(old: &ContentContract, new: &ContentContract) -> ContractDiff {
    let new_paths: HashSet<&str> = new.source_fields.iter().map(|f| f.path.as_str()).collect();
    let mut diff = ContractDiff::default();

    for field in &new.source_fields {
        match old.field(&field.path) {
            None => diff.added.push(field.path.clone()),
            Some(previous) => {
                let attributes = changed_attributes(previous, field);
                if !attributes.is_empty() {
                    diff.changed.push(FieldChange {
                        path: field.path.clone(),
                        attributes,
                    });
                }
            }
        }
    }
    diff.removed = old
        .source_fields
        .iter()
        .filter(|field| !new_paths.contains(field.path.as_str()))
        .map(|field| field.path.clone())
        .collect();
    diff
}

// ═══════════════════════════════════════════════════════════════════════════════
// NATIVE BRIDGE
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "napi")]
#[napi]
pub fn aggregate_contract_native(mounts_json: String) -> napi::Result<String> {
    let mounts: Vec<ContentMount> = serde_json::from_str(&mounts_json)
        .map_err(|e| napi::Error::from_reason(format!("Mounts parse error: {}", e)))?;
    let contract =
        aggregate_contract(&mounts).map_err(|e| napi::Error::from_reason(e.to_string()))?;
    serde_json::to_string(&contract)
        .map_err(|e| napi::Error::from_reason(format!("Serialize error: {}", e)))
}
