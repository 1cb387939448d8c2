//! Structural Tree Builder
//!
//! Maps contract fields back onto the places in a preset (still holding its
//! placeholders) whose binding expressions reference them. Each field is
//! claimed by the first location that references it, in traversal order:
//! head, experience, pages (page head, then sections), chrome (regions, then
//! overlays). Fields nobody references land in a trailing `other` node.
//!
//! Purely diagnostic: malformed or partial presets produce empty subtrees.

#[cfg(feature = "napi")]
use napi_derive::napi;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};

use crate::binding::{exact_binding, extract_binding_refs, BindingRoot, INDEX_FIELD};
use crate::contract::{ContentContract, ContentSourceField};
use crate::schema::{RegionSlot, SitePreset};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralNode {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<ContentSourceField>,
    #[serde(default)]
    pub children: Vec<StructuralNode>,
}

impl StructuralNode {
    fn group(id: &str, label: &str) -> Self {
        StructuralNode {
            id: id.to_string(),
            label: label.to_string(),
            description: None,
            fields: Vec::new(),
            children: Vec::new(),
        }
    }

    fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// All fields claimed by this node and its descendants.
    pub fn all_fields(&self) -> Vec<&ContentSourceField> {
        let mut out: Vec<&ContentSourceField> = self.fields.iter().collect();
        for child in &self.children {
            out.extend(child.all_fields());
        }
        out
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REFERENCED PATHS
// ═══════════════════════════════════════════════════════════════════════════════

/// Content paths referenced anywhere in a JSON subtree. Inside a
/// `__repeat` over `{{ content.P }}`, `{{ item.x }}` is recorded as `P.x`.
pub fn referenced_paths(value: &Value) -> BTreeSet<String> {
    let mut paths = BTreeSet::new();
    scan(value, None, &mut paths);
    paths
}

fn scan(value: &Value, item_base: Option<&str>, paths: &mut BTreeSet<String>) {
    match value {
        Value::String(text) => record(text, item_base, paths),
        Value::Array(items) => {
            for item in items {
                scan(item, item_base, paths);
            }
        }
        Value::Object(map) => {
            let repeat_base = map
                .get("__repeat")
                .and_then(Value::as_str)
                .and_then(|source| repeat_source_path(source, item_base));
            let inner_base = repeat_base.as_deref().or(item_base);
            for (key, child) in map {
                if key == "__repeat" {
                    scan(child, item_base, paths);
                } else {
                    scan(child, inner_base, paths);
                }
            }
        }
        _ => {}
    }
}

fn item_path(base: &str, path: &str) -> Option<String> {
    if path == INDEX_FIELD {
        None
    } else {
        Some(format!("{}.{}", base, path))
    }
}

fn repeat_source_path(source: &str, item_base: Option<&str>) -> Option<String> {
    let binding = exact_binding(source)?;
    match binding.root {
        BindingRoot::Content => Some(binding.path),
        BindingRoot::Item => item_path(item_base?, &binding.path),
    }
}

fn record(text: &str, item_base: Option<&str>, paths: &mut BTreeSet<String>) {
    for binding in extract_binding_refs(text) {
        match binding.root {
            BindingRoot::Content => {
                paths.insert(binding.path);
            }
            BindingRoot::Item => {
                if let Some(path) = item_base.and_then(|base| item_path(base, &binding.path)) {
                    paths.insert(path);
                }
            }
        }
    }
}

/// Segment-anchored match in both directions: `hero` claims `hero.title`
/// and `hero.title` claims `hero`, but `hero.title` never claims
/// `hero.titleLong`.
pub fn path_matches(field_path: &str, referenced: &str) -> bool {
    fn is_segment_prefix(prefix: &str, path: &str) -> bool {
        path.len() > prefix.len()
            && path.starts_with(prefix)
            && path.as_bytes()[prefix.len()] == b'.'
    }
    field_path == referenced
        || is_segment_prefix(field_path, referenced)
        || is_segment_prefix(referenced, field_path)
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLAIMS
// ═══════════════════════════════════════════════════════════════════════════════

/// Claimed-path bookkeeping for one build. Never shared between calls.
struct Claims<'c> {
    fields: &'c [ContentSourceField],
    claimed: HashSet<&'c str>,
}

impl<'c> Claims<'c> {
    fn new(contract: &'c ContentContract) -> Self {
        Claims {
            fields: &contract.source_fields,
            claimed: HashSet::new(),
        }
    }

    fn claim_value(&mut self, value: &Value) -> Vec<ContentSourceField> {
        let referenced = referenced_paths(value);
        if referenced.is_empty() {
            return Vec::new();
        }
        let mut taken = Vec::new();
        for field in self.fields {
            if self.claimed.contains(field.path.as_str()) {
                continue;
            }
            if referenced.iter().any(|r| path_matches(&field.path, r)) {
                self.claimed.insert(field.path.as_str());
                taken.push(field.clone());
            }
        }
        taken
    }

    fn claim<T: Serialize>(&mut self, location: &T) -> Vec<ContentSourceField> {
        match serde_json::to_value(location) {
            Ok(value) => self.claim_value(&value),
            Err(e) => {
                debug!("structural scan skipped an unserialisable location: {}", e);
                Vec::new()
            }
        }
    }

    fn unclaimed(&self) -> Vec<ContentSourceField> {
        self.fields
            .iter()
            .filter(|field| !self.claimed.contains(field.path.as_str()))
            .cloned()
            .collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TREE
// ═══════════════════════════════════════════════════════════════════════════════

pub const OTHER_NODE_ID: &str = "other";

pub fn build_structural_tree(preset: &SitePreset, contract: &ContentContract) -> Vec<StructuralNode> {
    let mut claims = Claims::new(contract);
    let mut nodes = Vec::new();

    if let Some(head) = &preset.head {
        let mut node =
            StructuralNode::group("head", "Head").with_description("Site-wide metadata");
        node.fields = claims.claim_value(head);
        nodes.push(node);
    }
    nodes.push(experience_node(preset, &mut claims));
    nodes.push(pages_node(preset, &mut claims));
    nodes.push(chrome_node(preset, &mut claims));

    let unclaimed = claims.unclaimed();
    if !unclaimed.is_empty() {
        debug!("{} contract fields are not referenced by the preset", unclaimed.len());
        let mut other = StructuralNode::group(OTHER_NODE_ID, "Other")
            .with_description("Declared fields not referenced anywhere in the preset");
        other.fields = unclaimed;
        nodes.push(other);
    }
    nodes
}

fn experience_node(preset: &SitePreset, claims: &mut Claims) -> StructuralNode {
    let mut node = StructuralNode::group("experience", "Experience");
    let Some(experience) = &preset.experience else {
        return node;
    };
    if let Some(id) = &experience.id {
        node.description = Some(id.clone());
    }
    if let Some(intro) = &experience.intro {
        let mut child = StructuralNode::group("experience.intro", "Intro");
        child.fields = claims.claim_value(intro);
        node.children.push(child);
    }
    if let Some(behaviours) = &experience.section_behaviours {
        let mut child =
            StructuralNode::group("experience.sectionBehaviours", "Section behaviours");
        child.fields = claims.claim_value(behaviours);
        node.children.push(child);
    }
    node
}

fn pages_node(preset: &SitePreset, claims: &mut Claims) -> StructuralNode {
    let mut node = StructuralNode::group("pages", "Pages");
    for (key, page) in &preset.pages {
        let page_key = if page.id.is_empty() { key } else { &page.id };
        let mut page_node = StructuralNode::group(&format!("page:{}", page_key), page_key);
        if !page.slug.is_empty() {
            page_node.description = Some(page.slug.clone());
        }
        if let Some(head) = &page.head {
            page_node.fields = claims.claim_value(head);
        }
        for (position, section) in page.sections.iter().enumerate() {
            let section_key = if section.id.is_empty() {
                format!("{}", position)
            } else {
                section.id.clone()
            };
            let label = section
                .label
                .clone()
                .or_else(|| section.pattern_id.clone())
                .unwrap_or_else(|| section_key.clone());
            let mut section_node = StructuralNode::group(
                &format!("page:{}/section:{}", page_key, section_key),
                &label,
            );
            section_node.description = section.pattern_id.clone();
            section_node.fields = claims.claim(section);
            page_node.children.push(section_node);
        }
        node.children.push(page_node);
    }
    node
}

fn chrome_node(preset: &SitePreset, claims: &mut Claims) -> StructuralNode {
    let mut node = StructuralNode::group("chrome", "Chrome");
    let Some(chrome) = &preset.chrome else {
        return node;
    };
    for (name, region) in &chrome.regions {
        if let RegionSlot::Slot(slot) = region {
            let mut child = StructuralNode::group(&format!("chrome.region:{}", name), name);
            child.description = slot.component.clone();
            child.fields = claims.claim(slot);
            node.children.push(child);
        }
    }
    for (name, slot) in &chrome.overlays {
        let mut child = StructuralNode::group(&format!("chrome.overlay:{}", name), name);
        child.description = slot.component.clone();
        child.fields = claims.claim(slot);
        node.children.push(child);
    }
    node
}

#[cfg(feature = "napi")]
#[napi]
pub fn build_structural_tree_native(preset_json: String, contract_json: String) -> napi::Result<String> {
    let preset: SitePreset = serde_json::from_str(&preset_json)
        .map_err(|e| napi::Error::from_reason(format!("Preset parse error: {}", e)))?;
    let contract: ContentContract = serde_json::from_str(&contract_json)
        .map_err(|e| napi::Error::from_reason(format!("Contract parse error: {}", e)))?;
    let tree = build_structural_tree(&preset, &contract);
    serde_json::to_string(&tree)
        .map_err(|e| napi::Error::from_reason(format!("Serialize error: {}", e)))
}
