//! Render-ready checks for resolved schemas.
//!
//! A resolved page or site handed to the renderer must hold no `__repeat`
//! templates and no binding text. These checks report violations with a
//! stable code; they never fail or panic.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::binding::contains_binding;
use crate::registry::WidgetRegistry;
use crate::schema::{PageSchema, SiteSchema, WidgetSchema};

// ═══════════════════════════════════════════════════════════════════════════════
// INVARIANT CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const INV_UNRESOLVED_BINDING: &str = "PE001";
pub const INV_UNEXPANDED_REPEAT: &str = "PE002";
pub const INV_UNKNOWN_WIDGET: &str = "PE003";
pub const INV_LEAF_CHILDREN: &str = "PE004";
pub const INV_DUPLICATE_ID: &str = "PE005";

fn get_guarantee(code: &str) -> &'static str {
    match code {
        INV_UNRESOLVED_BINDING => "Resolved schemas contain no binding expressions.",
        INV_UNEXPANDED_REPEAT => "Repeat templates are expanded before rendering.",
        INV_UNKNOWN_WIDGET => "Every widget type maps to a registered renderer.",
        INV_LEAF_CHILDREN => "Only container widgets carry child widgets.",
        INV_DUPLICATE_ID => "Widget ids are unique within a resolved tree.",
        _ => "Unknown invariant.",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderIssue {
    pub code: String,
    pub message: String,
    pub guarantee: String,
    /// JSON pointer into the checked schema.
    pub location: String,
}

impl RenderIssue {
    pub fn new(code: &str, message: impl Into<String>, location: &str) -> Self {
        RenderIssue {
            code: code.to_string(),
            message: message.into(),
            guarantee: get_guarantee(code).to_string(),
            location: location.to_string(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RAW SCAN
// ═══════════════════════════════════════════════════════════════════════════════

fn pointer_segment(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

/// Leftover binding text and `__repeat` keys anywhere in a JSON tree.
fn scan_raw(value: &Value, pointer: &str, issues: &mut Vec<RenderIssue>) {
    match value {
        Value::String(text) => {
            if contains_binding(text) {
                issues.push(RenderIssue::new(
                    INV_UNRESOLVED_BINDING,
                    format!("unresolved binding text: {}", text),
                    pointer,
                ));
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                scan_raw(item, &format!("{}/{}", pointer, index), issues);
            }
        }
        Value::Object(map) => {
            if map.contains_key("__repeat") {
                issues.push(RenderIssue::new(
                    INV_UNEXPANDED_REPEAT,
                    "__repeat template survived resolution",
                    pointer,
                ));
            }
            for (key, child) in map {
                if key == "__repeat" {
                    continue;
                }
                scan_raw(
                    child,
                    &format!("{}/{}", pointer, pointer_segment(key)),
                    issues,
                );
            }
        }
        _ => {}
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// WIDGET SCAN
// ═══════════════════════════════════════════════════════════════════════════════

struct WidgetCheck<'r> {
    registry: &'r WidgetRegistry,
    seen_ids: HashSet<String>,
    issues: Vec<RenderIssue>,
}

impl<'r> WidgetCheck<'r> {
    fn new(registry: &'r WidgetRegistry) -> Self {
        WidgetCheck {
            registry,
            seen_ids: HashSet::new(),
            issues: Vec::new(),
        }
    }

    fn check_all(&mut self, widgets: &[WidgetSchema], pointer: &str) {
        for (index, widget) in widgets.iter().enumerate() {
            self.check(widget, &format!("{}/{}", pointer, index));
        }
    }

    fn check(&mut self, widget: &WidgetSchema, pointer: &str) {
        if let Some(id) = &widget.id {
            if !self.seen_ids.insert(id.clone()) {
                self.issues.push(RenderIssue::new(
                    INV_DUPLICATE_ID,
                    format!("duplicate widget id '{}'", id),
                    pointer,
                ));
            }
        }
        if !widget.widget_type.is_empty() {
            match self.registry.get(&widget.widget_type) {
                None => self.issues.push(RenderIssue::new(
                    INV_UNKNOWN_WIDGET,
                    format!("unknown widget type '{}'", widget.widget_type),
                    pointer,
                )),
                Some(descriptor) if !descriptor.accepts_children && !widget.children().is_empty() => {
                    self.issues.push(RenderIssue::new(
                        INV_LEAF_CHILDREN,
                        format!("'{}' does not accept child widgets", widget.widget_type),
                        pointer,
                    ))
                }
                Some(_) => {}
            }
        }
        if let Some(children) = &widget.widgets {
            self.check_all(children, &format!("{}/widgets", pointer));
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENTRY POINTS
// ═══════════════════════════════════════════════════════════════════════════════

fn raw_issues<T: Serialize>(schema: &T) -> Vec<RenderIssue> {
    let mut issues = Vec::new();
    if let Ok(value) = serde_json::to_value(schema) {
        scan_raw(&value, "", &mut issues);
    }
    issues
}

pub fn verify_page(page: &PageSchema, registry: &WidgetRegistry) -> Vec<RenderIssue> {
    let mut issues = raw_issues(page);
    let mut check = WidgetCheck::new(registry);
    for (index, section) in page.sections.iter().enumerate() {
        check.check_all(&section.widgets, &format!("/sections/{}/widgets", index));
    }
    issues.extend(check.issues);
    issues
}

/// Checks the site-level schema, including chrome widgets. Page bodies are
/// checked separately with [`verify_page`].
pub fn verify_site(site: &SiteSchema, registry: &WidgetRegistry) -> Vec<RenderIssue> {
    let mut issues = raw_issues(site);
    let mut check = WidgetCheck::new(registry);
    if let Some(chrome) = &site.chrome {
        for (name, region) in &chrome.regions {
            if let Some(slot) = region.as_slot() {
                let pointer = format!("/chrome/regions/{}", pointer_segment(name));
                if let Some(widget) = &slot.widget {
                    check.check(widget, &format!("{}/widget", pointer));
                }
                if let Some(widgets) = &slot.widgets {
                    check.check_all(widgets, &format!("{}/widgets", pointer));
                }
            }
        }
        for (name, slot) in &chrome.overlays {
            let pointer = format!("/chrome/overlays/{}", pointer_segment(name));
            if let Some(widget) = &slot.widget {
                check.check(widget, &format!("{}/widget", pointer));
            }
            if let Some(widgets) = &slot.widgets {
                check.check_all(widgets, &format!("{}/widgets", pointer));
            }
        }
    }
    issues.extend(check.issues);
    issues
}
