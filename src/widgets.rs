//! Widget Tree Resolver
//!
//! Walks widget trees depth-first, resolving bindings and expanding
//! `__repeat` templates into concrete sibling clones.
//!
//! Clone ids are derived from the template id and the source array index,
//! so the same input always yields the same ids:
//! - template `card` at index 2 becomes `card-2`
//! - every id inside that clone gets the same `-2` suffix
//! - a template without an id uses `{parent}-r{position}` as its base
//!
//! `parent` is the nearest id of an enclosing node. An id-less enclosing
//! node contributes `{its parent}-{position}`, so every owner names a
//! unique position in the tree.

use log::debug;
use serde_json::Value;

use crate::binding::{
    evaluate_condition, resolve_map, resolve_string, resolve_text, resolve_value, BindingScope,
};
use crate::schema::WidgetSchema;

const ROOT_PARENT: &str = "widget";

/// Resolve an ordered widget list. The output holds no `__repeat` nodes and
/// keeps source order, with clones spliced in where their template stood.
pub fn process_widgets(widgets: &[WidgetSchema], scope: &BindingScope) -> Vec<WidgetSchema> {
    process_widgets_in(widgets, scope, ROOT_PARENT)
}

/// Same as [`process_widgets`], with the id of the owning node used to name
/// clones of id-less templates.
pub fn process_widgets_in(
    widgets: &[WidgetSchema],
    scope: &BindingScope,
    parent_id: &str,
) -> Vec<WidgetSchema> {
    let mut resolved = Vec::with_capacity(widgets.len());
    for (position, widget) in widgets.iter().enumerate() {
        match &widget.repeat {
            Some(source) => {
                resolved.extend(expand_repeat(widget, source, scope, parent_id, position))
            }
            None => {
                let owner = widget
                    .id
                    .clone()
                    .unwrap_or_else(|| format!("{}-{}", parent_id, position));
                resolved.push(resolve_widget_in(widget, scope, &owner))
            }
        }
    }
    resolved
}

/// Resolve a single non-template widget and its children. Every
/// binding-eligible key is resolved; `id` and `type` are kept as authored.
pub fn resolve_widget(widget: &WidgetSchema, scope: &BindingScope) -> WidgetSchema {
    resolve_widget_in(widget, scope, widget.id.as_deref().unwrap_or(ROOT_PARENT))
}

/// `owner` names this node for clones of id-less templates among its children.
fn resolve_widget_in(widget: &WidgetSchema, scope: &BindingScope, owner: &str) -> WidgetSchema {
    WidgetSchema {
        id: widget.id.clone(),
        widget_type: widget.widget_type.clone(),
        props: resolve_map(&widget.props, scope),
        style: widget.style.as_ref().and_then(|style| resolve_value(style, scope)),
        class_name: widget
            .class_name
            .as_deref()
            .and_then(|class_name| resolve_text(class_name, scope)),
        behaviour: widget
            .behaviour
            .as_ref()
            .and_then(|behaviour| resolve_value(behaviour, scope)),
        on: widget.on.as_ref().and_then(|on| resolve_value(on, scope)),
        widgets: widget
            .widgets
            .as_ref()
            .map(|children| process_widgets_in(children, scope, owner)),
        repeat: None,
        condition: None,
        extra: resolve_map(&widget.extra, scope),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REPEAT EXPANSION
// ═══════════════════════════════════════════════════════════════════════════════

fn repeat_items(source: &Value, scope: &BindingScope) -> Option<Vec<Value>> {
    let resolved = match source {
        Value::String(binding) => resolve_string(binding, scope),
        Value::Array(_) => Some(source.clone()),
        _ => None,
    };
    match resolved {
        Some(Value::Array(items)) => Some(items),
        _ => None,
    }
}

fn expand_repeat(
    template: &WidgetSchema,
    source: &Value,
    scope: &BindingScope,
    parent_id: &str,
    position: usize,
) -> Vec<WidgetSchema> {
    let base_id = template
        .id
        .clone()
        .unwrap_or_else(|| format!("{}-r{}", parent_id, position));

    let Some(items) = repeat_items(source, scope) else {
        debug!("__repeat on {} did not resolve to an array; expanding to nothing", base_id);
        return Vec::new();
    };

    let clones: Vec<WidgetSchema> = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let item_scope = scope.with_item(item, index);
            if let Some(condition) = &template.condition {
                if !evaluate_condition(condition, &item_scope) {
                    return None;
                }
            }
            Some(resolve_clone(template, &base_id, index, &item_scope))
        })
        .collect();

    debug!(
        "expanded __repeat {} into {} of {} items",
        base_id,
        clones.len(),
        items.len()
    );
    clones
}

/// Resolve the whole template against one item: every binding-eligible key,
/// with children resolved under the same item frame so nested repeats over
/// `{{ item.* }}` expand.
fn resolve_clone(
    template: &WidgetSchema,
    base_id: &str,
    index: usize,
    scope: &BindingScope,
) -> WidgetSchema {
    let suffix = format!("-{}", index);
    let id = format!("{}{}", base_id, suffix);

    let widgets = template.widgets.as_ref().map(|children| {
        let suffixed: Vec<WidgetSchema> = children
            .iter()
            .map(|child| suffix_ids(child, &suffix))
            .collect();
        process_widgets_in(&suffixed, scope, &id)
    });

    WidgetSchema {
        widget_type: template.widget_type.clone(),
        props: resolve_map(&template.props, scope),
        style: template.style.as_ref().and_then(|style| resolve_value(style, scope)),
        class_name: template
            .class_name
            .as_deref()
            .and_then(|class_name| resolve_text(class_name, scope)),
        behaviour: template
            .behaviour
            .as_ref()
            .and_then(|behaviour| resolve_value(behaviour, scope)),
        on: template.on.as_ref().and_then(|on| resolve_value(on, scope)),
        widgets,
        repeat: None,
        condition: None,
        extra: resolve_map(&template.extra, scope),
        id: Some(id),
    }
}

fn suffix_ids(widget: &WidgetSchema, suffix: &str) -> WidgetSchema {
    let mut copy = widget.clone();
    apply_suffix(&mut copy, suffix);
    copy
}

fn apply_suffix(widget: &mut WidgetSchema, suffix: &str) {
    if let Some(id) = widget.id.as_mut() {
        id.push_str(suffix);
    }
    if let Some(children) = widget.widgets.as_mut() {
        for child in children {
            apply_suffix(child, suffix);
        }
    }
}
