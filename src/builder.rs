//! Pattern factory helpers.
//!
//! Section and widget patterns build schema trees with binding placeholders
//! baked in. Ids come from an explicit [`BuilderSession`] passed by the
//! caller, so two sessions never share a counter.

use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::schema::{SectionSchema, WidgetSchema};

pub fn content_binding(path: &str) -> String {
    format!("{{{{ content.{} }}}}", path)
}

pub fn item_binding(path: &str) -> String {
    format!("{{{{ item.{} }}}}", path)
}

/// Id source for one factory run.
#[derive(Debug, Default)]
pub struct BuilderSession {
    counters: HashMap<String, u32>,
}

impl BuilderSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id for `prefix`: `text-1`, `text-2`, ...
    pub fn next_id(&mut self, prefix: &str) -> String {
        let counter = self.counters.entry(prefix.to_string()).or_insert(0);
        *counter += 1;
        format!("{}-{}", prefix, counter)
    }

    pub fn widget(&mut self, widget_type: &str) -> WidgetBuilder {
        let id = self.next_id(&widget_type.to_lowercase());
        WidgetBuilder::new(widget_type).id(&id)
    }

    pub fn section(&mut self, pattern_id: &str) -> SectionBuilder {
        let id = self.next_id(pattern_id);
        SectionBuilder::new(&id).pattern(pattern_id)
    }
}

#[derive(Debug, Clone)]
pub struct WidgetBuilder {
    widget: WidgetSchema,
}

impl WidgetBuilder {
    pub fn new(widget_type: &str) -> Self {
        WidgetBuilder {
            widget: WidgetSchema {
                widget_type: widget_type.to_string(),
                ..Default::default()
            },
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.widget.id = Some(id.to_string());
        self
    }

    pub fn prop(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.widget.props.insert(key.to_string(), value.into());
        self
    }

    /// Bind a prop to a content path.
    pub fn bind(self, key: &str, content_path: &str) -> Self {
        self.prop(key, content_binding(content_path))
    }

    /// Bind a prop to a field of the current repeat item.
    pub fn bind_item(self, key: &str, item_path: &str) -> Self {
        self.prop(key, item_binding(item_path))
    }

    pub fn style(mut self, key: &str, value: impl Into<Value>) -> Self {
        let style = self
            .widget
            .style
            .get_or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(map) = style {
            map.insert(key.to_string(), value.into());
        }
        self
    }

    pub fn class_name(mut self, class_name: &str) -> Self {
        self.widget.class_name = Some(class_name.to_string());
        self
    }

    pub fn child(mut self, child: WidgetBuilder) -> Self {
        self.widget
            .widgets
            .get_or_insert_with(Vec::new)
            .push(child.build());
        self
    }

    /// Make this widget a template repeated over a content array.
    pub fn repeat(mut self, content_path: &str) -> Self {
        self.widget.repeat = Some(Value::String(content_binding(content_path)));
        self
    }

    /// Repeat over an array field of the enclosing repeat item.
    pub fn repeat_item(mut self, item_path: &str) -> Self {
        self.widget.repeat = Some(Value::String(item_binding(item_path)));
        self
    }

    pub fn condition(mut self, binding: &str) -> Self {
        self.widget.condition = Some(Value::String(binding.to_string()));
        self
    }

    pub fn build(self) -> WidgetSchema {
        self.widget
    }
}

#[derive(Debug, Clone)]
pub struct SectionBuilder {
    section: SectionSchema,
}

impl SectionBuilder {
    pub fn new(id: &str) -> Self {
        SectionBuilder {
            section: SectionSchema {
                id: id.to_string(),
                ..Default::default()
            },
        }
    }

    pub fn pattern(mut self, pattern_id: &str) -> Self {
        self.section.pattern_id = Some(pattern_id.to_string());
        self
    }

    pub fn label(mut self, label: &str) -> Self {
        self.section.label = Some(label.to_string());
        self
    }

    pub fn style(mut self, style: Value) -> Self {
        self.section.style = Some(style);
        self
    }

    pub fn widget(mut self, widget: WidgetBuilder) -> Self {
        self.section.widgets.push(widget.build());
        self
    }

    pub fn build(self) -> SectionSchema {
        self.section
    }
}
