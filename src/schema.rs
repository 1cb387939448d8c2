//! Schema Types for the Preset Engine
//!
//! Serde model of presets (site templates) and the concrete schemas produced
//! from them. Field names follow the camelCase JSON authored by the site
//! builder, and unknown keys are carried in `extra` so resolution never drops
//! authoring data.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ═══════════════════════════════════════════════════════════════════════════════
// WIDGETS
// ═══════════════════════════════════════════════════════════════════════════════

/// A widget node. With `__repeat` set the node is a template that the
/// resolver expands into concrete siblings; it never reaches the renderer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub widget_type: String,
    #[serde(default)]
    pub props: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behaviour: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widgets: Option<Vec<WidgetSchema>>,
    /// Binding (or literal array) driving repeat expansion.
    #[serde(rename = "__repeat", default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<Value>,
    /// Per-item filter evaluated against the repeat item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WidgetSchema {
    pub fn is_template(&self) -> bool {
        self.repeat.is_some()
    }

    pub fn children(&self) -> &[WidgetSchema] {
        self.widgets.as_deref().unwrap_or(&[])
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SECTIONS & PAGES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionSchema {
    #[serde(default)]
    pub id: String,
    /// Name of the pattern factory that produced this section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behaviour: Option<Value>,
    #[serde(default)]
    pub widgets: Vec<WidgetSchema>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSchema {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub slug: String,
    /// Page metadata (title, description); binding-eligible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<Value>,
    #[serde(default)]
    pub sections: Vec<SectionSchema>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Lightweight page entry carried by a [`SiteSchema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRef {
    pub id: String,
    pub slug: String,
}

// ═══════════════════════════════════════════════════════════════════════════════
// CHROME
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HiddenRegion {
    Hidden,
}

/// A chrome region is either switched off with the literal `"hidden"` or
/// holds a slot descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegionSlot {
    Hidden(HiddenRegion),
    Slot(ChromeSlot),
}

impl RegionSlot {
    pub fn as_slot(&self) -> Option<&ChromeSlot> {
        match self {
            RegionSlot::Hidden(_) => None,
            RegionSlot::Slot(slot) => Some(slot),
        }
    }
}

/// Region or overlay descriptor. Presets use both the nested `widget` shape
/// and the flat `component` + `props` shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChromeSlot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget: Option<WidgetSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widgets: Option<Vec<WidgetSchema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChromeSchema {
    #[serde(default)]
    pub regions: IndexMap<String, RegionSlot>,
    #[serde(default)]
    pub overlays: IndexMap<String, ChromeSlot>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// PRESET & SITE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_behaviours: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The authored site template. Never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitePreset {
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub theme: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<ExperienceConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chrome: Option<ChromeSchema>,
    #[serde(default)]
    pub pages: IndexMap<String, PageSchema>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSchema {
    pub id: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub theme: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<ExperienceConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chrome: Option<ChromeSchema>,
    pub pages: Vec<PageRef>,
}
