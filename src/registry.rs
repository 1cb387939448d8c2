//! Widget type registry.
//!
//! The renderer maps a widget `type` tag to a component. The engine only
//! needs each tag's capabilities, looked up once per node.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    Text,
    Media,
    Action,
    Layout,
    Decoration,
    Embed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetDescriptor {
    pub kind: WidgetKind,
    pub accepts_children: bool,
}

impl WidgetDescriptor {
    pub const fn leaf(kind: WidgetKind) -> Self {
        WidgetDescriptor {
            kind,
            accepts_children: false,
        }
    }

    pub const fn container(kind: WidgetKind) -> Self {
        WidgetDescriptor {
            kind,
            accepts_children: true,
        }
    }
}

const STANDARD_WIDGETS: &[(&str, WidgetDescriptor)] = &[
    ("Text", WidgetDescriptor::leaf(WidgetKind::Text)),
    ("Heading", WidgetDescriptor::leaf(WidgetKind::Text)),
    ("RichText", WidgetDescriptor::leaf(WidgetKind::Text)),
    ("Image", WidgetDescriptor::leaf(WidgetKind::Media)),
    ("Video", WidgetDescriptor::leaf(WidgetKind::Media)),
    ("Icon", WidgetDescriptor::leaf(WidgetKind::Media)),
    ("Button", WidgetDescriptor::leaf(WidgetKind::Action)),
    ("Link", WidgetDescriptor::container(WidgetKind::Action)),
    ("Container", WidgetDescriptor::container(WidgetKind::Layout)),
    ("Stack", WidgetDescriptor::container(WidgetKind::Layout)),
    ("Flex", WidgetDescriptor::container(WidgetKind::Layout)),
    ("Grid", WidgetDescriptor::container(WidgetKind::Layout)),
    ("Marquee", WidgetDescriptor::container(WidgetKind::Layout)),
    ("Divider", WidgetDescriptor::leaf(WidgetKind::Decoration)),
    ("Spacer", WidgetDescriptor::leaf(WidgetKind::Decoration)),
    ("Embed", WidgetDescriptor::leaf(WidgetKind::Embed)),
];

#[derive(Debug, Clone, Default)]
pub struct WidgetRegistry {
    entries: HashMap<String, WidgetDescriptor>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in widget primitives.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for (tag, descriptor) in STANDARD_WIDGETS {
            registry.register(tag, *descriptor);
        }
        registry
    }

    pub fn register(&mut self, tag: &str, descriptor: WidgetDescriptor) -> &mut Self {
        self.entries.insert(tag.to_string(), descriptor);
        self
    }

    pub fn get(&self, tag: &str) -> Option<&WidgetDescriptor> {
        self.entries.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_lookup() {
        let registry = WidgetRegistry::standard();
        assert!(registry.get("Container").unwrap().accepts_children);
        assert_eq!(registry.get("Image").unwrap().kind, WidgetKind::Media);
        assert!(registry.get("Carousel3D").is_none());
    }

    #[test]
    fn test_custom_registration_overrides() {
        let mut registry = WidgetRegistry::standard();
        registry
            .register("Carousel", WidgetDescriptor::container(WidgetKind::Layout))
            .register("Text", WidgetDescriptor::container(WidgetKind::Text));
        assert!(registry.contains("Carousel"));
        assert!(registry.get("Text").unwrap().accepts_children);
    }
}
