//! Section, Page and Chrome Resolution
//!
//! Applies the widget resolver across sections, pages and chrome slots, and
//! strips preview-only subtrees before anything is resolved.

use serde_json::Value;
use std::slice;

use crate::binding::{resolve_map, resolve_text, resolve_value, BindingScope};
use crate::schema::{
    ChromeSchema, ChromeSlot, ExperienceConfig, PageSchema, RegionSlot, SectionSchema,
};
use crate::widgets::process_widgets_in;

/// Resolve a section at `position` within its page. An id-less section is
/// named `section-{position}` when naming clones of id-less templates.
pub fn resolve_section(section: &SectionSchema, position: usize, scope: &BindingScope) -> SectionSchema {
    let owner = if section.id.is_empty() {
        format!("section-{}", position)
    } else {
        section.id.clone()
    };
    SectionSchema {
        id: section.id.clone(),
        pattern_id: section.pattern_id.clone(),
        label: section.label.clone(),
        layout: resolve_opt(section.layout.as_ref(), scope),
        style: resolve_opt(section.style.as_ref(), scope),
        class_name: section
            .class_name
            .as_deref()
            .and_then(|class_name| resolve_text(class_name, scope)),
        padding: resolve_opt(section.padding.as_ref(), scope),
        behaviour: resolve_opt(section.behaviour.as_ref(), scope),
        widgets: process_widgets_in(&section.widgets, scope, &owner),
        extra: resolve_map(&section.extra, scope),
    }
}

fn resolve_opt(value: Option<&Value>, scope: &BindingScope) -> Option<Value> {
    value.and_then(|value| resolve_value(value, scope))
}

pub fn resolve_page(page: &PageSchema, scope: &BindingScope) -> PageSchema {
    PageSchema {
        id: page.id.clone(),
        slug: page.slug.clone(),
        head: page.head.as_ref().and_then(|head| resolve_value(head, scope)),
        sections: page
            .sections
            .iter()
            .enumerate()
            .map(|(position, section)| resolve_section(section, position, scope))
            .collect(),
        extra: resolve_map(&page.extra, scope),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CHROME
// ═══════════════════════════════════════════════════════════════════════════════

pub fn resolve_chrome(chrome: &ChromeSchema, scope: &BindingScope) -> ChromeSchema {
    ChromeSchema {
        regions: chrome
            .regions
            .iter()
            .map(|(name, region)| {
                let resolved = match region {
                    RegionSlot::Hidden(hidden) => RegionSlot::Hidden(*hidden),
                    RegionSlot::Slot(slot) => RegionSlot::Slot(resolve_slot(slot, scope, name)),
                };
                (name.clone(), resolved)
            })
            .collect(),
        overlays: chrome
            .overlays
            .iter()
            .map(|(name, slot)| {
                let owner = format!("overlay-{}", name);
                (name.clone(), resolve_slot(slot, scope, &owner))
            })
            .collect(),
        extra: resolve_map(&chrome.extra, scope),
    }
}

/// A slot carries a nested widget (full tree resolution), a widget list, or
/// flat props (binding resolution only). All present shapes are resolved.
/// `owner` names the slot's id-less widgets: `{owner}-widget` for the single
/// widget, `{owner}-{position}` for list entries.
pub fn resolve_slot(slot: &ChromeSlot, scope: &BindingScope, owner: &str) -> ChromeSlot {
    let widget_owner = format!("{}-widget", owner);
    ChromeSlot {
        component: slot.component.clone(),
        // the slot holds one widget, so a repeating root keeps its first clone
        widget: slot.widget.as_ref().and_then(|widget| {
            process_widgets_in(slice::from_ref(widget), scope, &widget_owner)
                .into_iter()
                .next()
        }),
        widgets: slot
            .widgets
            .as_ref()
            .map(|widgets| process_widgets_in(widgets, scope, owner)),
        props: slot.props.as_ref().map(|props| resolve_map(props, scope)),
        position: resolve_opt(slot.position.as_ref(), scope),
        extra: resolve_map(&slot.extra, scope),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EXPERIENCE
// ═══════════════════════════════════════════════════════════════════════════════

pub fn resolve_experience(experience: &ExperienceConfig, scope: &BindingScope) -> ExperienceConfig {
    ExperienceConfig {
        id: experience.id.clone(),
        intro: experience.intro.as_ref().and_then(|intro| resolve_value(intro, scope)),
        section_behaviours: experience
            .section_behaviours
            .as_ref()
            .and_then(|behaviours| resolve_value(behaviours, scope)),
        extra: resolve_map(&experience.extra, scope),
    }
}

/// Experience without its intro. `id`, `sectionBehaviours` and any other
/// keys survive; the intro subtree is never copied.
pub fn strip_intro(experience: &ExperienceConfig) -> ExperienceConfig {
    ExperienceConfig {
        id: experience.id.clone(),
        intro: None,
        section_behaviours: experience.section_behaviours.clone(),
        extra: experience.extra.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_intro_keeps_id_and_behaviours() {
        let experience: ExperienceConfig = serde_json::from_value(json!({
            "id": "cinematic",
            "intro": { "type": "gate", "text": "{{ content.intro.text }}" },
            "sectionBehaviours": { "hero": { "parallax": true } },
            "mode": "scroll"
        }))
        .unwrap();

        let stripped = strip_intro(&experience);
        assert_eq!(stripped.id.as_deref(), Some("cinematic"));
        assert!(stripped.intro.is_none());
        assert_eq!(
            stripped.section_behaviours,
            Some(json!({ "hero": { "parallax": true } }))
        );
        assert_eq!(stripped.extra["mode"], json!("scroll"));
        // source untouched
        assert!(experience.intro.is_some());
    }

    #[test]
    fn test_chrome_owners_keep_clone_ids_apart() {
        let chrome: ChromeSchema = serde_json::from_value(json!({
            "regions": {
                "menu": {
                    "widget": { "type": "Stack", "widgets": [{ "__repeat": "{{ content.links }}" }] },
                    "widgets": [{ "type": "Stack", "widgets": [{ "__repeat": "{{ content.links }}" }] }]
                }
            },
            "overlays": {
                "menu": { "widgets": [{ "type": "Stack", "widgets": [{ "__repeat": "{{ content.links }}" }] }] }
            }
        }))
        .unwrap();
        let content = json!({ "links": [{ "href": "/" }] });

        let resolved = resolve_chrome(&chrome, &BindingScope::new(&content));
        let region = resolved.regions["menu"].as_slot().unwrap();
        let overlay = &resolved.overlays["menu"];
        let ids = [
            region.widget.as_ref().unwrap().children()[0].id.clone(),
            region.widgets.as_ref().unwrap()[0].children()[0].id.clone(),
            overlay.widgets.as_ref().unwrap()[0].children()[0].id.clone(),
        ];
        assert_eq!(
            ids,
            [
                Some("menu-widget-0-r0-0".to_string()),
                Some("menu-0-r0-0".to_string()),
                Some("overlay-menu-0-r0-0".to_string()),
            ]
        );
    }
}
