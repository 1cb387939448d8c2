//! Render-Ready Gate Tests
//!
//! Resolved schemas must reach the renderer with:
//! - PE001: no binding text left in any string
//! - PE002: no `__repeat` template left unexpanded
//! - PE003..PE005: known widget types, children only on containers, unique ids

#[cfg(test)]
mod tests {
    use crate::compile::{
        build_all_pages, build_page_from_preset, build_site_schema_from_preset, CompileOptions,
    };
    use crate::registry::{WidgetDescriptor, WidgetKind, WidgetRegistry};
    use crate::schema::{PageSchema, SitePreset};
    use crate::validate::{
        verify_page, verify_site, INV_DUPLICATE_ID, INV_LEAF_CHILDREN, INV_UNEXPANDED_REPEAT,
        INV_UNKNOWN_WIDGET, INV_UNRESOLVED_BINDING,
    };
    use serde_json::{json, Value};

    fn page(value: Value) -> PageSchema {
        serde_json::from_value(value).expect("page fixture")
    }

    fn codes(issues: &[crate::validate::RenderIssue]) -> Vec<&str> {
        issues.iter().map(|issue| issue.code.as_str()).collect()
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // PE001 / PE002: raw placeholders
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_unresolved_page_is_flagged() {
        let raw = page(json!({
            "id": "home",
            "sections": [{
                "id": "hero",
                "widgets": [
                    { "id": "title", "type": "Heading", "props": { "text": "{{ content.hero.title }}" } },
                    { "id": "card", "type": "Container", "__repeat": "{{ content.cards }}" }
                ]
            }]
        }));

        let issues = verify_page(&raw, &WidgetRegistry::standard());
        let found = codes(&issues);
        assert!(found.contains(&INV_UNRESOLVED_BINDING));
        assert!(found.contains(&INV_UNEXPANDED_REPEAT));

        let binding = issues
            .iter()
            .find(|issue| issue.code == INV_UNRESOLVED_BINDING && issue.location.ends_with("/props/text"))
            .unwrap();
        assert_eq!(binding.location, "/sections/0/widgets/0/props/text");
        assert!(!binding.guarantee.is_empty());
    }

    #[test]
    fn test_compiled_pages_are_render_ready() {
        let preset: SitePreset = serde_json::from_value(json!({
            "pages": {
                "home": {
                    "head": { "title": "{{ content.site.name }}" },
                    "sections": [{
                        "id": "work",
                        "widgets": [{
                            "id": "grid",
                            "type": "Grid",
                            "widgets": [{
                                "id": "tile",
                                "type": "Container",
                                "__repeat": "{{ content.projects }}",
                                "condition": "{{ item.published }}",
                                "widgets": [
                                    { "id": "tile-title", "type": "Text", "props": { "text": "{{ item.name }} ({{ item.year }})" } },
                                    { "id": "tile-missing", "type": "Text", "props": { "text": "{{ item.subtitle }}" } }
                                ]
                            }]
                        }]
                    }]
                }
            }
        }))
        .unwrap();
        let content = json!({
            "site": { "name": "Atelier" },
            "projects": [
                { "name": "Dune", "year": 2021, "published": true },
                { "name": "Draft", "published": false },
                { "name": "Arc", "year": 2023, "published": true }
            ]
        });

        let pages = build_all_pages(&preset, &content);
        let issues = verify_page(&pages[0], &WidgetRegistry::standard());
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);

        let tiles = pages[0].sections[0].widgets[0].children();
        assert_eq!(tiles.len(), 2);
        assert_eq!(tiles[1].id.as_deref(), Some("tile-2"));
        assert_eq!(tiles[1].children()[0].props["text"], json!("Arc (2023)"));
    }

    #[test]
    fn test_site_without_content_reports_chrome_placeholders() {
        let preset: SitePreset = serde_json::from_value(json!({
            "chrome": {
                "regions": {
                    "header": { "widget": { "id": "brand", "type": "Text", "props": { "text": "{{ content.site.name }}" } } }
                }
            },
            "pages": {}
        }))
        .unwrap();
        let registry = WidgetRegistry::standard();

        let raw = build_site_schema_from_preset("studio", &preset, &CompileOptions::default());
        let issues = verify_site(&raw, &registry);
        assert_eq!(codes(&issues), vec![INV_UNRESOLVED_BINDING]);
        assert_eq!(issues[0].location, "/chrome/regions/header/widget/props/text");

        let options = CompileOptions::default().with_content(json!({ "site": { "name": "Atelier" } }));
        let resolved = build_site_schema_from_preset("studio", &preset, &options);
        assert!(verify_site(&resolved, &registry).is_empty());
    }

    #[test]
    fn test_idless_repeats_in_separate_sections_get_unique_ids() {
        let preset: SitePreset = serde_json::from_value(json!({
            "pages": {
                "home": {
                    "sections": [
                        { "widgets": [{ "type": "Text", "__repeat": "{{ content.items }}" }] },
                        { "widgets": [{ "type": "Text", "__repeat": "{{ content.items }}" }] },
                        {
                            "id": "hero",
                            "widgets": [
                                { "type": "Container", "widgets": [{ "type": "Text", "__repeat": "{{ content.items }}" }] },
                                { "type": "Container", "widgets": [{ "type": "Text", "__repeat": "{{ content.items }}" }] }
                            ]
                        }
                    ]
                }
            }
        }))
        .unwrap();
        let content = json!({ "items": [{ "name": "A" }, { "name": "B" }] });

        let page = build_page_from_preset(&preset, Some("home"), &content).unwrap();
        assert_eq!(page.sections[0].widgets[0].id.as_deref(), Some("section-0-r0-0"));
        assert_eq!(page.sections[1].widgets[0].id.as_deref(), Some("section-1-r0-0"));
        assert_eq!(
            page.sections[2].widgets[1].children()[1].id.as_deref(),
            Some("hero-1-r0-1")
        );

        let issues = verify_page(&page, &WidgetRegistry::standard());
        assert!(
            !codes(&issues).contains(&INV_DUPLICATE_ID),
            "unexpected issues: {:?}",
            issues
        );
    }

    #[test]
    fn test_event_and_extra_bindings_are_resolved() {
        let preset: SitePreset = serde_json::from_value(json!({
            "pages": {
                "home": {
                    "sections": [{
                        "id": "contact",
                        "widgets": [{
                            "id": "cta",
                            "type": "Button",
                            "props": { "label": "Write to us" },
                            "on": { "click": { "href": "{{ content.cta.href }}" } },
                            "ariaLabel": "{{ content.cta.aria }}"
                        }]
                    }]
                }
            }
        }))
        .unwrap();
        let content = json!({ "cta": { "href": "/contact", "aria": "Contact" } });

        let page = build_page_from_preset(&preset, None, &content).unwrap();
        let issues = verify_page(&page, &WidgetRegistry::standard());
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
        assert_eq!(page.sections[0].widgets[0].extra["ariaLabel"], json!("Contact"));
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // PE003..PE005: widget structure
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_widget_structure_checks() {
        let resolved = page(json!({
            "sections": [
                {
                    "id": "a",
                    "widgets": [
                        { "id": "x", "type": "Hologram" },
                        { "id": "label", "type": "Text", "widgets": [ { "id": "inner", "type": "Icon" } ] }
                    ]
                },
                {
                    "id": "b",
                    "widgets": [ { "id": "x", "type": "Spacer" } ]
                }
            ]
        }));

        let issues = verify_page(&resolved, &WidgetRegistry::standard());
        assert_eq!(
            codes(&issues),
            vec![INV_UNKNOWN_WIDGET, INV_LEAF_CHILDREN, INV_DUPLICATE_ID]
        );
        assert_eq!(issues[2].location, "/sections/1/widgets/0");
    }

    #[test]
    fn test_custom_registry_accepts_registered_type() {
        let resolved = page(json!({
            "sections": [{ "widgets": [ { "id": "h", "type": "Hologram", "widgets": [ { "id": "t", "type": "Text" } ] } ] }]
        }));
        let mut registry = WidgetRegistry::standard();
        registry.register("Hologram", WidgetDescriptor::container(WidgetKind::Embed));

        assert!(verify_page(&resolved, &registry).is_empty());
    }
}
