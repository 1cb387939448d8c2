#[cfg(test)]
mod tests {
    use crate::compile::{
        build_all_pages, build_page_from_preset, build_site_schema_from_preset, select_page,
        CompileOptions,
    };
    use crate::schema::{PageRef, RegionSlot, SitePreset};
    use serde_json::{json, Value};

    fn preset(value: Value) -> SitePreset {
        serde_json::from_value(value).expect("preset fixture")
    }

    fn studio_preset() -> SitePreset {
        preset(json!({
            "theme": { "palette": "ink" },
            "head": { "title": "{{ content.site.name }}" },
            "experience": {
                "id": "cinematic",
                "intro": { "type": "gate", "text": "{{ content.intro.text }}" },
                "sectionBehaviours": { "hero": "{{ content.hero.behaviour }}" }
            },
            "transition": { "type": "fade", "duration": 400 },
            "chrome": {
                "regions": {
                    "header": {
                        "widget": {
                            "id": "nav",
                            "type": "Container",
                            "widgets": [
                                {
                                    "id": "nav-link",
                                    "type": "Link",
                                    "__repeat": "{{ content.nav.links }}",
                                    "props": { "href": "{{ item.url }}", "label": "{{ item.label }}" }
                                }
                            ]
                        }
                    },
                    "footer": "hidden"
                },
                "overlays": {
                    "menu": { "component": "Menu", "props": { "title": "{{ content.site.name }}" } }
                }
            },
            "pages": {
                "home": {
                    "slug": "/",
                    "head": { "title": "Home | {{ content.site.name }}" },
                    "sections": [
                        {
                            "id": "hero",
                            "widgets": [
                                { "id": "title", "type": "Heading", "props": { "text": "{{ content.hero.title }}" } }
                            ]
                        }
                    ]
                },
                "about": {
                    "slug": "/about",
                    "sections": [
                        {
                            "id": "story",
                            "widgets": [
                                { "id": "body", "type": "Text", "props": { "text": "{{ content.story.body }}" } }
                            ]
                        }
                    ]
                }
            }
        }))
    }

    fn studio_content() -> Value {
        json!({
            "site": { "name": "Atelier" },
            "intro": { "text": "Enter" },
            "hero": { "title": "Light and form", "behaviour": "parallax" },
            "story": { "body": "Since 2009." },
            "nav": { "links": [
                { "url": "/", "label": "Home" },
                { "url": "/about", "label": "About" }
            ] }
        })
    }

    #[test]
    fn test_end_to_end_repeat_page() {
        let preset = preset(json!({
            "pages": {
                "home": {
                    "sections": [{
                        "widgets": [{
                            "__repeat": "{{ content.items }}",
                            "props": { "label": "{{ item.name }}" }
                        }]
                    }]
                }
            }
        }));
        let content = json!({ "items": [{ "name": "A" }, { "name": "B" }] });

        let page = build_page_from_preset(&preset, Some("home"), &content).unwrap();
        let widgets = &page.sections[0].widgets;

        assert_eq!(widgets.len(), 2);
        assert_eq!(widgets[0].props["label"], json!("A"));
        assert_eq!(widgets[1].props["label"], json!("B"));
        assert!(widgets[0].id.is_some());
        assert_ne!(widgets[0].id, widgets[1].id);
        assert!(widgets.iter().all(|w| w.repeat.is_none()));
    }

    #[test]
    fn test_site_schema_resolves_chrome_with_content() {
        let options = CompileOptions::default().with_content(studio_content());
        let site = build_site_schema_from_preset("studio", &studio_preset(), &options);

        assert_eq!(site.id, "studio");
        assert_eq!(site.theme, json!({ "palette": "ink" }));
        assert_eq!(site.head, Some(json!({ "title": "Atelier" })));
        assert_eq!(
            site.pages,
            vec![
                PageRef { id: "home".into(), slug: "/".into() },
                PageRef { id: "about".into(), slug: "/about".into() },
            ]
        );

        let chrome = site.chrome.unwrap();
        let header = chrome.regions["header"].as_slot().unwrap();
        let links = header.widget.as_ref().unwrap().children();
        assert_eq!(links.len(), 2);
        assert_eq!(links[1].id.as_deref(), Some("nav-link-1"));
        assert_eq!(links[1].props["label"], json!("About"));
        assert_eq!(chrome.regions["footer"], RegionSlot::Hidden(crate::schema::HiddenRegion::Hidden));
        assert_eq!(
            chrome.overlays["menu"].props.as_ref().unwrap()["title"],
            json!("Atelier")
        );
    }

    #[test]
    fn test_site_schema_without_content_keeps_placeholders() {
        let site =
            build_site_schema_from_preset("studio", &studio_preset(), &CompileOptions::default());

        let chrome = site.chrome.unwrap();
        let header = chrome.regions["header"].as_slot().unwrap();
        let template = &header.widget.as_ref().unwrap().children()[0];
        assert_eq!(template.repeat, Some(json!("{{ content.nav.links }}")));
        assert_eq!(site.head, Some(json!({ "title": "{{ content.site.name }}" })));
        assert_eq!(site.pages.len(), 2);
    }

    #[test]
    fn test_preview_strips_intro_and_transition() {
        let options = CompileOptions::preview().with_content(studio_content());
        let site = build_site_schema_from_preset("studio", &studio_preset(), &options);

        let experience = site.experience.unwrap();
        assert_eq!(experience.id.as_deref(), Some("cinematic"));
        assert!(experience.intro.is_none());
        assert_eq!(
            experience.section_behaviours,
            Some(json!({ "hero": "parallax" }))
        );
        assert!(site.transition.is_none());
    }

    #[test]
    fn test_production_keeps_intro_and_transition() {
        let options = CompileOptions::default().with_content(studio_content());
        let site = build_site_schema_from_preset("studio", &studio_preset(), &options);

        let experience = site.experience.unwrap();
        assert_eq!(experience.intro, Some(json!({ "type": "gate", "text": "Enter" })));
        assert_eq!(site.transition, Some(json!({ "type": "fade", "duration": 400 })));
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: CompileOptions = serde_json::from_value(json!({ "includeIntro": false })).unwrap();
        assert!(!options.include_intro);
        assert!(options.include_transition);
        assert!(options.content.is_none());
    }

    #[test]
    fn test_page_lookup_by_id_slug_and_fallback() {
        let preset = studio_preset();
        let content = studio_content();

        let about = build_page_from_preset(&preset, Some("about"), &content).unwrap();
        assert_eq!(about.id, "about");
        assert_eq!(about.sections[0].widgets[0].props["text"], json!("Since 2009."));

        let by_slug = build_page_from_preset(&preset, Some("/about"), &content).unwrap();
        assert_eq!(by_slug.id, "about");

        let fallback = build_page_from_preset(&preset, Some("missing"), &content).unwrap();
        assert_eq!(fallback.id, "home");
        assert_eq!(fallback.head, Some(json!({ "title": "Home | Atelier" })));

        let unnamed = build_page_from_preset(&preset, None, &content).unwrap();
        assert_eq!(unnamed.id, "home");
    }

    #[test]
    fn test_zero_pages_yields_none() {
        let empty = preset(json!({ "pages": {} }));
        assert!(build_page_from_preset(&empty, Some("home"), &json!({})).is_none());
        assert!(select_page(&empty, None).is_none());
        assert!(build_all_pages(&empty, &json!({})).is_empty());
    }

    #[test]
    fn test_build_all_pages_keeps_declaration_order() {
        let pages = build_all_pages(&studio_preset(), &studio_content());
        let ids: Vec<&str> = pages.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["home", "about"]);
        assert_eq!(pages[0].sections[0].widgets[0].props["text"], json!("Light and form"));
    }

    #[test]
    fn test_missing_content_drops_bound_props() {
        let page = build_page_from_preset(&studio_preset(), Some("about"), &json!({})).unwrap();
        let props = &page.sections[0].widgets[0].props;
        assert!(props.get("text").is_none());
    }

    #[test]
    fn test_compile_leaves_preset_untouched() {
        let preset = studio_preset();
        let before = preset.clone();
        let options = CompileOptions::preview().with_content(studio_content());
        let _ = build_site_schema_from_preset("studio", &preset, &options);
        let _ = build_all_pages(&preset, &studio_content());
        assert_eq!(preset, before);
    }
}
