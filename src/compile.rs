//! Preset Compiler
//!
//! Top-level orchestration: turns a [`SitePreset`] plus a content object into
//! a [`SiteSchema`] and resolved [`PageSchema`]s. Never fails on content
//! drift; an unknown page falls back to the first declared page.

#[cfg(feature = "napi")]
use napi_derive::napi;
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::binding::{resolve_value, BindingScope};
use crate::resolve::{resolve_chrome, resolve_experience, resolve_page, strip_intro};
use crate::schema::{PageRef, PageSchema, SitePreset, SiteSchema};

// ═══════════════════════════════════════════════════════════════════════════════
// OPTIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Compilation options. Both flags default to `true` (the production path);
/// preview and export contexts turn them off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompileOptions {
    pub content: Option<Value>,
    pub include_intro: bool,
    pub include_transition: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            content: None,
            include_intro: true,
            include_transition: true,
        }
    }
}

impl CompileOptions {
    /// Options for preview rendering: no intro gate, no page transition.
    pub fn preview() -> Self {
        CompileOptions {
            include_intro: false,
            include_transition: false,
            ..Default::default()
        }
    }

    pub fn with_content(mut self, content: Value) -> Self {
        self.content = Some(content);
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SITE
// ═══════════════════════════════════════════════════════════════════════════════

/// Build the site-level schema.
///
/// Chrome, head and experience are resolved only when content is supplied;
/// otherwise they pass through with their placeholders intact. Pages are
/// always reduced to `{ id, slug }` references.
pub fn build_site_schema_from_preset(
    preset_id: &str,
    preset: &SitePreset,
    options: &CompileOptions,
) -> SiteSchema {
    // strip before resolving so excluded subtrees are never walked
    let experience = preset.experience.as_ref().map(|experience| {
        if options.include_intro {
            experience.clone()
        } else {
            strip_intro(experience)
        }
    });
    let transition = if options.include_transition {
        preset.transition.clone()
    } else {
        None
    };

    let (head, experience, transition, chrome) = match &options.content {
        Some(content) => {
            let scope = BindingScope::new(content);
            (
                preset.head.as_ref().and_then(|head| resolve_value(head, &scope)),
                experience.map(|experience| resolve_experience(&experience, &scope)),
                transition.and_then(|transition| resolve_value(&transition, &scope)),
                preset.chrome.as_ref().map(|chrome| resolve_chrome(chrome, &scope)),
            )
        }
        None => (
            preset.head.clone(),
            experience,
            transition,
            preset.chrome.clone(),
        ),
    };

    let pages = page_refs(preset);
    info!(
        "compiled site schema {} ({} pages, content: {})",
        preset_id,
        pages.len(),
        options.content.is_some()
    );

    SiteSchema {
        id: preset_id.to_string(),
        theme: preset.theme.clone(),
        head,
        experience,
        transition,
        chrome,
        pages,
    }
}

pub fn page_refs(preset: &SitePreset) -> Vec<PageRef> {
    preset
        .pages
        .iter()
        .map(|(key, page)| {
            let id = page_id(key, page);
            let slug = if page.slug.is_empty() {
                id.clone()
            } else {
                page.slug.clone()
            };
            PageRef { id, slug }
        })
        .collect()
}

fn page_id(key: &str, page: &PageSchema) -> String {
    if page.id.is_empty() {
        key.to_string()
    } else {
        page.id.clone()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PAGES
// ═══════════════════════════════════════════════════════════════════════════════

/// Pick a page by id key, then by slug, falling back to the first page in
/// declaration order. `None` only when the preset has no pages.
pub fn select_page<'p>(
    preset: &'p SitePreset,
    page_id_or_slug: Option<&str>,
) -> Option<(&'p String, &'p PageSchema)> {
    if let Some(wanted) = page_id_or_slug {
        if let Some(found) = preset.pages.get_key_value(wanted) {
            return Some(found);
        }
        let wanted_slug = wanted.trim_start_matches('/');
        if let Some(found) = preset
            .pages
            .iter()
            .find(|(_, page)| !page.slug.is_empty() && page.slug.trim_start_matches('/') == wanted_slug)
        {
            return Some(found);
        }
        debug!("page {} not found; falling back to the first page", wanted);
    }
    preset.pages.first()
}

pub fn build_page_from_preset(
    preset: &SitePreset,
    page_id_or_slug: Option<&str>,
    content: &Value,
) -> Option<PageSchema> {
    let (key, page) = select_page(preset, page_id_or_slug)?;
    Some(compile_page(key, page, content))
}

/// Resolve every page in declaration order. Pages share nothing, so they are
/// resolved in parallel.
pub fn build_all_pages(preset: &SitePreset, content: &Value) -> Vec<PageSchema> {
    let entries: Vec<(&String, &PageSchema)> = preset.pages.iter().collect();
    entries
        .par_iter()
        .map(|(key, page)| compile_page(key, page, content))
        .collect()
}

fn compile_page(key: &str, page: &PageSchema, content: &Value) -> PageSchema {
    let scope = BindingScope::new(content);
    let mut resolved = resolve_page(page, &scope);
    resolved.id = page_id(key, page);
    if resolved.slug.is_empty() {
        resolved.slug = resolved.id.clone();
    }
    debug!(
        "resolved page {} ({} sections)",
        resolved.id,
        resolved.sections.len()
    );
    resolved
}

// ═══════════════════════════════════════════════════════════════════════════════
// NATIVE BRIDGE
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "napi")]
#[napi]
pub fn build_site_schema_native(
    preset_id: String,
    preset_json: String,
    options_json: Option<String>,
) -> napi::Result<String> {
    let preset: SitePreset = serde_json::from_str(&preset_json)
        .map_err(|e| napi::Error::from_reason(format!("Preset parse error: {}", e)))?;
    let options: CompileOptions = match options_json {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| napi::Error::from_reason(format!("Options parse error: {}", e)))?,
        None => CompileOptions::default(),
    };
    let site = build_site_schema_from_preset(&preset_id, &preset, &options);
    serde_json::to_string(&site)
        .map_err(|e| napi::Error::from_reason(format!("Serialize error: {}", e)))
}

#[cfg(feature = "napi")]
#[napi]
pub fn build_page_native(
    preset_json: String,
    page_id_or_slug: Option<String>,
    content_json: String,
) -> napi::Result<Option<String>> {
    let preset: SitePreset = serde_json::from_str(&preset_json)
        .map_err(|e| napi::Error::from_reason(format!("Preset parse error: {}", e)))?;
    let content: Value = serde_json::from_str(&content_json)
        .map_err(|e| napi::Error::from_reason(format!("Content parse error: {}", e)))?;
    build_page_from_preset(&preset, page_id_or_slug.as_deref(), &content)
        .map(|page| {
            serde_json::to_string(&page)
                .map_err(|e| napi::Error::from_reason(format!("Serialize error: {}", e)))
        })
        .transpose()
}
