//! # Preset Engine Ground Truth
//!
//! ## Resolution Invariants
//!
//! 1. **Content Is Data**: presets hold `{{ content.path }}` and `{{ item.path }}`
//!    placeholders. Resolution substitutes them; it never evaluates anything else.
//!
//! 2. **Type Preservation**: a string that is exactly one binding becomes the
//!    bound value unchanged (number, boolean, array, object). Bindings embedded
//!    in surrounding text are substituted as text.
//!
//! 3. **Fail Soft**: a missing path resolves to absent. Absent object members
//!    are dropped, absent array elements become `null`, and an unknown page
//!    falls back to the first declared page. Content drift never aborts a build.
//!
//! 4. **Repeat Expansion**: a widget carrying `__repeat` is replaced in place by
//!    one clone per source item that passes its `condition`. Clone ids are
//!    `{id}-{index}` using the source array index, applied to every descendant.
//!
//! 5. **Scope Rules**: `content.*` always reads the root content object;
//!    `item.*` reads the innermost repeat item, `item.$index` its index.
//!    Outside a repeat, `item.*` is absent.
//!
//! 6. **Contract Exclusivity**: two content mounts may not declare the same
//!    absolute path (`PathCollision`). Structural claims are first-wins, and
//!    unclaimed fields land in the `other` node.
//!
//! 7. **Render Ready**: resolved schemas carry no `__repeat` keys and no binding
//!    text (`PE001`..`PE005`, see [`validate`]).

#[cfg(feature = "napi")]
use napi_derive::napi;

pub mod binding;
pub mod builder;
pub mod compile;
pub mod contract;
pub mod discovery;
pub mod error;
pub mod logging;
pub mod registry;
pub mod resolve;
pub mod schema;
pub mod structure;
pub mod validate;
pub mod widgets;

#[cfg(test)]
mod compile_tests;
#[cfg(test)]
mod safety_tests;

pub use binding::{resolve_string, resolve_value, BindingScope};
pub use compile::{
    build_all_pages, build_page_from_preset, build_site_schema_from_preset, CompileOptions,
};
pub use contract::{aggregate_contract, ContentContract, ContentMount, ContentSourceField};
pub use error::{ContractError, EngineError, EngineResult};
pub use registry::WidgetRegistry;
pub use schema::{PageSchema, SitePreset, SiteSchema, WidgetSchema};
pub use structure::{build_structural_tree, StructuralNode};
pub use validate::{verify_page, verify_site, RenderIssue};
pub use widgets::process_widgets;

#[cfg(feature = "napi")]
pub use compile::{build_page_native, build_site_schema_native};
#[cfg(feature = "napi")]
pub use contract::aggregate_contract_native;
#[cfg(feature = "napi")]
pub use structure::build_structural_tree_native;

#[cfg(feature = "napi")]
#[napi]
pub fn compile_bridge() -> String {
    "Preset Engine Native Bridge Connected".to_string()
}
