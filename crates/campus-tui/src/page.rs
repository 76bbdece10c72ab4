//! Page loading.

use std::fs;
use std::path::Path;

use campus_core::{CampusError, Result};
use campus_dom::PageSpec;

/// Admission form shown when no page file is given.
pub const DEMO_PAGE: &str = include_str!("../pages/admission.yaml");

/// Load a page description from `path`.
///
/// Files ending in `.json` are parsed as JSON, everything else as YAML.
pub fn load_page(path: &Path) -> Result<PageSpec> {
    let content =
        fs::read_to_string(path).map_err(|e| CampusError::io("read page", path, e))?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let parsed = if is_json {
        PageSpec::from_json_str(&content)
    } else {
        PageSpec::from_yaml_str(&content)
    };
    let page = parsed.map_err(|e| CampusError::page_invalid(path, e.to_string()))?;
    tracing::info!(path = %path.display(), title = %page.title, "Loaded page");
    Ok(page)
}

/// The built-in admission page.
pub fn demo_page() -> Result<PageSpec> {
    PageSpec::from_yaml_str(DEMO_PAGE)
        .map_err(|e| CampusError::page_invalid("<built-in admission page>", e.to_string()))
}
