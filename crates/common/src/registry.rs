//! Page registry loading and page selection

use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::types::{Locale, PageDescriptor, PageFilter};

/// Ordered set of pages under test
#[derive(Debug, Clone)]
pub struct Registry {
    path: PathBuf,
    pages: Vec<PageDescriptor>,
    warnings: Vec<String>,
}

impl Registry {
    /// Parse registry JSON. `path` is only used in error messages.
    pub fn from_json(path: impl Into<PathBuf>, json: &str) -> Result<Self> {
        let path = path.into();

        let value: Value = serde_json::from_str(json)
            .map_err(|e| Error::malformed(&path, format!("invalid JSON: {}", e)))?;

        let entries = match value {
            Value::Array(entries) => entries,
            other => {
                return Err(Error::malformed(
                    &path,
                    format!("expected an array of pages, found {}", json_kind(&other)),
                ))
            }
        };

        let mut pages = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            let page: PageDescriptor = serde_json::from_value(entry)
                .map_err(|e| Error::malformed(&path, format!("page #{}: {}", index, e)))?;
            pages.push(page);
        }

        let warnings = validate(&path, &pages)?;
        for warning in &warnings {
            warn!("{}", warning);
        }

        Ok(Self {
            path,
            pages,
            warnings,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn pages(&self) -> &[PageDescriptor] {
        &self.pages
    }

    /// Non-fatal validation findings
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Read and parse the registry file
pub fn load_registry(path: &Path) -> Result<Registry> {
    debug!("Loading page registry from {}", path.display());
    let json = std::fs::read_to_string(path)
        .map_err(|e| Error::malformed(path, format!("cannot read file: {}", e)))?;
    Registry::from_json(path, &json)
}

/// Apply the locale filter, then the key filter, keeping registry order
pub fn select_pages<'a>(registry: &'a Registry, filter: &PageFilter) -> Vec<&'a PageDescriptor> {
    registry
        .pages()
        .iter()
        .filter(|page| filter.matches(page))
        .collect()
}

/// Check registry invariants. Key and URL violations are fatal; a URL whose
/// path disagrees with the declared locale is returned as a warning.
fn validate(path: &Path, pages: &[PageDescriptor]) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut warnings = Vec::new();

    for page in pages {
        if page.key.is_empty() {
            return Err(Error::malformed(path, format!("page '{}' has an empty key", page.name)));
        }
        if !is_safe_file_stem(&page.key) {
            return Err(Error::malformed(
                path,
                format!("page key '{}' cannot be used as a file name", page.key),
            ));
        }
        if !seen.insert(page.key.as_str()) {
            return Err(Error::malformed(path, format!("duplicate page key '{}'", page.key)));
        }

        let url = url::Url::parse(&page.url).map_err(|e| {
            Error::malformed(path, format!("page '{}' has invalid url '{}': {}", page.key, page.url, e))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(Error::malformed(
                path,
                format!("page '{}' url must be http(s), got '{}'", page.key, url.scheme()),
            ));
        }

        let implied = Locale::from_path(url.path());
        if implied != page.locale {
            warnings.push(format!(
                "page '{}' is declared {} but its url path suggests {}",
                page.key, page.locale, implied
            ));
        }
    }

    Ok(warnings)
}

fn is_safe_file_stem(key: &str) -> bool {
    key != "." && key != ".." && !key.contains(['/', '\\', '\0'])
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
