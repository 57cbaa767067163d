//! Generator configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use courseqa_common::{Locale, PageFilter};

use crate::assemble::RenderOptions;
use crate::error::{GenError, GenResult};

/// Generator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Page registry JSON file
    pub registry_path: PathBuf,

    /// Directory holding the topic spec files
    pub specs_dir: PathBuf,

    /// Directory receiving one file per page
    pub output_dir: PathBuf,

    /// Extension of generated files, without the leading dot
    pub extension: String,

    /// Only generate pages of this locale
    pub locale: Option<Locale>,

    /// Only generate the page with this key
    pub page_key: Option<String>,

    /// Render and report without writing files
    pub dry_run: bool,

    /// Registry path as required from a generated file
    pub registry_import: String,

    /// Shared helpers module as required from a generated file
    pub helpers_import: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let render = RenderOptions::default();
        Self {
            registry_path: PathBuf::from("cypress/fixtures/pages.json"),
            specs_dir: PathBuf::from("cypress/e2e"),
            output_dir: PathBuf::from("cypress/e2e/pages"),
            extension: render.extension,
            locale: None,
            page_key: None,
            dry_run: false,
            registry_import: render.registry_import,
            helpers_import: render.helpers_import,
        }
    }
}

impl GeneratorConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml(text: &str) -> GenResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> GenResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn validate(&self) -> GenResult<()> {
        let extension = self.extension.trim();
        if extension.is_empty() {
            return Err(GenError::Config("extension must not be empty".to_string()));
        }
        if extension.starts_with('.') || extension.contains(['/', '\\']) {
            return Err(GenError::Config(format!(
                "extension '{}' must be a bare suffix such as cy.js",
                self.extension
            )));
        }
        if self.page_key.as_deref().is_some_and(str::is_empty) {
            return Err(GenError::Config("page key filter must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn filter(&self) -> PageFilter {
        PageFilter {
            locale: self.locale,
            key: self.page_key.clone(),
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            extension: self.extension.clone(),
            registry_import: self.registry_import.clone(),
            helpers_import: self.helpers_import.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_suite_layout() {
        let config = GeneratorConfig::default();
        assert_eq!(config.registry_path, PathBuf::from("cypress/fixtures/pages.json"));
        assert_eq!(config.output_dir, PathBuf::from("cypress/e2e/pages"));
        assert_eq!(config.extension, "cy.js");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = GeneratorConfig::from_toml(
            r#"
output_dir = "generated"
locale = "ua-ru"
"#,
        )
        .unwrap();
        assert_eq!(config.output_dir, PathBuf::from("generated"));
        assert_eq!(config.locale, Some(Locale::Secondary));
        assert_eq!(config.specs_dir, PathBuf::from("cypress/e2e"));
        assert_eq!(config.filter().locale, Some(Locale::Secondary));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(matches!(
            GeneratorConfig::from_toml("outptu_dir = \"x\""),
            Err(GenError::Toml(_))
        ));
    }

    #[test]
    fn test_bad_extension_is_rejected() {
        assert!(matches!(
            GeneratorConfig::from_toml("extension = \".cy.js\""),
            Err(GenError::Config(_))
        ));
    }
}
