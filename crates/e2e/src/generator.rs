//! Generation pass: registry in, one spec file per page out

use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use courseqa_common::{load_registry, select_pages, PageDescriptor};

use crate::assemble::{render_page_file, PlaceholderReason, TopicContent, TopicSection};
use crate::config::GeneratorConfig;
use crate::error::{GenError, GenResult};
use crate::extract::{extract_for_page, Extraction};
use crate::sanitize::sanitize;
use crate::spec::{SpecFileDescriptor, SpecSource, SPEC_FILES};

/// Outcome for one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageReport {
    pub key: String,
    pub name: String,
    pub path: PathBuf,
    pub written: bool,
    pub matched: usize,
    pub fallback: usize,
    pub placeholders: usize,
}

impl PageReport {
    fn new(page: &PageDescriptor, path: PathBuf, written: bool, sections: &[TopicSection]) -> Self {
        let count = |f: fn(&TopicContent) -> bool| sections.iter().filter(|s| f(&s.content)).count();
        Self {
            key: page.key.clone(),
            name: page.name.clone(),
            path,
            written,
            matched: count(|c| matches!(c, TopicContent::Block(_))),
            fallback: count(|c| matches!(c, TopicContent::Template(_))),
            placeholders: count(|c| matches!(c, TopicContent::Placeholder(_))),
        }
    }

    /// Whether every topic came from this page's own tagged groups
    pub fn is_complete(&self) -> bool {
        self.fallback == 0 && self.placeholders == 0
    }
}

/// Outcome of a whole run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub registry: PathBuf,
    pub output_dir: PathBuf,
    pub dry_run: bool,
    pub pages: Vec<PageReport>,
    /// Every degraded case, in the order it was found
    pub warnings: Vec<String>,
}

impl GenerationReport {
    pub fn total(&self) -> usize {
        self.pages.len()
    }

    pub fn degraded_pages(&self) -> usize {
        self.pages.iter().filter(|p| !p.is_complete()).count()
    }
}

/// Build the topic groups for one page from already read sources
pub fn build_sections(page_key: &str, sources: &[SpecSource]) -> Vec<TopicSection> {
    sources
        .iter()
        .map(|source| {
            let content = match &source.text {
                None => TopicContent::Placeholder(PlaceholderReason::MissingSpecFile),
                Some(text) => match extract_for_page(text, page_key) {
                    Extraction::Matched(block) => cleaned(&block.text, TopicContent::Block),
                    Extraction::FallbackTemplate(block) => cleaned(&block.text, TopicContent::Template),
                    Extraction::NotFound => TopicContent::Placeholder(PlaceholderReason::NoMatchFound),
                },
            };
            TopicSection {
                topic: source.descriptor.topic.to_string(),
                source: source.descriptor.filename.to_string(),
                content,
            }
        })
        .collect()
}

fn cleaned(raw: &str, wrap: fn(String) -> TopicContent) -> TopicContent {
    let text = sanitize(raw);
    if text.is_empty() {
        TopicContent::Placeholder(PlaceholderReason::EmptyBlock)
    } else {
        wrap(text)
    }
}

/// Regenerates per-page spec files
pub struct Generator {
    config: GeneratorConfig,
    spec_files: Vec<SpecFileDescriptor>,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            spec_files: SPEC_FILES.to_vec(),
        }
    }

    /// Replace the topic file list
    pub fn with_spec_files(mut self, spec_files: Vec<SpecFileDescriptor>) -> Self {
        self.spec_files = spec_files;
        self
    }

    /// Read every topic file once. Unreadable files become missing sources
    /// and are recorded in `warnings`.
    pub fn load_sources(&self, warnings: &mut Vec<String>) -> Vec<SpecSource> {
        self.spec_files
            .iter()
            .map(|&descriptor| match SpecSource::read(&self.config.specs_dir, descriptor) {
                Ok(source) => {
                    debug!("Read {}", source.path.display());
                    source
                }
                Err(e) => {
                    let message = match &e {
                        GenError::MissingSpecFile { .. } => e.to_string(),
                        other => format!("Cannot read {}: {}", descriptor.filename, other),
                    };
                    warn!("{}; topic '{}' gets placeholders", message, descriptor.topic);
                    warnings.push(message);
                    SpecSource::missing(&self.config.specs_dir, descriptor)
                }
            })
            .collect()
    }

    /// Run the whole pass. Fails only when the configuration is invalid, the
    /// registry cannot be loaded, or the output directory cannot be created.
    /// A page file that cannot be written is reported and the run goes on.
    pub fn run(&self) -> GenResult<GenerationReport> {
        self.config.validate()?;
        info!("Generating page-specific test files...");

        let registry = load_registry(&self.config.registry_path)?;
        let mut warnings: Vec<String> = registry.warnings().to_vec();

        let pages = select_pages(&registry, &self.config.filter());
        info!("Found {} pages, {} selected", registry.len(), pages.len());
        if pages.is_empty() {
            let message = if registry.is_empty() {
                format!("Registry {} lists no pages", registry.path().display())
            } else {
                "No pages match the current locale/key filter".to_string()
            };
            warn!("{}", message);
            warnings.push(message);
        }

        let sources = self.load_sources(&mut warnings);

        if !self.config.dry_run {
            std::fs::create_dir_all(&self.config.output_dir)?;
        }

        let options = self.config.render_options();
        let mut reports = Vec::with_capacity(pages.len());

        for page in pages {
            info!("Generating tests for: {} ({})...", page.name, page.key);
            let sections = build_sections(&page.key, &sources);
            for section in &sections {
                if let Some(message) = degraded_message(&page.key, section) {
                    warn!("{}", message);
                    warnings.push(message);
                }
            }

            let file = render_page_file(page, &sections, &options);
            let path = self.config.output_dir.join(&file.file_name);
            let written = if self.config.dry_run {
                info!("  Would write: {}", path.display());
                false
            } else {
                match std::fs::write(&path, &file.contents) {
                    Ok(()) => {
                        info!("  Created: {}", path.display());
                        true
                    }
                    Err(e) => {
                        let message = format!("[{}] cannot write {}: {}", page.key, path.display(), e);
                        warn!("{}", message);
                        warnings.push(message);
                        false
                    }
                }
            };

            reports.push(PageReport::new(page, path, written, &sections));
        }

        info!(
            "Done! Generated {} page test files",
            reports.iter().filter(|r| r.written || self.config.dry_run).count()
        );
        warn!("Generated files may need manual adjustments; review and test each file before using it");

        Ok(GenerationReport {
            registry: registry.path().to_path_buf(),
            output_dir: self.config.output_dir.clone(),
            dry_run: self.config.dry_run,
            pages: reports,
            warnings,
        })
    }
}

fn degraded_message(page_key: &str, section: &TopicSection) -> Option<String> {
    match &section.content {
        TopicContent::Block(_) => None,
        // Already reported once when the sources were read.
        TopicContent::Placeholder(PlaceholderReason::MissingSpecFile) => None,
        TopicContent::Template(_) => Some(format!(
            "[{}] {}: no page-tagged group, used the all-pages template",
            page_key, section.source
        )),
        TopicContent::Placeholder(PlaceholderReason::NoMatchFound) => Some(format!(
            "[{}] {}: no matching tests found, placeholder emitted",
            page_key, section.source
        )),
        TopicContent::Placeholder(PlaceholderReason::EmptyBlock) => Some(format!(
            "[{}] {}: extracted block was empty, placeholder emitted",
            page_key, section.source
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn source(filename: &'static str, text: Option<&str>) -> SpecSource {
        SpecSource {
            descriptor: SpecFileDescriptor::new(filename, "Topic"),
            path: Path::new("specs").join(filename),
            text: text.map(str::to_string),
        }
    }

    #[test]
    fn test_build_sections_branches_on_extraction() {
        let sources = vec![
            source("a.cy.js", Some("describe('[k] A', () => { it('own', () => {}); });")),
            source(
                "b.cy.js",
                Some("targetPages.forEach((page) => { it('shared', () => {}); });"),
            ),
            source("c.cy.js", Some("describe('plain', () => {});")),
            source("d.cy.js", None),
            source("e.cy.js", Some("describe('[k] E', () => { beforeEach(() => {}); });")),
        ];

        let sections = build_sections("k", &sources);
        assert_eq!(sections[0].content, TopicContent::Block("it('own', () => {});".to_string()));
        assert_eq!(sections[1].content, TopicContent::Template("it('shared', () => {});".to_string()));
        assert_eq!(sections[2].content, TopicContent::Placeholder(PlaceholderReason::NoMatchFound));
        assert_eq!(sections[3].content, TopicContent::Placeholder(PlaceholderReason::MissingSpecFile));
        assert_eq!(sections[4].content, TopicContent::Placeholder(PlaceholderReason::EmptyBlock));

        let messages: Vec<_> = sections.iter().filter_map(|s| degraded_message("k", s)).collect();
        assert_eq!(messages.len(), 3);
        assert!(messages[0].contains("b.cy.js"));
    }
}
