//! Command-line arguments and configuration layering

use clap::Parser;
use std::path::PathBuf;

use courseqa_common::Locale;
use courseqa_e2e::{GenResult, GeneratorConfig};

use crate::output::OutputFormat;

/// CourseQA - per-page spec generator for course landing pages
#[derive(Parser, Debug)]
#[command(name = "courseqa")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// TOML config file; flags override its values
    #[arg(long, env = "COURSEQA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Page registry JSON file
    #[arg(long, env = "COURSEQA_REGISTRY")]
    pub registry: Option<PathBuf>,

    /// Directory holding the topic spec files
    #[arg(long, env = "COURSEQA_SPECS_DIR")]
    pub specs_dir: Option<PathBuf>,

    /// Directory receiving the generated page files
    #[arg(long, env = "COURSEQA_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Extension of generated files
    #[arg(long, env = "COURSEQA_EXTENSION")]
    pub extension: Option<String>,

    /// Only generate pages of this locale (ua or ua-ru)
    #[arg(long, env = "COURSEQA_LOCALE")]
    pub locale: Option<Locale>,

    /// Only generate the page with this key
    #[arg(long = "page", env = "COURSEQA_PAGE")]
    pub page_key: Option<String>,

    /// Render and report without writing files
    #[arg(long)]
    pub dry_run: bool,

    /// Summary format
    #[arg(long, default_value = "table")]
    pub format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Defaults, then the config file, then flags and environment
    pub fn generator_config(&self) -> GenResult<GeneratorConfig> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::from_file(path)?,
            None => GeneratorConfig::default(),
        };

        if let Some(registry) = &self.registry {
            config.registry_path = registry.clone();
        }
        if let Some(specs_dir) = &self.specs_dir {
            config.specs_dir = specs_dir.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = output_dir.clone();
        }
        if let Some(extension) = &self.extension {
            config.extension = extension.clone();
        }
        if self.locale.is_some() {
            config.locale = self.locale;
        }
        if self.page_key.is_some() {
            config.page_key = self.page_key.clone();
        }
        if self.dry_run {
            config.dry_run = true;
        }

        config.validate()?;
        Ok(config)
    }
}
