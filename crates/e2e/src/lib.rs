//! CourseQA spec generator
//!
//! Turns topic-organised browser spec files into one spec file per landing
//! page:
//! - Loads the page registry and selects pages by locale and key
//! - Scans each topic file for groups tagged `[page-key]`, falling back to the
//!   all-pages `targetPages.forEach` body
//! - Strips wrappers and duplicated setup hooks from the extracted code
//! - Renders and writes `<key>.<extension>` per page
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Generator                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  load_registry() -> select_pages()                          │
//! │  SpecSource::read() for every SpecFileDescriptor            │
//! │  per page, per topic:                                       │
//! │    extract_for_page() -> Matched | FallbackTemplate |       │
//! │                          NotFound                           │
//! │    sanitize()                                               │
//! │  render_page_file() -> GeneratedSpecFile -> write           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod assemble;
pub mod config;
pub mod error;
pub mod extract;
pub mod generator;
pub mod sanitize;
pub mod scan;
pub mod spec;

pub use assemble::{render_page_file, GeneratedSpecFile, PlaceholderReason, TopicContent, TopicSection};
pub use config::GeneratorConfig;
pub use error::{GenError, GenResult};
pub use extract::{extract_for_page, ExtractedBlock, Extraction};
pub use generator::{GenerationReport, Generator, PageReport};
pub use spec::{SpecFileDescriptor, SpecSource, SPEC_FILES};
