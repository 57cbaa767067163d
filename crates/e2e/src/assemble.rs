//! Rendering of one consolidated spec file per page

use serde::Serialize;

use courseqa_common::PageDescriptor;

use crate::sanitize::indent;

const SECTION_INDENT: &str = "    ";
const BANNER: &str = "  // ============================================\n";

/// Statements of the shared `beforeEach` every page file opens with
pub(crate) const SHARED_SETUP: &[&str] = &[
    "cy.viewport(1280, 720);",
    "cy.visit(page.url);",
    "cy.window().then((win) => {\n  win.scrollTo(0, 0);\n});",
];

/// Why a topic has no code for a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderReason {
    MissingSpecFile,
    NoMatchFound,
    /// A block was found but nothing remained after cleanup
    EmptyBlock,
}

/// Content of one topic group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicContent {
    /// Code written for this page
    Block(String),
    /// Page-agnostic iteration body, needs review
    Template(String),
    Placeholder(PlaceholderReason),
}

/// One topic group of a generated file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSection {
    pub topic: String,
    pub source: String,
    pub content: TopicContent,
}

/// Paths the generated file uses to load shared code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub extension: String,
    pub registry_import: String,
    pub helpers_import: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            extension: "cy.js".to_string(),
            registry_import: "../../fixtures/pages.json".to_string(),
            helpers_import: "./_helpers".to_string(),
        }
    }
}

/// A rendered page file, not yet written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSpecFile {
    pub page_key: String,
    pub file_name: String,
    pub contents: String,
}

/// Render the full spec file for `page`
pub fn render_page_file(
    page: &PageDescriptor,
    sections: &[TopicSection],
    options: &RenderOptions,
) -> GeneratedSpecFile {
    let mut out = String::new();
    write_header(&mut out, page, options);
    for section in sections {
        write_section(&mut out, section, &page.key);
    }
    out.push_str("});\n");

    GeneratedSpecFile {
        page_key: page.key.clone(),
        file_name: format!("{}.{}", page.key, options.extension),
        contents: out,
    }
}

fn write_header(out: &mut String, page: &PageDescriptor, options: &RenderOptions) {
    let key = js_string(&page.key);
    out.push_str(&format!(
        "/// <reference types=\"cypress\" />

/**
 * All tests for: {name}
 * URL: {url}
 *
 * This file contains all test cases for this page.
 * Page is opened once, then all tests run on it.
 * Generated by courseqa; changes are overwritten on the next run.
 */

// eslint-disable-next-line @typescript-eslint/no-var-requires
const pages = require('{registry}');
const {{ normalizeUrlForCanonical, getModalHelpers, TEST_LEAD, safeBodyText }} = require('{helpers}');

// Get page data
const page = pages.find(p => p.key === '{key}');
if (!page) {{
  throw new Error('Page {key} not found in pages.json');
}}

describe('{title} - All Tests', () => {{
  beforeEach(() => {{
",
        name = doc_comment_text(&page.name),
        url = doc_comment_text(&page.url),
        registry = js_string(&options.registry_import),
        helpers = js_string(&options.helpers_import),
        key = key,
        title = js_string(&page.name),
    ));
    for statement in SHARED_SETUP {
        out.push_str(&indent(statement, "    "));
        out.push('\n');
    }
    out.push_str("  });\n\n");
}

fn write_section(out: &mut String, section: &TopicSection, page_key: &str) {
    out.push_str(BANNER);
    out.push_str(&format!("  // {}\n", line_comment_text(&section.topic)));
    out.push_str(&format!("  // Source: {}\n", line_comment_text(&section.source)));
    out.push_str(BANNER);
    out.push_str(&format!("  describe('{}', () => {{\n", js_string(&section.topic)));

    let source = line_comment_text(&section.source);
    match &section.content {
        TopicContent::Block(text) => out.push_str(&indent(text, SECTION_INDENT)),
        TopicContent::Template(text) => {
            out.push_str(&format!(
                "{}// Fallback template from {}: written for all pages, not only this one.\n",
                SECTION_INDENT, source
            ));
            out.push_str(&format!("{}// Review before relying on it.\n", SECTION_INDENT));
            out.push_str(&indent(text, SECTION_INDENT));
        }
        TopicContent::Placeholder(reason) => {
            let (first, second) = match reason {
                PlaceholderReason::MissingSpecFile => (
                    format!("Note: {} was not found, no tests generated for this topic", source),
                    "Add the spec file and re-run the generator".to_string(),
                ),
                PlaceholderReason::NoMatchFound => (
                    format!("Note: Tests from {} need to be manually integrated", source),
                    format!(
                        "No [{}] group or targetPages.forEach block was found",
                        line_comment_text(page_key)
                    ),
                ),
                PlaceholderReason::EmptyBlock => (
                    format!("Note: Tests from {} need to be manually integrated", source),
                    "The extracted block was empty after removing setup hooks".to_string(),
                ),
            };
            out.push_str(&format!("{}// {}\n", SECTION_INDENT, first));
            out.push_str(&format!("{}// {}", SECTION_INDENT, second));
        }
    }

    out.push_str("\n\n  });\n\n");
}

/// Escape text for a single-quoted JavaScript string
fn js_string(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn line_comment_text(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

fn doc_comment_text(text: &str) -> String {
    line_comment_text(text).replace("*/", "*\\/")
}
