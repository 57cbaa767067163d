//! Per-page block extraction from topic spec files

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::scan::SourceScan;

pub(crate) static DESCRIBE_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bdescribe\s*\(").expect("valid describe pattern"));

pub(crate) static TARGET_PAGES_FOR_EACH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\btargetPages\s*\.\s*forEach\s*\(").expect("valid forEach pattern")
});

/// Test code taken out of a spec file for one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedBlock {
    pub page_key: String,
    pub text: String,
}

/// Outcome of looking for a page's code in one spec file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Extraction {
    /// Bodies of the groups tagged `[key]`, in source order
    Matched(ExtractedBlock),
    /// Body of the all-pages iteration, not specific to this page
    FallbackTemplate(ExtractedBlock),
    NotFound,
}

impl Extraction {
    pub fn kind(&self) -> &'static str {
        match self {
            Extraction::Matched(_) => "matched",
            Extraction::FallbackTemplate(_) => "fallback",
            Extraction::NotFound => "not_found",
        }
    }
}

/// Find the code written for `page_key` in a spec source.
///
/// Groups whose title contains `[page_key]` win. Without any, the first
/// `targetPages.forEach` callback body is returned verbatim as a template.
pub fn extract_for_page(source: &str, page_key: &str) -> Extraction {
    let scan = SourceScan::new(source);

    let tagged = tagged_bodies(&scan, page_key);
    if !tagged.is_empty() {
        return Extraction::Matched(ExtractedBlock {
            page_key: page_key.to_string(),
            text: tagged.join("\n"),
        });
    }

    let template = scan
        .calls(&TARGET_PAGES_FOR_EACH)
        .iter()
        .find_map(|call| scan.callback_body(call))
        .map(|body| body.inner(source).to_string());

    match template {
        Some(text) => Extraction::FallbackTemplate(ExtractedBlock {
            page_key: page_key.to_string(),
            text,
        }),
        None => Extraction::NotFound,
    }
}

fn tagged_bodies<'a>(scan: &SourceScan<'a>, page_key: &str) -> Vec<&'a str> {
    let tag = format!("[{}]", page_key);
    let mut bodies = Vec::new();
    // Tagged groups nested in an already taken body are part of it.
    let mut taken_until = 0;

    for call in scan.calls(&DESCRIBE_CALL) {
        if call.start < taken_until || !scan.first_arg(&call).contains(&tag) {
            continue;
        }
        if let Some(body) = scan.callback_body(&call) {
            bodies.push(body.inner(scan.src()));
            taken_until = body.close;
        }
    }

    bodies
}
