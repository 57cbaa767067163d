//! Cleanup of extracted blocks before they are embedded in a page file

use once_cell::sync::Lazy;
use regex::Regex;

use crate::assemble::SHARED_SETUP;
use crate::extract::{DESCRIBE_CALL, TARGET_PAGES_FOR_EACH};
use crate::scan::{CallSite, SourceScan, Span};

static BEFORE_EACH_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bbeforeEach\s*\(").expect("valid beforeEach pattern"));

/// Head of a `cy.<command>(` statement
static CY_COMMAND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bcy\s*\.\s*\w+\s*\(").expect("valid cy command pattern"));

/// A title starting with a `[...]` page tag, literal or templated
static PAGE_TAG_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*[`'"]\s*\[[^\]\s]+\]"#).expect("valid page tag pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
enum Strip {
    /// Replace the call with its callback body
    Unwrap,
    /// Drop the call statement
    Remove,
    /// Keep the hook without these byte ranges of its body
    Trim(Vec<(usize, usize)>),
}

/// Remove top-level page iteration wrappers and page-tagged group wrappers,
/// drop the statements of top-level `beforeEach` hooks that repeat the shared
/// page setup, then strip the common indentation.
///
/// A hook left with no code is removed. Everything else, assertions
/// included, is kept byte for byte.
pub fn sanitize(block: &str) -> String {
    let mut text = block.to_string();
    while let Some(next) = strip_first_wrapper(&text) {
        text = next;
    }
    dedent(&text)
}

fn strip_first_wrapper(text: &str) -> Option<String> {
    let scan = SourceScan::new(text);

    let unwrappable = scan
        .calls(&TARGET_PAGES_FOR_EACH)
        .into_iter()
        .chain(
            scan.calls(&DESCRIBE_CALL)
                .into_iter()
                .filter(|call| PAGE_TAG_TITLE.is_match(scan.first_arg(call))),
        )
        .filter(|call| scan.callback_body(call).is_some())
        .map(|call| (call, Strip::Unwrap));
    let hooks = scan
        .calls(&BEFORE_EACH_CALL)
        .into_iter()
        .filter_map(|call| hook_strip(&scan, &call).map(|strip| (call, strip)));

    let (call, strip) = unwrappable
        .chain(hooks)
        .filter(|(call, _)| scan.depth_at(call.start) == 0)
        .min_by_key(|(call, _)| call.start)?;

    Some(apply(&scan, &call, strip))
}

/// What to do with a `beforeEach` hook, or `None` to leave it as is
fn hook_strip(scan: &SourceScan<'_>, call: &CallSite) -> Option<Strip> {
    let body = scan.callback_body(call)?;
    let duplicated = shared_setup_statements(scan, body);
    let rest = without_ranges(scan.src(), body.open + 1, body.close, &duplicated);
    if !has_code(&rest) {
        Some(Strip::Remove)
    } else if duplicated.is_empty() {
        None
    } else {
        Some(Strip::Trim(duplicated))
    }
}

/// Whole-line ranges of the hook body statements that the shared setup
/// already runs
fn shared_setup_statements(scan: &SourceScan<'_>, body: Span) -> Vec<(usize, usize)> {
    let text = scan.src();
    let bytes = text.as_bytes();
    let level = scan.depth_at(body.open) + 1;

    scan.calls(&CY_COMMAND)
        .into_iter()
        .filter(|call| call.start > body.open && call.start < body.close)
        .filter(|call| scan.depth_at(call.start) == level && starts_statement(scan, body.open, call.start))
        .filter_map(|call| {
            let end = (call.start..body.close)
                .find(|&pos| scan.is_code(pos) && bytes[pos] == b';' && scan.depth_at(pos) == level)
                .map_or(body.close, |semi| semi + 1);
            is_shared_setup(&text[call.start..end]).then(|| widen_to_lines(text, call.start, end))
        })
        .collect()
}

fn starts_statement(scan: &SourceScan<'_>, open: usize, pos: usize) -> bool {
    let bytes = scan.src().as_bytes();
    (open..pos)
        .rev()
        .find(|&p| scan.is_code(p) && !bytes[p].is_ascii_whitespace())
        .is_some_and(|p| matches!(bytes[p], b'{' | b';' | b'}'))
}

fn is_shared_setup(statement: &str) -> bool {
    let statement = squash(statement);
    SHARED_SETUP.iter().any(|shared| squash(shared) == statement)
}

/// Statement text without whitespace or a trailing `;`
fn squash(statement: &str) -> String {
    let squashed: String = statement.chars().filter(|c| !c.is_whitespace()).collect();
    squashed.trim_end_matches(';').to_string()
}

fn without_ranges(text: &str, from: usize, to: usize, ranges: &[(usize, usize)]) -> String {
    let mut out = String::new();
    let mut cursor = from;
    for &(start, end) in ranges {
        out.push_str(&text[cursor..start]);
        cursor = end;
    }
    out.push_str(&text[cursor..to]);
    out
}

fn has_code(text: &str) -> bool {
    let scan = SourceScan::new(text);
    text.bytes()
        .enumerate()
        .any(|(pos, b)| scan.is_code(pos) && !b.is_ascii_whitespace())
}

fn apply(scan: &SourceScan<'_>, call: &CallSite, strip: Strip) -> String {
    let text = scan.src();
    let body = scan.callback_body(call);

    if let (Strip::Trim(ranges), Some(body)) = (&strip, body) {
        let own_indent = line_indent(text, call.start);
        let rest = without_ranges(text, body.open + 1, body.close, ranges);
        return format!(
            "{}\n{}\n{}{}",
            &text[..=body.open],
            indent(&dedent(&rest), &format!("{}  ", own_indent)),
            own_indent,
            &text[body.close..]
        );
    }

    let (start, end) = widen_to_lines(text, call.start, scan.statement_end(call));
    let replacement = match (strip, body) {
        (Strip::Unwrap, Some(body)) => {
            let mut inner = indent(&dedent(body.inner(text)), line_indent(text, call.start));
            if !inner.is_empty() && text[..end].ends_with('\n') {
                inner.push('\n');
            }
            inner
        }
        _ => String::new(),
    };

    format!("{}{}{}", &text[..start], replacement, &text[end..])
}

/// Extend a range to whole lines when only whitespace lies outside it
fn widen_to_lines(text: &str, start: usize, end: usize) -> (usize, usize) {
    let line_start = text[..start].rfind('\n').map_or(0, |i| i + 1);
    let start = if text[line_start..start].trim().is_empty() {
        line_start
    } else {
        start
    };

    let line_end = text[end..].find('\n').map_or(text.len(), |i| end + i + 1);
    let end = if text[end..line_end].trim().is_empty() {
        line_end
    } else {
        end
    };

    (start, end)
}

fn line_indent(text: &str, pos: usize) -> &str {
    let line_start = text[..pos].rfind('\n').map_or(0, |i| i + 1);
    let line = &text[line_start..];
    &line[..line.len() - line.trim_start_matches([' ', '\t']).len()]
}

/// Strip leading and trailing blank lines, trailing whitespace at the very
/// end, and the indentation shared by all non-blank lines. Blank lines become
/// empty.
pub fn dedent(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let first = lines.iter().position(|l| !l.trim().is_empty());
    let last = lines.iter().rposition(|l| !l.trim().is_empty());
    let (first, last) = match (first, last) {
        (Some(first), Some(last)) => (first, last),
        _ => return String::new(),
    };
    let lines = &lines[first..=last];

    let common = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);

    let joined = lines
        .iter()
        .map(|l| if l.trim().is_empty() { "" } else { &l[common..] })
        .collect::<Vec<_>>()
        .join("\n");
    joined.trim_end().to_string()
}

/// Prefix every non-empty line
pub fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|l| {
            if l.is_empty() {
                String::new()
            } else {
                format!("{}{}", prefix, l)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
