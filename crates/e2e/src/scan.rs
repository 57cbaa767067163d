//! Lexer-aware scanning of spec sources
//!
//! Spec files are JavaScript. Before any delimiter is counted, every byte is
//! classified as code or non-code (comment, string, template text, regex
//! literal). Brace matching and call lookup then only ever look at code bytes,
//! so `'}'` in a string or `/[{]/` in a regex cannot end a block early.

use regex::Regex;

/// Byte positions of an opening delimiter and its matching close
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub open: usize,
    pub close: usize,
}

impl Span {
    /// Text strictly between the delimiters
    pub fn inner<'a>(&self, src: &'a str) -> &'a str {
        &src[self.open + 1..self.close]
    }
}

/// A call expression such as `describe(...)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    /// Start of the callee name
    pub start: usize,
    /// Argument list parentheses
    pub args: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Code,
    LineComment,
    BlockComment,
    Quote(u8),
    Template,
    Regex { in_class: bool },
}

/// Last significant token before the current byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prev {
    Start,
    Punct(u8),
    /// Identifier, number or literal
    Operand,
    /// Keyword after which an expression starts
    Keyword,
}

/// Keywords that may be followed by a regex literal
const EXPRESSION_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "case", "throw", "in", "of", "void", "delete", "new", "yield",
    "await", "else", "do",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Brace,
    TemplateExpr,
}

/// Classified view over one source text
pub struct SourceScan<'a> {
    src: &'a str,
    code: Vec<bool>,
    depth: Vec<u32>,
}

impl<'a> SourceScan<'a> {
    pub fn new(src: &'a str) -> Self {
        let code = classify(src.as_bytes());
        let depth = nesting(src.as_bytes(), &code);
        Self { src, code, depth }
    }

    pub fn src(&self) -> &'a str {
        self.src
    }

    pub fn is_code(&self, pos: usize) -> bool {
        self.code.get(pos).copied().unwrap_or(false)
    }

    /// Delimiter nesting depth in effect just before `pos`
    pub fn depth_at(&self, pos: usize) -> u32 {
        self.depth.get(pos).copied().unwrap_or(0)
    }

    /// Position of the delimiter closing the one at `open`.
    ///
    /// Returns `None` when `open` is not a code delimiter or the source ends
    /// before depth returns to zero.
    pub fn matching(&self, open: usize) -> Option<usize> {
        let bytes = self.src.as_bytes();
        let (opener, closer) = match bytes.get(open)? {
            b'{' => (b'{', b'}'),
            b'(' => (b'(', b')'),
            b'[' => (b'[', b']'),
            _ => return None,
        };
        if !self.is_code(open) {
            return None;
        }

        let mut depth = 0usize;
        for (pos, &b) in bytes.iter().enumerate().skip(open) {
            if !self.code[pos] {
                continue;
            }
            if b == opener {
                depth += 1;
            } else if b == closer {
                depth -= 1;
                if depth == 0 {
                    return Some(pos);
                }
            }
        }
        None
    }

    /// Call sites whose callee matches `pattern`. The pattern must end with
    /// the opening parenthesis. Matches in comments or literals, member calls
    /// (`x.describe(`) and calls with unbalanced arguments are skipped.
    pub fn calls(&self, pattern: &Regex) -> Vec<CallSite> {
        let bytes = self.src.as_bytes();
        pattern
            .find_iter(self.src)
            .filter_map(|m| {
                let open = m.end().checked_sub(1)?;
                if bytes.get(open) != Some(&b'(') || !self.is_code(m.start()) {
                    return None;
                }
                let preceded_by_member = self.src[..m.start()]
                    .chars()
                    .next_back()
                    .is_some_and(|c| c == '.' || c == '$' || c == '_' || c.is_alphanumeric());
                if preceded_by_member {
                    return None;
                }
                let close = self.matching(open)?;
                Some(CallSite {
                    start: m.start(),
                    args: Span { open, close },
                })
            })
            .collect()
    }

    /// Text of the first argument of a call
    pub fn first_arg(&self, call: &CallSite) -> &'a str {
        let bytes = self.src.as_bytes();
        let level = self.depth_at(call.args.open) + 1;
        let end = (call.args.open + 1..call.args.close)
            .find(|&pos| self.code[pos] && bytes[pos] == b',' && self.depth[pos] == level)
            .unwrap_or(call.args.close);
        &self.src[call.args.open + 1..end]
    }

    /// Body braces of the callback passed to a call: the first argument-level
    /// `{` that follows `=>` or a parameter list.
    pub fn callback_body(&self, call: &CallSite) -> Option<Span> {
        let bytes = self.src.as_bytes();
        let level = self.depth_at(call.args.open) + 1;
        let open = (call.args.open + 1..call.args.close).find(|&pos| {
            self.code[pos]
                && bytes[pos] == b'{'
                && self.depth[pos] == level
                && opens_function_body(&self.src[..pos])
        })?;
        let close = self.matching(open)?;
        Some(Span { open, close })
    }

    /// End of the statement formed by a call: just past the closing
    /// parenthesis, or past a `;` on the same line.
    pub fn statement_end(&self, call: &CallSite) -> usize {
        let after = call.args.close + 1;
        let rest = &self.src[after..];
        let trimmed = rest.trim_start_matches([' ', '\t']);
        if trimmed.starts_with(';') {
            after + (rest.len() - trimmed.len()) + 1
        } else {
            after
        }
    }
}

fn opens_function_body(before: &str) -> bool {
    let before = before.trim_end();
    before.ends_with("=>") || before.ends_with(')')
}

/// Whether a `/` seen after `prev` starts a regex literal rather than a division
fn regex_may_start(prev: Prev) -> bool {
    match prev {
        Prev::Start | Prev::Keyword => true,
        Prev::Punct(b) => b"(,=:[!&|?{};+-*%<>~^".contains(&b),
        Prev::Operand => false,
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || !b.is_ascii()
}

fn classify(bytes: &[u8]) -> Vec<bool> {
    let mut code = vec![false; bytes.len()];
    let mut mode = Mode::Code;
    let mut frames: Vec<Frame> = Vec::new();
    let mut prev = Prev::Start;

    let mut pos = 0;
    while pos < bytes.len() {
        let b = bytes[pos];
        let next = bytes.get(pos + 1).copied();

        match mode {
            Mode::Code => match b {
                b'/' if next == Some(b'/') => {
                    mode = Mode::LineComment;
                    pos += 2;
                    continue;
                }
                b'/' if next == Some(b'*') => {
                    mode = Mode::BlockComment;
                    pos += 2;
                    continue;
                }
                b'/' if regex_may_start(prev) => {
                    mode = Mode::Regex { in_class: false };
                    prev = Prev::Operand;
                }
                b'\'' | b'"' => {
                    mode = Mode::Quote(b);
                    prev = Prev::Operand;
                }
                b'`' => {
                    mode = Mode::Template;
                    prev = Prev::Operand;
                }
                b'{' => {
                    frames.push(Frame::Brace);
                    code[pos] = true;
                    prev = Prev::Punct(b);
                }
                b'}' => {
                    if frames.last() == Some(&Frame::TemplateExpr) {
                        frames.pop();
                        mode = Mode::Template;
                    } else {
                        frames.pop();
                        code[pos] = true;
                        prev = Prev::Punct(b);
                    }
                }
                _ if is_word_byte(b) => {
                    let end = bytes[pos..]
                        .iter()
                        .position(|&c| !is_word_byte(c))
                        .map_or(bytes.len(), |n| pos + n);
                    code[pos..end].fill(true);
                    let word = &bytes[pos..end];
                    // `x.return` is a property, not a keyword
                    let member = prev == Prev::Punct(b'.');
                    prev = if !member && EXPRESSION_KEYWORDS.iter().any(|k| k.as_bytes() == word) {
                        Prev::Keyword
                    } else {
                        Prev::Operand
                    };
                    pos = end;
                    continue;
                }
                _ => {
                    code[pos] = true;
                    if !b.is_ascii_whitespace() {
                        prev = Prev::Punct(b);
                    }
                }
            },
            Mode::LineComment => {
                if b == b'\n' {
                    code[pos] = true;
                    mode = Mode::Code;
                }
            }
            Mode::BlockComment => {
                if b == b'*' && next == Some(b'/') {
                    mode = Mode::Code;
                    pos += 2;
                    continue;
                }
            }
            Mode::Quote(quote) => match b {
                b'\\' => {
                    pos += 2;
                    continue;
                }
                b'\n' => mode = Mode::Code,
                _ if b == quote => mode = Mode::Code,
                _ => {}
            },
            Mode::Template => match b {
                b'\\' => {
                    pos += 2;
                    continue;
                }
                b'`' => {
                    mode = Mode::Code;
                    prev = Prev::Operand;
                }
                b'$' if next == Some(b'{') => {
                    frames.push(Frame::TemplateExpr);
                    mode = Mode::Code;
                    prev = Prev::Punct(b'{');
                    pos += 2;
                    continue;
                }
                _ => {}
            },
            Mode::Regex { in_class } => match b {
                b'\\' => {
                    pos += 2;
                    continue;
                }
                b'[' => mode = Mode::Regex { in_class: true },
                b']' => mode = Mode::Regex { in_class: false },
                b'/' if !in_class => mode = Mode::Code,
                b'\n' => mode = Mode::Code,
                _ => {}
            },
        }
        pos += 1;
    }

    code
}

fn nesting(bytes: &[u8], code: &[bool]) -> Vec<u32> {
    let mut depth = Vec::with_capacity(bytes.len());
    let mut current = 0u32;
    for (&b, &is_code) in bytes.iter().zip(code) {
        depth.push(current);
        if is_code {
            match b {
                b'{' | b'(' | b'[' => current += 1,
                b'}' | b')' | b']' => current = current.saturating_sub(1),
                _ => {}
            }
        }
    }
    depth
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn body_of_first_brace(src: &str) -> Option<&str> {
        let scan = SourceScan::new(src);
        let open = src.find('{')?;
        let close = scan.matching(open)?;
        Some(Span { open, close }.inner(src))
    }

    #[test_case("{ if (a) { b(); } c(); } tail", " if (a) { b(); } c(); " ; "nested block")]
    #[test_case("{ s('}'); } tail", " s('}'); " ; "brace in single quotes")]
    #[test_case("{ s(\"}\"); } tail", " s(\"}\"); " ; "brace in double quotes")]
    #[test_case("{ // }\n x(); } tail", " // }\n x(); " ; "brace in line comment")]
    #[test_case("{ /* } */ x(); } tail", " /* } */ x(); " ; "brace in block comment")]
    #[test_case("{ t(`}${ {a: 1}.a }}`); } tail", " t(`}${ {a: 1}.a }}`); " ; "template literal with expression")]
    #[test_case("{ ok = /[}]\\}/.test(s); } tail", " ok = /[}]\\}/.test(s); " ; "brace in regex literal")]
    #[test_case("{ n = a / b; m = {}; } tail", " n = a / b; m = {}; " ; "division is not a regex")]
    #[test_case("{ return /[}]/.test(s); } tail", " return /[}]/.test(s); " ; "regex after return")]
    #[test_case("{ if (typeof /}/ === 'object') {} } tail", " if (typeof /}/ === 'object') {} " ; "regex after typeof")]
    #[test_case("{ x = o.return / 2; y = {}; } tail", " x = o.return / 2; y = {}; " ; "keyword as property divides")]
    #[test_case("{ n = total2 / 2; m = {}; } tail", " n = total2 / 2; m = {}; " ; "identifier with digits divides")]
    fn test_matching_ignores_non_code(src: &str, expected: &str) {
        assert_eq!(body_of_first_brace(src), Some(expected));
    }

    #[test]
    fn test_unbalanced_has_no_match() {
        assert_eq!(body_of_first_brace("{ if (a) { b(); }"), None);
    }

    #[test]
    fn test_calls_skip_comments_strings_and_members() {
        let src = "// describe('x', () => {})\nconst s = 'describe(';\ncy.describe(1);\ndescribe('real', () => {});";
        let scan = SourceScan::new(src);
        let pattern = Regex::new(r"\bdescribe\s*\(").unwrap();
        let calls = scan.calls(&pattern);
        assert_eq!(calls.len(), 1);
        assert_eq!(scan.first_arg(&calls[0]), "'real'");
    }

    #[test]
    fn test_callback_body_skips_options_object() {
        let src = "describe('t', { tags: ['@smoke'] }, () => { it('a', () => {}); });";
        let scan = SourceScan::new(src);
        let pattern = Regex::new(r"\bdescribe\s*\(").unwrap();
        let call = scan.calls(&pattern)[0];
        let body = scan.callback_body(&call).unwrap();
        assert_eq!(body.inner(src), " it('a', () => {}); ");
        assert_eq!(scan.statement_end(&call), src.len());
    }

    #[test]
    fn test_first_arg_stops_at_top_level_comma() {
        let src = "describe(`[${page.key}] Hero, part ${f(1, 2)}`, () => {});";
        let scan = SourceScan::new(src);
        let pattern = Regex::new(r"\bdescribe\s*\(").unwrap();
        let call = scan.calls(&pattern)[0];
        assert_eq!(scan.first_arg(&call), "`[${page.key}] Hero, part ${f(1, 2)}`");
    }
}
