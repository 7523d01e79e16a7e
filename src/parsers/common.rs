//! Shared scanning machinery for the line-based parsers.
//!
//! The brace-family parsers (C, C++, C#, Java, Go, PHP, Rust, JS/TS) all run
//! the same core loop: scrub each line of comments and string contents, match
//! declaration patterns against what is left, and track brace depth to find
//! where blocks end. The pieces of that loop live here; each parser supplies
//! its own pattern grammar.

use super::Declaration;

// ---------------------------------------------------------------------------
// Line scrubbing
// ---------------------------------------------------------------------------

/// How single quotes behave in the language being scrubbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingleQuote {
    /// `'...'` is a full string literal (JS, PHP).
    Text,
    /// `'x'` is a short character literal; a lone quote is left alone
    /// (C family, and Rust where it may be a lifetime).
    CharLiteral,
    /// Single quotes carry no special meaning.
    Plain,
}

/// Options controlling [`CodeScrubber`].
#[derive(Debug, Clone, Copy)]
pub struct ScrubOptions {
    /// Treat `//` as a line comment.
    pub slash_comments: bool,
    /// Treat `#` as a line comment.
    pub hash_comments: bool,
    /// Block comment delimiters, e.g. `("/*", "*/")` or `("#=", "=#")`.
    pub block_delims: Option<(&'static str, &'static str)>,
    /// Single-quote handling.
    pub single_quote: SingleQuote,
    /// Track backtick template literals (JS/TS).
    pub template_literals: bool,
}

/// Streaming comment/string remover.
///
/// `scrub` consumes one line at a time and returns the line with comments
/// and string contents removed (string delimiters are kept so the shape of
/// the code survives). Block-comment and template-literal state carries
/// across lines; multi-line plain strings do not, which is an accepted
/// imprecision of line scanning.
pub struct CodeScrubber {
    opts: ScrubOptions,
    in_block_comment: bool,
    in_template: bool,
}

impl CodeScrubber {
    pub fn new(opts: ScrubOptions) -> Self {
        Self {
            opts,
            in_block_comment: false,
            in_template: false,
        }
    }

    /// Scrubber for the C family: `//`, `/* */`, double-quoted strings,
    /// short character literals.
    pub fn c_family() -> Self {
        Self::new(ScrubOptions {
            slash_comments: true,
            hash_comments: false,
            block_delims: Some(("/*", "*/")),
            single_quote: SingleQuote::CharLiteral,
            template_literals: false,
        })
    }

    /// Scrubber for JS/TS: adds single-quoted strings and template literals.
    pub fn javascript() -> Self {
        Self::new(ScrubOptions {
            slash_comments: true,
            hash_comments: false,
            block_delims: Some(("/*", "*/")),
            single_quote: SingleQuote::Text,
            template_literals: true,
        })
    }

    /// Scrubber for PHP: `//`, `#`, `/* */`, both quote styles.
    pub fn php() -> Self {
        Self::new(ScrubOptions {
            slash_comments: true,
            hash_comments: true,
            block_delims: Some(("/*", "*/")),
            single_quote: SingleQuote::Text,
            template_literals: false,
        })
    }

    /// Scrubber for Julia: `#` line comments and `#= =#` blocks.
    pub fn julia() -> Self {
        Self::new(ScrubOptions {
            slash_comments: false,
            hash_comments: true,
            block_delims: Some(("#=", "=#")),
            single_quote: SingleQuote::CharLiteral,
            template_literals: false,
        })
    }

    /// True while positioned inside a block comment.
    pub fn in_block_comment(&self) -> bool {
        self.in_block_comment
    }

    /// True while positioned inside an unterminated template literal.
    pub fn in_template(&self) -> bool {
        self.in_template
    }

    /// Remove comments and string contents from one line.
    pub fn scrub(&mut self, line: &str) -> String {
        let chars: Vec<char> = line.chars().collect();
        let n = chars.len();
        let mut out = String::with_capacity(line.len());
        let mut i = 0;

        while i < n {
            if self.in_block_comment {
                let (_, close) = self.opts.block_delims.unwrap_or(("/*", "*/"));
                match find_from(&chars, i, close) {
                    Some(pos) => {
                        i = pos + close.chars().count();
                        self.in_block_comment = false;
                    }
                    None => return out,
                }
                continue;
            }

            if self.in_template {
                match find_unescaped(&chars, i, '`') {
                    Some(pos) => {
                        i = pos + 1;
                        self.in_template = false;
                        out.push('`');
                    }
                    None => return out,
                }
                continue;
            }

            let c = chars[i];

            // Block comment open? Checked before `#` so Julia's `#=` wins
            // over its `#` line comment.
            if let Some((open, close)) = self.opts.block_delims {
                if starts_at(&chars, i, open) {
                    match find_from(&chars, i + open.chars().count(), close) {
                        Some(pos) => i = pos + close.chars().count(),
                        None => {
                            self.in_block_comment = true;
                            return out;
                        }
                    }
                    continue;
                }
            }

            if c == '/' && self.opts.slash_comments && starts_at(&chars, i, "//") {
                return out;
            }
            if c == '#' && self.opts.hash_comments {
                return out;
            }

            match c {
                '"' => {
                    out.push('"');
                    match find_unescaped(&chars, i + 1, '"') {
                        Some(pos) => {
                            out.push('"');
                            i = pos + 1;
                        }
                        None => return out,
                    }
                }
                '\'' if self.opts.single_quote == SingleQuote::Text => {
                    out.push('\'');
                    match find_unescaped(&chars, i + 1, '\'') {
                        Some(pos) => {
                            out.push('\'');
                            i = pos + 1;
                        }
                        None => return out,
                    }
                }
                '\'' if self.opts.single_quote == SingleQuote::CharLiteral => {
                    // `'x'` or `'\n'`; anything longer (a lifetime, an
                    // apostrophe) is passed through untouched.
                    if i + 2 < n && chars[i + 1] != '\\' && chars[i + 2] == '\'' {
                        out.push_str("''");
                        i += 3;
                    } else if i + 3 < n && chars[i + 1] == '\\' && chars[i + 3] == '\'' {
                        out.push_str("''");
                        i += 4;
                    } else {
                        out.push('\'');
                        i += 1;
                    }
                }
                '`' if self.opts.template_literals => {
                    out.push('`');
                    match find_unescaped(&chars, i + 1, '`') {
                        Some(pos) => {
                            out.push('`');
                            i = pos + 1;
                        }
                        None => {
                            self.in_template = true;
                            return out;
                        }
                    }
                }
                _ => {
                    out.push(c);
                    i += 1;
                }
            }
        }

        out
    }
}

fn starts_at(chars: &[char], i: usize, needle: &str) -> bool {
    needle.chars().enumerate().all(|(k, nc)| chars.get(i + k) == Some(&nc))
}

fn find_from(chars: &[char], from: usize, needle: &str) -> Option<usize> {
    (from..chars.len()).find(|&i| starts_at(chars, i, needle))
}

fn find_unescaped(chars: &[char], from: usize, quote: char) -> Option<usize> {
    let mut i = from;
    while i < chars.len() {
        if chars[i] == '\\' {
            i += 2;
            continue;
        }
        if chars[i] == quote {
            return Some(i);
        }
        i += 1;
    }
    None
}

// ---------------------------------------------------------------------------
// Brace depth bookkeeping
// ---------------------------------------------------------------------------

/// Net depth change and the minimum depth reached after any closing brace.
///
/// `min_after_close` starts at `i32::MAX`; a line with no `}` therefore
/// closes nothing. Callers pass scrubbed code, so braces inside comments
/// and strings never count.
pub fn brace_deltas(code: &str, depth_at_start: i32) -> (i32, i32) {
    let mut depth = depth_at_start;
    let mut min_after_close = i32::MAX;
    for c in code.chars() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                min_after_close = min_after_close.min(depth);
            }
            _ => {}
        }
    }
    // Negative depth means unbalanced input; clamp rather than abort.
    (depth.max(0), min_after_close)
}

/// Declarations whose closing brace has not been seen yet.
///
/// Each entry remembers the depth *before* its opening brace; the block is
/// closed on the first line where depth returns to that value or below.
#[derive(Default)]
pub struct OpenBlocks {
    blocks: Vec<(usize, i32)>,
}

impl OpenBlocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, decl_index: usize, depth_before: i32) {
        self.blocks.push((decl_index, depth_before));
    }

    /// Close every block whose depth has unwound, stamping `line` as its end.
    pub fn close_at(&mut self, min_depth: i32, line: usize, decls: &mut [Declaration]) {
        self.blocks.retain(|&(idx, depth_before)| {
            if depth_before >= min_depth {
                if let Some(d) = decls.get_mut(idx) {
                    d.end_line = line;
                }
                false
            } else {
                true
            }
        });
    }

    /// Stamp `last_line` on everything still open (unterminated source).
    pub fn close_all(&mut self, last_line: usize, decls: &mut [Declaration]) {
        for &(idx, _) in &self.blocks {
            if let Some(d) = decls.get_mut(idx) {
                d.end_line = last_line;
            }
        }
        self.blocks.clear();
    }
}

// ---------------------------------------------------------------------------
// Scope stack
// ---------------------------------------------------------------------------

/// An open container (class, namespace, impl, module) during the scan.
#[derive(Debug, Clone)]
pub struct Scope {
    pub name: String,
    pub depth_before: i32,
}

/// Stack of open containers used to qualify nested declaration names.
///
/// Containers reference nothing outside the current parse; the stack dies
/// with the parser invocation.
pub struct ScopeStack {
    separator: &'static str,
    scopes: Vec<Scope>,
}

impl ScopeStack {
    pub fn new(separator: &'static str) -> Self {
        Self {
            separator,
            scopes: Vec::new(),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, depth_before: i32) {
        self.scopes.push(Scope {
            name: name.into(),
            depth_before,
        });
    }

    /// Pop containers whose blocks have unwound.
    pub fn close_at(&mut self, min_depth: i32) {
        self.scopes.retain(|s| s.depth_before < min_depth);
    }

    /// Qualify a name with the open container path.
    pub fn qualify(&self, name: &str) -> String {
        if self.scopes.is_empty() {
            return name.to_string();
        }
        let mut parts: Vec<&str> = self.scopes.iter().map(|s| s.name.as_str()).collect();
        parts.push(name);
        parts.join(self.separator)
    }

    pub fn innermost(&self) -> Option<&Scope> {
        self.scopes.last()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Misc helpers
// ---------------------------------------------------------------------------

/// Leading indentation width with tabs expanded.
pub fn indent_width(line: &str, tab_width: usize) -> usize {
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width += tab_width - (width % tab_width),
            _ => break,
        }
    }
    width
}

/// Trim a trailing `\r` so CRLF input behaves like LF input.
pub fn trim_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::DeclKind;

    #[test]
    fn scrub_removes_line_comments() {
        let mut s = CodeScrubber::c_family();
        assert_eq!(s.scrub("int x; // comment {"), "int x; ");
    }

    #[test]
    fn scrub_removes_string_contents() {
        let mut s = CodeScrubber::c_family();
        assert_eq!(s.scrub(r#"call("{ not a brace }");"#), r#"call("");"#);
    }

    #[test]
    fn scrub_tracks_block_comments_across_lines() {
        let mut s = CodeScrubber::c_family();
        assert_eq!(s.scrub("code(); /* start"), "code(); ");
        assert!(s.in_block_comment());
        assert_eq!(s.scrub("still inside {"), "");
        assert_eq!(s.scrub("end */ after();"), " after();");
        assert!(!s.in_block_comment());
    }

    #[test]
    fn scrub_char_literal_does_not_eat_lifetimes() {
        let mut s = CodeScrubber::c_family();
        let out = s.scrub("fn f<'a>(x: &'a str) -> char { 'x' }");
        assert!(out.contains("'a>"));
        assert!(out.contains("''"));
    }

    #[test]
    fn scrub_template_literal_spans_lines() {
        let mut s = CodeScrubber::javascript();
        s.scrub("const t = `hello {");
        assert!(s.in_template());
        let out = s.scrub("world }` ; next()");
        assert!(!s.in_template());
        assert!(out.contains("next()"));
    }

    #[test]
    fn scrub_julia_block_comments() {
        let mut s = CodeScrubber::julia();
        assert_eq!(s.scrub("x = 1 #= block"), "x = 1 ");
        assert!(s.in_block_comment());
        assert_eq!(s.scrub("=# y = 2"), " y = 2");
        assert_eq!(s.scrub("z = 3 # trailing"), "z = 3 ");
    }

    #[test]
    fn brace_deltas_basics() {
        assert_eq!(brace_deltas("fn f() {", 0), (1, i32::MAX));
        assert_eq!(brace_deltas("}", 1), (0, 0));
        assert_eq!(brace_deltas("fn f() {}", 0), (0, 0));
        assert_eq!(brace_deltas("} else {", 2), (2, 1));
    }

    #[test]
    fn brace_deltas_clamps_negative_depth() {
        assert_eq!(brace_deltas("}}}", 1).0, 0);
    }

    #[test]
    fn open_blocks_close_in_order() {
        let mut decls = vec![
            Declaration::new(DeclKind::Class, "Outer", 1),
            Declaration::new(DeclKind::Function, "inner", 2),
        ];
        let mut open = OpenBlocks::new();
        open.open(0, 0);
        open.open(1, 1);
        // Inner block unwinds to depth 1.
        open.close_at(1, 4, &mut decls);
        assert_eq!(decls[1].end_line, 4);
        assert_eq!(decls[0].end_line, 1);
        // Outer unwinds to depth 0.
        open.close_at(0, 5, &mut decls);
        assert_eq!(decls[0].end_line, 5);
    }

    #[test]
    fn scope_stack_qualifies_names() {
        let mut scopes = ScopeStack::new("::");
        scopes.push("Outer", 0);
        scopes.push("Inner", 1);
        assert_eq!(scopes.qualify("f"), "Outer::Inner::f");
        scopes.close_at(1);
        assert_eq!(scopes.qualify("f"), "Outer::f");
    }

    #[test]
    fn indent_width_expands_tabs() {
        assert_eq!(indent_width("    x", 4), 4);
        assert_eq!(indent_width("\tx", 4), 4);
        assert_eq!(indent_width("  \tx", 4), 4);
        assert_eq!(indent_width("x", 4), 0);
    }
}
