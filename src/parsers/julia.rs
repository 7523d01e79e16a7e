//! Julia declaration scanner.
//!
//! Blocks are keyword-delimited: each opening keyword (`function`, `struct`,
//! `module`, `macro`, `begin`, `if`, `for`, `while`, `try`, `let`, `do`,
//! `quote`) raises the depth and a standalone `end` token lowers it, which
//! gives declarations their line spans. `module` blocks push onto the scope
//! stack. Comments are `#` with `#= =#` blocks.

use once_cell::sync::Lazy;
use regex::Regex;

use super::common::{trim_cr, CodeScrubber, OpenBlocks, ScopeStack};
use super::{DeclKind, Declaration, LanguageParser};

const BLOCK_OPENERS: &[&str] = &[
    "function", "struct", "module", "macro", "begin", "if", "for", "while", "try", "let", "do",
    "quote",
];

static MODULE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:bare)?module\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap());
static FUNCTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^function\s+(?:[A-Za-z_][A-Za-z0-9_]*\.)?([A-Za-z_][A-Za-z0-9_!]*)").unwrap()
});
static SHORT_FUNCTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_!]*)\s*\([^)]*\)\s*=[^=]").unwrap()
});
static STRUCT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:mutable\s+)?struct\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap());
static ABSTRACT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:abstract|primitive)\s+type\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap()
});
static CONST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^const\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap());
static MACRO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^macro\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap());
static VARIABLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*=[^=]").unwrap());

pub struct JuliaParser;

impl LanguageParser for JuliaParser {
    fn parse(&self, _path: &str, content: &str) -> Vec<Declaration> {
        let mut scrubber = CodeScrubber::julia();
        let mut decls: Vec<Declaration> = Vec::new();
        let mut open = OpenBlocks::new();
        let mut scopes = ScopeStack::new(".");
        let mut depth: i32 = 0;
        let mut last_line = 0;

        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            last_line = line_no;
            let code = scrubber.scrub(trim_cr(raw));
            let trimmed = code.trim();
            if trimmed.is_empty() {
                continue;
            }

            // `abstract type X end` closes itself; bypass token counting.
            if let Some(caps) = ABSTRACT_RE.captures(trimmed) {
                decls.push(Declaration::new(DeclKind::Class, &caps[1], line_no));
                continue;
            }

            let depth_before = depth;
            let (new_depth, min_close) = keyword_deltas(trimmed, depth);

            if let Some((kind, name, container, is_block)) =
                match_declaration(trimmed, depth_before, &scopes)
            {
                decls.push(Declaration::new(kind, name, line_no));
                let decl_idx = decls.len() - 1;
                if is_block {
                    open.open(decl_idx, depth_before);
                    if let Some(c) = container {
                        scopes.push(c, depth_before);
                    }
                }
            }

            depth = new_depth;
            open.close_at(min_close, line_no, &mut decls);
            scopes.close_at(min_close);
        }

        open.close_all(last_line, &mut decls);
        decls
    }
}

/// Keyword-based analogue of `brace_deltas`: openers raise depth, `end`
/// tokens lower it.
fn keyword_deltas(code: &str, depth_at_start: i32) -> (i32, i32) {
    let mut depth = depth_at_start;
    let mut min_after_close = i32::MAX;
    for token in code.split_whitespace() {
        if BLOCK_OPENERS.contains(&token) {
            depth += 1;
        } else if token == "end" {
            depth -= 1;
            min_after_close = min_after_close.min(depth);
        }
    }
    (depth.max(0), min_after_close)
}

type Matched = (DeclKind, String, Option<String>, bool);

fn match_declaration(code: &str, depth: i32, scopes: &ScopeStack) -> Option<Matched> {
    if let Some(caps) = MODULE_RE.captures(code) {
        let name = caps[1].to_string();
        return Some((DeclKind::Class, name.clone(), Some(name), true));
    }
    if let Some(caps) = FUNCTION_RE.captures(code) {
        return Some((
            DeclKind::Function,
            scopes.qualify(&caps[1]),
            None,
            true,
        ));
    }
    if let Some(caps) = MACRO_RE.captures(code) {
        return Some((DeclKind::Function, scopes.qualify(&caps[1]), None, true));
    }
    if let Some(caps) = STRUCT_RE.captures(code) {
        return Some((DeclKind::Struct, scopes.qualify(&caps[1]), None, true));
    }
    if let Some(caps) = CONST_RE.captures(code) {
        return Some((DeclKind::Symbol, scopes.qualify(&caps[1]), None, false));
    }
    if let Some(caps) = SHORT_FUNCTION_RE.captures(code) {
        return Some((DeclKind::Function, scopes.qualify(&caps[1]), None, false));
    }
    // Plain assignment at module level is a variable.
    if depth == 0 || !scopes.is_empty() {
        if let Some(caps) = VARIABLE_RE.captures(code) {
            if depth == scopes.innermost().map(|s| s.depth_before + 1).unwrap_or(0) {
                return Some((DeclKind::Symbol, scopes.qualify(&caps[1]), None, false));
            }
        }
    }
    None
}
