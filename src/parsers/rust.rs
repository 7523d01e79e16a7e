//! Rust declaration scanner.
//!
//! Recognizes `fn`, `struct`, `enum`, `trait`, `impl`, `const`, `static`,
//! `type`, `macro_rules!`, and `mod`. `impl`, `trait`, and `mod` blocks push
//! onto the scope stack so functions inside them come out qualified
//! (`Type::method`). Attribute lines (`#[...]`) accumulate onto the next
//! declaration and are never matched as code.

use once_cell::sync::Lazy;
use regex::Regex;

use super::common::{brace_deltas, trim_cr, CodeScrubber, OpenBlocks, ScopeStack};
use super::{DeclKind, Declaration, LanguageParser};

const VIS: &str = r"(?:pub(?:\([^)]*\))?\s+)?";

static ATTR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#!?\[.*\]$").unwrap());
static FN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^{VIS}(?:default\s+)?(?:const\s+)?(?:async\s+)?(?:unsafe\s+)?(?:extern\s*(?:\x22[^\x22]*\x22\s*)?)?fn\s+([A-Za-z_][A-Za-z0-9_]*)"
    ))
    .unwrap()
});
static STRUCT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^{VIS}(?:struct|union)\s+([A-Za-z_][A-Za-z0-9_]*)")).unwrap()
});
static ENUM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^{VIS}enum\s+([A-Za-z_][A-Za-z0-9_]*)")).unwrap());
static TRAIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^{VIS}(?:unsafe\s+)?trait\s+([A-Za-z_][A-Za-z0-9_]*)")).unwrap()
});
static IMPL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:unsafe\s+)?impl(?:\s*<[^>]*>)?\s+(?:.+\s+for\s+)?([A-Za-z_][A-Za-z0-9_:]*)")
        .unwrap()
});
static MOD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^{VIS}mod\s+([A-Za-z_][A-Za-z0-9_]*)")).unwrap());
static MACRO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^macro_rules!\s*([A-Za-z_][A-Za-z0-9_]*)").unwrap());
static TYPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^{VIS}type\s+([A-Za-z_][A-Za-z0-9_]*)")).unwrap());
static CONST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^{VIS}(?:const|static)\s+(?:mut\s+)?([A-Za-z_][A-Za-z0-9_]*)"
    ))
    .unwrap()
});

/// A tentative match: external kind, emitted name, and the scope-container
/// name when the declaration opens one.
struct Match {
    kind: DeclKind,
    name: String,
    container: Option<String>,
}

pub struct RustParser;

impl LanguageParser for RustParser {
    fn parse(&self, _path: &str, content: &str) -> Vec<Declaration> {
        let mut scrubber = CodeScrubber::c_family();
        let mut decls: Vec<Declaration> = Vec::new();
        let mut open = OpenBlocks::new();
        let mut scopes = ScopeStack::new("::");
        let mut depth: i32 = 0;
        // Declaration matched but its `{` or `;` not yet seen.
        let mut pending: Option<(usize, Option<String>)> = None;
        let mut pending_attrs: Vec<usize> = Vec::new();
        let mut last_line = 0;

        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            last_line = line_no;
            let code = scrubber.scrub(trim_cr(raw));
            let trimmed = code.trim();
            if trimmed.is_empty() {
                continue;
            }

            if ATTR_RE.is_match(trimmed) {
                pending_attrs.push(line_no);
                continue;
            }

            let depth_before = depth;
            let (new_depth, min_close) = brace_deltas(&code, depth);
            let has_open = code.contains('{');
            let ends_stmt = trimmed.ends_with(';');

            if let Some(m) = match_declaration(trimmed, &scopes) {
                pending_attrs.clear();
                decls.push(Declaration::new(m.kind, m.name, line_no));
                let decl_idx = decls.len() - 1;
                if has_open {
                    open.open(decl_idx, depth_before);
                    if let Some(name) = m.container {
                        scopes.push(name, depth_before);
                    }
                } else if !ends_stmt {
                    pending = Some((decl_idx, m.container));
                }
                // `;` one-liners keep end_line == start_line.
            } else if let Some((decl_idx, container)) = pending.take() {
                if has_open {
                    open.open(decl_idx, depth_before);
                    if let Some(name) = container {
                        scopes.push(name, depth_before);
                    }
                } else if ends_stmt {
                    decls[decl_idx].end_line = line_no;
                } else {
                    // Still mid-signature; keep waiting.
                    pending = Some((decl_idx, container));
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

/// Try each declaration pattern in priority order.
fn match_declaration(code: &str, scopes: &ScopeStack) -> Option<Match> {
    if let Some(caps) = FN_RE.captures(code) {
        return Some(Match {
            kind: DeclKind::Function,
            name: scopes.qualify(&caps[1]),
            container: None,
        });
    }
    if let Some(caps) = IMPL_RE.captures(code) {
        let target = caps[1].trim_end_matches(':').to_string();
        return Some(Match {
            kind: DeclKind::Class,
            name: target.clone(),
            container: Some(target),
        });
    }
    if let Some(caps) = TRAIT_RE.captures(code) {
        return Some(Match {
            kind: DeclKind::Class,
            name: caps[1].to_string(),
            container: Some(caps[1].to_string()),
        });
    }
    if let Some(caps) = STRUCT_RE.captures(code) {
        return Some(Match {
            kind: DeclKind::Struct,
            name: caps[1].to_string(),
            container: None,
        });
    }
    if let Some(caps) = ENUM_RE.captures(code) {
        return Some(Match {
            kind: DeclKind::Class,
            name: caps[1].to_string(),
            container: None,
        });
    }
    if let Some(caps) = MOD_RE.captures(code) {
        return Some(Match {
            kind: DeclKind::Class,
            name: caps[1].to_string(),
            container: Some(caps[1].to_string()),
        });
    }
    if let Some(caps) = MACRO_RE.captures(code) {
        return Some(Match {
            kind: DeclKind::Function,
            name: caps[1].to_string(),
            container: None,
        });
    }
    if let Some(caps) = TYPE_RE.captures(code) {
        return Some(Match {
            kind: DeclKind::Symbol,
            name: caps[1].to_string(),
            container: None,
        });
    }
    if let Some(caps) = CONST_RE.captures(code) {
        return Some(Match {
            kind: DeclKind::Symbol,
            name: caps[1].to_string(),
            container: None,
        });
    }
    None
}
