//! JavaScript / TypeScript declaration scanner.
//!
//! One parser handles both languages; TypeScript-only patterns (interface,
//! type alias, enum) are enabled by the constructor. Template literals are
//! tracked in the scrubber so backtick strings never disturb brace
//! accounting. Arrow functions assigned to `const`/`let`/`var` count as
//! functions, as do `name = (...) =>` class properties.

use once_cell::sync::Lazy;
use regex::Regex;

use super::common::{brace_deltas, trim_cr, CodeScrubber, OpenBlocks, ScopeStack};
use super::{DeclKind, Declaration, LanguageParser};

const EXPORT: &str = r"(?:export\s+(?:default\s+)?)?";

static CLASS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^{EXPORT}(?:abstract\s+)?class\s+([A-Za-z_$][A-Za-z0-9_$]*)"
    ))
    .unwrap()
});
static FUNCTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^{EXPORT}(?:async\s+)?function\s*\*?\s*([A-Za-z_$][A-Za-z0-9_$]*)"
    ))
    .unwrap()
});
static ARROW_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^{EXPORT}(?:const|let|var)\s+([A-Za-z_$][A-Za-z0-9_$]*)(?:\s*:[^=]+)?\s*=\s*(?:async\s+)?(?:<[^>]*>\s*)?(?:\([^)]*\)|[A-Za-z_$][A-Za-z0-9_$]*)\s*=>"
    ))
    .unwrap()
});
static METHOD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:static\s+)?(?:async\s+)?(?:get\s+|set\s+)?\*?\s*([A-Za-z_$][A-Za-z0-9_$]*)\s*\(",
    )
    .unwrap()
});
static CLASS_PROP_ARROW_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:static\s+)?([A-Za-z_$][A-Za-z0-9_$]*)\s*=\s*(?:async\s+)?(?:\([^)]*\)|[A-Za-z_$][A-Za-z0-9_$]*)\s*=>",
    )
    .unwrap()
});
static INTERFACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^{EXPORT}interface\s+([A-Za-z_$][A-Za-z0-9_$]*)")).unwrap()
});
static TYPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^{EXPORT}type\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*=")).unwrap()
});
static ENUM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^{EXPORT}(?:const\s+)?enum\s+([A-Za-z_$][A-Za-z0-9_$]*)"
    ))
    .unwrap()
});

const STMT_KEYWORDS: &[&str] = &[
    "if", "else", "for", "while", "switch", "catch", "return", "do", "new", "await", "typeof",
    "super", "function",
];

pub struct JsTsParser {
    typescript: bool,
}

impl JsTsParser {
    pub const fn javascript() -> Self {
        Self { typescript: false }
    }

    pub const fn typescript() -> Self {
        Self { typescript: true }
    }
}

impl LanguageParser for JsTsParser {
    fn parse(&self, _path: &str, content: &str) -> Vec<Declaration> {
        let mut scrubber = CodeScrubber::javascript();
        let mut decls: Vec<Declaration> = Vec::new();
        let mut open = OpenBlocks::new();
        let mut scopes = ScopeStack::new(".");
        let mut depth: i32 = 0;
        let mut pending: Option<(usize, Option<String>)> = None;
        let mut pending_decorators: Vec<usize> = Vec::new();
        let mut last_line = 0;

        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            last_line = line_no;
            let was_in_template = scrubber.in_template();
            let code = scrubber.scrub(trim_cr(raw));
            let trimmed = code.trim();
            if trimmed.is_empty() {
                continue;
            }

            // Decorator-only line (`@Component({...})` may carry braces that
            // belong to the decorator expression, so only bare names count).
            if trimmed.starts_with('@') && !trimmed.contains('(') && !trimmed.contains('{') {
                pending_decorators.push(line_no);
                continue;
            }

            let depth_before = depth;
            let (new_depth, min_close) = brace_deltas(&code, depth);
            let has_open = code.contains('{');
            let ends_stmt = trimmed.ends_with(';');

            let m = if was_in_template {
                // The line started inside a template literal; whatever code
                // follows the closing backtick is not a declaration site.
                None
            } else {
                match_declaration(trimmed, self.typescript, depth_before, &scopes)
            };

            if let Some(m) = m {
                pending_decorators.clear();
                decls.push(Declaration::new(m.kind, m.name, line_no));
                let decl_idx = decls.len() - 1;
                if has_open {
                    open.open(decl_idx, depth_before);
                    if let Some(c) = m.container {
                        scopes.push(c, depth_before);
                    }
                } else if !ends_stmt && !m.complete_without_block {
                    pending = Some((decl_idx, m.container));
                }
            } else if let Some((decl_idx, container)) = pending.take() {
                if has_open {
                    open.open(decl_idx, depth_before);
                    if let Some(c) = container {
                        scopes.push(c, depth_before);
                    }
                } else if ends_stmt {
                    decls[decl_idx].end_line = line_no;
                } else {
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

struct Match {
    kind: DeclKind,
    name: String,
    container: Option<String>,
    /// Arrow one-liners like `const f = (x) => x` need no block or `;`.
    complete_without_block: bool,
}

fn match_declaration(
    code: &str,
    typescript: bool,
    depth: i32,
    scopes: &ScopeStack,
) -> Option<Match> {
    if let Some(caps) = CLASS_RE.captures(code) {
        let name = caps[1].to_string();
        return Some(Match {
            kind: DeclKind::Class,
            name: name.clone(),
            container: Some(name),
            complete_without_block: false,
        });
    }
    if let Some(caps) = FUNCTION_RE.captures(code) {
        return Some(Match {
            kind: DeclKind::Function,
            name: caps[1].to_string(),
            container: None,
            complete_without_block: false,
        });
    }
    if let Some(caps) = ARROW_RE.captures(code) {
        return Some(Match {
            kind: DeclKind::Function,
            name: caps[1].to_string(),
            container: None,
            complete_without_block: true,
        });
    }
    if typescript {
        if let Some(caps) = INTERFACE_RE.captures(code) {
            let name = caps[1].to_string();
            return Some(Match {
                kind: DeclKind::Class,
                name: name.clone(),
                container: Some(name),
                complete_without_block: false,
            });
        }
        if let Some(caps) = ENUM_RE.captures(code) {
            return Some(Match {
                kind: DeclKind::Class,
                name: caps[1].to_string(),
                container: None,
                complete_without_block: false,
            });
        }
        if let Some(caps) = TYPE_RE.captures(code) {
            return Some(Match {
                kind: DeclKind::Symbol,
                name: caps[1].to_string(),
                container: None,
                complete_without_block: true,
            });
        }
    }
    // Members only directly inside a class/interface body.
    if let Some(scope) = scopes.innermost() {
        if depth == scope.depth_before + 1 {
            if let Some(caps) = CLASS_PROP_ARROW_RE.captures(code) {
                return Some(Match {
                    kind: DeclKind::Function,
                    name: scopes.qualify(&caps[1]),
                    container: None,
                    complete_without_block: true,
                });
            }
            if let Some(caps) = METHOD_RE.captures(code) {
                let name = caps[1].to_string();
                if !STMT_KEYWORDS.contains(&name.as_str()) {
                    return Some(Match {
                        kind: DeclKind::Function,
                        name: scopes.qualify(&name),
                        container: None,
                        complete_without_block: false,
                    });
                }
            }
        }
    }
    None
}
