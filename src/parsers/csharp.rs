//! C# declaration scanner.
//!
//! Recognizes namespaces, types (`class`/`interface`/`struct`/`enum`),
//! delegates, events, methods, and `{ get; set; }` properties. Attribute
//! lines (`[Serializable]`) accumulate onto the next declaration. Nested
//! declarations are qualified `Namespace.Type.Member`.

use once_cell::sync::Lazy;
use regex::Regex;

use super::common::{brace_deltas, trim_cr, CodeScrubber, OpenBlocks, ScopeStack};
use super::{DeclKind, Declaration, LanguageParser};

const MODS: &str =
    r"(?:(?:public|private|protected|internal|static|sealed|abstract|partial|virtual|override|async|extern|new|unsafe|readonly)\s+)";

static ATTR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[.*\]$").unwrap());
static NAMESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^namespace\s+([A-Za-z_][A-Za-z0-9_.]*)").unwrap());
static TYPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^{MODS}*(class|interface|struct|enum|record)\s+([A-Za-z_][A-Za-z0-9_]*)"
    ))
    .unwrap()
});
static DELEGATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^{MODS}*delegate\s+\S+\s+([A-Za-z_][A-Za-z0-9_]*)\s*\("
    ))
    .unwrap()
});
static EVENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^{MODS}*event\s+\S+\s+([A-Za-z_][A-Za-z0-9_]*)")).unwrap()
});
static METHOD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^{MODS}+[A-Za-z_][A-Za-z0-9_<>,\[\]\.\s]*?\s+([A-Za-z_][A-Za-z0-9_]*)(?:<[^>]*>)?\s*\("
    ))
    .unwrap()
});
static PROPERTY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^{MODS}+[A-Za-z_][A-Za-z0-9_<>,\[\]\.]*\s+([A-Za-z_][A-Za-z0-9_]*)\s*\{{"
    ))
    .unwrap()
});
static CTOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^{MODS}*([A-Za-z_][A-Za-z0-9_]*)\s*\(")).unwrap());
// Interface members carry no modifiers; a bare `Type Name(` also counts.
static PLAIN_METHOD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_<>,\[\]\.]*)\s+([A-Za-z_][A-Za-z0-9_]*)(?:<[^>]*>)?\s*\(")
        .unwrap()
});

const STMT_KEYWORDS: &[&str] = &[
    "return", "if", "while", "for", "foreach", "switch", "throw", "using", "new", "else",
    "await", "yield", "lock", "var", "case", "catch", "do",
];

pub struct CSharpParser;

impl LanguageParser for CSharpParser {
    fn parse(&self, _path: &str, content: &str) -> Vec<Declaration> {
        let mut scrubber = CodeScrubber::c_family();
        let mut decls: Vec<Declaration> = Vec::new();
        let mut open = OpenBlocks::new();
        let mut scopes = ScopeStack::new(".");
        let mut depth: i32 = 0;
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

            if let Some((kind, name, container)) = match_declaration(trimmed, &scopes) {
                pending_attrs.clear();
                decls.push(Declaration::new(kind, name, line_no));
                let decl_idx = decls.len() - 1;
                if has_open {
                    open.open(decl_idx, depth_before);
                    if let Some(c) = container {
                        scopes.push(c, depth_before);
                    }
                } else if !ends_stmt {
                    pending = Some((decl_idx, container));
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

type Matched = (DeclKind, String, Option<String>);

fn match_declaration(code: &str, scopes: &ScopeStack) -> Option<Matched> {
    if let Some(caps) = NAMESPACE_RE.captures(code) {
        let name = caps[1].to_string();
        return Some((DeclKind::Class, name.clone(), Some(name)));
    }
    if let Some(caps) = TYPE_RE.captures(code) {
        let kind = match &caps[1] {
            "struct" => DeclKind::Struct,
            _ => DeclKind::Class,
        };
        let name = caps[2].to_string();
        let container = if &caps[1] == "enum" {
            None
        } else {
            Some(name.clone())
        };
        return Some((kind, scopes.qualify(&name), container));
    }
    if let Some(caps) = DELEGATE_RE.captures(code) {
        return Some((DeclKind::Symbol, scopes.qualify(&caps[1]), None));
    }
    if let Some(caps) = EVENT_RE.captures(code) {
        return Some((DeclKind::Symbol, scopes.qualify(&caps[1]), None));
    }
    if let Some(caps) = METHOD_RE.captures(code) {
        return Some((DeclKind::Function, scopes.qualify(&caps[1]), None));
    }
    if let Some(caps) = PLAIN_METHOD_RE.captures(code) {
        let ret = caps[1].to_string();
        let name = caps[2].to_string();
        if !scopes.is_empty()
            && !STMT_KEYWORDS.contains(&ret.as_str())
            && !STMT_KEYWORDS.contains(&name.as_str())
        {
            return Some((DeclKind::Function, scopes.qualify(&name), None));
        }
    }
    if let Some(caps) = PROPERTY_RE.captures(code) {
        return Some((DeclKind::Symbol, scopes.qualify(&caps[1]), None));
    }
    // Constructors: `public Name(...)` where Name is the enclosing type.
    if let Some(scope) = scopes.innermost() {
        if let Some(caps) = CTOR_RE.captures(code) {
            if caps[1] == scope.name {
                return Some((DeclKind::Function, scopes.qualify(&caps[1]), None));
            }
        }
    }
    None
}
