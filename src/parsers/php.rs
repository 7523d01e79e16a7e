//! PHP declaration scanner.
//!
//! Recognizes `namespace` (both the file-wide `;` form and the block form),
//! `use` imports with optional aliases, `class`/`interface`/`trait`,
//! methods with visibility modifiers, `$property` declarations, and class
//! constants. Namespace-qualified names use the `\` separator.

use once_cell::sync::Lazy;
use regex::Regex;

use super::common::{brace_deltas, trim_cr, CodeScrubber, OpenBlocks, ScopeStack};
use super::{DeclKind, Declaration, LanguageParser};

static NAMESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^namespace\s+([A-Za-z_\\][A-Za-z0-9_\\]*)\s*([;{]?)").unwrap());
static USE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^use\s+([A-Za-z_\\][A-Za-z0-9_\\]*)(?:\s+as\s+([A-Za-z_][A-Za-z0-9_]*))?\s*;")
        .unwrap()
});
static CLASS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:abstract|final)\s+)*(?:class|interface|trait)\s+([A-Za-z_][A-Za-z0-9_]*)")
        .unwrap()
});
static FUNCTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(?:public|private|protected|static|abstract|final)\s+)*function\s+&?\s*([A-Za-z_][A-Za-z0-9_]*)",
    )
    .unwrap()
});
static PROPERTY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(?:public|private|protected|static|readonly|var)\s+)+(?:\??[A-Za-z_][A-Za-z0-9_\\]*\s+)?\$([A-Za-z_][A-Za-z0-9_]*)",
    )
    .unwrap()
});
static CONST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:public|private|protected|final)\s+)*const\s+([A-Za-z_][A-Za-z0-9_]*)")
        .unwrap()
});

pub struct PhpParser;

impl LanguageParser for PhpParser {
    fn parse(&self, _path: &str, content: &str) -> Vec<Declaration> {
        let mut scrubber = CodeScrubber::php();
        let mut decls: Vec<Declaration> = Vec::new();
        let mut open = OpenBlocks::new();
        let mut scopes = ScopeStack::new("\\");
        let mut depth: i32 = 0;
        let mut pending: Option<(usize, Option<String>)> = None;
        let mut last_line = 0;

        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            last_line = line_no;
            let code = scrubber.scrub(trim_cr(raw));
            let trimmed = code.trim();
            if trimmed.is_empty() {
                continue;
            }

            let depth_before = depth;
            let (new_depth, min_close) = brace_deltas(&code, depth);
            let has_open = code.contains('{');
            let ends_stmt = trimmed.ends_with(';');

            if let Some(m) = match_declaration(trimmed, &mut scopes) {
                decls.push(Declaration::new(m.0, m.1, line_no));
                let decl_idx = decls.len() - 1;
                if has_open {
                    open.open(decl_idx, depth_before);
                    if let Some(c) = m.2 {
                        scopes.push(c, depth_before);
                    }
                } else if !ends_stmt {
                    pending = Some((decl_idx, m.2));
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

fn match_declaration(code: &str, scopes: &mut ScopeStack) -> Option<Matched> {
    if let Some(caps) = NAMESPACE_RE.captures(code) {
        let name = caps[1].to_string();
        if &caps[2] == ";" {
            // File-wide namespace; a sentinel depth keeps it open forever.
            scopes.push(name.clone(), i32::MIN);
            return Some((DeclKind::Class, name, None));
        }
        return Some((DeclKind::Class, name.clone(), Some(name)));
    }
    if let Some(caps) = USE_RE.captures(code) {
        let name = caps
            .get(2)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| caps[1].to_string());
        return Some((DeclKind::Symbol, name, None));
    }
    if let Some(caps) = CLASS_RE.captures(code) {
        let name = caps[1].to_string();
        return Some((DeclKind::Class, scopes.qualify(&name), Some(name)));
    }
    if let Some(caps) = FUNCTION_RE.captures(code) {
        return Some((DeclKind::Function, scopes.qualify(&caps[1]), None));
    }
    if let Some(caps) = PROPERTY_RE.captures(code) {
        return Some((DeclKind::Symbol, scopes.qualify(&caps[1]), None));
    }
    if let Some(caps) = CONST_RE.captures(code) {
        return Some((DeclKind::Symbol, scopes.qualify(&caps[1]), None));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::parse_file;

    #[test]
    fn namespace_class_method() {
        let src = "<?php\nnamespace App\\Models;\n\nclass User {\n    public function save() {\n    }\n}\n";
        let decls = parse_file("php", "User.php", src);
        let names: Vec<&str> = decls.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["App\\Models", "App\\Models\\User", "App\\Models\\User\\save"]
        );
        assert_eq!(decls[2].kind, DeclKind::Function);
    }

    #[test]
    fn use_with_alias() {
        let src = "<?php\nuse App\\Services\\Mailer;\nuse App\\Services\\Queue as JobQueue;\n";
        let decls = parse_file("php", "u.php", src);
        let names: Vec<&str> = decls.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["App\\Services\\Mailer", "JobQueue"]);
        assert!(decls.iter().all(|d| d.kind == DeclKind::Symbol));
    }

    #[test]
    fn properties_and_consts() {
        let src = "<?php\nclass Config {\n    public string $name;\n    private $cache;\n    const VERSION = '1.0';\n}\n";
        let decls = parse_file("php", "c.php", src);
        let got: Vec<(&str, DeclKind)> =
            decls.iter().map(|d| (d.name.as_str(), d.kind)).collect();
        assert_eq!(
            got,
            vec![
                ("Config", DeclKind::Class),
                ("Config\\name", DeclKind::Symbol),
                ("Config\\cache", DeclKind::Symbol),
                ("Config\\VERSION", DeclKind::Symbol),
            ]
        );
    }

    #[test]
    fn trait_and_interface_are_classes() {
        let src = "<?php\ntrait Loggable {\n    public function log($m) {\n    }\n}\ninterface Sender {\n    public function send();\n}\n";
        let decls = parse_file("php", "t.php", src);
        assert_eq!(decls[0].name, "Loggable");
        assert_eq!(decls[0].kind, DeclKind::Class);
        assert_eq!(decls[2].name, "Sender");
        // Interface method signature is a one-liner.
        assert_eq!(decls[3].start_line, decls[3].end_line);
    }

    #[test]
    fn hash_comments_are_skipped() {
        let src = "<?php\n# function fake() {}\n// function also_fake() {}\nfunction real() {\n}\n";
        let decls = parse_file("php", "h.php", src);
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].name, "real");
    }
}
