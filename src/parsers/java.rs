//! Java declaration scanner.
//!
//! Recognizes `package`, `import`, types (`class`/`interface`/`enum`/
//! `record`), methods and constructors, and class-level fields. The package
//! name seeds the qualification context, so members come out as
//! `com.example.Type.member`. Field matching is disabled inside method
//! bodies to keep locals out of the declaration list.

use once_cell::sync::Lazy;
use regex::Regex;

use super::common::{brace_deltas, trim_cr, CodeScrubber, OpenBlocks, ScopeStack};
use super::{DeclKind, Declaration, LanguageParser};

const MODS: &str =
    r"(?:(?:public|private|protected|static|final|abstract|synchronized|native|default|sealed|strictfp|transient|volatile)\s+)";

static PACKAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^package\s+([A-Za-z_][A-Za-z0-9_.]*)\s*;").unwrap());
static IMPORT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^import\s+(?:static\s+)?([A-Za-z_][A-Za-z0-9_.\*]*)\s*;").unwrap());
static TYPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^{MODS}*(class|interface|enum|record)\s+([A-Za-z_][A-Za-z0-9_]*)"
    ))
    .unwrap()
});
static METHOD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^{MODS}*(?:<[^>]*>\s*)?[A-Za-z_][A-Za-z0-9_<>,\[\]\.]*\s+([A-Za-z_][A-Za-z0-9_]*)\s*\("
    ))
    .unwrap()
});
static CTOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^{MODS}*([A-Za-z_][A-Za-z0-9_]*)\s*\(")).unwrap());
static FIELD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^{MODS}*[A-Za-z_][A-Za-z0-9_<>,\[\]\.]*\s+([A-Za-z_][A-Za-z0-9_]*)\s*(?:=[^=].*)?;\s*$"
    ))
    .unwrap()
});
static ANNOTATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^@[A-Za-z_][A-Za-z0-9_.]*").unwrap());

const STMT_KEYWORDS: &[&str] = &[
    "return", "if", "while", "for", "switch", "throw", "new", "else", "case", "catch", "do",
    "assert", "super", "this", "try", "break", "continue",
];

pub struct JavaParser;

impl LanguageParser for JavaParser {
    fn parse(&self, _path: &str, content: &str) -> Vec<Declaration> {
        let mut scrubber = CodeScrubber::c_family();
        let mut decls: Vec<Declaration> = Vec::new();
        let mut open = OpenBlocks::new();
        let mut scopes = ScopeStack::new(".");
        let mut depth: i32 = 0;
        let mut pending: Option<(usize, Option<String>)> = None;
        let mut pending_annotations: Vec<usize> = Vec::new();
        // Depths at which method bodies opened; non-empty means we are
        // inside one and field matching is off.
        let mut open_fn_depths: Vec<i32> = Vec::new();
        let mut last_line = 0;

        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            last_line = line_no;
            let code = scrubber.scrub(trim_cr(raw));
            let trimmed = code.trim();
            if trimmed.is_empty() {
                continue;
            }

            if ANNOTATION_RE.is_match(trimmed) && !trimmed.contains('{') {
                pending_annotations.push(line_no);
                continue;
            }

            let depth_before = depth;
            let (new_depth, min_close) = brace_deltas(&code, depth);
            let has_open = code.contains('{');
            let ends_stmt = trimmed.ends_with(';');

            let in_method = !open_fn_depths.is_empty();
            if let Some(m) = match_declaration(trimmed, in_method, &mut scopes) {
                pending_annotations.clear();
                let is_fn = m.0 == DeclKind::Function;
                decls.push(Declaration::new(m.0, m.1, line_no));
                let decl_idx = decls.len() - 1;
                if has_open {
                    open.open(decl_idx, depth_before);
                    if is_fn {
                        open_fn_depths.push(depth_before);
                    }
                    if let Some(c) = m.2 {
                        scopes.push(c, depth_before);
                    }
                } else if !ends_stmt {
                    pending = Some((decl_idx, m.2));
                }
            } else if let Some((decl_idx, container)) = pending.take() {
                if has_open {
                    open.open(decl_idx, depth_before);
                    if decls[decl_idx].kind == DeclKind::Function {
                        open_fn_depths.push(depth_before);
                    }
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
            open_fn_depths.retain(|&d| d < min_close);
        }

        open.close_all(last_line, &mut decls);
        decls
    }
}

type Matched = (DeclKind, String, Option<String>);

fn match_declaration(code: &str, in_method: bool, scopes: &mut ScopeStack) -> Option<Matched> {
    if let Some(caps) = PACKAGE_RE.captures(code) {
        let name = caps[1].to_string();
        // The package qualifies everything that follows; a sentinel depth
        // keeps it on the stack for the whole file.
        scopes.push(name.clone(), i32::MIN);
        return Some((DeclKind::Symbol, name, None));
    }
    if let Some(caps) = IMPORT_RE.captures(code) {
        return Some((DeclKind::Symbol, caps[1].to_string(), None));
    }
    if let Some(caps) = TYPE_RE.captures(code) {
        let name = caps[2].to_string();
        return Some((
            DeclKind::Class,
            scopes.qualify(&name),
            Some(name),
        ));
    }
    if let Some(caps) = METHOD_RE.captures(code) {
        let name = caps[1].to_string();
        let first = code.split_whitespace().next().unwrap_or("");
        if !STMT_KEYWORDS.contains(&first) && !STMT_KEYWORDS.contains(&name.as_str()) {
            return Some((DeclKind::Function, scopes.qualify(&name), None));
        }
    }
    if let Some(scope) = scopes.innermost() {
        if let Some(caps) = CTOR_RE.captures(code) {
            if caps[1] == scope.name {
                return Some((DeclKind::Function, scopes.qualify(&caps[1]), None));
            }
        }
    }
    if !in_method {
        if let Some(caps) = FIELD_RE.captures(code) {
            let first = code.split_whitespace().next().unwrap_or("");
            if !STMT_KEYWORDS.contains(&first) && !scopes.is_empty() {
                return Some((DeclKind::Symbol, scopes.qualify(&caps[1]), None));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::parse_file;

    #[test]
    fn package_class_method_qualification() {
        let src = "package com.example;\n\npublic class Greeter {\n    public String greet(String who) {\n        return \"hi \" + who;\n    }\n}\n";
        let decls = parse_file("java", "Greeter.java", src);
        let names: Vec<&str> = decls.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "com.example",
                "com.example.Greeter",
                "com.example.Greeter.greet"
            ]
        );
        assert_eq!(decls[0].kind, DeclKind::Symbol);
        assert_eq!(decls[1].kind, DeclKind::Class);
        assert_eq!(decls[2].kind, DeclKind::Function);
    }

    #[test]
    fn imports_are_symbols() {
        let src = "import java.util.List;\nimport static java.lang.Math.max;\n";
        let decls = parse_file("java", "I.java", src);
        let names: Vec<&str> = decls.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["java.util.List", "java.lang.Math.max"]);
    }

    #[test]
    fn fields_but_not_locals() {
        let src = "public class Counter {\n    private int count = 0;\n    public void bump() {\n        int step = 1;\n        count += step;\n    }\n}\n";
        let decls = parse_file("java", "C.java", src);
        let names: Vec<&str> = decls.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Counter", "Counter.count", "Counter.bump"]);
    }

    #[test]
    fn constructor_is_a_function() {
        let src = "public class Job {\n    public Job(String id) {\n    }\n}\n";
        let decls = parse_file("java", "J.java", src);
        assert_eq!(decls[1].name, "Job.Job");
        assert_eq!(decls[1].kind, DeclKind::Function);
    }

    #[test]
    fn annotations_attach_to_next_declaration() {
        let src = "@Override\n@Deprecated\npublic class Old {\n}\n";
        let decls = parse_file("java", "O.java", src);
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].start_line, 3);
    }

    #[test]
    fn interface_methods_are_one_liners() {
        let src = "public interface Store {\n    void put(String k, String v);\n    String get(String k);\n}\n";
        let decls = parse_file("java", "S.java", src);
        assert_eq!(decls.len(), 3);
        assert!(decls[1].start_line == decls[1].end_line);
        assert_eq!(decls[1].name, "Store.put");
    }

    #[test]
    fn enum_is_a_class() {
        let src = "public enum State {\n    ON,\n    OFF,\n}\n";
        let decls = parse_file("java", "E.java", src);
        assert_eq!(decls[0].kind, DeclKind::Class);
        assert_eq!(decls[0].end_line, 4);
    }
}
