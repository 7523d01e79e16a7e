//! C declaration scanner.
//!
//! Recognizes functions (definitions and prototypes), `struct`/`union`/
//! `enum`, one-line `typedef`s, and `#define` macros. Backslash-continued
//! macros suppress matching until the continuation ends; other preprocessor
//! directives are skipped outright.

use once_cell::sync::Lazy;
use regex::Regex;

use super::common::{brace_deltas, trim_cr, CodeScrubber, OpenBlocks};
use super::{DeclKind, Declaration, LanguageParser};

static DEFINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#\s*define\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap());
static TYPEDEF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^typedef\s+.*?([A-Za-z_][A-Za-z0-9_]*)\s*;\s*$").unwrap());
static TYPEDEF_FNPTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^typedef\s+.*\(\s*\*\s*([A-Za-z_][A-Za-z0-9_]*)\s*\)").unwrap());
static RECORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:typedef\s+)?(struct|union|enum)\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap());
static FUNCTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_\s\*]*?[\s\*])([A-Za-z_][A-Za-z0-9_]*)\s*\(").unwrap()
});

/// Keywords that rule out a function-heuristic match.
const CONTROL_KEYWORDS: &[&str] = &[
    "if", "else", "for", "while", "switch", "return", "case", "do", "sizeof", "goto",
];

/// Continuation state for backslash-continued preprocessor lines. The inner
/// value is the `#define`'s declaration index when one is being extended.
type MacroContinuation = Option<Option<usize>>;

pub struct CParser;

impl LanguageParser for CParser {
    fn parse(&self, _path: &str, content: &str) -> Vec<Declaration> {
        let mut scrubber = CodeScrubber::c_family();
        let mut decls: Vec<Declaration> = Vec::new();
        let mut open = OpenBlocks::new();
        let mut depth: i32 = 0;
        let mut pending: Option<usize> = None;
        let mut continuation: MacroContinuation = None;
        let mut last_line = 0;

        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            last_line = line_no;
            let line = trim_cr(raw);

            // Inside a backslash-continued macro: extend or finish it.
            if let Some(define_idx) = continuation {
                let continues = line.trim_end().ends_with('\\');
                if let Some(decl_idx) = define_idx {
                    decls[decl_idx].end_line = line_no;
                }
                if !continues {
                    continuation = None;
                }
                continue;
            }

            let code = scrubber.scrub(line);
            let trimmed = code.trim();
            if trimmed.is_empty() {
                continue;
            }

            if trimmed.starts_with('#') {
                let continues = line.trim_end().ends_with('\\');
                if let Some(caps) = DEFINE_RE.captures(trimmed) {
                    decls.push(Declaration::new(DeclKind::Function, &caps[1], line_no));
                    if continues {
                        continuation = Some(Some(decls.len() - 1));
                    }
                } else if continues {
                    continuation = Some(None);
                }
                continue;
            }

            let depth_before = depth;
            let (new_depth, min_close) = brace_deltas(&code, depth);
            let has_open = code.contains('{');
            let ends_stmt = trimmed.ends_with(';');

            if let Some((kind, name)) = match_declaration(trimmed, ends_stmt) {
                decls.push(Declaration::new(kind, name, line_no));
                let decl_idx = decls.len() - 1;
                if has_open {
                    open.open(decl_idx, depth_before);
                } else if !ends_stmt {
                    pending = Some(decl_idx);
                }
            } else if let Some(decl_idx) = pending.take() {
                if has_open {
                    open.open(decl_idx, depth_before);
                } else if ends_stmt {
                    decls[decl_idx].end_line = line_no;
                } else {
                    pending = Some(decl_idx);
                }
            }

            depth = new_depth;
            open.close_at(min_close, line_no, &mut decls);
        }

        open.close_all(last_line, &mut decls);
        decls
    }
}

fn match_declaration(code: &str, ends_stmt: bool) -> Option<(DeclKind, String)> {
    // One-line typedefs win over the record patterns so that
    // `typedef struct Node Node;` comes out as a symbol.
    if code.starts_with("typedef") && ends_stmt {
        if let Some(caps) = TYPEDEF_FNPTR_RE.captures(code) {
            return Some((DeclKind::Symbol, caps[1].to_string()));
        }
        if let Some(caps) = TYPEDEF_RE.captures(code) {
            return Some((DeclKind::Symbol, caps[1].to_string()));
        }
        return None;
    }

    if let Some(caps) = RECORD_RE.captures(code) {
        let kind = match &caps[1] {
            "enum" => DeclKind::Class,
            _ => DeclKind::Struct,
        };
        return Some((kind, caps[2].to_string()));
    }

    if let Some(caps) = FUNCTION_RE.captures(code) {
        let prefix_first = caps[1].split_whitespace().next().unwrap_or("");
        let name = &caps[2];
        if !CONTROL_KEYWORDS.contains(&prefix_first) && !CONTROL_KEYWORDS.contains(&name) {
            return Some((DeclKind::Function, name.to_string()));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::parse_file;

    #[test]
    fn function_definition_spans_block() {
        let src = "int main(int argc, char **argv) {\n    return 0;\n}\n";
        let decls = parse_file("c", "main.c", src);
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].kind, DeclKind::Function);
        assert_eq!(decls[0].name, "main");
        assert_eq!((decls[0].start_line, decls[0].end_line), (1, 3));
    }

    #[test]
    fn prototype_is_one_liner() {
        let src = "int add(int a, int b);\n";
        let decls = parse_file("c", "add.h", src);
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].start_line, decls[0].end_line);
    }

    #[test]
    fn typedef_one_liner() {
        let src = "typedef unsigned long word_t;\n";
        let decls = parse_file("c", "t.h", src);
        assert_eq!(decls[0].kind, DeclKind::Symbol);
        assert_eq!(decls[0].name, "word_t");
        assert_eq!(decls[0].start_line, decls[0].end_line);
    }

    #[test]
    fn typedef_function_pointer_names_the_pointer() {
        let src = "typedef int (*compare_fn)(const void *, const void *);\n";
        let decls = parse_file("c", "t.h", src);
        assert_eq!(decls[0].name, "compare_fn");
        assert_eq!(decls[0].kind, DeclKind::Symbol);
    }

    #[test]
    fn struct_union_enum_kinds() {
        let src = "struct point {\n    int x;\n};\nunion value {\n    int i;\n};\nenum color {\n    RED,\n};\n";
        let decls = parse_file("c", "s.c", src);
        let got: Vec<(&str, DeclKind)> =
            decls.iter().map(|d| (d.name.as_str(), d.kind)).collect();
        assert_eq!(
            got,
            vec![
                ("point", DeclKind::Struct),
                ("value", DeclKind::Struct),
                ("color", DeclKind::Class),
            ]
        );
        assert_eq!(decls[0].end_line, 3);
    }

    #[test]
    fn define_macro_single_line() {
        let src = "#define MAX(a, b) ((a) > (b) ? (a) : (b))\n#include <stdio.h>\n";
        let decls = parse_file("c", "m.h", src);
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].name, "MAX");
        assert_eq!(decls[0].kind, DeclKind::Function);
    }

    #[test]
    fn multi_line_macro_extends_and_suppresses() {
        let src = "#define SWAP(a, b) \\\n    do { int t = a; \\\n    a = b; b = t; } while (0)\nint after(void) {\n}\n";
        let decls = parse_file("c", "m.c", src);
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].name, "SWAP");
        assert_eq!((decls[0].start_line, decls[0].end_line), (1, 3));
        assert_eq!(decls[1].name, "after");
    }

    #[test]
    fn control_flow_is_not_a_function() {
        let src = "static int run(void) {\n    if (ready()) {\n        return 1;\n    }\n    while (spin()) {\n    }\n    return 0;\n}\n";
        let decls = parse_file("c", "r.c", src);
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].name, "run");
        assert_eq!(decls[0].end_line, 8);
    }

    #[test]
    fn declarations_in_comments_are_ignored() {
        let src = "/* int fake(void); */\n// struct nope { };\nint real(void);\n";
        let decls = parse_file("c", "c.c", src);
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].name, "real");
    }
}
