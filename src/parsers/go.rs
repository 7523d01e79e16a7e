//! Go declaration scanner.
//!
//! Recognizes `package`, imports in both single and block form, `func`
//! (methods are detected by their receiver and named `T.M`), `type`
//! declarations, and top-level `var`/`const` including grouped blocks.

use once_cell::sync::Lazy;
use regex::Regex;

use super::common::{brace_deltas, trim_cr, CodeScrubber, OpenBlocks};
use super::{DeclKind, Declaration, LanguageParser};

static PACKAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^package\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap());
static IMPORT_SINGLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^import\s+(?:[A-Za-z_.][A-Za-z0-9_]*\s+)?"([^"]+)""#).unwrap());
static IMPORT_BLOCK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^import\s*\(").unwrap());
static IMPORT_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^(?:[A-Za-z_.][A-Za-z0-9_]*\s+)?"([^"]+)""#).unwrap());
static FUNC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^func\s+(?:\(\s*[A-Za-z_][A-Za-z0-9_]*\s+\*?([A-Za-z_][A-Za-z0-9_]*)\s*\)\s+)?([A-Za-z_][A-Za-z0-9_]*)",
    )
    .unwrap()
});
static TYPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^type\s+([A-Za-z_][A-Za-z0-9_]*)\s+(\S+)").unwrap());
static VAR_CONST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:var|const)\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap());
static GROUP_OPEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:var|const)\s*\(").unwrap());
static GROUP_ENTRY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)").unwrap());

pub struct GoParser;

impl LanguageParser for GoParser {
    fn parse(&self, _path: &str, content: &str) -> Vec<Declaration> {
        let mut scrubber = CodeScrubber::c_family();
        let mut decls: Vec<Declaration> = Vec::new();
        let mut open = OpenBlocks::new();
        let mut depth: i32 = 0;
        let mut pending: Option<usize> = None;
        let mut in_import_block = false;
        let mut in_group_block = false;
        let mut last_line = 0;

        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            last_line = line_no;
            let raw = trim_cr(raw);
            let code = scrubber.scrub(raw);
            let trimmed = code.trim();
            if trimmed.is_empty() {
                continue;
            }

            // Import paths live in string literals, so the raw line is the
            // one to read inside an import block.
            if in_import_block {
                if trimmed.starts_with(')') {
                    in_import_block = false;
                } else if let Some(caps) = IMPORT_LINE_RE.captures(raw.trim()) {
                    decls.push(Declaration::new(DeclKind::Symbol, &caps[1], line_no));
                }
                continue;
            }
            if in_group_block {
                if trimmed.starts_with(')') {
                    in_group_block = false;
                } else if let Some(caps) = GROUP_ENTRY_RE.captures(trimmed) {
                    decls.push(Declaration::new(DeclKind::Symbol, &caps[1], line_no));
                }
                continue;
            }

            let depth_before = depth;
            let (new_depth, min_close) = brace_deltas(&code, depth);
            let has_open = code.contains('{');
            let at_top = depth_before == 0;

            if IMPORT_BLOCK_RE.is_match(trimmed) {
                in_import_block = true;
            } else if let Some(caps) = IMPORT_SINGLE_RE.captures(raw.trim()) {
                decls.push(Declaration::new(DeclKind::Symbol, &caps[1], line_no));
            } else if at_top && GROUP_OPEN_RE.is_match(trimmed) {
                in_group_block = true;
            } else if let Some((kind, name)) = match_declaration(trimmed, at_top) {
                decls.push(Declaration::new(kind, name, line_no));
                let decl_idx = decls.len() - 1;
                if has_open {
                    open.open(decl_idx, depth_before);
                } else if !trimmed.ends_with(';') && kind == DeclKind::Function {
                    pending = Some(decl_idx);
                }
            } else if let Some(decl_idx) = pending.take() {
                if has_open {
                    open.open(decl_idx, depth_before);
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

fn match_declaration(code: &str, at_top: bool) -> Option<(DeclKind, String)> {
    if let Some(caps) = PACKAGE_RE.captures(code) {
        return Some((DeclKind::Symbol, caps[1].to_string()));
    }
    if let Some(caps) = FUNC_RE.captures(code) {
        let name = match caps.get(1) {
            Some(receiver) => format!("{}.{}", receiver.as_str(), &caps[2]),
            None => caps[2].to_string(),
        };
        return Some((DeclKind::Function, name));
    }
    if !at_top {
        return None;
    }
    if let Some(caps) = TYPE_RE.captures(code) {
        let kind = match &caps[2] {
            t if t.starts_with("struct") || t.starts_with("interface") => DeclKind::Class,
            _ => DeclKind::Symbol,
        };
        return Some((kind, caps[1].to_string()));
    }
    if let Some(caps) = VAR_CONST_RE.captures(code) {
        return Some((DeclKind::Symbol, caps[1].to_string()));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::parse_file;

    #[test]
    fn package_func_and_method() {
        let src = "package server\n\nfunc Listen(addr string) error {\n    return nil\n}\n\nfunc (s *Server) Close() {\n}\n";
        let decls = parse_file("go", "server.go", src);
        let names: Vec<&str> = decls.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["server", "Listen", "Server.Close"]);
        assert_eq!(decls[1].kind, DeclKind::Function);
        assert_eq!((decls[1].start_line, decls[1].end_line), (3, 5));
        assert_eq!(decls[2].kind, DeclKind::Function);
    }

    #[test]
    fn type_struct_and_interface_are_classes() {
        let src = "type Point struct {\n    X int\n    Y int\n}\n\ntype Reader interface {\n    Read(p []byte) (int, error)\n}\n\ntype ID int\n";
        let decls = parse_file("go", "t.go", src);
        let got: Vec<(&str, DeclKind)> =
            decls.iter().map(|d| (d.name.as_str(), d.kind)).collect();
        assert_eq!(
            got,
            vec![
                ("Point", DeclKind::Class),
                ("Reader", DeclKind::Class),
                ("ID", DeclKind::Symbol),
            ]
        );
        assert_eq!(decls[0].end_line, 4);
    }

    #[test]
    fn import_forms() {
        let src = "import \"fmt\"\n\nimport (\n    \"os\"\n    log \"github.com/rs/zerolog\"\n)\n";
        let decls = parse_file("go", "i.go", src);
        let names: Vec<&str> = decls.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["fmt", "os", "github.com/rs/zerolog"]);
        assert!(decls.iter().all(|d| d.kind == DeclKind::Symbol));
    }

    #[test]
    fn grouped_vars_and_consts() {
        let src = "var (\n    Debug   bool\n    Workers = 4\n)\n\nconst MaxRetries = 3\n";
        let decls = parse_file("go", "v.go", src);
        let names: Vec<&str> = decls.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Debug", "Workers", "MaxRetries"]);
    }

    #[test]
    fn locals_inside_functions_are_skipped() {
        let src = "func run() {\n    var attempts = 0\n    const limit = 3\n    _ = attempts + limit\n}\n";
        let decls = parse_file("go", "r.go", src);
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].name, "run");
    }

    #[test]
    fn anonymous_func_literals_are_not_declarations() {
        let src = "func main() {\n    go func() {\n    }()\n}\n";
        let decls = parse_file("go", "m.go", src);
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].name, "main");
    }
}
