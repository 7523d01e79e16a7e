//! Python declaration scanner.
//!
//! Indentation-driven: an `indent_stack` of open `class`/`def` blocks is
//! popped whenever a code line dedents to or below the opener's own indent.
//! Triple-quoted strings are tracked so docstring bodies never produce
//! declarations, and decorators accumulate onto the next `class`/`def`.

use once_cell::sync::Lazy;
use regex::Regex;

use super::common::{indent_width, trim_cr};
use super::{DeclKind, Declaration, LanguageParser};

const TAB_WIDTH: usize = 4;

static CLASS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^class\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap());
static DEF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:async\s+)?def\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap());
static CONSTANT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z][A-Z0-9_]*)\s*=([^=].*)?$").unwrap());
static VARIABLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-z_][a-z0-9_]*)\s*=([^=].*)?$").unwrap());

pub struct PythonParser;

impl LanguageParser for PythonParser {
    fn parse(&self, _path: &str, content: &str) -> Vec<Declaration> {
        let mut decls: Vec<Declaration> = Vec::new();
        // (declaration index, indent of the def/class line itself)
        let mut indent_stack: Vec<(usize, usize)> = Vec::new();
        let mut pending_decorators: Vec<usize> = Vec::new();
        let mut string_delim: Option<&'static str> = None;
        let mut line_count = 0;

        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            line_count = line_no;
            let line = trim_cr(raw);

            // Inside a triple-quoted literal: only look for the closer.
            if let Some(delim) = string_delim {
                if line.contains(delim) {
                    string_delim = None;
                }
                continue;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let indent = indent_width(line, TAB_WIDTH);

            // Dedent closes every block opened at this indent or deeper.
            while let Some(&(decl_idx, open_indent)) = indent_stack.last() {
                if indent <= open_indent {
                    decls[decl_idx].end_line = line_no.saturating_sub(1).max(decls[decl_idx].start_line);
                    indent_stack.pop();
                } else {
                    break;
                }
            }

            if trimmed.starts_with('@') {
                pending_decorators.push(line_no);
                continue;
            }

            if let Some(caps) = CLASS_RE.captures(trimmed) {
                let decl = Declaration::new(DeclKind::Class, &caps[1], line_no);
                decls.push(decl);
                indent_stack.push((decls.len() - 1, indent));
                pending_decorators.clear();
            } else if let Some(caps) = DEF_RE.captures(trimmed) {
                let decl = Declaration::new(DeclKind::Function, &caps[1], line_no);
                decls.push(decl);
                indent_stack.push((decls.len() - 1, indent));
                pending_decorators.clear();
            } else if indent == 0 && indent_stack.is_empty() {
                if let Some(caps) = CONSTANT_RE.captures(trimmed) {
                    decls.push(Declaration::new(DeclKind::Symbol, &caps[1], line_no));
                } else if let Some(caps) = VARIABLE_RE.captures(trimmed) {
                    let rhs = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
                    if !rhs.starts_with("def ") && !rhs.starts_with("class ") {
                        decls.push(Declaration::new(DeclKind::Symbol, &caps[1], line_no));
                    }
                }
            }

            // Enter triple-quoted string state when a delimiter opens and
            // does not close on the same line. Docstrings land here, so a
            // `def` inside one never matches.
            string_delim = unclosed_triple_quote(trimmed);
        }

        // Blocks still open at EOF run to the last line.
        for (decl_idx, _) in indent_stack {
            decls[decl_idx].end_line = line_count;
        }

        decls
    }
}

/// Returns the delimiter of a triple-quoted literal that opens on this line
/// without closing, if any.
fn unclosed_triple_quote(line: &str) -> Option<&'static str> {
    for delim in ["\"\"\"", "'''"] {
        if line.matches(delim).count() % 2 == 1 {
            return Some(delim);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::parse_file;

    #[test]
    fn simple_function_runs_to_eof() {
        let src = "def greet():\n    return \"hi\"\n";
        let decls = parse_file("python", "hello.py", src);
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].kind, DeclKind::Function);
        assert_eq!(decls[0].name, "greet");
        assert_eq!(decls[0].start_line, 1);
        assert_eq!(decls[0].end_line, 2);
    }

    #[test]
    fn class_with_methods() {
        let src = "class Greeter:\n    def hello(self):\n        pass\n\n    def bye(self):\n        pass\n";
        let decls = parse_file("python", "g.py", src);
        let names: Vec<&str> = decls.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Greeter", "hello", "bye"]);
        assert_eq!(decls[0].kind, DeclKind::Class);
        // hello closes just before bye opens.
        assert_eq!(decls[1].end_line, 4);
        // Greeter and bye run to EOF.
        assert_eq!(decls[0].end_line, 6);
        assert_eq!(decls[2].end_line, 6);
    }

    #[test]
    fn dedent_closes_function() {
        let src = "def a():\n    pass\n\nX = 1\n";
        let decls = parse_file("python", "m.py", src);
        assert_eq!(decls[0].name, "a");
        assert_eq!(decls[0].end_line, 3);
        assert_eq!(decls[1].name, "X");
        assert_eq!(decls[1].kind, DeclKind::Symbol);
    }

    #[test]
    fn decorators_attach_to_next_def() {
        let src = "@app.route(\"/\")\n@cached\ndef index():\n    pass\n";
        let decls = parse_file("python", "app.py", src);
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].name, "index");
        assert_eq!(decls[0].start_line, 3);
    }

    #[test]
    fn docstring_body_is_not_parsed() {
        let src = "\"\"\"module docs\ndef fake(): pass\n\"\"\"\n\ndef real():\n    pass\n";
        let decls = parse_file("python", "m.py", src);
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].name, "real");
    }

    #[test]
    fn single_line_docstring_does_not_poison_state() {
        let src = "def f():\n    \"\"\"one line\"\"\"\n    pass\n\ndef g():\n    pass\n";
        let decls = parse_file("python", "m.py", src);
        let names: Vec<&str> = decls.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["f", "g"]);
    }

    #[test]
    fn module_constants_and_variables() {
        let src = "MAX_SIZE = 100\ncount = 0\nignored == equality\n";
        let decls = parse_file("python", "m.py", src);
        let names: Vec<&str> = decls.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["MAX_SIZE", "count"]);
        assert!(decls.iter().all(|d| d.kind == DeclKind::Symbol));
    }

    #[test]
    fn lambda_assignment_is_a_variable() {
        let src = "double = lambda x: x * 2\n";
        let decls = parse_file("python", "m.py", src);
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].name, "double");
    }

    #[test]
    fn locals_inside_functions_are_not_module_symbols() {
        let src = "def f():\n    x = 1\n    return x\n";
        let decls = parse_file("python", "m.py", src);
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].name, "f");
    }

    #[test]
    fn comments_and_blanks_only_yield_nothing() {
        let src = "# a comment\n\n# another\n\n";
        assert!(parse_file("python", "m.py", src).is_empty());
    }

    #[test]
    fn crlf_input_behaves_like_lf() {
        let src = "def greet():\r\n    return \"hi\"\r\n";
        let decls = parse_file("python", "h.py", src);
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].name, "greet");
        assert_eq!(decls[0].end_line, 2);
    }

    #[test]
    fn async_def_is_a_function() {
        let src = "async def fetch():\n    pass\n";
        let decls = parse_file("python", "m.py", src);
        assert_eq!(decls[0].name, "fetch");
        assert_eq!(decls[0].kind, DeclKind::Function);
    }
}
