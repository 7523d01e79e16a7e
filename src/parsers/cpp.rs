//! C++ declaration scanner.
//!
//! Builds on the C heuristics with classes, namespaces, scoped enums,
//! `using` aliases, and templates. `template<...>` prefixes are stripped
//! before matching, and class/namespace blocks push onto the scope stack so
//! methods come out `Type::method`-qualified.

use once_cell::sync::Lazy;
use regex::Regex;

use super::common::{brace_deltas, trim_cr, CodeScrubber, OpenBlocks, ScopeStack};
use super::{DeclKind, Declaration, LanguageParser};

static CLASS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(class|struct)\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap());
static NAMESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:inline\s+)?namespace\s+([A-Za-z_][A-Za-z0-9_:]*)").unwrap());
static ENUM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^enum\s+(?:class\s+|struct\s+)?([A-Za-z_][A-Za-z0-9_]*)").unwrap()
});
static USING_ALIAS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^using\s+([A-Za-z_][A-Za-z0-9_]*)\s*=").unwrap());
static TYPEDEF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^typedef\s+.*?([A-Za-z_][A-Za-z0-9_]*)\s*;\s*$").unwrap());
static TEMPLATE_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^template\s*<[^>]*>\s*").unwrap());
static FUNCTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([A-Za-z_][A-Za-z0-9_\s\*&:<>,~]*?[\s\*&])((?:[A-Za-z_][A-Za-z0-9_]*::)*~?[A-Za-z_][A-Za-z0-9_]*)\s*\(",
    )
    .unwrap()
});
static CTOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:explicit\s+)?(~?[A-Za-z_][A-Za-z0-9_]*)\s*\(").unwrap()
});

const CONTROL_KEYWORDS: &[&str] = &[
    "if", "else", "for", "while", "switch", "return", "case", "do", "sizeof", "goto", "new",
    "delete", "throw", "catch",
];

pub struct CppParser;

impl LanguageParser for CppParser {
    fn parse(&self, _path: &str, content: &str) -> Vec<Declaration> {
        let mut scrubber = CodeScrubber::c_family();
        let mut decls: Vec<Declaration> = Vec::new();
        let mut open = OpenBlocks::new();
        let mut scopes = ScopeStack::new("::");
        let mut depth: i32 = 0;
        let mut pending: Option<(usize, Option<String>)> = None;
        let mut last_line = 0;

        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            last_line = line_no;
            let code = scrubber.scrub(trim_cr(raw));
            let mut trimmed = code.trim();
            if trimmed.is_empty() {
                continue;
            }

            // Preprocessor lines are not declarations in C++ mode.
            if trimmed.starts_with('#') {
                continue;
            }

            // Strip a `template<...>` prefix; a lone template line carries
            // no declaration of its own.
            if let Some(m) = TEMPLATE_PREFIX_RE.find(trimmed) {
                trimmed = trimmed[m.end()..].trim();
                if trimmed.is_empty() {
                    continue;
                }
            }

            let depth_before = depth;
            let (new_depth, min_close) = brace_deltas(&code, depth);
            let has_open = code.contains('{');
            let ends_stmt = trimmed.ends_with(';');

            if let Some(m) = match_declaration(trimmed, ends_stmt, &scopes) {
                decls.push(Declaration::new(m.0, m.1, line_no));
                let decl_idx = decls.len() - 1;
                if has_open {
                    open.open(decl_idx, depth_before);
                    if let Some(name) = m.2 {
                        scopes.push(name, depth_before);
                    }
                } else if !ends_stmt {
                    pending = Some((decl_idx, m.2));
                }
            } else if let Some((decl_idx, container)) = pending.take() {
                if has_open {
                    open.open(decl_idx, depth_before);
                    if let Some(name) = container {
                        scopes.push(name, depth_before);
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

/// (kind, name, container-name-if-scope-opening)
type Matched = (DeclKind, String, Option<String>);

fn match_declaration(code: &str, ends_stmt: bool, scopes: &ScopeStack) -> Option<Matched> {
    if let Some(caps) = NAMESPACE_RE.captures(code) {
        let name = caps[1].to_string();
        return Some((DeclKind::Class, name.clone(), Some(name)));
    }
    if let Some(caps) = CLASS_RE.captures(code) {
        let kind = if &caps[1] == "class" {
            DeclKind::Class
        } else {
            DeclKind::Struct
        };
        let name = caps[2].to_string();
        // Forward declarations (`class Foo;`) open no scope.
        let container = if ends_stmt { None } else { Some(name.clone()) };
        return Some((kind, name, container));
    }
    if let Some(caps) = ENUM_RE.captures(code) {
        return Some((DeclKind::Class, caps[1].to_string(), None));
    }
    if let Some(caps) = USING_ALIAS_RE.captures(code) {
        return Some((DeclKind::Symbol, caps[1].to_string(), None));
    }
    if code.starts_with("typedef") && ends_stmt {
        if let Some(caps) = TYPEDEF_RE.captures(code) {
            return Some((DeclKind::Symbol, caps[1].to_string(), None));
        }
        return None;
    }
    if let Some(caps) = FUNCTION_RE.captures(code) {
        let prefix_first = caps[1]
            .split_whitespace()
            .next()
            .unwrap_or("")
            .trim_end_matches(['*', '&']);
        let name = caps[2].to_string();
        if !CONTROL_KEYWORDS.contains(&prefix_first)
            && !CONTROL_KEYWORDS.contains(&name.as_str())
            && prefix_first != "using"
        {
            let qualified = if name.contains("::") {
                name
            } else {
                scopes.qualify(&name)
            };
            return Some((DeclKind::Function, qualified, None));
        }
    }
    // Constructors and destructors: bare `Name(...)` inside `class Name`.
    if let Some(scope) = scopes.innermost() {
        if let Some(caps) = CTOR_RE.captures(code) {
            let name = caps[1].to_string();
            if name.trim_start_matches('~') == scope.name {
                return Some((DeclKind::Function, scopes.qualify(&name), None));
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
    fn class_with_methods_is_qualified() {
        let src = "class Engine {\npublic:\n    void start() {\n    }\n    int rpm() const;\n};\n";
        let decls = parse_file("cpp", "e.cpp", src);
        let names: Vec<&str> = decls.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Engine", "Engine::start", "Engine::rpm"]);
        assert_eq!(decls[0].end_line, 6);
        assert_eq!((decls[1].start_line, decls[1].end_line), (3, 4));
        assert_eq!(decls[2].start_line, decls[2].end_line);
    }

    #[test]
    fn namespace_qualifies_contents() {
        let src = "namespace net {\nclass Socket {\n};\nvoid connect() {\n}\n}\n";
        let decls = parse_file("cpp", "n.cpp", src);
        let names: Vec<&str> = decls.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["net", "Socket", "net::connect"]);
    }

    #[test]
    fn typedef_is_one_line_symbol() {
        let src = "typedef std::vector<int> IntVec;\n";
        let decls = parse_file("cpp", "t.hpp", src);
        assert_eq!(decls[0].kind, DeclKind::Symbol);
        assert_eq!(decls[0].name, "IntVec");
        assert_eq!(decls[0].start_line, decls[0].end_line);
    }

    #[test]
    fn using_alias_is_a_symbol() {
        let src = "using Buffer = std::array<char, 64>;\nusing namespace std;\n";
        let decls = parse_file("cpp", "u.hpp", src);
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].name, "Buffer");
    }

    #[test]
    fn template_prefix_is_stripped() {
        let src = "template <typename T>\nclass Stack {\n};\ntemplate <typename T> T max_of(T a, T b) {\n    return a > b ? a : b;\n}\n";
        let decls = parse_file("cpp", "t.hpp", src);
        let names: Vec<&str> = decls.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Stack", "max_of"]);
        assert_eq!(decls[0].kind, DeclKind::Class);
        assert_eq!(decls[1].kind, DeclKind::Function);
    }

    #[test]
    fn enum_class_matches() {
        let src = "enum class Mode {\n    Fast,\n    Slow,\n};\n";
        let decls = parse_file("cpp", "m.hpp", src);
        assert_eq!(decls[0].name, "Mode");
        assert_eq!(decls[0].kind, DeclKind::Class);
    }

    #[test]
    fn out_of_line_method_definition() {
        let src = "void Engine::start() {\n    ignite();\n}\n";
        let decls = parse_file("cpp", "e.cpp", src);
        assert_eq!(decls[0].name, "Engine::start");
        assert_eq!(decls[0].end_line, 3);
    }

    #[test]
    fn constructor_and_destructor() {
        let src = "class File {\n    File(const char *path) {\n    }\n    ~File() {\n    }\n};\n";
        let decls = parse_file("cpp", "f.cpp", src);
        let names: Vec<&str> = decls.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["File", "File::File", "File::~File"]);
    }
}
