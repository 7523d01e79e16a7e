//! Declaration extraction: one line-based scanner per language.
//!
//! Parsers are deliberately not full grammars. Each one recognizes the
//! top-level declaration forms of its language with regex patterns, tracks
//! comments, strings, and block structure well enough to assign line spans,
//! and errs on the side of extracting too much rather than dropping real
//! declarations. A parser never fails: pathological input yields an empty
//! list at worst.

pub mod common;

pub mod c;
pub mod cpp;
pub mod csharp;
pub mod go;
pub mod java;
pub mod jsts;
pub mod julia;
pub mod php;
pub mod python;
pub mod r;
pub mod rust;

// ---------------------------------------------------------------------------
// External model
// ---------------------------------------------------------------------------

/// Externally visible declaration kind.
///
/// Parsers may distinguish richer internal kinds (methods, properties,
/// macros, namespaces); everything collapses to these four on emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Function,
    Class,
    Struct,
    Symbol,
}

impl DeclKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclKind::Function => "function",
            DeclKind::Class => "class",
            DeclKind::Struct => "struct",
            DeclKind::Symbol => "symbol",
        }
    }

    /// Plural bucket label used in summaries and annotation headers.
    pub fn plural(&self) -> &'static str {
        match self {
            DeclKind::Function => "functions",
            DeclKind::Class => "classes",
            DeclKind::Struct => "structs",
            DeclKind::Symbol => "symbols",
        }
    }
}

/// A named construct extracted from source, with a 1-based inclusive span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub kind: DeclKind,
    pub name: String,
    pub start_line: usize,
    pub end_line: usize,
}

impl Declaration {
    /// A declaration spanning a single line until proven otherwise.
    pub fn new(kind: DeclKind, name: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            name: name.into(),
            start_line: line,
            end_line: line,
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Capability set every language parser satisfies.
pub trait LanguageParser: Send + Sync {
    /// Extract declarations in source order. Must not panic on weird input.
    fn parse(&self, path: &str, content: &str) -> Vec<Declaration>;
}

/// Look up the parser for a language tag.
pub fn parser_for(language: &str) -> Option<&'static dyn LanguageParser> {
    static PYTHON: python::PythonParser = python::PythonParser;
    static C: c::CParser = c::CParser;
    static CPP: cpp::CppParser = cpp::CppParser;
    static CSHARP: csharp::CSharpParser = csharp::CSharpParser;
    static JAVA: java::JavaParser = java::JavaParser;
    static GO: go::GoParser = go::GoParser;
    static PHP: php::PhpParser = php::PhpParser;
    static RUST: rust::RustParser = rust::RustParser;
    static JAVASCRIPT: jsts::JsTsParser = jsts::JsTsParser::javascript();
    static TYPESCRIPT: jsts::JsTsParser = jsts::JsTsParser::typescript();
    static JULIA: julia::JuliaParser = julia::JuliaParser;
    static R: r::RParser = r::RParser;

    match language {
        "python" => Some(&PYTHON),
        "c" => Some(&C),
        "cpp" => Some(&CPP),
        "csharp" => Some(&CSHARP),
        "java" => Some(&JAVA),
        "go" => Some(&GO),
        "php" => Some(&PHP),
        "rust" => Some(&RUST),
        "javascript" => Some(&JAVASCRIPT),
        "typescript" => Some(&TYPESCRIPT),
        "julia" => Some(&JULIA),
        "r" => Some(&R),
        _ => None,
    }
}

/// Dispatch a file to its parser.
///
/// Unknown languages and doc files yield no declarations. A parser that
/// panics internally is treated as having found nothing; the event is
/// logged at debug level and the pipeline carries on.
pub fn parse_file(language: &str, path: &str, content: &str) -> Vec<Declaration> {
    let Some(parser) = parser_for(language) else {
        return Vec::new();
    };
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        parser.parse(path, content)
    })) {
        Ok(decls) => decls,
        Err(_) => {
            tracing::debug!(path, language, "parser failed; treating as no declarations");
            Vec::new()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_all_languages() {
        for tag in [
            "python",
            "c",
            "cpp",
            "csharp",
            "java",
            "go",
            "php",
            "rust",
            "javascript",
            "typescript",
            "julia",
            "r",
        ] {
            assert!(parser_for(tag).is_some(), "no parser for {tag}");
        }
    }

    #[test]
    fn unknown_language_has_no_parser() {
        assert!(parser_for("doc").is_none());
        assert!(parser_for("unknown").is_none());
        assert!(parse_file("doc", "README.md", "# hi").is_empty());
    }

    #[test]
    fn declarations_are_in_source_order() {
        let src = "fn a() {}\nfn b() {}\nfn c() {}\n";
        let decls = parse_file("rust", "x.rs", src);
        for pair in decls.windows(2) {
            assert!(pair[0].start_line <= pair[1].start_line);
        }
    }

    #[test]
    fn spans_stay_within_the_file() {
        let src = "class A:\n    def m(self):\n        pass\n";
        let line_count = src.lines().count();
        for d in parse_file("python", "a.py", src) {
            assert!(d.start_line >= 1);
            assert!(d.start_line <= d.end_line);
            assert!(d.end_line <= line_count);
        }
    }
}
