//! R declaration scanner.
//!
//! Recognizes `name <- function(...)` (and the `=` form), S4 `setClass` /
//! `setMethod` calls, and UPPER_CASE constant assignments. Function bodies
//! use brace tracking; a body without braces is a one-liner. Comments are
//! `#` and there are no block comments.

use once_cell::sync::Lazy;
use regex::Regex;

use super::common::{brace_deltas, trim_cr, CodeScrubber, OpenBlocks, ScrubOptions, SingleQuote};
use super::{DeclKind, Declaration, LanguageParser};

static FUNCTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z_.][A-Za-z0-9_.]*)\s*(?:<-|=)\s*function\s*\(").unwrap()
});
static SET_CLASS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^setClass\(\s*"([^"]+)""#).unwrap());
static SET_METHOD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^setMethod\(\s*"([^"]+)""#).unwrap());
static CONSTANT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z][A-Z0-9_.]*)\s*(?:<-|=)[^=]").unwrap());

fn r_scrubber() -> CodeScrubber {
    CodeScrubber::new(ScrubOptions {
        slash_comments: false,
        hash_comments: true,
        block_delims: None,
        single_quote: SingleQuote::Text,
        template_literals: false,
    })
}

pub struct RParser;

impl LanguageParser for RParser {
    fn parse(&self, _path: &str, content: &str) -> Vec<Declaration> {
        let mut scrubber = r_scrubber();
        let mut decls: Vec<Declaration> = Vec::new();
        let mut open = OpenBlocks::new();
        let mut depth: i32 = 0;
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

            let depth_before = depth;
            let (new_depth, min_close) = brace_deltas(&code, depth);
            let has_open = code.contains('{');

            // setClass/setMethod carry their names in string literals, so
            // they match against the raw line.
            if let Some((kind, name)) = match_declaration(trimmed, raw.trim(), depth_before) {
                decls.push(Declaration::new(kind, name, line_no));
                if has_open {
                    open.open(decls.len() - 1, depth_before);
                }
            }

            depth = new_depth;
            open.close_at(min_close, line_no, &mut decls);
        }

        open.close_all(last_line, &mut decls);
        decls
    }
}

fn match_declaration(code: &str, raw: &str, depth: i32) -> Option<(DeclKind, String)> {
    if let Some(caps) = FUNCTION_RE.captures(code) {
        return Some((DeclKind::Function, caps[1].to_string()));
    }
    if let Some(caps) = SET_CLASS_RE.captures(raw) {
        return Some((DeclKind::Class, caps[1].to_string()));
    }
    if let Some(caps) = SET_METHOD_RE.captures(raw) {
        return Some((DeclKind::Function, caps[1].to_string()));
    }
    if depth == 0 {
        if let Some(caps) = CONSTANT_RE.captures(code) {
            return Some((DeclKind::Symbol, caps[1].to_string()));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::parse_file;

    #[test]
    fn arrow_function_with_braces() {
        let src = "normalize <- function(x) {\n  (x - mean(x)) / sd(x)\n}\n";
        let decls = parse_file("r", "n.R", src);
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].kind, DeclKind::Function);
        assert_eq!(decls[0].name, "normalize");
        assert_eq!((decls[0].start_line, decls[0].end_line), (1, 3));
    }

    #[test]
    fn equals_form_and_one_liner() {
        let src = "double = function(x) x * 2\n";
        let decls = parse_file("r", "d.R", src);
        assert_eq!(decls[0].name, "double");
        assert_eq!(decls[0].start_line, decls[0].end_line);
    }

    #[test]
    fn set_class_and_set_method() {
        let src = "setClass(\"Person\", representation(name = \"character\"))\nsetMethod(\"show\", \"Person\", function(object) {\n  cat(object@name)\n})\n";
        let decls = parse_file("r", "p.R", src);
        assert_eq!(decls[0].kind, DeclKind::Class);
        assert_eq!(decls[0].name, "Person");
        assert_eq!(decls[1].kind, DeclKind::Function);
        assert_eq!(decls[1].name, "show");
        assert_eq!(decls[1].end_line, 4);
    }

    #[test]
    fn upper_case_constant() {
        let src = "MAX_ITER <- 100\nlocal_var <- 5\n";
        let decls = parse_file("r", "c.R", src);
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].name, "MAX_ITER");
        assert_eq!(decls[0].kind, DeclKind::Symbol);
    }

    #[test]
    fn comments_are_ignored() {
        let src = "# fake <- function(x) x\nreal <- function(x) x\n";
        let decls = parse_file("r", "f.R", src);
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].name, "real");
    }

    #[test]
    fn dotted_names_are_allowed() {
        let src = "print.myclass <- function(x, ...) {\n  invisible(x)\n}\n";
        let decls = parse_file("r", "m.R", src);
        assert_eq!(decls[0].name, "print.myclass");
    }
}
