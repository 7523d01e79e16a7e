//! File-extension to language-tag mapping.
//!
//! A fixed built-in table covers the languages the parsers understand plus
//! the documentation extensions; user-supplied `custom_extension_map` entries
//! take precedence over the built-ins.

use std::collections::HashMap;

/// Language tag assigned to documentation-typed files.
pub const DOC: &str = "doc";

/// Language tag assigned when no table entry applies.
pub const UNKNOWN: &str = "unknown";

/// Map a file path to a language tag.
///
/// Takes the last extension, lowercases it, and looks it up in the custom
/// map first, then the built-in table. Files without a recognized extension
/// get [`UNKNOWN`], which writers treat as opaque text.
pub fn detect(path: &str, custom_map: &HashMap<String, String>) -> String {
    let ext = match extension_of(path) {
        Some(e) => e,
        None => return UNKNOWN.to_string(),
    };

    if let Some(tag) = custom_map.get(&ext) {
        return tag.clone();
    }

    builtin(&ext)
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// The last extension of a path, lowercased, without the leading dot.
pub fn extension_of(path: &str) -> Option<String> {
    let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() {
        // Dotfiles like `.gitignore` have no extension.
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Built-in extension table.
fn builtin(ext: &str) -> Option<&'static str> {
    let tag = match ext {
        "py" => "python",
        "js" | "jsx" => "javascript",
        "ts" | "tsx" => "typescript",
        "r" => "r",
        "jl" => "julia",
        "cpp" | "cxx" | "hpp" | "hxx" | "cc" => "cpp",
        "c" | "h" => "c",
        "cs" => "csharp",
        "java" => "java",
        "go" => "go",
        "php" => "php",
        "rs" => "rust",
        "md" | "rst" | "txt" | "rmd" => DOC,
        _ => return None,
    };
    Some(tag)
}
