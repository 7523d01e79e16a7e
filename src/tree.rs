//! Folder tree rendering.
//!
//! Depth-first walk of the scan root honoring the collector's exclude
//! rules. Directories print their trailing-slash name; entries nest under
//! four-space indentation. Directories sort before files, each
//! alphabetically, so the rendering is deterministic.

use std::path::Path;

use crate::matcher;

/// Render the filtered directory tree as indented ASCII lines.
pub fn render(root: &Path, exclude_patterns: &[String]) -> String {
    let mut out = String::new();
    walk(root, "", 0, exclude_patterns, &mut out);
    out
}

fn walk(dir: &Path, rel_prefix: &str, depth: usize, excludes: &[String], out: &mut String) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(err) => {
            tracing::debug!(dir = %dir.display(), %err, "skipping unreadable directory");
            return;
        }
    };

    let mut dirs: Vec<String> = Vec::new();
    let mut files: Vec<String> = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        match entry.file_type() {
            Ok(ft) if ft.is_dir() => dirs.push(name),
            Ok(ft) if ft.is_file() => files.push(name),
            _ => {}
        }
    }
    dirs.sort();
    files.sort();

    let indent = "    ".repeat(depth);

    for name in dirs {
        let rel = join_rel(rel_prefix, &name);
        if excludes
            .iter()
            .any(|p| matcher::matches_path_or_ancestors(&rel, p, true))
        {
            continue;
        }
        out.push_str(&format!("{indent}{name}/\n"));
        walk(&dir.join(&name), &rel, depth + 1, excludes, out);
    }

    for name in files {
        let rel = join_rel(rel_prefix, &name);
        if excludes
            .iter()
            .any(|p| matcher::matches_path_or_ancestors(&rel, p, false))
        {
            continue;
        }
        out.push_str(&format!("{indent}{name}\n"));
    }
}

fn join_rel(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}
