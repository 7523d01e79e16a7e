//! File discovery and content loading.
//!
//! Walks the target directory with the `ignore` crate's `WalkBuilder`
//! (standard filters off, sorted by file name, so the walk order is a
//! deterministic alphabetical DFS), applies the built-in and configured
//! exclude patterns, filters by language, drops binaries, and reads the
//! survivors with lossy UTF-8 decoding. Reads run on the caller's rayon
//! pool; the result order is always the walk order.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::config::Config;
use crate::error::{CodeConcatError, Result};
use crate::language;
use crate::matcher;
use crate::parsers::Declaration;
use crate::security::SecurityIssue;

/// Files larger than this are skipped with a warning.
const MAX_FILE_SIZE: u64 = 20 * 1024 * 1024;

/// Built-in exclude patterns, normalized to a single `**/`-anchored set.
///
/// Covers VCS and editor metadata, compiled artifact directories,
/// byte-compiled files, logs, and this tool's own configuration.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "**/.git/**",
    "**/.svn/**",
    "**/.hg/**",
    "**/.idea/**",
    "**/.vscode/**",
    "**/__pycache__/**",
    "**/node_modules/**",
    "**/vendor/**",
    "**/build/**",
    "**/dist/**",
    "**/target/**",
    "**/venv/**",
    "**/.venv/**",
    "**/*.egg-info/**",
    "**/*.pyc",
    "**/*.pyo",
    "**/*.class",
    "**/*.o",
    "**/*.obj",
    "**/*.so",
    "**/*.dylib",
    "**/*.dll",
    "**/*.exe",
    "**/*.log",
    "**/.DS_Store",
    "**/.codeconcat.yml",
];

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A collected source file.
///
/// Fresh from the collector only `path`, `language`, and `content` are
/// populated; the pipeline fills in declarations and security issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Repo-relative, forward-slash-normalized path.
    pub path: String,
    /// Language tag from the detector.
    pub language: String,
    /// Decoded text; invalid bytes become replacement characters.
    pub content: String,
    pub declarations: Vec<Declaration>,
    pub security_issues: Vec<SecurityIssue>,
}

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

/// The full exclude set for a run: built-ins, configured patterns, and the
/// tool's own output artifact.
pub fn exclude_patterns(config: &Config) -> Vec<String> {
    let mut patterns: Vec<String> = DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect();
    patterns.extend(config.exclude_paths.iter().cloned());
    let output = matcher::normalize(&config.output);
    if let Some(name) = output.rsplit('/').next() {
        if !name.is_empty() {
            patterns.push(format!("**/{name}"));
        }
    }
    patterns
}

/// Walk the target directory and return readable text files in walk order.
pub fn collect(config: &Config) -> Result<Vec<FileRecord>> {
    let root = PathBuf::from(&config.target_path);
    if !root.exists() {
        return Err(CodeConcatError::path_not_found(&config.target_path));
    }

    let excludes = exclude_patterns(config);
    let candidates = discover(&root, config, &excludes);

    // Reads run in parallel on the ambient rayon pool; collect() preserves
    // the discovery order.
    let records: Vec<FileRecord> = candidates
        .into_par_iter()
        .filter_map(|(rel_path, abs_path, lang)| read_record(&rel_path, &abs_path, lang))
        .collect();

    Ok(records)
}

/// Deterministic walk yielding (relative path, absolute path, language) for
/// every candidate that passes the path and language filters.
fn discover(root: &Path, config: &Config, excludes: &[String]) -> Vec<(String, PathBuf, String)> {
    let mut walker = ignore::WalkBuilder::new(root);
    walker
        .standard_filters(false)
        .hidden(false)
        .follow_links(false)
        .sort_by_file_name(std::cmp::Ord::cmp);

    // Prune excluded directories so their subtrees are never descended.
    let prune_root = root.to_path_buf();
    let prune_excludes = excludes.to_vec();
    walker.filter_entry(move |entry| {
        if entry.depth() == 0 {
            return true;
        }
        let rel = relative_path(&prune_root, entry.path());
        let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
        if !is_dir {
            return true;
        }
        !prune_excludes
            .iter()
            .any(|p| matcher::matches_path_or_ancestors(&rel, p, true))
    });

    let mut candidates = Vec::new();

    for entry in walker.build() {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                tracing::debug!(%err, "skipping unreadable walk entry");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let rel = relative_path(root, entry.path());

        // A pattern matching the file itself or any ancestor rejects it.
        if excludes
            .iter()
            .any(|p| matcher::matches_path_or_ancestors(&rel, p, false))
        {
            continue;
        }

        // Include patterns, when present, are a whitelist.
        if !config.include_paths.is_empty()
            && !config
                .include_paths
                .iter()
                .any(|p| matcher::matches_path_or_ancestors(&rel, p, false))
        {
            continue;
        }

        let lang = language::detect(&rel, &config.custom_extension_map);
        if config.exclude_languages.contains(&lang) {
            continue;
        }
        if !config.include_languages.is_empty()
            && lang != language::DOC
            && !config.include_languages.contains(&lang)
        {
            continue;
        }

        if let Ok(meta) = entry.metadata() {
            if meta.len() > MAX_FILE_SIZE {
                tracing::warn!(path = %rel, size = meta.len(), "skipping oversized file");
                continue;
            }
        }

        candidates.push((rel, entry.path().to_path_buf(), lang));
    }

    candidates
}

/// Read one candidate; binary and unreadable files drop out with a debug log.
fn read_record(rel_path: &str, abs_path: &Path, language: String) -> Option<FileRecord> {
    let bytes = match std::fs::read(abs_path) {
        Ok(b) => b,
        Err(err) => {
            tracing::debug!(path = rel_path, %err, "dropping unreadable file");
            return None;
        }
    };

    if looks_binary(&bytes) {
        tracing::debug!(path = rel_path, "dropping binary file");
        return None;
    }

    Some(FileRecord {
        path: rel_path.to_string(),
        language,
        content: String::from_utf8_lossy(&bytes).into_owned(),
        declarations: Vec::new(),
        security_issues: Vec::new(),
    })
}

/// Binary sniff: the first line (or first 8 KiB) must decode as UTF-8 and
/// carry no NUL byte.
fn looks_binary(bytes: &[u8]) -> bool {
    let window = bytes
        .iter()
        .position(|&b| b == b'\n')
        .map(|p| p + 1)
        .unwrap_or(bytes.len())
        .min(8192);
    let head = &bytes[..window];
    head.contains(&0) || std::str::from_utf8(head).is_err()
}

/// Forward-slash-normalized path relative to the scan root.
fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    matcher::normalize(&rel.to_string_lossy())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
