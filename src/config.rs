//! Configuration loading, validation, and defaults.
//!
//! Config values come from `<target_path>/.codeconcat.yml` (when present)
//! with CLI flags layered on top. Unknown keys in the file abort config
//! assembly; `#[serde(deny_unknown_fields)]` makes serde do the policing.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CodeConcatError, Result};

/// Conventional config file name, looked up inside the target directory.
pub const CONFIG_FILE_NAME: &str = ".codeconcat.yml";

/// Default output artifact name.
pub const DEFAULT_OUTPUT: &str = "code_concat_output.md";

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Top-level configuration for a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Root directory to scan.
    pub target_path: String,
    /// Glob patterns; when non-empty only matching files are collected.
    pub include_paths: Vec<String>,
    /// Glob patterns for files and directories to skip.
    pub exclude_paths: Vec<String>,
    /// When non-empty, only files of these languages are collected.
    pub include_languages: Vec<String>,
    /// Languages to drop during collection.
    pub exclude_languages: Vec<String>,
    /// Extract documentation files into a dedicated output section.
    pub extract_docs: bool,
    /// Interleave doc content with code output.
    pub merge_docs: bool,
    /// Lowercase extensions (with leading dot) treated as documentation.
    pub doc_extensions: Vec<String>,
    /// Extension (without dot) to language-tag overrides.
    pub custom_extension_map: HashMap<String, String>,
    /// Worker pool size for per-file parsing.
    pub max_workers: usize,
    /// Suppress the folder tree section.
    pub disable_tree: bool,
    /// Skip annotation; raw content is used as annotated content.
    pub disable_annotations: bool,
    /// Drop comment lines from emitted content.
    pub remove_comments: bool,
    /// Drop blank lines from emitted content.
    pub remove_empty_lines: bool,
    /// Prefix emitted lines with their original 1-based line numbers.
    pub show_line_numbers: bool,
    /// Emit the per-file summary/tags block.
    pub include_file_summary: bool,
    /// Emit the directory structure section.
    pub include_directory_structure: bool,
    /// Output artifact path.
    pub output: String,
    /// Output format.
    pub format: OutputFormat,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Markdown,
    Json,
    Xml,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Json => "json",
            OutputFormat::Xml => "xml",
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for Config {
    fn default() -> Self {
        Self {
            target_path: ".".to_string(),
            include_paths: Vec::new(),
            exclude_paths: Vec::new(),
            include_languages: Vec::new(),
            exclude_languages: Vec::new(),
            extract_docs: false,
            merge_docs: false,
            doc_extensions: vec![
                ".md".to_string(),
                ".rst".to_string(),
                ".txt".to_string(),
                ".rmd".to_string(),
            ],
            custom_extension_map: HashMap::new(),
            max_workers: 4,
            disable_tree: false,
            disable_annotations: false,
            remove_comments: false,
            remove_empty_lines: false,
            show_line_numbers: false,
            include_file_summary: true,
            include_directory_structure: true,
            output: DEFAULT_OUTPUT.to_string(),
            format: OutputFormat::Markdown,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading and validation
// ---------------------------------------------------------------------------

impl Config {
    /// Load config from a YAML file. Unknown keys are an error.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CodeConcatError::io(format!("reading config from '{}'", path.display()), e)
        })?;
        let config: Config = serde_yaml::from_str(&content).map_err(|e| {
            CodeConcatError::config_with_source(
                format!("failed to parse '{}'", path.display()),
                e,
            )
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `<dir>/.codeconcat.yml` when it exists, defaults otherwise.
    pub fn load_for_target(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate config values.
    pub fn validate(&self) -> Result<()> {
        if self.max_workers == 0 {
            return Err(CodeConcatError::validation(
                "max_workers",
                "must be at least 1",
            ));
        }
        if self.output.trim().is_empty() {
            return Err(CodeConcatError::validation("output", "must not be empty"));
        }
        Ok(())
    }

    /// Doc extensions normalized to lowercase without the leading dot.
    pub fn doc_extension_set(&self) -> Vec<String> {
        self.doc_extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Init template
// ---------------------------------------------------------------------------

/// Commented default config, written by `codeconcat --init`.
pub fn default_config_template() -> String {
    r#"# codeconcat configuration
# All keys are optional; unknown keys are rejected.

# Glob patterns applied during collection.
include_paths: []
exclude_paths: []

# Language tags, e.g. [python, rust].
include_languages: []
exclude_languages: []

# Documentation handling.
extract_docs: false
merge_docs: false
doc_extensions: [".md", ".rst", ".txt", ".rmd"]

# Extension (no dot) -> language tag overrides.
custom_extension_map: {}

# Worker pool size for per-file parsing.
max_workers: 4

# Output shaping.
disable_tree: false
disable_annotations: false
remove_comments: false
remove_empty_lines: false
show_line_numbers: false
include_file_summary: true
include_directory_structure: true

output: code_concat_output.md
format: markdown
"#
    .to_string()
}

/// Write the default config into `dir`, refusing to clobber without `force`.
pub fn write_default_config(dir: &Path, force: bool) -> Result<std::path::PathBuf> {
    let path = dir.join(CONFIG_FILE_NAME);
    if path.exists() && !force {
        return Err(CodeConcatError::config(format!(
            "config already exists at '{}' (use --force to overwrite)",
            path.display()
        )));
    }
    std::fs::write(&path, default_config_template())
        .map_err(|e| CodeConcatError::io(format!("writing config to '{}'", path.display()), e))?;
    Ok(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
