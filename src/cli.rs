use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::{Config, OutputFormat};
use crate::error::Result;

#[derive(Parser, Debug)]
#[command(
    name = "codeconcat",
    about = "Flatten a multi-language repository into one LLM-friendly document",
    version
)]
pub struct Cli {
    /// Directory to scan
    #[arg(default_value = ".")]
    pub target_path: PathBuf,

    /// Create a default .codeconcat.yml in the target directory and exit
    #[arg(long)]
    pub init: bool,

    /// Overwrite an existing config file during --init
    #[arg(long, requires = "init")]
    pub force: bool,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormatArg>,

    /// Glob pattern to include (repeatable); others are dropped
    #[arg(long = "include-path", value_name = "GLOB")]
    pub include_paths: Vec<String>,

    /// Glob pattern to exclude (repeatable)
    #[arg(long = "exclude-path", value_name = "GLOB")]
    pub exclude_paths: Vec<String>,

    /// Language tag to include (repeatable); others are dropped
    #[arg(long = "include-language", value_name = "LANG")]
    pub include_languages: Vec<String>,

    /// Language tag to exclude (repeatable)
    #[arg(long = "exclude-language", value_name = "LANG")]
    pub exclude_languages: Vec<String>,

    /// Collect documentation files into a dedicated section
    #[arg(long)]
    pub extract_docs: bool,

    /// Interleave documentation with code output
    #[arg(long)]
    pub merge_docs: bool,

    /// Worker pool size for per-file parsing
    #[arg(long, value_name = "N")]
    pub max_workers: Option<usize>,

    /// Skip the folder tree section
    #[arg(long)]
    pub no_tree: bool,

    /// Skip annotation; emit raw file content
    #[arg(long)]
    pub no_annotations: bool,

    /// Drop comment lines from emitted content
    #[arg(long)]
    pub remove_comments: bool,

    /// Drop blank lines from emitted content
    #[arg(long)]
    pub remove_empty_lines: bool,

    /// Prefix emitted lines with original line numbers
    #[arg(long)]
    pub show_line_numbers: bool,

    /// Skip the per-file summary block
    #[arg(long)]
    pub no_file_summary: bool,

    /// Skip the directory structure section
    #[arg(long)]
    pub no_directory_structure: bool,

    /// Suppress the end-of-run summary
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Color output mode
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

/// CLI mirror of [`OutputFormat`], decoupled from serde so the library
/// type carries no clap dependency.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Markdown,
    Json,
    Xml,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Markdown => OutputFormat::Markdown,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Xml => OutputFormat::Xml,
        }
    }
}

/// Assemble the effective config: file values first, CLI flags on top.
pub fn build_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load_for_target(&cli.target_path)?;
    config.target_path = cli.target_path.to_string_lossy().to_string();

    if let Some(ref output) = cli.output {
        config.output = output.to_string_lossy().to_string();
    }
    if let Some(format) = cli.format {
        config.format = format.into();
    }
    if !cli.include_paths.is_empty() {
        config.include_paths = cli.include_paths.clone();
    }
    if !cli.exclude_paths.is_empty() {
        config.exclude_paths.extend(cli.exclude_paths.iter().cloned());
    }
    if !cli.include_languages.is_empty() {
        config.include_languages = cli.include_languages.clone();
    }
    if !cli.exclude_languages.is_empty() {
        config
            .exclude_languages
            .extend(cli.exclude_languages.iter().cloned());
    }
    if let Some(workers) = cli.max_workers {
        config.max_workers = workers;
    }
    if cli.extract_docs {
        config.extract_docs = true;
    }
    if cli.merge_docs {
        config.merge_docs = true;
    }
    if cli.no_tree {
        config.disable_tree = true;
    }
    if cli.no_annotations {
        config.disable_annotations = true;
    }
    if cli.remove_comments {
        config.remove_comments = true;
    }
    if cli.remove_empty_lines {
        config.remove_empty_lines = true;
    }
    if cli.show_line_numbers {
        config.show_line_numbers = true;
    }
    if cli.no_file_summary {
        config.include_file_summary = false;
    }
    if cli.no_directory_structure {
        config.include_directory_structure = false;
    }

    config.validate()?;
    Ok(config)
}
