//! Output writers: markdown, JSON, and XML from one logical model.
//!
//! Every writer consumes the same inputs (annotated files, doc records, the
//! optional folder tree) and produces a single UTF-8 artifact with LF line
//! endings at `config.output`. Content processing (comment stripping, blank
//! line removal, line numbering) is shared and always numbers lines by
//! their original position, before any stripping.

use serde::Serialize;

use crate::annotator::AnnotatedFileRecord;
use crate::config::{Config, OutputFormat};
use crate::docs::DocRecord;
use crate::error::{CodeConcatError, Result};
use crate::security::SecurityIssue;
use crate::stats::RunStats;

// ---------------------------------------------------------------------------
// Content processing
// ---------------------------------------------------------------------------

/// Apply the configured post-processing toggles to file content.
///
/// Line numbers, when enabled, are the 1-based positions in the original
/// content, computed before comment or blank-line stripping.
pub fn process_content(content: &str, config: &Config) -> String {
    let mut out: Vec<String> = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if config.remove_empty_lines && trimmed.is_empty() {
            continue;
        }
        if config.remove_comments && is_comment_line(trimmed) {
            continue;
        }
        if config.show_line_numbers {
            out.push(format!("{:<4} | {}", idx + 1, line));
        } else {
            out.push(line.to_string());
        }
    }
    out.join("\n")
}

/// Conservative language-agnostic comment test, by design prefix-based.
fn is_comment_line(trimmed: &str) -> bool {
    trimmed.starts_with('#')
        || trimmed.starts_with("//")
        || trimmed.starts_with("/*")
        || trimmed.starts_with('*')
        || trimmed.starts_with("\"\"\"")
        || trimmed.starts_with("'''")
        || trimmed.ends_with("*/")
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Render in the configured format and write the artifact once.
pub fn write_output(
    files: &[AnnotatedFileRecord],
    docs: &[DocRecord],
    config: &Config,
    folder_tree: Option<&str>,
    stats: &RunStats,
) -> Result<()> {
    let rendered = render(files, docs, config, folder_tree, stats)?;
    std::fs::write(&config.output, rendered)
        .map_err(|e| CodeConcatError::write_failure(&config.output, e))
}

/// Render to a string without touching the filesystem.
pub fn render(
    files: &[AnnotatedFileRecord],
    docs: &[DocRecord],
    config: &Config,
    folder_tree: Option<&str>,
    stats: &RunStats,
) -> Result<String> {
    match config.format {
        OutputFormat::Markdown => Ok(render_markdown(files, docs, config, folder_tree, stats)),
        OutputFormat::Json => render_json(files, docs, config, folder_tree, stats),
        OutputFormat::Xml => Ok(render_xml(files, docs, config, folder_tree, stats)),
    }
}

// ---------------------------------------------------------------------------
// Markdown
// ---------------------------------------------------------------------------

fn render_markdown(
    files: &[AnnotatedFileRecord],
    docs: &[DocRecord],
    config: &Config,
    folder_tree: Option<&str>,
    stats: &RunStats,
) -> String {
    let mut out = String::new();
    out.push_str("# CodeConCat Output\n\n");
    out.push_str(&format!(
        "Generated by codeconcat v{}. This document aggregates the repository's \
         source files and their extracted declarations into a single place.\n\n",
        env!("CARGO_PKG_VERSION")
    ));

    if stats.total_files > 0 {
        out.push_str("## Statistics\n\n");
        out.push_str("| Language | Files | Declarations |\n");
        out.push_str("|---|---|---|\n");
        for lang in &stats.languages {
            out.push_str(&format!(
                "| {} | {} | {} |\n",
                lang.language, lang.files, lang.declarations
            ));
        }
        out.push_str(&format!(
            "\n{} files, {} declarations, ~{} tokens\n\n",
            stats.total_files, stats.total_declarations, stats.token_estimate
        ));
    }

    if config.include_directory_structure {
        if let Some(tree) = folder_tree {
            out.push_str("## Directory Structure\n\n```\n");
            out.push_str(tree);
            if !tree.ends_with('\n') {
                out.push('\n');
            }
            out.push_str("```\n\n");
        }
    }

    if config.merge_docs && !docs.is_empty() {
        // Interleave docs with code by path so related files sit together.
        let mut entries: Vec<(&str, String)> = Vec::new();
        for file in files {
            entries.push((file.file.path.as_str(), markdown_file_section(file, config)));
        }
        for doc in docs {
            entries.push((doc.path.as_str(), markdown_doc_section(doc)));
        }
        entries.sort_by(|a, b| a.0.cmp(b.0));

        out.push_str("## Files\n\n");
        for (_, section) in entries {
            out.push_str(&section);
        }
        return out;
    }

    if !files.is_empty() {
        out.push_str("## Code Files\n\n");
        for file in files {
            out.push_str(&markdown_file_section(file, config));
        }
    }

    if !docs.is_empty() {
        out.push_str("## Documentation\n\n");
        for doc in docs {
            out.push_str(&markdown_doc_section(doc));
        }
    }

    out
}

fn markdown_file_section(file: &AnnotatedFileRecord, config: &Config) -> String {
    let mut out = String::new();
    if config.disable_annotations {
        out.push_str(&format!("## File: {}\n\n", file.file.path));
        out.push_str(&format!(
            "```{}\n{}\n```\n",
            file.file.language,
            process_content(&file.file.content, config)
        ));
    } else {
        out.push_str(&file.annotated_content);
    }
    out.push_str(&markdown_security_section(&file.file.security_issues));
    out.push('\n');
    out
}

fn markdown_security_section(issues: &[SecurityIssue]) -> String {
    if issues.is_empty() {
        return String::new();
    }
    let mut out = String::new();
    out.push_str("\n### Security Issues\n");
    for issue in issues {
        out.push_str(&format!(
            "- line {}: {} ({}) `{}`\n",
            issue.line_number, issue.issue_type, issue.severity, issue.line_content
        ));
    }
    out
}

fn markdown_doc_section(doc: &DocRecord) -> String {
    let mut out = String::new();
    out.push_str(&format!("## Doc: {}\n\n", doc.path));
    out.push_str(&doc.content);
    if !doc.content.ends_with('\n') {
        out.push('\n');
    }
    out.push('\n');
    out
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct JsonOutput<'a> {
    version: &'static str,
    stats: &'a RunStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    folder_tree: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    code: Vec<JsonFile<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    docs: Vec<JsonDoc<'a>>,
}

#[derive(Serialize)]
struct JsonFile<'a> {
    file_path: &'a str,
    language: &'a str,
    token_estimate: usize,
    content: &'a str,
    annotated_content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a str>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    tags: &'a [String],
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    security_issues: &'a [SecurityIssue],
}

#[derive(Serialize)]
struct JsonDoc<'a> {
    file_path: &'a str,
    doc_type: &'a str,
    content: &'a str,
}

fn render_json(
    files: &[AnnotatedFileRecord],
    docs: &[DocRecord],
    config: &Config,
    folder_tree: Option<&str>,
    stats: &RunStats,
) -> Result<String> {
    let output = JsonOutput {
        version: env!("CARGO_PKG_VERSION"),
        stats,
        folder_tree: if config.include_directory_structure {
            folder_tree
        } else {
            None
        },
        code: files
            .iter()
            .map(|f| JsonFile {
                file_path: &f.file.path,
                language: &f.file.language,
                token_estimate: crate::tokens::estimate_tokens(&f.file.content),
                content: &f.file.content,
                annotated_content: &f.annotated_content,
                summary: (!f.summary.is_empty()).then_some(f.summary.as_str()),
                tags: &f.tags,
                security_issues: &f.file.security_issues,
            })
            .collect(),
        docs: docs
            .iter()
            .map(|d| JsonDoc {
                file_path: &d.path,
                doc_type: &d.doc_type,
                content: &d.content,
            })
            .collect(),
    };

    let mut rendered = serde_json::to_string_pretty(&output)
        .map_err(|e| CodeConcatError::config_with_source("failed to serialize JSON output", e))?;
    rendered.push('\n');
    Ok(rendered)
}

// ---------------------------------------------------------------------------
// XML
// ---------------------------------------------------------------------------

fn render_xml(
    files: &[AnnotatedFileRecord],
    docs: &[DocRecord],
    config: &Config,
    folder_tree: Option<&str>,
    stats: &RunStats,
) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<code_concat_output>\n");
    out.push_str("  <metadata>\n");
    out.push_str(&format!(
        "    <version>{}</version>\n",
        env!("CARGO_PKG_VERSION")
    ));
    out.push_str("    <title>CodeConCat Output</title>\n");
    out.push_str(&format!(
        "    <statistics files=\"{}\" declarations=\"{}\" security_issues=\"{}\" token_estimate=\"{}\"/>\n",
        stats.total_files, stats.total_declarations, stats.total_security_issues, stats.token_estimate
    ));
    out.push_str("  </metadata>\n");

    if config.include_directory_structure {
        if let Some(tree) = folder_tree {
            out.push_str("  <folder_tree>");
            out.push_str(&cdata(tree));
            out.push_str("</folder_tree>\n");
        }
    }

    if !files.is_empty() {
        out.push_str("  <code_files>\n");
        for file in files {
            out.push_str("    <file>\n");
            out.push_str(&format!(
                "      <path>{}</path>\n",
                escape_xml(&file.file.path)
            ));
            out.push_str(&format!(
                "      <language>{}</language>\n",
                escape_xml(&file.file.language)
            ));
            if !file.summary.is_empty() {
                out.push_str("      <annotations>\n");
                out.push_str(&format!(
                    "        <summary>{}</summary>\n",
                    escape_xml(&file.summary)
                ));
                out.push_str("        <tags>\n");
                for tag in &file.tags {
                    out.push_str(&format!("          <tag>{}</tag>\n", escape_xml(tag)));
                }
                out.push_str("        </tags>\n");
                out.push_str("      </annotations>\n");
            }
            if !file.file.security_issues.is_empty() {
                out.push_str("      <security_issues>\n");
                for issue in &file.file.security_issues {
                    out.push_str(&format!(
                        "        <issue line=\"{}\" severity=\"{}\">{}</issue>\n",
                        issue.line_number,
                        escape_xml(&issue.severity),
                        escape_xml(&issue.issue_type)
                    ));
                }
                out.push_str("      </security_issues>\n");
            }
            out.push_str("      <content>");
            out.push_str(&cdata(&file.file.content));
            out.push_str("</content>\n");
            out.push_str("    </file>\n");
        }
        out.push_str("  </code_files>\n");
    }

    if !docs.is_empty() {
        out.push_str("  <doc_files>\n");
        for doc in docs {
            out.push_str("    <file>\n");
            out.push_str(&format!("      <path>{}</path>\n", escape_xml(&doc.path)));
            out.push_str(&format!(
                "      <doc_type>{}</doc_type>\n",
                escape_xml(&doc.doc_type)
            ));
            out.push_str("      <content>");
            out.push_str(&cdata(&doc.content));
            out.push_str("</content>\n");
            out.push_str("    </file>\n");
        }
        out.push_str("  </doc_files>\n");
    }

    out.push_str("</code_concat_output>\n");
    out
}

/// Wrap free-form text in a CDATA section so `<` and `>` survive verbatim.
/// An embedded `]]>` is split across two sections, the standard trick.
fn cdata(text: &str) -> String {
    format!("<![CDATA[{}]]>", text.replace("]]>", "]]]]><![CDATA[>"))
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
