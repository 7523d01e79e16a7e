//! Per-file annotation: summary string, tag set, and rendered preview.
//!
//! The annotated content is a small markdown document per file: a header,
//! one sub-header per declaration kind listing names, and the (optionally
//! processed) source in a fenced code block. With `disable_annotations` the
//! raw content passes through untouched.

use crate::collector::FileRecord;
use crate::config::Config;
use crate::parsers::DeclKind;
use crate::writer;

/// A file record augmented for writer consumption.
#[derive(Debug, Clone)]
pub struct AnnotatedFileRecord {
    pub file: FileRecord,
    pub summary: String,
    pub tags: Vec<String>,
    pub annotated_content: String,
}

/// Kinds in their fixed presentation order.
const KIND_ORDER: [DeclKind; 4] = [
    DeclKind::Function,
    DeclKind::Class,
    DeclKind::Struct,
    DeclKind::Symbol,
];

/// Annotate one parsed file record.
pub fn annotate(file: FileRecord, config: &Config) -> AnnotatedFileRecord {
    if config.disable_annotations {
        let annotated_content = file.content.clone();
        return AnnotatedFileRecord {
            file,
            summary: String::new(),
            tags: Vec::new(),
            annotated_content,
        };
    }

    let summary = summarize(&file);
    let tags = tag(&file);
    let annotated_content = render(&file, &summary, &tags, config);

    AnnotatedFileRecord {
        file,
        summary,
        tags,
        annotated_content,
    }
}

/// "Contains N functions, M classes" with zero buckets omitted.
fn summarize(file: &FileRecord) -> String {
    let parts: Vec<String> = KIND_ORDER
        .iter()
        .filter_map(|kind| {
            let count = file.declarations.iter().filter(|d| d.kind == *kind).count();
            (count > 0).then(|| format!("{count} {}", kind.plural()))
        })
        .collect();

    if parts.is_empty() {
        "No declarations found".to_string()
    } else {
        format!("Contains {}", parts.join(", "))
    }
}

/// `has_<kind>` tags for present kinds, plus the language tag.
fn tag(file: &FileRecord) -> Vec<String> {
    let mut tags: Vec<String> = KIND_ORDER
        .iter()
        .filter(|kind| file.declarations.iter().any(|d| d.kind == **kind))
        .map(|kind| format!("has_{}", kind.plural()))
        .collect();
    tags.push(file.language.clone());
    tags
}

fn render(file: &FileRecord, summary: &str, tags: &[String], config: &Config) -> String {
    let mut out = String::new();
    out.push_str(&format!("## File: {}\n", file.path));

    if config.include_file_summary {
        out.push_str(&format!("\n**Summary:** {summary}\n"));
        out.push_str(&format!("**Tags:** {}\n", tags.join(", ")));
    }

    for kind in KIND_ORDER {
        let names: Vec<&str> = file
            .declarations
            .iter()
            .filter(|d| d.kind == kind)
            .map(|d| d.name.as_str())
            .collect();
        if names.is_empty() {
            continue;
        }
        // Capitalized bucket header: "Functions", "Classes", ...
        let mut header = kind.plural().to_string();
        header[..1].make_ascii_uppercase();
        out.push_str(&format!("\n### {header}\n"));
        for name in names {
            out.push_str(&format!("- {name}\n"));
        }
    }

    out.push_str(&format!(
        "\n```{}\n{}\n```\n",
        file.language,
        writer::process_content(&file.content, config)
    ));
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::Declaration;

    fn record(language: &str, content: &str, decls: Vec<Declaration>) -> FileRecord {
        FileRecord {
            path: "src/app.py".to_string(),
            language: language.to_string(),
            content: content.to_string(),
            declarations: decls,
            security_issues: Vec::new(),
        }
    }

    #[test]
    fn summary_counts_by_kind() {
        let file = record(
            "python",
            "def greet():\n    return \"hi\"\n",
            vec![Declaration::new(DeclKind::Function, "greet", 1)],
        );
        let annotated = annotate(file, &Config::default());
        assert_eq!(annotated.summary, "Contains 1 functions");
        assert!(annotated.tags.contains(&"has_functions".to_string()));
        assert!(annotated.tags.contains(&"python".to_string()));
    }

    #[test]
    fn summary_omits_zero_buckets() {
        let file = record(
            "rust",
            "struct A;\nfn b() {}\nfn c() {}\n",
            vec![
                Declaration::new(DeclKind::Struct, "A", 1),
                Declaration::new(DeclKind::Function, "b", 2),
                Declaration::new(DeclKind::Function, "c", 3),
            ],
        );
        let annotated = annotate(file, &Config::default());
        assert_eq!(annotated.summary, "Contains 2 functions, 1 structs");
    }

    #[test]
    fn empty_file_summary() {
        let file = record("python", "# nothing here\n", vec![]);
        let annotated = annotate(file, &Config::default());
        assert_eq!(annotated.summary, "No declarations found");
        assert_eq!(annotated.tags, vec!["python".to_string()]);
    }

    #[test]
    fn rendered_content_has_header_lists_and_fence() {
        let file = record(
            "python",
            "def greet():\n    return \"hi\"\n",
            vec![Declaration::new(DeclKind::Function, "greet", 1)],
        );
        let annotated = annotate(file, &Config::default());
        assert!(annotated.annotated_content.contains("## File: src/app.py"));
        assert!(annotated.annotated_content.contains("### Functions"));
        assert!(annotated.annotated_content.contains("- greet"));
        assert!(annotated.annotated_content.contains("```python"));
        assert!(annotated.annotated_content.contains("def greet():"));
    }

    #[test]
    fn disable_annotations_passes_content_through() {
        let config = Config {
            disable_annotations: true,
            ..Config::default()
        };
        let file = record(
            "python",
            "def greet(): pass\n",
            vec![Declaration::new(DeclKind::Function, "greet", 1)],
        );
        let annotated = annotate(file, &config);
        assert_eq!(annotated.annotated_content, "def greet(): pass\n");
        assert!(annotated.summary.is_empty());
        assert!(annotated.tags.is_empty());
    }

    #[test]
    fn summary_block_respects_writer_toggle() {
        let config = Config {
            include_file_summary: false,
            ..Config::default()
        };
        let file = record("python", "x = 1\n", vec![]);
        let annotated = annotate(file, &config);
        assert!(!annotated.annotated_content.contains("**Summary:**"));
        // The summary itself is still computed for the structured writers.
        assert_eq!(annotated.summary, "No declarations found");
    }
}
