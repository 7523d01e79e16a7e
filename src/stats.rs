//! Run statistics: per-language aggregation over the processed files.
//!
//! Computed once after annotation and surfaced by every writer, so the
//! document opens with a picture of what it contains.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::annotator::AnnotatedFileRecord;
use crate::docs::DocRecord;
use crate::tokens;

/// Aggregates for one language bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LanguageStats {
    pub language: String,
    pub files: usize,
    pub declarations: usize,
    pub token_estimate: usize,
}

/// Whole-run aggregates, with languages sorted by tag for determinism.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub total_files: usize,
    pub total_declarations: usize,
    pub total_security_issues: usize,
    pub total_doc_files: usize,
    pub token_estimate: usize,
    pub languages: Vec<LanguageStats>,
}

impl RunStats {
    /// Aggregate over the annotated files and extracted docs.
    pub fn compute(files: &[AnnotatedFileRecord], docs: &[DocRecord]) -> Self {
        let mut by_language: BTreeMap<&str, LanguageStats> = BTreeMap::new();

        for file in files {
            let entry = by_language
                .entry(file.file.language.as_str())
                .or_insert_with(|| LanguageStats {
                    language: file.file.language.clone(),
                    ..LanguageStats::default()
                });
            entry.files += 1;
            entry.declarations += file.file.declarations.len();
            entry.token_estimate += tokens::estimate_tokens(&file.file.content);
        }

        let doc_tokens: usize = docs.iter().map(|d| tokens::estimate_tokens(&d.content)).sum();

        let mut stats = RunStats {
            total_files: files.len(),
            total_declarations: files.iter().map(|f| f.file.declarations.len()).sum(),
            total_security_issues: files.iter().map(|f| f.file.security_issues.len()).sum(),
            total_doc_files: docs.len(),
            token_estimate: doc_tokens,
            languages: by_language.into_values().collect(),
        };
        stats.token_estimate += stats.languages.iter().map(|l| l.token_estimate).sum::<usize>();
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotator;
    use crate::collector::FileRecord;
    use crate::config::Config;
    use crate::parsers::{DeclKind, Declaration};

    fn annotated(path: &str, language: &str, content: &str, decls: usize) -> AnnotatedFileRecord {
        let record = FileRecord {
            path: path.to_string(),
            language: language.to_string(),
            content: content.to_string(),
            declarations: (0..decls)
                .map(|i| Declaration::new(DeclKind::Function, format!("f{i}"), i + 1))
                .collect(),
            security_issues: Vec::new(),
        };
        annotator::annotate(record, &Config::default())
    }

    #[test]
    fn aggregates_by_language_sorted() {
        let files = vec![
            annotated("b.rs", "rust", "fn a() {}\n", 1),
            annotated("a.py", "python", "def f(): pass\n", 1),
            annotated("c.py", "python", "def g(): pass\n", 1),
        ];
        let stats = RunStats::compute(&files, &[]);
        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.total_declarations, 3);
        let tags: Vec<&str> = stats.languages.iter().map(|l| l.language.as_str()).collect();
        assert_eq!(tags, vec!["python", "rust"]);
        assert_eq!(stats.languages[0].files, 2);
    }

    #[test]
    fn token_estimate_covers_code_and_docs() {
        let files = vec![annotated("a.py", "python", "x = 1\n", 0)];
        let docs = vec![DocRecord {
            path: "README.md".to_string(),
            doc_type: "md".to_string(),
            content: "# sixteen chars!\n".to_string(),
        }];
        let stats = RunStats::compute(&files, &docs);
        assert!(stats.token_estimate > 0);
        assert_eq!(stats.total_doc_files, 1);
    }

    #[test]
    fn empty_run_is_all_zeroes() {
        let stats = RunStats::compute(&[], &[]);
        assert_eq!(stats, RunStats::default());
    }
}
