//! Documentation extraction.
//!
//! Files whose extension is in `config.doc_extensions` are never parsed for
//! declarations; they become opaque [`DocRecord`]s carried through to the
//! writers.

use serde::Serialize;

use crate::collector::FileRecord;
use crate::language;

/// An opaque documentation file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocRecord {
    pub path: String,
    /// Extension without the leading dot (`md`, `rst`, ...).
    pub doc_type: String,
    pub content: String,
}

/// Build doc records from already-collected doc files.
pub fn extract(doc_files: &[FileRecord]) -> Vec<DocRecord> {
    doc_files
        .iter()
        .map(|f| DocRecord {
            path: f.path.clone(),
            doc_type: language::extension_of(&f.path).unwrap_or_default(),
            content: f.content.clone(),
        })
        .collect()
}
