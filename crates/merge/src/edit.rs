use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::config::MergeConfig;
use crate::diff::DiffEngine;
use crate::error::Result;
use crate::locator::Locator;
use crate::merger::{merge_with_markers, Merger};
use crate::types::MergeResult;

/// Where freshly generated text goes when no previous block exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsertionPoint {
    /// Byte offset, clamped to the document and to a char boundary
    Offset(usize),
    /// Start of a 0-based line; past the last line means end of document
    Line(usize),
    End,
}

impl InsertionPoint {
    /// Resolve to a byte offset in `document`
    #[must_use]
    pub fn resolve(self, document: &str) -> usize {
        match self {
            Self::Offset(offset) => {
                let mut offset = offset.min(document.len());
                while !document.is_char_boundary(offset) {
                    offset -= 1;
                }
                offset
            }
            Self::Line(0) => 0,
            Self::Line(line) => document
                .match_indices('\n')
                .nth(line - 1)
                .map_or(document.len(), |(idx, _)| idx + 1),
            Self::End => document.len(),
        }
    }
}

/// A single replace-or-insert against the host document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentEdit {
    /// Replace a previously generated block with merged text
    Replace {
        range: Range<usize>,
        text: String,
        conflicts: usize,
    },
    /// Insert generated text where no block existed
    Insert { offset: usize, text: String },
}

impl DocumentEdit {
    /// Produce the edited document. The whole result is built before it is
    /// returned, so callers never observe a partial edit.
    #[must_use]
    pub fn apply(&self, document: &str) -> String {
        let (range, text) = match self {
            Self::Replace { range, text, .. } => (range.clone(), text.as_str()),
            Self::Insert { offset, text } => (*offset..*offset, text.as_str()),
        };

        let mut out = String::with_capacity(document.len() + text.len());
        out.push_str(&document[..range.start]);
        out.push_str(text);
        out.push_str(&document[range.end..]);
        out
    }

    /// Conflict blocks written by this edit
    #[must_use]
    pub const fn conflicts(&self) -> usize {
        match self {
            Self::Replace { conflicts, .. } => *conflicts,
            Self::Insert { .. } => 0,
        }
    }
}

/// Decide how `generated` lands in `document`.
///
/// Returns `Ok(None)` when the existing block already matches. A failed
/// merge yields an error and no edit.
pub fn plan_edit(
    document: &str,
    name: &str,
    generated: &str,
    insertion: InsertionPoint,
    engine: &dyn DiffEngine,
    config: &MergeConfig,
) -> Result<Option<DocumentEdit>> {
    let Some(existing) = Locator::new(config).locate(document, name) else {
        log::debug!("no existing block `{name}`; inserting generated text");
        return Ok(Some(DocumentEdit::Insert {
            offset: insertion.resolve(document),
            text: generated.to_string(),
        }));
    };

    match merge_with_markers(&existing.text, generated, engine, &config.markers)? {
        MergeResult::NoChange => {
            log::debug!("block `{name}` is up to date");
            Ok(None)
        }
        MergeResult::Text(text) => {
            let conflicts = config.markers.count_in(&text);
            Ok(Some(DocumentEdit::Replace {
                range: existing.span(),
                text,
                conflicts,
            }))
        }
    }
}

impl Merger {
    /// Plan the edit for `generated` with this merger's engine and config
    pub fn plan_edit(
        &self,
        document: &str,
        name: &str,
        generated: &str,
        insertion: InsertionPoint,
    ) -> Result<Option<DocumentEdit>> {
        plan_edit(
            document,
            name,
            generated,
            insertion,
            self.engine(),
            self.config(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::SimilarDiff;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insertion_point_resolve() {
        let doc = "one\ntwo\nthree";
        assert_eq!(InsertionPoint::Line(0).resolve(doc), 0);
        assert_eq!(InsertionPoint::Line(1).resolve(doc), 4);
        assert_eq!(InsertionPoint::Line(2).resolve(doc), 8);
        assert_eq!(InsertionPoint::Line(9).resolve(doc), doc.len());
        assert_eq!(InsertionPoint::End.resolve(doc), doc.len());
        assert_eq!(InsertionPoint::Offset(100).resolve(doc), doc.len());
        assert_eq!(InsertionPoint::Offset(2).resolve("é!"), 2);
        assert_eq!(InsertionPoint::Offset(1).resolve("é!"), 0);
    }

    #[test]
    fn test_insert_when_block_absent() {
        let doc = "/** fetchTsComment\n * @namespace User\n */\nconst x = 1\n";
        let generated = "\nexport namespace User {\n\tid: number\n}\n";
        let edit = plan_edit(
            doc,
            "User",
            generated,
            InsertionPoint::Line(3),
            &SimilarDiff::default(),
            &MergeConfig::default(),
        )
        .unwrap()
        .unwrap();

        assert_eq!(
            edit,
            DocumentEdit::Insert {
                offset: 42,
                text: generated.to_string()
            }
        );
        assert_eq!(
            edit.apply(doc),
            format!("/** fetchTsComment\n * @namespace User\n */\n{generated}const x = 1\n")
        );
    }

    #[test]
    fn test_no_edit_when_unchanged() {
        let doc = "head\nexport namespace User {\n\tid: number // kept\n}\ntail";
        let generated = "export namespace User {\n  id: number;\n}";
        let edit = Merger::default()
            .plan_edit(doc, "User", generated, InsertionPoint::End)
            .unwrap();
        assert_eq!(edit, None);
    }

    #[test]
    fn test_replace_existing_block() {
        let doc = "head\nexport namespace User {\n\tid: number\n}\ntail";
        let generated = "export namespace User {\n\tid: number\n\tname: string\n}";
        let edit = Merger::default()
            .plan_edit(doc, "User", generated, InsertionPoint::End)
            .unwrap()
            .unwrap();

        assert_eq!(edit.conflicts(), 0);
        assert_eq!(
            edit.apply(doc),
            "head\nexport namespace User {\n\tid: number\n\tname: string\n}\ntail"
        );
    }

    #[test]
    fn test_replace_reports_conflicts() {
        let doc = "export namespace User {\n\tid: number\n}";
        let generated = "export namespace User {\n\tid: string\n}";
        let edit = Merger::default()
            .plan_edit(doc, "User", generated, InsertionPoint::End)
            .unwrap()
            .unwrap();
        assert_eq!(edit.conflicts(), 1);
        assert!(edit.apply(doc).contains("<<<<<<<\n\tid: number\n=======\n\tid: string\n>>>>>>>"));
    }
}
