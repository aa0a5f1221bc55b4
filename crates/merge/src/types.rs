use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// One step of an edit script over two compacted line arrays.
///
/// Ranges are inclusive. `Equal` and `Delete` index the old array,
/// `Insert` indexes the new array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp {
    Equal { start: usize, end: usize },
    Insert { start: usize, end: usize },
    Delete { start: usize, end: usize },
}

impl EditOp {
    #[must_use]
    pub const fn equal(start: usize, end: usize) -> Self {
        Self::Equal { start, end }
    }

    #[must_use]
    pub const fn insert(start: usize, end: usize) -> Self {
        Self::Insert { start, end }
    }

    #[must_use]
    pub const fn delete(start: usize, end: usize) -> Self {
        Self::Delete { start, end }
    }

    /// Inclusive `(start, end)` bounds
    #[must_use]
    pub const fn bounds(&self) -> (usize, usize) {
        match *self {
            Self::Equal { start, end } | Self::Insert { start, end } | Self::Delete { start, end } => {
                (start, end)
            }
        }
    }

    #[must_use]
    pub fn range(&self) -> RangeInclusive<usize> {
        let (start, end) = self.bounds();
        start..=end
    }

    /// Number of compacted lines covered
    #[must_use]
    pub const fn len(&self) -> usize {
        let (start, end) = self.bounds();
        end.saturating_sub(start) + 1
    }

    #[must_use]
    pub const fn is_equal(&self) -> bool {
        matches!(self, Self::Equal { .. })
    }

    #[must_use]
    pub const fn is_insert(&self) -> bool {
        matches!(self, Self::Insert { .. })
    }

    #[must_use]
    pub const fn is_delete(&self) -> bool {
        matches!(self, Self::Delete { .. })
    }
}

/// A previously generated block inside a host document.
///
/// Offsets are byte offsets; `end` is the offset of the closing brace
/// (inclusive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingBlock {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl ExistingBlock {
    /// Half-open byte span to replace in the host document
    #[must_use]
    pub const fn span(&self) -> std::ops::Range<usize> {
        self.start..self.end + 1
    }
}

/// Outcome of a merge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MergeResult {
    /// Both sides normalize to the same content; apply no edit
    NoChange,
    /// Merged text to write in place of the existing block
    Text(String),
}

impl MergeResult {
    #[must_use]
    pub const fn is_no_change(&self) -> bool {
        matches!(self, Self::NoChange)
    }

    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::NoChange => None,
            Self::Text(text) => Some(text),
        }
    }

    #[must_use]
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::NoChange => None,
            Self::Text(text) => Some(text),
        }
    }
}
