use similar::{capture_diff_slices, Algorithm, DiffOp};

use crate::config::DiffAlgorithm;
use crate::error::{MergeError, Result};
use crate::types::EditOp;

/// Computes an edit script over two compacted line arrays.
///
/// Implementations must cover both arrays in order without gaps or
/// overlaps and return a single full-range `Equal` for identical input.
/// When the sides share nothing they may instead return one op spanning the
/// full range, tagged `Insert` (over `new`) or `Delete` (over `old`); either
/// one means "replace everything".
pub trait DiffEngine {
    fn diff(&self, old: &[String], new: &[String]) -> Result<Vec<EditOp>>;

    /// Short label used in logs
    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> DiffEngine for F
where
    F: Fn(&[String], &[String]) -> Result<Vec<EditOp>>,
{
    fn diff(&self, old: &[String], new: &[String]) -> Result<Vec<EditOp>> {
        self(old, new)
    }
}

/// Default engine backed by the `similar` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarDiff {
    algorithm: DiffAlgorithm,
}

impl SimilarDiff {
    #[must_use]
    pub const fn new(algorithm: DiffAlgorithm) -> Self {
        Self { algorithm }
    }

    const fn similar_algorithm(&self) -> Algorithm {
        match self.algorithm {
            DiffAlgorithm::Myers => Algorithm::Myers,
            DiffAlgorithm::Patience => Algorithm::Patience,
            DiffAlgorithm::Lcs => Algorithm::Lcs,
        }
    }
}

impl DiffEngine for SimilarDiff {
    fn diff(&self, old: &[String], new: &[String]) -> Result<Vec<EditOp>> {
        match (old.is_empty(), new.is_empty()) {
            (true, true) => return Ok(Vec::new()),
            (true, false) => return Ok(vec![EditOp::insert(0, new.len() - 1)]),
            (false, true) => return Ok(vec![EditOp::delete(0, old.len() - 1)]),
            (false, false) => {}
        }

        if old == new {
            return Ok(vec![EditOp::equal(0, old.len() - 1)]);
        }

        let raw = capture_diff_slices(self.similar_algorithm(), old, new);
        let ops = canonicalize(&raw);

        if !ops.iter().any(EditOp::is_equal) {
            return Ok(vec![EditOp::insert(0, new.len() - 1)]);
        }

        Ok(ops)
    }

    fn name(&self) -> &str {
        self.algorithm.as_str()
    }
}

/// Collapse every change run between two equal runs into at most one
/// `Delete` followed by at most one `Insert`.
fn canonicalize(raw: &[DiffOp]) -> Vec<EditOp> {
    let mut ops = Vec::with_capacity(raw.len());
    let mut hunk = Hunk::default();

    for op in raw {
        match *op {
            DiffOp::Equal { old_index, len, .. } => {
                hunk.flush(&mut ops);
                if len > 0 {
                    ops.push(EditOp::equal(old_index, old_index + len - 1));
                }
            }
            DiffOp::Delete {
                old_index, old_len, ..
            } => hunk.delete(old_index, old_len),
            DiffOp::Insert {
                new_index, new_len, ..
            } => hunk.insert(new_index, new_len),
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => {
                hunk.delete(old_index, old_len);
                hunk.insert(new_index, new_len);
            }
        }
    }

    hunk.flush(&mut ops);
    ops
}

#[derive(Default)]
struct Hunk {
    deleted: Option<(usize, usize)>,
    inserted: Option<(usize, usize)>,
}

impl Hunk {
    fn delete(&mut self, index: usize, len: usize) {
        Self::extend(&mut self.deleted, index, len);
    }

    fn insert(&mut self, index: usize, len: usize) {
        Self::extend(&mut self.inserted, index, len);
    }

    fn extend(slot: &mut Option<(usize, usize)>, index: usize, len: usize) {
        if len == 0 {
            return;
        }
        let last = index + len - 1;
        *slot = Some(match *slot {
            Some((start, end)) => (start.min(index), end.max(last)),
            None => (index, last),
        });
    }

    fn flush(&mut self, ops: &mut Vec<EditOp>) {
        if let Some((start, end)) = self.deleted.take() {
            ops.push(EditOp::delete(start, end));
        }
        if let Some((start, end)) = self.inserted.take() {
            ops.push(EditOp::insert(start, end));
        }
    }
}

/// Check that `ops` covers both arrays in order, or is one of the
/// single-op full-range signals.
pub fn validate_ops(ops: &[EditOp], old_len: usize, new_len: usize) -> Result<()> {
    if ops.is_empty() {
        if old_len == 0 && new_len == 0 {
            return Ok(());
        }
        return Err(MergeError::invalid_edit_script(
            "empty edit script for non-empty input",
        ));
    }

    if let [op] = ops {
        let full = match op {
            EditOp::Equal { .. } => old_len == new_len && old_len > 0 && op.len() == old_len,
            EditOp::Insert { .. } => new_len > 0 && op.len() == new_len,
            EditOp::Delete { .. } => old_len > 0 && op.len() == old_len,
        };
        let (start, _) = op.bounds();
        if start == 0 && full {
            return Ok(());
        }
    }

    let mut old_pos = 0;
    let mut new_pos = 0;

    for (i, op) in ops.iter().enumerate() {
        let (start, end) = op.bounds();
        if end < start {
            return Err(MergeError::invalid_edit_script(format!(
                "op {i} has inverted range {start}..={end}"
            )));
        }

        match op {
            EditOp::Equal { .. } | EditOp::Delete { .. } if start != old_pos => {
                return Err(MergeError::invalid_edit_script(format!(
                    "op {i} starts at old index {start}, expected {old_pos}"
                )));
            }
            EditOp::Insert { .. } if start != new_pos => {
                return Err(MergeError::invalid_edit_script(format!(
                    "op {i} starts at new index {start}, expected {new_pos}"
                )));
            }
            EditOp::Equal { .. } => {
                old_pos += op.len();
                new_pos += op.len();
            }
            EditOp::Delete { .. } => old_pos += op.len(),
            EditOp::Insert { .. } => new_pos += op.len(),
        }

        if old_pos > old_len || new_pos > new_len {
            return Err(MergeError::invalid_edit_script(format!(
                "op {i} runs past the end of the input"
            )));
        }
    }

    if old_pos != old_len || new_pos != new_len {
        return Err(MergeError::invalid_edit_script(format!(
            "script covers {old_pos}/{old_len} old and {new_pos}/{new_len} new lines"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_identical_is_single_equal() {
        let a = lines(&["a", "b", "c"]);
        let ops = SimilarDiff::default().diff(&a, &a).unwrap();
        assert_eq!(ops, vec![EditOp::equal(0, 2)]);
    }

    #[test]
    fn test_disjoint_is_single_insert() {
        let old = lines(&["a", "b"]);
        let new = lines(&["x", "y", "z"]);
        let ops = SimilarDiff::default().diff(&old, &new).unwrap();
        assert_eq!(ops, vec![EditOp::insert(0, 2)]);
    }

    #[test]
    fn test_empty_sides() {
        let engine = SimilarDiff::default();
        let some = lines(&["a"]);
        assert!(engine.diff(&[], &[]).unwrap().is_empty());
        assert_eq!(engine.diff(&[], &some).unwrap(), vec![EditOp::insert(0, 0)]);
        assert_eq!(engine.diff(&some, &[]).unwrap(), vec![EditOp::delete(0, 0)]);
    }

    #[test]
    fn test_modification_is_delete_then_insert() {
        let old = lines(&["{", "name?:string", "}"]);
        let new = lines(&["{", "name:string", "}"]);
        let ops = SimilarDiff::default().diff(&old, &new).unwrap();
        assert_eq!(
            ops,
            vec![
                EditOp::equal(0, 0),
                EditOp::delete(1, 1),
                EditOp::insert(1, 1),
                EditOp::equal(2, 2),
            ]
        );
        validate_ops(&ops, old.len(), new.len()).unwrap();
    }

    #[test]
    fn test_pure_addition() {
        let old = lines(&["{", "age:boolean", "}"]);
        let new = lines(&["{", "age:boolean", "bar:foo", "}"]);
        let ops = SimilarDiff::default().diff(&old, &new).unwrap();
        assert_eq!(
            ops,
            vec![EditOp::equal(0, 1), EditOp::insert(2, 2), EditOp::equal(2, 2)]
        );
    }

    #[test]
    fn test_all_algorithms_satisfy_contract() {
        let old = lines(&["a", "b", "c", "d", "e", "f"]);
        let new = lines(&["a", "x", "c", "d", "y", "z", "f", "g"]);
        for algorithm in [DiffAlgorithm::Myers, DiffAlgorithm::Patience, DiffAlgorithm::Lcs] {
            let ops = SimilarDiff::new(algorithm).diff(&old, &new).unwrap();
            validate_ops(&ops, old.len(), new.len())
                .unwrap_or_else(|err| panic!("{algorithm:?}: {err}"));
        }
    }

    #[test]
    fn test_canonicalize_merges_change_runs() {
        let raw = [
            DiffOp::Equal {
                old_index: 0,
                new_index: 0,
                len: 1,
            },
            DiffOp::Insert {
                old_index: 1,
                new_index: 1,
                new_len: 1,
            },
            DiffOp::Delete {
                old_index: 1,
                old_len: 2,
                new_index: 2,
            },
            DiffOp::Equal {
                old_index: 3,
                new_index: 2,
                len: 1,
            },
        ];
        assert_eq!(
            canonicalize(&raw),
            vec![
                EditOp::equal(0, 0),
                EditOp::delete(1, 2),
                EditOp::insert(1, 1),
                EditOp::equal(3, 3),
            ]
        );
    }

    #[test]
    fn test_validate_rejects_gaps_and_overlaps() {
        assert!(validate_ops(&[EditOp::equal(0, 0), EditOp::equal(2, 2)], 3, 3).is_err());
        assert!(validate_ops(&[EditOp::equal(0, 1), EditOp::delete(1, 1)], 2, 2).is_err());
        assert!(validate_ops(&[EditOp::equal(0, 0), EditOp::insert(1, 1)], 1, 1).is_err());
        assert!(validate_ops(&[], 1, 0).is_err());
        assert!(validate_ops(&[EditOp::equal(0, 0), EditOp::insert(1, 1)], 1, 2).is_ok());
    }

    #[test]
    fn test_validate_accepts_full_range_signals() {
        assert!(validate_ops(&[EditOp::insert(0, 3)], 2, 4).is_ok());
        assert!(validate_ops(&[EditOp::delete(0, 1)], 2, 0).is_ok());
        assert!(validate_ops(&[EditOp::equal(0, 2)], 3, 3).is_ok());
        assert!(validate_ops(&[EditOp::insert(0, 1)], 2, 4).is_err());
    }

    #[test]
    fn test_validate_accepts_full_delete_as_replacement() {
        assert!(validate_ops(&[EditOp::delete(0, 2)], 3, 3).is_ok());
        assert!(validate_ops(&[EditOp::delete(0, 1)], 2, 5).is_ok());
        assert!(validate_ops(&[EditOp::delete(0, 0)], 2, 5).is_err());
        assert!(validate_ops(&[EditOp::delete(1, 2)], 3, 3).is_err());
        assert!(validate_ops(&[EditOp::delete(0, 0)], 0, 2).is_err());
    }

    #[test]
    fn test_closure_engine() {
        let engine = |old: &[String], _new: &[String]| -> Result<Vec<EditOp>> {
            Ok(vec![EditOp::equal(0, old.len() - 1)])
        };
        let a = lines(&["a"]);
        assert_eq!(engine.diff(&a, &a).unwrap(), vec![EditOp::equal(0, 0)]);
        assert_eq!(engine.name(), "custom");
    }
}
