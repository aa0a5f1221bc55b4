use crate::compactor::{compact, split_segments, Compacted};
use crate::config::{ConflictMarkers, MergeConfig};
use crate::diff::{validate_ops, DiffEngine, SimilarDiff};
use crate::error::{MergeError, Result};
use crate::normalizer::normalize;
use crate::reconstruct::{reconstruct, Side};
use crate::types::MergeResult;

/// One input prepared for diffing: trimmed, split, normalized, compacted.
#[derive(Debug, Clone)]
pub struct PreparedText<'a> {
    pub text: &'a str,
    pub segments: Vec<&'a str>,
    pub compacted: Compacted,
}

impl<'a> PreparedText<'a> {
    pub fn new(text: &'a str) -> Self {
        let text = text.trim();
        let segments = split_segments(text);
        let compacted = compact(normalize(&segments));
        Self {
            text,
            segments,
            compacted,
        }
    }

    fn side(&self) -> Side<'_> {
        Side::new(&self.segments, &self.compacted.map)
    }
}

/// Merge `new_text` into `old_text` with the default conflict markers.
pub fn merge(old_text: &str, new_text: &str, engine: &dyn DiffEngine) -> Result<MergeResult> {
    merge_with_markers(old_text, new_text, engine, &ConflictMarkers::default())
}

/// Merge `new_text` into `old_text`.
///
/// Fails only when the diff engine fails or returns a script that does not
/// cover both inputs; nothing is produced in that case.
pub fn merge_with_markers(
    old_text: &str,
    new_text: &str,
    engine: &dyn DiffEngine,
    markers: &ConflictMarkers,
) -> Result<MergeResult> {
    let old = PreparedText::new(old_text);
    let new = PreparedText::new(new_text);

    let ops = engine
        .diff(&old.compacted.lines, &new.compacted.lines)
        .map_err(|err| match err {
            MergeError::MergeFailed(_) => err,
            other => MergeError::merge_failed(format!("{} diff engine: {other}", engine.name())),
        })?;
    validate_ops(&ops, old.compacted.len(), new.compacted.len())?;

    log::debug!(
        "{} diff: {} old / {} new diff keys, {} op(s)",
        engine.name(),
        old.compacted.len(),
        new.compacted.len(),
        ops.len()
    );

    Ok(reconstruct(old.side(), new.side(), &ops, new.text, markers))
}

/// Merge entry point bound to a configuration and its default engine
#[derive(Debug, Clone, Default)]
pub struct Merger {
    config: MergeConfig,
    engine: SimilarDiff,
}

impl Merger {
    /// Create a merger; the configuration must be valid
    pub fn new(config: MergeConfig) -> Result<Self> {
        config.validate()?;
        let engine = SimilarDiff::new(config.algorithm);
        Ok(Self { config, engine })
    }

    #[must_use]
    pub const fn config(&self) -> &MergeConfig {
        &self.config
    }

    #[must_use]
    pub const fn engine(&self) -> &SimilarDiff {
        &self.engine
    }

    pub fn merge(&self, old_text: &str, new_text: &str) -> Result<MergeResult> {
        merge_with_markers(old_text, new_text, &self.engine, &self.config.markers)
    }

    /// Merge with a caller-supplied engine but this merger's markers
    pub fn merge_with(
        &self,
        old_text: &str,
        new_text: &str,
        engine: &dyn DiffEngine,
    ) -> Result<MergeResult> {
        merge_with_markers(old_text, new_text, engine, &self.config.markers)
    }
}
