//! # Regen Merge
//!
//! Merges a freshly generated code block back into a document that may
//! already hold an earlier, possibly hand-edited, generation of it.
//!
//! ## Philosophy
//!
//! The merge never silently destroys local work:
//! - Unchanged lines keep their original formatting and comments
//! - Purely additive content is spliced in place
//! - Lines the new generation no longer reports are kept
//! - Divergent lines are wrapped in `<<<<<<<` / `=======` / `>>>>>>>` markers
//!
//! ## Architecture
//!
//! ```text
//! Host document
//!     │
//!     ├──> Locator (keyword regex + brace balance) → ExistingBlock?
//!     │
//!     ├──> Old text / generated text
//!     │    ├─> Split into raw segments (terminators kept apart)
//!     │    ├─> Normalize (drop comments, whitespace, `;`)
//!     │    └─> Compact (drop empty keys, keep index map)
//!     │
//!     ├──> DiffEngine (pluggable) → EditOp[]
//!     │
//!     └──> Reconstruct verbatim text → MergeResult → DocumentEdit
//! ```
//!
//! ## Example
//!
//! ```rust
//! use regen_merge::{merge, MergeResult, SimilarDiff};
//!
//! let old = "interface Data {\n\tage: boolean // checked by hand\n}";
//! let new = "interface Data {\n\tage: boolean\n\tbar: foo\n}";
//!
//! let merged = merge(old, new, &SimilarDiff::default()).unwrap();
//! assert_eq!(
//!     merged,
//!     MergeResult::Text(
//!         "interface Data {\n\tage: boolean // checked by hand\n\tbar: foo\n}".to_string()
//!     )
//! );
//! ```

mod compactor;
mod config;
mod diff;
mod directive;
mod edit;
mod error;
mod locator;
mod merger;
mod normalizer;
mod pipeline;
mod reconstruct;
mod types;

pub use compactor::{compact, split_segments, Compacted};
pub use config::{ConflictMarkers, DiffAlgorithm, MergeConfig};
pub use diff::{validate_ops, DiffEngine, SimilarDiff};
pub use directive::{parse_directives, Directive};
pub use edit::{plan_edit, DocumentEdit, InsertionPoint};
pub use error::{MergeError, Result};
pub use locator::{locate, Locator};
pub use merger::{merge, merge_with_markers, Merger, PreparedText};
pub use normalizer::{normalize, normalize_line, NormalizeState};
pub use pipeline::{GenerationContext, Handler, Next, Pipeline, PlanEditHandler};
pub use reconstruct::{reconstruct, recover, Recovered, Side};
pub use types::{EditOp, ExistingBlock, MergeResult};
