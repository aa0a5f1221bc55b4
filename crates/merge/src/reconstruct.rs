use crate::config::ConflictMarkers;
use crate::types::{EditOp, MergeResult};

/// Raw segments of one input and the index map of its compacted form
#[derive(Debug, Clone, Copy)]
pub struct Side<'a> {
    pub segments: &'a [&'a str],
    pub map: &'a [usize],
}

impl<'a> Side<'a> {
    #[must_use]
    pub const fn new(segments: &'a [&'a str], map: &'a [usize]) -> Self {
        Self { segments, map }
    }
}

/// Verbatim text behind a compacted range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovered {
    /// Segments between the previous mapped line and this range that
    /// normalized to nothing: terminators, blank and comment-only lines
    pub ignored: String,
    /// Segments of the range itself
    pub value: String,
    /// Raw segment indices covered by `value`
    pub span: (usize, usize),
}

/// Map the inclusive compacted range `start..=end` back to raw text.
///
/// The first range of a side starts at raw segment 0 and the last one
/// extends to the final raw segment, so leading and trailing comments are
/// kept with their side.
pub fn recover(segments: &[&str], map: &[usize], start: usize, end: usize) -> Recovered {
    let real_start = if start == 0 { 0 } else { map[start] };
    let real_end = if map.get(end + 1).is_some() {
        map[end]
    } else {
        segments.len() - 1
    };

    let ignored = match start.checked_sub(1).map(|prev| map[prev]) {
        Some(prev) if real_start - prev > 1 => segments[prev + 1..real_start].concat(),
        _ => String::new(),
    };

    Recovered {
        ignored,
        value: segments[real_start..=real_end].concat(),
        span: (real_start, real_end),
    }
}

/// Rebuild the merged text from an edit script.
///
/// `new_text` is the trimmed generated text, returned as-is when the script
/// is a single non-equal op. Standalone deletions are kept: content the new
/// generation no longer reports may have been added by hand.
pub fn reconstruct(
    old: Side<'_>,
    new: Side<'_>,
    ops: &[EditOp],
    new_text: &str,
    markers: &ConflictMarkers,
) -> MergeResult {
    match ops {
        [] | [EditOp::Equal { .. }] => return MergeResult::NoChange,
        [_] => return MergeResult::Text(new_text.trim().to_string()),
        _ => {}
    }

    // Segments consumed by a conflict block are blanked so the following
    // insert does not emit them a second time.
    let mut new_segments: Vec<&str> = new.segments.to_vec();
    let mut out = String::new();
    let mut conflicts = 0usize;

    for (i, op) in ops.iter().enumerate() {
        match *op {
            EditOp::Equal { start, end } => {
                let recovered = recover(old.segments, old.map, start, end);
                push_fragment(&mut out, &recovered, old.segments);
                out.push_str(&recovered.value);
            }
            EditOp::Delete { start, end } => {
                let removed = recover(old.segments, old.map, start, end);
                push_fragment(&mut out, &removed, old.segments);

                if let Some(&EditOp::Insert {
                    start: new_start,
                    end: new_end,
                }) = ops.get(i + 1)
                {
                    let added = recover(&new_segments, new.map, new_start, new_end);
                    out.push_str(&markers.render(&removed.value, &added.value));
                    let (from, to) = added.span;
                    for segment in &mut new_segments[from..=to] {
                        *segment = "";
                    }
                    conflicts += 1;
                } else {
                    log::debug!("keeping {} line(s) absent from new generation", op.len());
                    out.push_str(&removed.value);
                }
            }
            EditOp::Insert { start, end } => {
                let added = recover(&new_segments, new.map, start, end);
                push_fragment(&mut out, &added, &new_segments);
                out.push_str(&added.value);
            }
        }
    }

    if conflicts > 0 {
        log::warn!("merge produced {conflicts} conflict block(s)");
    }

    MergeResult::Text(out)
}

/// Emit the ignored prefix of a fragment. A fragment that opens its side
/// has no prefix, so when it follows other output it needs a line break of
/// its own.
fn push_fragment(out: &mut String, recovered: &Recovered, segments: &[&str]) {
    if recovered.span.0 == 0 && !out.is_empty() && !out.ends_with('\n') {
        out.push_str(segments.get(1).copied().unwrap_or("\n"));
    }
    out.push_str(&recovered.ignored);
}
