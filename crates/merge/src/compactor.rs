//! Raw segment splitting and normalization-empty line removal.

/// Split text into raw segments, keeping every line terminator (`\n` or
/// `\r\n`) as a segment of its own so that concatenating the segments
/// reproduces the input exactly.
///
/// Content segments sit at even indices, terminators at odd ones.
pub fn split_segments(text: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut rest = text;

    while let Some(newline) = rest.find('\n') {
        let content_end = if rest[..newline].ends_with('\r') {
            newline - 1
        } else {
            newline
        };
        segments.push(&rest[..content_end]);
        segments.push(&rest[content_end..=newline]);
        rest = &rest[newline + 1..];
    }

    segments.push(rest);
    segments
}

/// Non-empty normalized lines plus a map back to their original indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compacted {
    /// Diff keys, in order
    pub lines: Vec<String>,
    /// `map[i]` is the original index of `lines[i]`; strictly increasing
    pub map: Vec<usize>,
}

impl Compacted {
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Original index for a compacted position
    #[must_use]
    pub fn original_index(&self, position: usize) -> Option<usize> {
        self.map.get(position).copied()
    }
}

/// Drop empty normalized lines, remembering where the survivors came from.
pub fn compact(normalized: Vec<String>) -> Compacted {
    normalized
        .into_iter()
        .enumerate()
        .filter(|(_, line)| !line.is_empty())
        .fold(Compacted::default(), |mut acc, (original, line)| {
            acc.lines.push(line);
            acc.map.push(original);
            acc
        })
}
