//! Reduces each line to its diff key: the text left after dropping comments,
//! whitespace and statement terminators.

const BLOCK_OPEN: &str = "/*";
const BLOCK_CLOSE: &str = "*/";
const LINE_COMMENT: &str = "//";

/// Fold state carried from one line to the next
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeState {
    /// A `/*` on an earlier line has not been closed yet
    pub in_block_comment: bool,
}

/// Normalize every line. The output has the same length as the input.
pub fn normalize<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    lines
        .iter()
        .scan(NormalizeState::default(), |state, line| {
            let (next, normalized) = normalize_line(*state, line.as_ref());
            *state = next;
            Some(normalized)
        })
        .collect()
}

/// Normalize a single line given the state left by the previous one.
pub fn normalize_line(state: NormalizeState, line: &str) -> (NormalizeState, String) {
    let mut rest = line;

    if state.in_block_comment {
        match rest.find(BLOCK_CLOSE) {
            Some(idx) => rest = &rest[idx + BLOCK_CLOSE.len()..],
            None => return (state, String::new()),
        }
    }

    let (code, in_block_comment) = strip_block_comments(rest);
    let code = match code.find(LINE_COMMENT) {
        Some(idx) => &code[..idx],
        None => code.as_str(),
    };

    let normalized = code
        .chars()
        .filter(|ch| !ch.is_whitespace() && *ch != ';')
        .collect();

    (NormalizeState { in_block_comment }, normalized)
}

/// Remove `/* ... */` spans; an unterminated `/*` swallows the rest of the line.
fn strip_block_comments(line: &str) -> (String, bool) {
    let mut kept = String::with_capacity(line.len());
    let mut rest = line;

    while let Some(open) = rest.find(BLOCK_OPEN) {
        kept.push_str(&rest[..open]);
        let body = &rest[open + BLOCK_OPEN.len()..];
        match body.find(BLOCK_CLOSE) {
            Some(close) => rest = &body[close + BLOCK_CLOSE.len()..],
            None => return (kept, true),
        }
    }

    kept.push_str(rest);
    (kept, false)
}
