//! Generation directives: doc comments that tell the generator where to
//! fetch data from and which block name to emit.
//!
//! ```text
//! /** fetchTsComment
//!  * @url https://api.example.com/user
//!  * @namespace User
//!  */
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::MergeConfig;
use crate::edit::InsertionPoint;
use crate::error::{MergeError, Result};

const REQUIRED_KEYS: [&str; 2] = ["url", "namespace"];

/// One directive comment found in a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    /// `@key value` pairs; later duplicates win
    pub values: BTreeMap<String, String>,
    /// 0-based line of the opening `/**`
    pub start_line: usize,
    /// 0-based line of the closing `*/`
    pub end_line: usize,
}

impl Directive {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.get("url")
    }

    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.get("namespace")
    }

    /// Generated text for this directive goes on the line after the comment
    #[must_use]
    pub const fn insertion_point(&self) -> InsertionPoint {
        InsertionPoint::Line(self.end_line + 1)
    }

    /// Fail on the first required key that is missing or blank
    pub fn validate(&self) -> Result<()> {
        for key in REQUIRED_KEYS {
            if self.get(key).map_or(true, |value| value.trim().is_empty()) {
                return Err(MergeError::MissingDirective(key.to_string()));
            }
        }
        Ok(())
    }
}

/// Parse every directive comment tagged with the configured tag.
pub fn parse_directives(document: &str, config: &MergeConfig) -> Vec<Directive> {
    let block = match Regex::new(&format!(
        r"(?s)/\*\*\s{}\r?\n(.*?)\*/",
        regex::escape(&config.directive_tag)
    )) {
        Ok(re) => re,
        Err(err) => {
            log::warn!("invalid directive pattern: {err}");
            return Vec::new();
        }
    };

    block
        .captures_iter(document)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let body = caps.get(1)?.as_str();
            Some(Directive {
                values: parse_values(body),
                start_line: line_of(document, whole.start()),
                end_line: line_of(document, whole.end()),
            })
        })
        .collect()
}

fn parse_values(body: &str) -> BTreeMap<String, String> {
    let continuation = continuation_re();
    let joined = continuation.replace_all(body, "");

    pair_re()
        .captures_iter(&joined)
        .map(|caps| (caps[1].to_string(), caps[2].trim().to_string()))
        .collect()
}

fn continuation_re() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\r?\n\s*\*").expect("valid continuation regex"))
}

fn pair_re() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@(\S+)([^@]*)").expect("valid directive pair regex"))
}

fn line_of(document: &str, offset: usize) -> usize {
    document[..offset].bytes().filter(|b| *b == b'\n').count()
}
