use regex::Regex;

use crate::config::MergeConfig;
use crate::types::ExistingBlock;

/// Finds a previously generated block by name.
///
/// The scan is textual: the introducer is matched with a regex and the body
/// is delimited by brace counting, so braces inside string literals or
/// comments are counted like any other.
#[derive(Debug, Clone)]
pub struct Locator {
    block_keyword: String,
    export_keyword: String,
}

impl Default for Locator {
    fn default() -> Self {
        Self::new(&MergeConfig::default())
    }
}

impl Locator {
    #[must_use]
    pub fn new(config: &MergeConfig) -> Self {
        Self {
            block_keyword: config.block_keyword.clone(),
            export_keyword: config.export_keyword.clone(),
        }
    }

    /// Locate the first block named `name` in `document`.
    ///
    /// Returns `None` when the introducer is missing or its braces never
    /// balance; callers then insert fresh text instead of merging.
    pub fn locate(&self, document: &str, name: &str) -> Option<ExistingBlock> {
        let pattern = format!(
            r"(?:{}\s*)*{}\s+{}\s*\{{",
            regex::escape(&self.export_keyword),
            regex::escape(&self.block_keyword),
            regex::escape(name),
        );
        let introducer = match Regex::new(&pattern) {
            Ok(re) => re,
            Err(err) => {
                log::warn!("invalid block introducer pattern {pattern:?}: {err}");
                return None;
            }
        };

        let found = introducer.find(document)?;
        let body_start = found.end();

        let Some(close) = matching_brace(&document[body_start..]) else {
            log::warn!(
                "block `{name}` at offset {} has unbalanced braces; treating as absent",
                found.start()
            );
            return None;
        };

        let start = found.start();
        let end = body_start + close;
        Some(ExistingBlock {
            start,
            end,
            text: document[start..=end].to_string(),
        })
    }
}

/// Locate `name` with the default keywords (`export`, `namespace`).
pub fn locate(document: &str, name: &str) -> Option<ExistingBlock> {
    Locator::default().locate(document, name)
}

/// Offset of the `}` closing a block whose `{` was just consumed.
fn matching_brace(body: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (offset, byte) in body.bytes().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(offset);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_locates_exported_namespace() {
        let doc = "export namespace Foo { interface A { x: number } }";
        let block = locate(doc, "Foo").unwrap();
        assert_eq!(block.start, 0);
        assert_eq!(block.end, doc.len() - 1);
        assert_eq!(block.text, doc);
    }

    #[test]
    fn test_block_inside_larger_document() {
        let doc = "import x from 'y'\n\n/** fetchTsComment */\nnamespace User {\n  id: number\n}\nconst after = {}\n";
        let block = locate(doc, "User").unwrap();
        assert_eq!(&doc[block.start..block.start + 9], "namespace");
        assert_eq!(block.text, "namespace User {\n  id: number\n}");
        assert_eq!(&doc[block.span()], block.text);
    }

    #[test]
    fn test_name_must_match_exactly() {
        let doc = "namespace FooBar { }\nnamespace Foo { a: b }";
        let block = locate(doc, "Foo").unwrap();
        assert_eq!(block.text, "namespace Foo { a: b }");
    }

    #[test]
    fn test_name_is_escaped() {
        let doc = "namespace A { }";
        assert!(locate(doc, "A.*").is_none());
        assert!(locate(doc, ".").is_none());
    }

    #[test]
    fn test_missing_block() {
        assert!(locate("interface Foo { }", "Foo").is_none());
        assert!(locate("", "Foo").is_none());
    }

    #[test]
    fn test_unbalanced_braces_are_absent() {
        assert!(locate("export namespace Foo { interface A { x: number }", "Foo").is_none());
    }

    #[test]
    fn test_custom_keywords() {
        let config = MergeConfig {
            block_keyword: "module".to_string(),
            export_keyword: "declare".to_string(),
            ..MergeConfig::default()
        };
        let doc = "declare module Api {\n}";
        let block = Locator::new(&config).locate(doc, "Api").unwrap();
        assert_eq!(block.start, 0);
        assert_eq!(block.text, doc);
        assert!(locate(doc, "Api").is_none());
    }

    #[test]
    fn test_multibyte_text_offsets() {
        let doc = "// 类型\nnamespace Ü { name: '名前' }";
        let block = locate(doc, "Ü").unwrap();
        assert_eq!(&doc[block.span()], "namespace Ü { name: '名前' }");
    }
}
