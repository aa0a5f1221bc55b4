use serde::{Deserialize, Serialize};

use crate::error::{MergeError, Result};

/// Configuration for merging and locating generated blocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Markers written around divergent old/new content
    pub markers: ConflictMarkers,

    /// Keyword that introduces a generated block (`namespace Foo { ... }`)
    pub block_keyword: String,

    /// Optional keyword allowed in front of the block keyword
    pub export_keyword: String,

    /// Line-alignment algorithm used by the default diff engine
    pub algorithm: DiffAlgorithm,

    /// Tag that opens a generation directive comment
    pub directive_tag: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            markers: ConflictMarkers::default(),
            block_keyword: "namespace".to_string(),
            export_keyword: "export".to_string(),
            algorithm: DiffAlgorithm::default(),
            directive_tag: "fetchTsComment".to_string(),
        }
    }
}

impl MergeConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.markers.validate()?;

        for (field, value) in [
            ("block_keyword", &self.block_keyword),
            ("export_keyword", &self.export_keyword),
            ("directive_tag", &self.directive_tag),
        ] {
            if value.trim().is_empty() {
                return Err(MergeError::invalid_config(format!("{field} must not be empty")));
            }
            if value.chars().any(char::is_whitespace) {
                return Err(MergeError::invalid_config(format!(
                    "{field} must be a single word, got {value:?}"
                )));
            }
        }

        Ok(())
    }

    /// Parse a TOML document; missing keys fall back to defaults
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(raw).map_err(|err| MergeError::invalid_config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Conflict marker lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConflictMarkers {
    pub start: String,
    pub separator: String,
    pub end: String,
}

impl Default for ConflictMarkers {
    fn default() -> Self {
        Self {
            start: "<<<<<<<".to_string(),
            separator: "=======".to_string(),
            end: ">>>>>>>".to_string(),
        }
    }
}

impl ConflictMarkers {
    fn validate(&self) -> Result<()> {
        if self.start.is_empty() || self.separator.is_empty() || self.end.is_empty() {
            return Err(MergeError::invalid_config("conflict markers must not be empty"));
        }
        if [&self.start, &self.separator, &self.end]
            .iter()
            .any(|marker| marker.contains('\n'))
        {
            return Err(MergeError::invalid_config(
                "conflict markers must fit on a single line",
            ));
        }
        if self.start == self.separator || self.separator == self.end || self.start == self.end {
            return Err(MergeError::invalid_config("conflict markers must be distinct"));
        }
        Ok(())
    }

    /// Render one conflict block
    #[must_use]
    pub fn render(&self, old: &str, new: &str) -> String {
        format!(
            "{}\n{old}\n{}\n{new}\n{}",
            self.start, self.separator, self.end
        )
    }

    /// Count the conflict blocks present in `text`
    #[must_use]
    pub fn count_in(&self, text: &str) -> usize {
        text.lines().filter(|line| *line == self.start).count()
    }
}

/// Line-alignment algorithm for the default diff engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffAlgorithm {
    /// Classic O(ND) shortest edit script
    #[default]
    Myers,

    /// Patience diff, anchors on unique lines
    Patience,

    /// Longest common subsequence
    Lcs,
}

impl DiffAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            DiffAlgorithm::Myers => "myers",
            DiffAlgorithm::Patience => "patience",
            DiffAlgorithm::Lcs => "lcs",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = MergeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.algorithm, DiffAlgorithm::Myers);
    }

    #[test]
    fn test_config_validation() {
        let mut config = MergeConfig::default();

        config.block_keyword = "  ".to_string();
        assert!(config.validate().is_err());

        config.block_keyword = "declare namespace".to_string();
        assert!(config.validate().is_err());

        config.block_keyword = "module".to_string();
        config.markers.separator = String::new();
        assert!(config.validate().is_err());

        config.markers.separator = "<<<<<<<".to_string();
        assert!(config.validate().is_err());

        config.markers = ConflictMarkers::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = MergeConfig::from_toml_str(
            r#"
block_keyword = "module"
algorithm = "patience"

[markers]
start = "<<<<<<< existing"
"#,
        )
        .unwrap();

        assert_eq!(config.block_keyword, "module");
        assert_eq!(config.export_keyword, "export");
        assert_eq!(config.algorithm, DiffAlgorithm::Patience);
        assert_eq!(config.markers.start, "<<<<<<< existing");
        assert_eq!(config.markers.end, ">>>>>>>");
    }

    #[test]
    fn test_from_toml_rejects_invalid() {
        assert!(MergeConfig::from_toml_str("algorithm = \"quantum\"").is_err());
        assert!(MergeConfig::from_toml_str("export_keyword = \"\"").is_err());
    }

    #[test]
    fn test_render_and_count_markers() {
        let markers = ConflictMarkers::default();
        let block = markers.render("name?: string", "name: string");
        assert_eq!(
            block,
            "<<<<<<<\nname?: string\n=======\nname: string\n>>>>>>>"
        );
        let text = format!("a\n{block}\nb\n{block}");
        assert_eq!(markers.count_in(&text), 2);
    }
}
