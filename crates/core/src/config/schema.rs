//! Configuration schema definitions

use serde::{Deserialize, Serialize};

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    /// `[scan]` table
    #[serde(default)]
    pub scan: ScanConfig,
}

/// Keyword hints for the class, string and schema scanners
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Substrings that flag a class descriptor as animation-related
    #[serde(default = "default_class_hints")]
    pub class_hints: Vec<String>,

    /// Substrings that flag a string constant as interesting
    #[serde(default = "default_string_hints")]
    pub string_hints: Vec<String>,

    /// Substrings that must co-occur with `create table` in a schema hint
    #[serde(default = "default_schema_hints")]
    pub schema_hints: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            class_hints: default_class_hints(),
            string_hints: default_string_hints(),
            schema_hints: default_schema_hints(),
        }
    }
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| (*w).to_string()).collect()
}

fn default_class_hints() -> Vec<String> {
    owned(&[
        "anim", "bone", "joint", "stick", "skeleton", "ik", "frame", "sprite", "timeline",
        "keyframe",
    ])
}

fn default_string_hints() -> Vec<String> {
    owned(&[
        "figure", "frame", "joint", "bone", "segment", "stick", "angle", "length", "scale",
        "timeline", "keyframe", "fps", "draw", "canvas", "color", "opacity", "alpha", "onion",
    ])
}

fn default_schema_hints() -> Vec<String> {
    owned(&["frame", "anim", "sequence", "object"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_scan_section_keeps_defaults() {
        let schema: ConfigSchema = toml::from_str("[scan]\nclass_hints = [\"rig\"]\n").unwrap();
        assert_eq!(schema.scan.class_hints, vec!["rig"]);
        assert_eq!(schema.scan.schema_hints, default_schema_hints());
        assert_eq!(schema.scan.string_hints.len(), 18);
    }

    #[test]
    fn test_empty_document_is_default() {
        let schema: ConfigSchema = toml::from_str("").unwrap();
        assert_eq!(schema.scan.class_hints.len(), 10);
    }
}
