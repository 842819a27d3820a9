//! String and class tables of a DEX file, read through the `dex` crate.

use crate::error::DexError;
use dex::DexReader;

/// The tables of one DEX file that the report scans.
#[derive(Debug, Clone, Default)]
pub struct DexFile {
    strings: Vec<String>,
    class_names: Vec<String>,
}

impl DexFile {
    /// Parse a whole DEX image.
    ///
    /// A malformed header or table layout fails the parse. Individual string
    /// constants or class definitions that cannot be decoded are skipped and
    /// counted in a warning.
    pub fn parse(bytes: Vec<u8>) -> Result<Self, DexError> {
        let dex = DexReader::from_vec(bytes).map_err(|e| DexError(e.to_string()))?;

        let mut strings = Vec::new();
        let mut bad_strings = 0usize;
        for id in 0..dex.header().string_ids_size() {
            match dex.get_string(id.into()) {
                Ok(s) => strings.push(s.to_string()),
                Err(e) => {
                    tracing::debug!(id, error = %e, "skipping undecodable string");
                    bad_strings += 1;
                }
            }
        }

        let mut class_names = Vec::new();
        let mut bad_classes = 0usize;
        for class in dex.classes() {
            match class {
                Ok(class) => class_names.push(class.jtype().type_descriptor().to_string()),
                Err(e) => {
                    tracing::debug!(error = %e, "skipping undecodable class");
                    bad_classes += 1;
                }
            }
        }

        if bad_strings > 0 || bad_classes > 0 {
            tracing::warn!(bad_strings, bad_classes, "DEX entries could not be decoded");
        }

        Ok(Self {
            strings,
            class_names,
        })
    }

    /// String constants in string-id order
    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    /// Descriptors of the defined classes, e.g. `Lcom/example/Foo;`
    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::DexBuilder;

    #[test]
    fn test_reads_strings_and_classes() {
        let dex = DexFile::parse(
            DexBuilder::new()
                .string("onion_skin_alpha")
                .class("Lcom/example/AnimatorUtil;")
                .build(),
        )
        .unwrap();

        assert!(dex.strings().iter().any(|s| s == "onion_skin_alpha"));
        assert!(dex.strings().iter().any(|s| s == "Lcom/example/AnimatorUtil;"));
        assert_eq!(dex.class_names(), ["Lcom/example/AnimatorUtil;"]);
    }

    #[test]
    fn test_non_ascii_strings() {
        let dex = DexFile::parse(DexBuilder::new().string("größe").string("日本").build()).unwrap();
        assert!(dex.strings().iter().any(|s| s == "größe"));
        assert!(dex.strings().iter().any(|s| s == "日本"));
    }

    #[test]
    fn test_undecodable_string_is_skipped() {
        let dex = DexFile::parse(
            DexBuilder::new()
                .raw_string(1, vec![0xff])
                .string("keyframe_interval")
                .class("Lcom/example/Timeline;")
                .build(),
        )
        .unwrap();

        assert!(dex.strings().iter().any(|s| s == "keyframe_interval"));
        assert_eq!(dex.class_names(), ["Lcom/example/Timeline;"]);
    }

    #[test]
    fn test_empty_dex() {
        let dex = DexFile::parse(DexBuilder::new().build()).unwrap();
        assert!(dex.strings().is_empty());
        assert!(dex.class_names().is_empty());
    }

    #[test]
    fn test_rejects_garbage() {
        let err = DexFile::parse(b"not a dex file at all".to_vec()).unwrap_err();
        assert!(err.to_string().starts_with("invalid DEX file"));
    }
}
