//! Error types for the APK readers.

use apk_recon_core::{Error, ErrorCode};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for APK operations.
pub type Result<T> = std::result::Result<T, ApkError>;

/// Errors raised while decoding binary XML.
#[derive(Debug, Error)]
pub enum AxmlError {
    /// The decoder rejected the document
    #[error("{0}")]
    Decode(String),

    /// The document has no root element
    #[error("document has no root element")]
    NoRoot,
}

/// A DEX file the parser rejected.
#[derive(Debug, Error)]
#[error("invalid DEX file: {0}")]
pub struct DexError(
    /// Message from the parser
    pub String,
);

/// Errors raised while writing the decoded manifest as text.
#[derive(Debug, Error)]
pub enum XmlWriteError {
    /// Writer failure
    #[error("xml writer: {0}")]
    Writer(#[from] quick_xml::Error),

    /// Underlying IO failure
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// Output was not UTF-8
    #[error("output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Errors that can occur while loading an APK.
#[derive(Debug, Error)]
pub enum ApkError {
    /// The APK path does not exist
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a readable zip archive
    #[error("invalid archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// A DEX entry could not be parsed
    #[error("{entry}: {source}")]
    Dex {
        /// Archive entry name
        entry: String,
        /// Parse failure
        #[source]
        source: DexError,
    },
}

impl From<ApkError> for Error {
    fn from(err: ApkError) -> Self {
        match err {
            ApkError::NotFound(path) => Error::file_not_found(path),
            ApkError::Io(e) => e.into(),
            ApkError::Archive(e) => Error::new(ErrorCode::NotAnArchive, e.to_string())
                .with_suggestion("Pass the path of an .apk file")
                .with_source(e),
            ApkError::Dex { entry, source } => {
                Error::new(ErrorCode::DexFormat, format!("{entry}: {source}")).with_source(source)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_file_not_found() {
        let err: Error = ApkError::NotFound(PathBuf::from("missing.apk")).into();
        assert_eq!(err.code, ErrorCode::FileNotFound);
        assert!(err.message.contains("missing.apk"));
    }

    #[test]
    fn test_dex_error_keeps_entry_name() {
        let err = ApkError::Dex {
            entry: "classes2.dex".to_string(),
            source: DexError("bad magic".to_string()),
        };
        assert_eq!(err.to_string(), "classes2.dex: invalid DEX file: bad magic");

        let core: Error = err.into();
        assert_eq!(core.code, ErrorCode::DexFormat);
    }
}
