//! Android package readers for apk-recon
//!
//! This crate provides read-only access to the parts of an APK the report
//! needs:
//! - ZIP container listing and entry access (`zip`)
//! - `AndroidManifest.xml` decoding (`axmldecoder`) and rendering (`quick-xml`)
//! - DEX string and class tables (`dex`)
//! - The [`Report`] built from all of the above

#![warn(missing_docs)]

pub mod apk;
pub mod dex;
pub mod error;
pub mod manifest;
pub mod report;
pub mod xml;

#[cfg(any(test, feature = "test-support"))]
#[allow(missing_docs)]
pub mod fixtures;

pub use apk::{Apk, ManifestState};
pub use error::{ApkError, AxmlError, DexError};
pub use manifest::{Manifest, PackageInfo};
pub use report::{ActivityEntry, ManifestSection, Report};
pub use xml::XmlElement;
