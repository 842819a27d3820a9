//! The analysis report: everything printed about one APK, as a plain value.

use crate::apk::{Apk, ManifestState};
use crate::manifest::PackageInfo;
use apk_recon_core::scan::{scan_matching, Scanners};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

/// One declared activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityEntry {
    /// Fully qualified class name
    pub name: String,
    /// Whether this is the launcher activity
    pub main: bool,
}

/// What the manifest section shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ManifestSection {
    /// No `AndroidManifest.xml` in the archive
    Missing,
    /// Pretty-printed XML
    Decoded(String),
    /// Decoding or rendering failed with this message
    Error(String),
}

/// Findings for one APK, in the order they are printed.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Path the APK was loaded from
    pub path: String,
    /// Package identity and SDK bounds
    pub package: PackageInfo,
    /// Declared activities with the launcher flagged
    pub activities: Vec<ActivityEntry>,
    /// Decoded manifest text or the reason there is none
    pub manifest: ManifestSection,
    /// Entries under `assets/`, in archive order
    pub assets: Vec<String>,
    /// Class descriptors matching the class hints
    pub classes: BTreeSet<String>,
    /// String constants matching the string hints
    pub strings: BTreeSet<String>,
    /// `CREATE TABLE` statements matching the schema hints
    pub schema: BTreeSet<String>,
}

impl Report {
    /// Run every reporter and scanner over a loaded APK.
    pub fn build(path: &Path, apk: &Apk, scanners: &Scanners) -> Self {
        Self {
            path: path.display().to_string(),
            package: apk.package_info(),
            activities: activity_entries(apk.activities(), apk.main_activity().as_deref()),
            manifest: manifest_section(apk.manifest_state()),
            assets: apk.assets().into_iter().map(str::to_string).collect(),
            classes: scan_matching(apk.class_names(), &scanners.classes),
            strings: scan_matching(apk.strings(), &scanners.strings),
            schema: scan_matching(apk.strings(), &scanners.schema),
        }
    }
}

/// Flag the first activity equal to `main`; later duplicates stay unflagged
fn activity_entries(names: Vec<String>, main: Option<&str>) -> Vec<ActivityEntry> {
    let mut flagged = false;
    names
        .into_iter()
        .map(|name| {
            let main = !flagged && main == Some(name.as_str());
            flagged |= main;
            ActivityEntry { name, main }
        })
        .collect()
}

fn manifest_section(state: &ManifestState) -> ManifestSection {
    match state {
        ManifestState::Missing => ManifestSection::Missing,
        ManifestState::Failed(message) => ManifestSection::Error(message.clone()),
        ManifestState::Decoded(manifest) => match manifest.root().to_pretty_string() {
            Ok(xml) => ManifestSection::Decoded(xml),
            Err(e) => {
                tracing::warn!(error = %e, "manifest could not be rendered");
                ManifestSection::Error(e.to_string())
            }
        },
    }
}
