//! Loaded APK: archive listing, decoded manifest and parsed DEX files.

use crate::dex::DexFile;
use crate::error::{ApkError, Result};
use crate::manifest::{Manifest, PackageInfo};
use crate::xml;
use std::io::{Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// Archive entry holding the binary manifest
pub const MANIFEST_ENTRY: &str = "AndroidManifest.xml";

/// Prefix of the assets directory inside the archive
pub const ASSETS_PREFIX: &str = "assets/";

/// Outcome of decoding `AndroidManifest.xml`.
///
/// Decoding is lenient: a broken manifest is recorded here instead of failing
/// the whole load.
#[derive(Debug, Clone)]
pub enum ManifestState {
    /// The archive has no manifest entry
    Missing,
    /// Decoded successfully
    Decoded(Manifest),
    /// Present but not decodable
    Failed(String),
}

/// Read-only view of an APK.
#[derive(Debug)]
pub struct Apk {
    files: Vec<String>,
    manifest: ManifestState,
    dex_files: Vec<DexFile>,
}

/// `classes.dex` sorts as 1, `classesN.dex` as N
fn dex_ordinal(name: &str) -> Option<u32> {
    let digits = name.strip_prefix("classes")?.strip_suffix(".dex")?;
    if digits.is_empty() {
        return Some(1);
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

// Declared entry sizes are not used for preallocation
fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Vec<u8>> {
    let mut file = archive.by_name(name)?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    Ok(buf)
}

impl Apk {
    /// Open and parse the APK at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ApkError::NotFound(path.to_path_buf()));
        }
        let file = std::fs::File::open(path)?;
        let apk = Self::from_reader(std::io::BufReader::new(file))?;
        tracing::info!(
            path = %path.display(),
            entries = apk.files.len(),
            dex_files = apk.dex_files.len(),
            "loaded apk"
        );
        Ok(apk)
    }

    /// Parse an APK from any seekable reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut files = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            files.push(archive.by_index_raw(i)?.name().to_string());
        }

        let manifest = if files.iter().any(|f| f == MANIFEST_ENTRY) {
            let bytes = read_entry(&mut archive, MANIFEST_ENTRY)?;
            match xml::decode(&bytes) {
                Ok(root) => ManifestState::Decoded(Manifest::new(root)),
                Err(e) => {
                    tracing::warn!(error = %e, "manifest could not be decoded");
                    ManifestState::Failed(e.to_string())
                }
            }
        } else {
            tracing::warn!("archive has no {}", MANIFEST_ENTRY);
            ManifestState::Missing
        };

        let mut dex_names: Vec<(u32, &String)> = files
            .iter()
            .filter_map(|f| dex_ordinal(f).map(|n| (n, f)))
            .collect();
        dex_names.sort();

        let mut dex_files = Vec::with_capacity(dex_names.len());
        for (_, name) in dex_names {
            let bytes = read_entry(&mut archive, name)?;
            let dex = DexFile::parse(bytes).map_err(|source| ApkError::Dex {
                entry: name.clone(),
                source,
            })?;
            dex_files.push(dex);
        }

        Ok(Self {
            files,
            manifest,
            dex_files,
        })
    }

    /// Every archive entry name, in archive order
    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Entries under `assets/`, in archive order
    pub fn assets(&self) -> Vec<&str> {
        self.files
            .iter()
            .map(String::as_str)
            .filter(|f| f.starts_with(ASSETS_PREFIX))
            .collect()
    }

    /// Whether the manifest was found and decoded
    pub fn manifest_state(&self) -> &ManifestState {
        &self.manifest
    }

    /// The decoded manifest, if decoding succeeded
    pub fn manifest(&self) -> Option<&Manifest> {
        match &self.manifest {
            ManifestState::Decoded(m) => Some(m),
            _ => None,
        }
    }

    /// Package metadata; all fields are `None` without a decoded manifest
    pub fn package_info(&self) -> PackageInfo {
        self.manifest().map(Manifest::package_info).unwrap_or_default()
    }

    /// Declared activities, resolved; empty without a decoded manifest
    pub fn activities(&self) -> Vec<String> {
        self.manifest().map(Manifest::activities).unwrap_or_default()
    }

    /// The launcher activity, if the manifest declares one
    pub fn main_activity(&self) -> Option<String> {
        self.manifest().and_then(Manifest::main_activity)
    }

    /// Parsed DEX files, `classes.dex` first
    pub fn dex_files(&self) -> &[DexFile] {
        &self.dex_files
    }

    /// Class descriptors across all DEX files
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.dex_files
            .iter()
            .flat_map(|d| d.class_names().iter().map(String::as_str))
    }

    /// String constants across all DEX files
    pub fn strings(&self) -> impl Iterator<Item = &str> {
        self.dex_files
            .iter()
            .flat_map(|d| d.strings().iter().map(String::as_str))
    }
}
