//! Text layout of the report

use apk_recon_android::{ManifestSection, Report};
use apk_recon_cli::output::{write_bullet, write_list, write_marked, write_section};
use std::io::{self, Write};

/// Absent manifest values print as `None`
fn show(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("None")
}

/// Write every section of `report` after the loading line.
pub fn write_report<W: Write>(out: &mut W, report: &Report) -> io::Result<()> {
    let package = &report.package;
    write_section(out, "APK Info")?;
    writeln!(out, "Package: {}", show(&package.package))?;
    writeln!(
        out,
        "Version: {} ({})",
        show(&package.version_name),
        show(&package.version_code)
    )?;
    writeln!(
        out,
        "MinSDK: {}  TargetSDK: {}",
        show(&package.min_sdk),
        show(&package.target_sdk)
    )?;

    write_section(out, "Launchable Activities")?;
    for activity in &report.activities {
        if activity.main {
            write_marked(out, &activity.name, "MAIN")?;
        } else {
            write_bullet(out, &activity.name)?;
        }
    }

    write_section(out, "AndroidManifest.xml (decoded)")?;
    match &report.manifest {
        ManifestSection::Decoded(xml) => writeln!(out, "{xml}")?,
        ManifestSection::Missing => writeln!(out, "<no manifest xml>")?,
        ManifestSection::Error(message) => writeln!(out, "<manifest decode error: {message}>")?,
    }

    write_section(out, "Assets dir entries")?;
    write_list(out, &report.assets)?;

    write_section(out, "Suspected animation-related classes")?;
    write_list(out, &report.classes)?;

    write_section(out, "Interesting string constants")?;
    write_list(out, &report.strings)?;

    write_section(out, "Possible SQL schema (CREATE TABLE ...)")?;
    write_list(out, &report.schema)?;

    Ok(())
}
