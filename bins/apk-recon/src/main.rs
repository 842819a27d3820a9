//! apk-recon CLI
//!
//! Loads an APK and prints package metadata, activities, the decoded manifest,
//! assets, and keyword hits over class names, string constants and SQL schema.

mod render;

use anyhow::Result;
use apk_recon_android::{Apk, Report};
use apk_recon_cli::output::{self, format_count, format_duration, Status};
use apk_recon_cli::progress;
use apk_recon_core::config::Config;
use apk_recon_core::error::exit_codes;
use apk_recon_core::scan::Scanners;
use apk_recon_telemetry::{TelemetryConfig, Timer};
use clap::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};

const USAGE: &str = "usage: apk-recon <path_to_apk>";

#[derive(Parser)]
#[command(name = "apk-recon")]
#[command(about = "Heuristic reconnaissance report for Android APKs")]
#[command(version)]
struct Cli {
    /// Keyword configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase log verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress the loading line and spinner
    #[arg(short, long)]
    quiet: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Path to the APK
    apk: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    output::set_color_enabled(!cli.no_color);

    let telemetry = TelemetryConfig {
        ansi: !cli.no_color,
        ..TelemetryConfig::for_verbosity(cli.verbose, cli.quiet)
    };
    if let Err(e) = apk_recon_telemetry::init_with_config(telemetry) {
        Status::warning(&e.to_string());
    }

    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            report_error(&err, cli.json);
            exit_code_for(&err)
        }
    };

    std::process::exit(exit_code);
}

fn structured(err: &anyhow::Error) -> Option<&apk_recon_core::Error> {
    err.chain()
        .find_map(|e| e.downcast_ref::<apk_recon_core::Error>())
}

/// With `--json`, structured errors go to stderr as JSON too
fn report_error(err: &anyhow::Error, json: bool) {
    match structured(err) {
        Some(e) if json => match serde_json::to_string_pretty(&e.to_report()) {
            Ok(text) => eprintln!("{text}"),
            Err(_) => Status::error(&format!("{err:#}")),
        },
        _ => Status::error(&format!("{err:#}")),
    }
}

/// Structured errors carry their own exit code; anything else is a failure
fn exit_code_for(err: &anyhow::Error) -> i32 {
    structured(err).map_or(exit_codes::FAILURE, apk_recon_core::Error::exit_code)
}

fn run(cli: &Cli) -> Result<i32> {
    let Some(apk_path) = cli.apk.as_deref() else {
        println!("{USAGE}");
        return Ok(exit_codes::USAGE);
    };

    let config = Config::load(cli.config.as_deref())?;
    if let Some(path) = &config.path {
        tracing::info!(path = %path.display(), "using keyword configuration");
    }
    let scanners = Scanners::from_config(&config.schema.scan);

    if !cli.quiet && !cli.json {
        Status::progress(&format!("Loading APK: {}", apk_path.display()));
    }
    let apk = load(apk_path, cli.quiet)?;

    let timer = Timer::start("report");
    let report = Report::build(apk_path, &apk, &scanners);
    timer.stop();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if cli.json {
        serde_json::to_writer_pretty(&mut out, &report).map_err(apk_recon_core::Error::from)?;
        writeln!(out)?;
    } else {
        render::write_report(&mut out, &report)?;
    }
    out.flush()?;

    Ok(exit_codes::SUCCESS)
}

fn load(path: &Path, quiet: bool) -> Result<Apk> {
    let spinner = progress::spinner(&format!("Loading {}", path.display()), !quiet);
    let timer = Timer::start("load");

    match Apk::open(path) {
        Ok(apk) => {
            let elapsed = timer.stop();
            progress::finish_success(
                &spinner,
                &format!(
                    "Loaded {} in {}",
                    format_count(apk.dex_files().len(), "DEX file", "DEX files"),
                    format_duration(elapsed)
                ),
            );
            Ok(apk)
        }
        Err(e) => {
            progress::finish_error(&spinner, "Failed to load APK");
            Err(apk_recon_core::Error::from(e).into())
        }
    }
}
