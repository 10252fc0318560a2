//! Treecast - Main Entry Point
//!
//! Command-line trigger for the export pipeline: reads a snapshot captured
//! from the live view and writes the requested artifact next to it.

use std::path::PathBuf;

use clap::Parser;
use log::info;

use treecast::config;
use treecast::{ExportFormat, ExportOptions, ExportTarget, Snapshot};

/// Application name constant.
const APP_NAME: &str = "treecast";

/// Export a captured table/tree snapshot as text, SVG, or HTML.
#[derive(Debug, Parser)]
#[command(name = APP_NAME, version, about)]
struct Cli {
    /// Snapshot JSON captured from the live view
    snapshot: PathBuf,

    /// What to export
    #[arg(long, short = 't', value_enum, default_value_t = ExportTarget::Tree)]
    target: ExportTarget,

    /// Artifact format (defaults to the last used format)
    #[arg(long, short = 'f', value_enum)]
    format: Option<ExportFormat>,

    /// Output directory (defaults to the last used directory, then `.`)
    #[arg(long, short = 'o')]
    out_dir: Option<PathBuf>,

    /// Artifact filename override
    #[arg(long)]
    filename: Option<String>,
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> treecast::Result<()> {
    let mut settings = config::load_settings();

    let snapshot = Snapshot::from_file(&cli.snapshot)?;
    let format = cli.format.unwrap_or(settings.export.last_format);

    let mut options = ExportOptions::new(cli.target, format);
    options.filename = cli.filename;
    // The snapshot's captured font wins; the configured default fills in.
    if snapshot.styles.font.is_none() {
        options.embed_font = settings.font.clone();
    }

    let artifact = snapshot.export(&options)?;

    let out_dir = cli
        .out_dir
        .or_else(|| settings.export.last_export_directory.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let path = artifact.write_to(&out_dir)?;

    info!("Exported {} ({} bytes)", path.display(), artifact.bytes.len());
    println!("{}", path.display());

    // Remember the chosen format and directory for next time.
    settings.export.last_format = format;
    settings.export.last_export_directory = Some(out_dir);
    config::save_settings_silent(&settings);

    Ok(())
}
