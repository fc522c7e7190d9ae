use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use osutape_export::config_manager::ConfigManager;
use osutape_export::export::ExportOutcome;
use osutape_export::{ExportManager, ExportSummary};
use osutape_paths::PATHS;

/// Exporta la música de tus beatmaps de osu! a una carpeta de mp3 etiquetados.
#[derive(Debug, Parser)]
#[command(name = "osutape", version, about)]
struct Cli {
    /// Carpeta Songs de osu! (por defecto, la del settings.toml o la detectada)
    #[arg(long)]
    songs_dir: Option<PathBuf>,

    /// Carpeta de salida para los mp3
    #[arg(long)]
    output: Option<PathBuf>,

    /// Nombre de álbum para las etiquetas
    #[arg(long)]
    album: Option<String>,

    /// Volcado de colecciones para filtrar qué se exporta
    #[arg(long)]
    collection: Option<PathBuf>,

    /// Fichero de configuración alternativo
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let settings_path = cli.config.unwrap_or_else(|| PATHS.settings_file.clone());
    let mut manager_cfg = ConfigManager::load(settings_path)?;

    // los flags de línea de comandos pisan lo persistido
    if let Some(dir) = cli.songs_dir {
        manager_cfg.settings.songs_dir = Some(dir);
    }
    if let Some(out) = cli.output {
        manager_cfg.settings.output_dir = out;
    }
    if let Some(album) = cli.album {
        manager_cfg.settings.album = album;
    }
    if let Some(col) = cli.collection {
        manager_cfg.settings.collection_file = Some(col);
    }

    // una sola instancia escribiendo en la salida a la vez
    let _lock = PATHS.lock()?;

    let output_dir = manager_cfg.settings.output_dir.clone();
    let manager = ExportManager::new(manager_cfg.settings)?;

    let entries = manager.scan().await?;
    println!("🎵 {} carpetas de beatmaps encontradas", entries.len());

    let progress = ProgressBar::new(entries.len() as u64);
    progress.set_style(ProgressStyle::with_template(
        "{bar:40.cyan/blue} {pos}/{len} {msg}",
    )?);

    let mut summary = ExportSummary::default();
    let mut results = manager.process(entries);
    while let Some(result) = results.recv().await {
        match result {
            Ok(ExportOutcome::Exported(track)) => {
                progress.set_message(track.title.clone());
                summary.exported += 1;
            }
            Ok(ExportOutcome::Skipped { .. }) => {
                summary.skipped += 1;
            }
            Err(e) => {
                warn!("export failed: {e:#}");
                summary.failed += 1;
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    println!(
        "✅ {} exportados, {} omitidos, {} fallidos",
        summary.exported, summary.skipped, summary.failed
    );
    println!("Salida: {}", output_dir.display());

    Ok(())
}
