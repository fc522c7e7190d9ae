//! Crate `osutape_export`: exporta la música de los beatmaps de osu! a una
//! carpeta de mp3 etiquetados (título, artista, álbum y portada).

pub mod collection;
pub mod config_manager;
pub mod error;
pub mod export;
pub mod export_config;
pub mod extensions;
pub mod scanner;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::sync::mpsc::Receiver;
use tracing::{debug, info, warn};

use crate::collection::CollectionFilter;
use crate::export::{ExportOutcome, Exporter, ExporterConfig};
use crate::export_config::ExportSettings;
use crate::scanner::{BeatmapEntry, SongsScanner, SongsScannerConfig};

/// Recuento final de una pasada de exportación.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    pub exported: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub struct ExportManager {
    scanner: SongsScanner,
    exporter: Exporter,
}

impl ExportManager {
    pub fn new(settings: ExportSettings) -> Result<Self> {
        let songs_dir = settings
            .songs_dir
            .clone()
            .context("no songs directory configured and none could be detected")?;

        let collection = match &settings.collection_file {
            Some(path) => {
                let filter = CollectionFilter::from_file(path)
                    .with_context(|| format!("read collection dump {}", path.display()))?;
                info!("{} collection entries loaded", filter.len());
                Some(Arc::new(filter))
            }
            None => None,
        };

        let scanner = SongsScanner::new(SongsScannerConfig { songs_dir });
        let exporter = Exporter::new(ExporterConfig {
            output_dir: settings.output_dir.clone(),
            album: settings.album.clone(),
            collection,
            cpu_percent: settings.cpu_percent,
        });

        Ok(ExportManager { scanner, exporter })
    }

    pub async fn scan(&self) -> Result<Vec<BeatmapEntry>> {
        self.scanner.scan().await
    }

    pub fn process(&self, entries: Vec<BeatmapEntry>) -> Receiver<Result<ExportOutcome>> {
        self.exporter.process(entries)
    }

    /// Escanea y exporta todo, con registro del progreso.
    pub async fn run(&self) -> Result<ExportSummary> {
        info!("Starting songs scan...");
        let entries = self.scan().await?;
        info!("{} beatmap folders found", entries.len());

        let start_time = Instant::now();
        let mut summary = ExportSummary::default();

        let mut results = self.process(entries);
        while let Some(result) = results.recv().await {
            match result {
                Ok(ExportOutcome::Exported(track)) => {
                    info!("Exported: {} -> {}", track.title, track.output.display());
                    summary.exported += 1;
                }
                Ok(ExportOutcome::Skipped { path, reason }) => {
                    debug!(?reason, "skipped {}", path.display());
                    summary.skipped += 1;
                }
                Err(e) => {
                    warn!("Failed to export a beatmap: {}", e);
                    summary.failed += 1;
                }
            }
        }

        let elapsed = start_time.elapsed();
        info!("Export took {} ms", elapsed.as_millis());
        info!(
            "{} exported, {} skipped, {} failed",
            summary.exported, summary.skipped, summary.failed
        );

        Ok(summary)
    }
}
