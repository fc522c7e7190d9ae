mod cover;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use futures::{StreamExt, stream};
use tokio::sync::{
    Semaphore,
    mpsc::{self, Receiver, Sender},
};
use tokio::task::spawn_blocking;
use tracing::{error, warn};

use lofty::config::WriteOptions;
use lofty::tag::{Accessor, Tag, TagExt, TagType};

use osutape_core::BeatmapFile;

use crate::collection::CollectionFilter;
use crate::error::ExportError;
use crate::extensions::SupportedAudio;
use crate::scanner::BeatmapEntry;

/// Nombre de fichero seguro a partir del título: solo quedan alfanuméricos
/// y espacios, y se recorta.
pub fn safe_file_name(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Un mp3 ya copiado y etiquetado en la carpeta de salida.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedTrack {
    pub source: PathBuf,
    pub output: PathBuf,
    pub title: String,
}

/// Por qué un beatmap se dejó fuera sin que sea un error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotInCollection,
    UnsupportedAudio,
}

/// Resultado de procesar un beatmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Exported(ExportedTrack),
    Skipped { path: PathBuf, reason: SkipReason },
}

#[derive(Debug, Clone)]
pub struct ExporterConfig {
    pub output_dir: PathBuf,
    pub album: String,
    pub collection: Option<Arc<CollectionFilter>>,
    /// Porcentaje de CPU a usar (0.0–100.0)
    pub cpu_percent: f32,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            album: "Osu".to_string(),
            collection: None,
            cpu_percent: 50.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Exporter {
    config: Arc<ExporterConfig>,
}

impl Exporter {
    pub fn new(config: ExporterConfig) -> Self {
        Exporter {
            config: config.into(),
        }
    }

    fn calc_max_threads(&self) -> (usize, usize) {
        let max_threads = (num_cpus::get() as f32 * self.config.cpu_percent / 100.0).ceil() as usize;
        let max_threads = max_threads.max(1);
        let max_threads = max_threads.clamp(1, 100);
        (max_threads, max_threads.saturating_mul(2))
    }

    /// Lanza la exportación en segundo plano y devuelve el canal por el que
    /// van llegando los resultados, uno por beatmap.
    pub fn process(&self, entries: Vec<BeatmapEntry>) -> Receiver<Result<ExportOutcome>> {
        let (max_threads, chan_size) = self.calc_max_threads();

        let (tx, rx) = mpsc::channel(chan_size);

        let config = self.config.clone();
        tokio::spawn(async move {
            if let Err(e) = Self::export_group(tx, entries, config, max_threads).await {
                error!(error = %e, "pipeline de exportación falló");
            }
        });

        rx
    }

    /// Procesa todas las entradas en paralelo acotado por el semáforo.
    async fn export_group(
        tx: Sender<Result<ExportOutcome>>,
        entries: Vec<BeatmapEntry>,
        cfg: Arc<ExporterConfig>,
        permits: usize,
    ) -> Result<()> {
        let sem = Arc::new(Semaphore::new(permits));

        let stream_of_futures = entries.into_iter().map(|entry| {
            let sem = sem.clone();
            let cfg = cfg.clone();

            async move {
                let _permit = sem.acquire_owned().await?;

                let outcome = spawn_blocking(move || Self::export_single(entry, cfg)).await??;

                Ok::<_, anyhow::Error>(outcome)
            }
        });

        let mut stream = stream::iter(stream_of_futures).buffer_unordered(permits);

        while let Some(result) = stream.next().await {
            if tx.send(result).await.is_err() {
                break;
            }
        }

        Ok(())
    }

    /// Exporta un beatmap: parsea el descriptor, aplica el filtro de
    /// colecciones, copia el mp3 a la salida y re-escribe sus etiquetas.
    fn export_single(entry: BeatmapEntry, cfg: Arc<ExporterConfig>) -> Result<ExportOutcome, ExportError> {
        let map = BeatmapFile::open(&entry.osu_file)?;

        if let Some(filter) = &cfg.collection {
            let title = map.title()?;
            let artist = map.field("Metadata", "Artist")?.to_string();
            if !filter.matches(&title, &artist) {
                return Ok(ExportOutcome::Skipped {
                    path: entry.osu_file,
                    reason: SkipReason::NotInCollection,
                });
            }
        }

        let audio = map.audio_path()?;
        if SupportedAudio::from_path(&audio) != Some(SupportedAudio::Mp3) {
            return Ok(ExportOutcome::Skipped {
                path: entry.osu_file,
                reason: SkipReason::UnsupportedAudio,
            });
        }

        let title = map.title()?;
        fs::create_dir_all(&cfg.output_dir)?;
        let output = cfg.output_dir.join(format!("{}.mp3", safe_file_name(&title)));
        fs::copy(&audio, &output)?;

        Self::write_tags(&map, &output, &cfg.album)?;

        Ok(ExportOutcome::Exported(ExportedTrack {
            source: audio,
            output,
            title,
        }))
    }

    /// Etiqueta nueva de cero: descarta los frames que venían en la copia y
    /// deja título, artista, álbum y la portada.
    fn write_tags(map: &BeatmapFile, output: &Path, album: &str) -> Result<(), ExportError> {
        let mut tag = Tag::new(TagType::Id3v2);
        tag.set_title(map.display_title()?);
        tag.set_artist(map.display_artist()?);
        tag.set_album(album.to_string());

        if let Some(bg) = map.background_path() {
            match cover::front_cover(&bg) {
                Ok(picture) => tag.push_picture(picture),
                Err(e) => warn!(%e, "no se pudo incrustar la portada, se omite"),
            }
        }

        tag.save_to_path(output, WriteOptions::default())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn safe_file_name_strips_everything_but_alnum_and_spaces() {
        assert_eq!(safe_file_name("Song: A / B!"), "Song A  B");
        assert_eq!(safe_file_name("  trimmed  "), "trimmed");
        assert_eq!(safe_file_name("ソング A"), "ソング A");
        assert_eq!(safe_file_name("***"), "");
    }

    fn write_map(dir: &Path, audio_name: &str) -> PathBuf {
        let osu = dir.join("map.osu");
        let mut f = fs::File::create(&osu).unwrap();
        write!(
            f,
            "osu file format v14\n\n[General]\nAudioFilename: {audio_name}\n\n\
             [Metadata]\nTitle:Song A\nArtist:Band B\n"
        )
        .unwrap();
        osu
    }

    #[test]
    fn non_mp3_audio_is_skipped_without_touching_the_output() {
        let tmp = tempdir().unwrap();
        let osu_file = write_map(tmp.path(), "audio.ogg");
        let entry = BeatmapEntry {
            dir: tmp.path().to_path_buf(),
            osu_file,
        };

        let out_dir = tmp.path().join("out");
        let cfg = Arc::new(ExporterConfig {
            output_dir: out_dir.clone(),
            ..ExporterConfig::default()
        });

        let outcome = Exporter::export_single(entry, cfg).unwrap();
        assert!(matches!(
            outcome,
            ExportOutcome::Skipped {
                reason: SkipReason::UnsupportedAudio,
                ..
            }
        ));
        assert!(!out_dir.exists());
    }

    #[test]
    fn beatmap_outside_the_collection_is_skipped() {
        let tmp = tempdir().unwrap();
        let osu_file = write_map(tmp.path(), "audio.mp3");
        let entry = BeatmapEntry {
            dir: tmp.path().to_path_buf(),
            osu_file,
        };

        let filter = CollectionFilter::from_text("Band B - Otra Canción [Hard]\n");
        let cfg = Arc::new(ExporterConfig {
            collection: Some(Arc::new(filter)),
            ..ExporterConfig::default()
        });

        let outcome = Exporter::export_single(entry, cfg).unwrap();
        assert!(matches!(
            outcome,
            ExportOutcome::Skipped {
                reason: SkipReason::NotInCollection,
                ..
            }
        ));
    }

    #[test]
    fn missing_audio_filename_is_an_error() {
        let tmp = tempdir().unwrap();
        let osu = tmp.path().join("map.osu");
        fs::write(&osu, "[Metadata]\nTitle:Song A\n").unwrap();
        let entry = BeatmapEntry {
            dir: tmp.path().to_path_buf(),
            osu_file: osu,
        };

        let err = Exporter::export_single(entry, Arc::new(ExporterConfig::default())).unwrap_err();
        assert!(matches!(
            err,
            ExportError::Beatmap(osutape_core::Error::MissingField { .. })
        ));
    }

    #[test]
    fn calc_max_threads_stays_at_least_one() {
        let exporter = Exporter::new(ExporterConfig {
            cpu_percent: 0.0,
            ..ExporterConfig::default()
        });
        let (threads, chan) = exporter.calc_max_threads();
        assert!(threads >= 1);
        assert_eq!(chan, threads * 2);
    }
}
