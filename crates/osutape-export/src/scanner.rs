use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{Level, instrument, warn};

/// Un beatmap listo para procesar: su carpeta dentro de Songs y el primer
/// descriptor `.osu` que contiene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeatmapEntry {
    pub dir: PathBuf,
    pub osu_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SongsScannerConfig {
    pub songs_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct SongsScanner {
    pub config: SongsScannerConfig,
}

impl SongsScanner {
    pub fn new(config: SongsScannerConfig) -> Self {
        Self { config }
    }

    /// Recorre el directorio Songs: una entrada por carpeta de beatmap que
    /// tenga al menos un `.osu`. Las carpetas ilegibles se avisan y se
    /// siguen procesando las demás.
    #[instrument(level = Level::INFO, skip(self))]
    pub async fn scan(&self) -> Result<Vec<BeatmapEntry>> {
        let songs_dir = dunce::canonicalize(&self.config.songs_dir)
            .with_context(|| format!("open {}", self.config.songs_dir.display()))?;

        let mut dirs = Vec::new();
        let mut entries = tokio::fs::read_dir(&songs_dir).await?;
        while let Some(de) = entries.next_entry().await? {
            if de.file_type().await?.is_dir() {
                dirs.push(de.path());
            }
        }
        // orden estable: la elección de "primer descriptor" no depende del SO
        dirs.sort();

        let mut found = Vec::new();
        for dir in dirs {
            match first_descriptor(&dir).await {
                Ok(Some(osu_file)) => found.push(BeatmapEntry { dir, osu_file }),
                Ok(None) => { /* carpeta sin .osu, se omite */ }
                Err(e) => warn!(?e, dir = %dir.display(), "no se pudo leer la carpeta"),
            }
        }

        Ok(found)
    }
}

/// Primer `.osu` (en orden alfabético) dentro de una carpeta de beatmap.
async fn first_descriptor(dir: &Path) -> Result<Option<PathBuf>> {
    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(de) = entries.next_entry().await? {
        let path = de.path();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        if ext.as_deref() == Some("osu") && de.file_type().await?.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn scan_finds_one_descriptor_per_beatmap_dir() {
        let tmp = tempdir().unwrap();
        let songs = tmp.path().join("Songs");

        fs::create_dir_all(songs.join("100 Band B - Song A")).unwrap();
        fs::write(songs.join("100 Band B - Song A/b.osu"), "osu file format v14\n").unwrap();
        fs::write(songs.join("100 Band B - Song A/a.osu"), "osu file format v14\n").unwrap();
        fs::write(songs.join("100 Band B - Song A/audio.mp3"), "x").unwrap();

        fs::create_dir_all(songs.join("200 Sin Descriptor")).unwrap();
        fs::write(songs.join("200 Sin Descriptor/readme.txt"), "x").unwrap();

        // ficheros sueltos en Songs no cuentan
        fs::write(songs.join("suelto.osu"), "x").unwrap();

        let scanner = SongsScanner::new(SongsScannerConfig { songs_dir: songs.clone() });
        let found = scanner.scan().await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].osu_file.file_name().unwrap(), "a.osu");
        assert!(found[0].dir.ends_with("100 Band B - Song A"));
    }

    #[tokio::test]
    async fn scan_fails_when_songs_dir_is_missing() {
        let scanner = SongsScanner::new(SongsScannerConfig {
            songs_dir: PathBuf::from("/definitivamente/no/existe"),
        });
        assert!(scanner.scan().await.is_err());
    }
}
